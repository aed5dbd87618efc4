//! Length-delimited message transport
//!
//! Frames are a protobuf varint length followed by that many bytes of an
//! encoded [`pb::Message`], the same framing as protobuf's
//! `writeDelimitedTo`/`parseDelimitedFrom`. Every exchange on a stream is a
//! single write followed by a blocking read; callers never interleave.

use crate::error::{ClientError, Result};
use crate::pb;
use prost::Message as _;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Longest valid varint encoding of a u64
const MAX_VARINT_LEN: usize = 10;

/// A byte stream carrying delimited protocol messages
pub struct FramedStream<S> {
    stream: BufReader<S>,
    max_frame_size: usize,
    io_timeout: Option<Duration>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, max_frame_size: usize, io_timeout: Option<Duration>) -> Self {
        Self {
            stream: BufReader::new(stream),
            max_frame_size,
            io_timeout,
        }
    }

    /// Write raw preamble bytes (magic byte and version) ahead of any frame.
    pub async fn write_preamble(&mut self, preamble: &[u8]) -> Result<()> {
        let deadline = self.io_timeout;
        let stream = self.stream.get_mut();
        with_deadline(deadline, async move {
            stream.write_all(preamble).await?;
            Ok(())
        })
        .await
    }

    /// Read and verify a preamble written by the peer.
    pub async fn read_preamble(&mut self, expected: &[u8]) -> Result<()> {
        let deadline = self.io_timeout;
        let stream = &mut self.stream;
        let mut actual = vec![0u8; expected.len()];
        with_deadline(deadline, async move {
            stream.read_exact(&mut actual).await.map_err(eof_as_closed)?;
            if actual != expected {
                return Err(ClientError::MalformedFrame(format!(
                    "bad preamble {:02x?}, expected {:02x?}",
                    actual, expected
                )));
            }
            Ok(())
        })
        .await
    }

    /// Write one length-delimited message and flush it.
    pub async fn send(&mut self, message: &pb::Message) -> Result<()> {
        let deadline = self.io_timeout;
        let bytes = message.encode_length_delimited_to_vec();
        let stream = self.stream.get_mut();
        with_deadline(deadline, async move {
            stream.write_all(&bytes).await?;
            stream.flush().await?;
            Ok(())
        })
        .await
    }

    /// Read one length-delimited message.
    ///
    /// A clean end of stream before the first byte of a frame reports
    /// `ConnectionClosed`, as does one in the middle of a frame.
    pub async fn recv(&mut self) -> Result<pb::Message> {
        let deadline = self.io_timeout;
        let limit = self.max_frame_size;
        let stream = &mut self.stream;
        with_deadline(deadline, async move {
            let len = read_varint(stream).await?;
            if len > limit as u64 {
                return Err(ClientError::FrameTooLarge { size: len, limit });
            }
            let mut buf = vec![0u8; len as usize];
            stream.read_exact(&mut buf).await.map_err(eof_as_closed)?;
            Ok(pb::Message::decode(buf.as_slice())?)
        })
        .await
    }

    /// Send a request and wait for the peer's reply.
    pub async fn exchange(&mut self, message: &pb::Message) -> Result<pb::Message> {
        self.send(message).await?;
        self.recv().await
    }

    /// Shut down the write half and release the stream.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8().await.map_err(eof_as_closed)?;
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ClientError::MalformedFrame(
        "length prefix longer than 10 bytes".to_string(),
    ))
}

fn eof_as_closed(err: std::io::Error) -> ClientError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ClientError::ConnectionClosed
    } else {
        ClientError::Io(err)
    }
}

async fn with_deadline<T>(
    deadline: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ClientError::Timeout(limit))?,
        None => fut.await,
    }
}
