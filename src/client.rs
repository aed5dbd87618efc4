//! Region client
//!
//! Opens a connection to one cache server, performs the version handshake
//! and then issues get/put/remove requests against a single region. Each
//! call writes one request and waits for its response before returning;
//! `&mut self` keeps exchanges on the connection strictly sequential.

use crate::codec::{create_entry, encode_key, ProtobufCodec, ValueCodec};
use crate::config::ClientConfig;
use crate::error::{ClientError, CodecError, Result};
use crate::locator::LocatorClient;
use crate::pb;
use crate::pb::request::RequestApi;
use crate::pb::response::ResponseApi;
use crate::protocol::{into_response, server_preamble, unexpected, ServerDescriptor, Value};
use crate::transport::FramedStream;
use std::ops::RangeInclusive;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

pub struct RegionClient<C = ProtobufCodec, S = TcpStream> {
    framed: FramedStream<S>,
    codec: C,
    region_name: String,
}

impl<C: ValueCodec> RegionClient<C, TcpStream> {
    /// Connect to `server` and handshake.
    pub async fn connect(
        server: &ServerDescriptor,
        config: &ClientConfig,
        codec: C,
    ) -> Result<Self> {
        tracing::info!("Connecting to host {} on port {}", server.hostname, server.port);
        let stream = TcpStream::connect(server.address()).await?;
        stream.set_nodelay(true)?;
        Self::from_stream(stream, config, codec).await
    }

    /// Ask the configured locator for a server, then connect to it.
    pub async fn discover(config: &ClientConfig, codec: C) -> Result<Self> {
        let server = LocatorClient::new(config).discover().await?;
        Self::connect(&server, config, codec).await
    }
}

impl<C, S> RegionClient<C, S>
where
    C: ValueCodec,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Handshake over an already connected stream.
    ///
    /// On `HandshakeRejected` (or any other failure) the stream is dropped
    /// and the connection closed.
    pub async fn from_stream(stream: S, config: &ClientConfig, codec: C) -> Result<Self> {
        let mut framed = FramedStream::new(stream, config.max_frame_size, config.io_timeout);
        handshake(&mut framed, config.major_version, config.minor_version).await?;
        Ok(Self {
            framed,
            codec,
            region_name: config.region_name.clone(),
        })
    }

    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Look up `key`. `Ok(None)` means the server has no entry for it.
    pub async fn get(&mut self, key: i32) -> Result<Option<String>> {
        let encoded_key = encode_key(&self.codec, key)?;
        match self.get_encoded(encoded_key).await? {
            None | Some(Value::Null) => Ok(None),
            // An empty string is how the server reports a missing string entry.
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(ClientError::Codec(CodecError::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            })),
        }
    }

    /// Look up an arbitrarily typed key.
    pub async fn get_value(&mut self, key: &Value) -> Result<Option<Value>> {
        let encoded_key = self.codec.encode(key)?;
        self.get_encoded(encoded_key).await
    }

    async fn get_encoded(&mut self, key: pb::EncodedValue) -> Result<Option<Value>> {
        tracing::debug!("GET region={} key={:?}", self.region_name, key.value);
        let request = pb::Message::request(RequestApi::GetRequest(pb::GetRequest {
            region_name: self.region_name.clone(),
            key: Some(key),
        }));
        match into_response(self.framed.exchange(&request).await?, "GetResponse")? {
            ResponseApi::GetResponse(resp) => match resp.result {
                Some(encoded) => Ok(Some(self.codec.decode(&encoded)?)),
                None => Ok(None),
            },
            other => Err(unexpected("GetResponse", &other)),
        }
    }

    /// Store `value` under `key`. Returns once the server acknowledges.
    pub async fn put(&mut self, key: i32, value: &str) -> Result<()> {
        self.put_value(&Value::String(key.to_string()), &Value::from(value))
            .await
    }

    pub async fn put_value(&mut self, key: &Value, value: &Value) -> Result<()> {
        let entry = create_entry(&self.codec, key, value)?;
        tracing::debug!("PUT region={} key={:?}", self.region_name, key);
        let request = pb::Message::request(RequestApi::PutRequest(pb::PutRequest {
            region_name: self.region_name.clone(),
            entry: Some(entry),
        }));
        match into_response(self.framed.exchange(&request).await?, "PutResponse")? {
            ResponseApi::PutResponse(_) => Ok(()),
            other => Err(unexpected("PutResponse", &other)),
        }
    }

    /// Remove the entry for `key`, if any.
    pub async fn remove(&mut self, key: i32) -> Result<()> {
        let encoded_key = encode_key(&self.codec, key)?;
        tracing::debug!("REMOVE region={} key={}", self.region_name, key);
        let request = pb::Message::request(RequestApi::RemoveRequest(pb::RemoveRequest {
            region_name: self.region_name.clone(),
            key: Some(encoded_key),
        }));
        match into_response(self.framed.exchange(&request).await?, "RemoveResponse")? {
            ResponseApi::RemoveResponse(_) => Ok(()),
            other => Err(unexpected("RemoveResponse", &other)),
        }
    }

    /// Put `value{i}` under every key in `1..=upper_limit`.
    pub async fn insert_values(&mut self, upper_limit: i32) -> Result<()> {
        for key in 1..=upper_limit {
            self.put(key, &format!("value{}", key)).await?;
        }
        tracing::info!("Inserted {} values into {}", upper_limit.max(0), self.region_name);
        Ok(())
    }

    /// Find present keys by probing 1, 2, 3, ... until the first miss.
    ///
    /// The protocol has no way to list a region's keys, so this only finds
    /// the contiguous run starting at 1; anything after the first hole is
    /// not seen. Use [`scan_keys`](Self::scan_keys) when the range is known.
    pub async fn probe_keys(&mut self) -> Result<Vec<i32>> {
        let mut keys = Vec::new();
        let mut key = 1;
        while self.get(key).await?.is_some() {
            keys.push(key);
            key = match key.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(keys)
    }

    /// Every key in `range` that currently has an entry. Holes are skipped.
    pub async fn scan_keys(&mut self, range: RangeInclusive<i32>) -> Result<Vec<i32>> {
        let mut keys = Vec::new();
        for key in range {
            if self.get(key).await?.is_some() {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        self.framed.shutdown().await
    }
}

async fn handshake<S>(framed: &mut FramedStream<S>, major: u32, minor: u32) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    framed.write_preamble(&server_preamble()).await?;
    let request = pb::Message::request(RequestApi::HandshakeRequest(pb::HandshakeRequest {
        major_version: major,
        minor_version: minor,
    }));
    match into_response(framed.exchange(&request).await?, "HandshakeResponse")? {
        ResponseApi::HandshakeResponse(resp) if resp.handshake_passed => {
            tracing::debug!(
                "Handshake passed, server version {}.{}",
                resp.server_major_version,
                resp.server_minor_version
            );
            Ok(())
        }
        ResponseApi::HandshakeResponse(resp) => {
            tracing::warn!(
                "Failed handshake: offered {}.{}, server speaks {}.{}",
                major,
                minor,
                resp.server_major_version,
                resp.server_minor_version
            );
            Err(ClientError::HandshakeRejected { major, minor })
        }
        other => Err(unexpected("HandshakeResponse", &other)),
    }
}
