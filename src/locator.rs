//! Locator discovery
//!
//! A locator answers a single `GetAvailableServersRequest` per connection.
//! The connection is opened, used for that one exchange and closed again
//! before discovery returns, whatever the outcome.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::pb;
use crate::pb::request::RequestApi;
use crate::pb::response::ResponseApi;
use crate::protocol::{into_response, locator_preamble, unexpected, ServerDescriptor};
use crate::transport::FramedStream;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

pub struct LocatorClient {
    addr: String,
    io_timeout: Option<Duration>,
    max_frame_size: usize,
}

impl LocatorClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            addr: config.locator_addr.clone(),
            io_timeout: config.io_timeout,
            max_frame_size: config.max_frame_size,
        }
    }

    /// Every usable server the locator currently reports, in the locator's
    /// order. Entries that do not describe a reachable address are skipped.
    pub async fn available_servers(&self) -> Result<Vec<ServerDescriptor>> {
        let servers = self.query().await?;
        Ok(usable_servers(&servers))
    }

    /// The first server the locator reports.
    ///
    /// Only that entry is validated; later entries have no bearing on the
    /// outcome.
    pub async fn discover(&self) -> Result<ServerDescriptor> {
        let servers = self.query().await?;
        let first = servers.first().ok_or(ClientError::NoServersAvailable)?;
        let server = ServerDescriptor::try_from(first)?;
        tracing::info!("Locator {} reported server {}", self.addr, server);
        Ok(server)
    }

    async fn query(&self) -> Result<Vec<pb::Server>> {
        tracing::debug!("Querying locator at {}", self.addr);
        let stream = TcpStream::connect(&self.addr).await?;
        let mut framed = FramedStream::new(stream, self.max_frame_size, self.io_timeout);
        let servers = request_servers(&mut framed).await;
        if let Err(e) = framed.shutdown().await {
            tracing::debug!("Locator connection shutdown failed: {}", e);
        }
        servers
    }
}

/// Run the discovery exchange over an already connected stream.
pub(crate) async fn request_servers<S>(framed: &mut FramedStream<S>) -> Result<Vec<pb::Server>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    framed.write_preamble(&locator_preamble()).await?;

    let request = pb::Message::request(RequestApi::GetAvailableServersRequest(
        pb::GetAvailableServersRequest {},
    ));
    let reply = framed.exchange(&request).await?;

    match into_response(reply, "GetAvailableServersResponse")? {
        ResponseApi::GetAvailableServersResponse(resp) => Ok(resp.servers),
        other => Err(unexpected("GetAvailableServersResponse", &other)),
    }
}

fn usable_servers(servers: &[pb::Server]) -> Vec<ServerDescriptor> {
    servers
        .iter()
        .filter_map(|server| match ServerDescriptor::try_from(server) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::warn!("Skipping locator entry: {}", e);
                None
            }
        })
        .collect()
}
