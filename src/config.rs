//! Client configuration

use crate::protocol::{
    CURRENT_MAJOR_VERSION, CURRENT_MINOR_VERSION, DEFAULT_LOCATOR_HOST, DEFAULT_LOCATOR_PORT,
    DEFAULT_REGION,
};
use std::time::Duration;

/// Default cap on a single frame (16 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Locator address (`host:port`)
    pub locator_addr: String,
    /// Region every get/put is addressed to
    pub region_name: String,
    /// Versions offered in the handshake
    pub major_version: u32,
    pub minor_version: u32,
    /// Bound on each request/response exchange; `None` waits forever
    pub io_timeout: Option<Duration>,
    /// Frames larger than this are rejected before being read
    pub max_frame_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            locator_addr: format!("{}:{}", DEFAULT_LOCATOR_HOST, DEFAULT_LOCATOR_PORT),
            region_name: DEFAULT_REGION.to_string(),
            major_version: CURRENT_MAJOR_VERSION,
            minor_version: CURRENT_MINOR_VERSION,
            io_timeout: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn locator(mut self, host: &str, port: u16) -> Self {
        self.config.locator_addr = format!("{}:{}", host, port);
        self
    }

    pub fn locator_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.locator_addr = addr.into();
        self
    }

    pub fn region_name(mut self, name: impl Into<String>) -> Self {
        self.config.region_name = name.into();
        self
    }

    pub fn versions(mut self, major: u32, minor: u32) -> Self {
        self.config.major_version = major;
        self.config.minor_version = minor;
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout = Some(timeout);
        self
    }

    pub fn max_frame_size(mut self, bytes: usize) -> Self {
        self.config.max_frame_size = bytes;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.locator_addr, "127.0.0.1:10334");
        assert_eq!(config.region_name, "example-region");
        assert_eq!(config.major_version, CURRENT_MAJOR_VERSION);
        assert_eq!(config.minor_version, CURRENT_MINOR_VERSION);
        assert!(config.io_timeout.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .locator("10.0.0.5", 20334)
            .region_name("orders")
            .versions(2, 0)
            .io_timeout(Duration::from_millis(250))
            .max_frame_size(1024)
            .build();
        assert_eq!(config.locator_addr, "10.0.0.5:20334");
        assert_eq!(config.region_name, "orders");
        assert_eq!((config.major_version, config.minor_version), (2, 0));
        assert_eq!(config.io_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.max_frame_size, 1024);
    }
}
