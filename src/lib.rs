//! Client for a distributed cache's length-delimited Protobuf protocol.
//!
//! ## Flow
//!
//! 1. Ask a locator for the available servers ([`locator::LocatorClient`])
//! 2. Connect to the first one and handshake ([`client::RegionClient`])
//! 3. Issue get/put requests against a single region, one at a time
//!
//! [`region::CachingProxyRegion`] layers a local cache and entry listeners
//! on top of the client; [`region::MockRegion`] is an in-memory stand-in for
//! tests.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod listener_example;
pub mod locator;
pub mod pb;
pub mod protocol;
pub mod region;
pub mod transport;

pub use client::RegionClient;
pub use codec::{ProtobufCodec, ValueCodec};
pub use config::ClientConfig;
pub use error::{ClientError, CodecError, Result};
pub use locator::LocatorClient;
pub use protocol::{ServerDescriptor, Value};
