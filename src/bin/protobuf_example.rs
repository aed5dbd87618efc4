//! Protobuf protocol example
//!
//! Discovers a server through the locator, handshakes, writes `value{i}` for
//! keys `1..=count` into the region and prints every key it can find.
//!
//! Run with: cargo run --bin protobuf-example -- --help

use anyhow::Result;
use cache_proto::client::RegionClient;
use cache_proto::codec::ProtobufCodec;
use cache_proto::config::ClientConfig;
use cache_proto::locator::LocatorClient;
use cache_proto::protocol::{DEFAULT_LOCATOR_HOST, DEFAULT_LOCATOR_PORT, DEFAULT_REGION};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "protobuf-example")]
#[command(about = "Put and get region entries over the Protobuf client protocol")]
struct Args {
    /// Locator host
    #[arg(long, default_value = DEFAULT_LOCATOR_HOST)]
    locator_host: String,

    /// Locator port
    #[arg(long, default_value_t = DEFAULT_LOCATOR_PORT)]
    locator_port: u16,

    /// Region to read and write
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Number of entries to insert
    #[arg(long, default_value = "10")]
    count: i32,

    /// Per-request timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut builder = ClientConfig::builder()
        .locator(&args.locator_host, args.locator_port)
        .region_name(args.region.clone());
    if args.timeout_ms > 0 {
        builder = builder.io_timeout(Duration::from_millis(args.timeout_ms));
    }
    let config = builder.build();

    let server = LocatorClient::new(&config).discover().await?;
    println!(
        "Connecting to host {} on port {}",
        server.hostname, server.port
    );
    let mut client = RegionClient::connect(&server, &config, ProtobufCodec::new()).await?;

    client.insert_values(args.count).await?;

    let keys = client.probe_keys().await?;
    for key in keys {
        match client.get(key).await? {
            Some(value) => println!("{}:{}", key, value),
            None => println!("{}:<removed>", key),
        }
    }

    client.close().await?;
    Ok(())
}
