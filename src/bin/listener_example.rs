//! Cache listener example
//!
//! Creates a caching-proxy region with a listener that queues create events,
//! puts 100 distinct keys in random order and reports how many events were
//! observed.
//!
//! Run with: cargo run --bin listener-example -- --help

use anyhow::Result;
use cache_proto::client::RegionClient;
use cache_proto::codec::ProtobufCodec;
use cache_proto::config::ClientConfig;
use cache_proto::listener_example::ListenerExample;
use cache_proto::protocol::{DEFAULT_LOCATOR_HOST, DEFAULT_LOCATOR_PORT, DEFAULT_REGION};
use cache_proto::region::RegionFactory;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "listener-example")]
#[command(about = "Observe entry-creation events on a caching-proxy region")]
struct Args {
    /// Locator host
    #[arg(long, default_value = DEFAULT_LOCATOR_HOST)]
    locator_host: String,

    /// Locator port
    #[arg(long, default_value_t = DEFAULT_LOCATOR_PORT)]
    locator_port: u16,

    /// Region matching the one defined on the server
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = ClientConfig::builder()
        .locator(&args.locator_host, args.locator_port)
        .region_name(args.region.clone())
        .build();

    let example = ListenerExample::new();

    let client = RegionClient::discover(&config, ProtobufCodec::new()).await?;
    let mut factory = RegionFactory::new();
    for listener in example.cache_listeners() {
        factory = factory.add_cache_listener(listener.clone());
    }
    let mut region = factory.create_caching_proxy(client);

    let created = example.accept(&mut region).await?;
    println!("Created {} entries.", created);

    region.into_client().close().await?;
    Ok(())
}
