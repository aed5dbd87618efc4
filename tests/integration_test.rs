//! Integration tests against an in-process locator and cache server
//!
//! The fake server speaks the same framed protocol over real TCP sockets and
//! stores entries in a `MockRegion`.

use cache_proto::client::RegionClient;
use cache_proto::codec::ProtobufCodec;
use cache_proto::config::ClientConfig;
use cache_proto::error::ClientError;
use cache_proto::event::{event_queue, CacheListener, Operation};
use cache_proto::listener_example::{ListenerExample, ITERATIONS};
use cache_proto::locator::LocatorClient;
use cache_proto::pb;
use cache_proto::pb::request::RequestApi;
use cache_proto::pb::response::ResponseApi;
use cache_proto::protocol::{
    locator_preamble, server_preamble, ServerDescriptor, Value, CURRENT_MAJOR_VERSION,
    CURRENT_MINOR_VERSION,
};
use cache_proto::region::{MockRegion, RegionFactory};
use cache_proto::transport::FramedStream;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

type Store = Arc<MockRegion<String, String>>;

const REGION: &str = "example-region";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cache_proto=debug")
        .try_init();
}

/// Locator that answers every discovery request with `servers`.
async fn spawn_locator(servers: Vec<pb::Server>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let servers = servers.clone();
            tokio::spawn(async move {
                let mut framed = FramedStream::new(stream, 1024 * 1024, None);
                framed.read_preamble(&locator_preamble()).await.unwrap();
                let request = framed.recv().await.unwrap().into_request();
                assert!(matches!(
                    request,
                    Some(RequestApi::GetAvailableServersRequest(_))
                ));
                let reply = pb::Message::response(ResponseApi::GetAvailableServersResponse(
                    pb::GetAvailableServersResponse { servers },
                ));
                framed.send(&reply).await.unwrap();
            });
        }
    });
    addr
}

/// Cache server hosting `REGION`, accepting only protocol version 1.1.
async fn spawn_server(store: Store) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::spawn(serve_connection(stream, store.clone()));
        }
    });
    addr
}

async fn serve_connection(stream: TcpStream, store: Store) {
    let mut framed = FramedStream::new(stream, 1024 * 1024, None);
    if framed.read_preamble(&server_preamble()).await.is_err() {
        return;
    }
    let passed = match framed.recv().await.map(pb::Message::into_request) {
        Ok(Some(RequestApi::HandshakeRequest(req))) => {
            req.major_version == CURRENT_MAJOR_VERSION && req.minor_version == CURRENT_MINOR_VERSION
        }
        _ => return,
    };
    let reply = pb::Message::response(ResponseApi::HandshakeResponse(pb::HandshakeResponse {
        server_major_version: CURRENT_MAJOR_VERSION,
        server_minor_version: CURRENT_MINOR_VERSION,
        handshake_passed: passed,
    }));
    if framed.send(&reply).await.is_err() || !passed {
        return;
    }

    while let Ok(message) = framed.recv().await {
        let reply = match message.into_request() {
            Some(RequestApi::GetRequest(req)) if req.region_name == REGION => {
                let result = key_of(req.key)
                    .and_then(|key| store.get(&key))
                    .map(|value| Value::String(value).into());
                pb::Message::response(ResponseApi::GetResponse(pb::GetResponse { result }))
            }
            Some(RequestApi::PutRequest(req)) if req.region_name == REGION => {
                let entry = req.entry.unwrap_or_default();
                match (key_of(entry.key), entry.value.map(Value::from)) {
                    (Some(key), Some(Value::String(value))) => {
                        store.put(key, value);
                        pb::Message::response(ResponseApi::PutResponse(pb::PutResponse {}))
                    }
                    _ => pb::Message::error(2, "unsupported entry"),
                }
            }
            Some(RequestApi::RemoveRequest(req)) if req.region_name == REGION => {
                if let Some(key) = key_of(req.key) {
                    store.remove(&key);
                }
                pb::Message::response(ResponseApi::RemoveResponse(pb::RemoveResponse {}))
            }
            Some(_) => pb::Message::error(11, "region not found"),
            None => return,
        };
        if framed.send(&reply).await.is_err() {
            return;
        }
    }
}

fn key_of(encoded: Option<pb::EncodedValue>) -> Option<String> {
    match encoded.map(Value::from) {
        Some(Value::String(key)) => Some(key),
        _ => None,
    }
}

async fn connect(store: Store) -> RegionClient {
    let server_addr = spawn_server(store).await;
    let locator_addr = spawn_locator(vec![pb::Server {
        hostname: server_addr.ip().to_string(),
        port: i32::from(server_addr.port()),
    }])
    .await;
    let config = ClientConfig::builder()
        .locator_addr(locator_addr.to_string())
        .build();
    RegionClient::discover(&config, ProtobufCodec::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_put_then_get_roundtrip() {
    init_tracing();
    let store: Store = Arc::new(MockRegion::new(REGION));
    let mut client = connect(store.clone()).await;

    client.insert_values(25).await.unwrap();
    for key in 1..=25 {
        assert_eq!(
            client.get(key).await.unwrap(),
            Some(format!("value{}", key))
        );
    }
    assert_eq!(store.len(), 25);
    assert_eq!(client.get(26).await.unwrap(), None);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_discovery_picks_first_server() {
    init_tracing();
    let locator_addr = spawn_locator(vec![
        pb::Server {
            hostname: "cache-a".to_string(),
            port: 40404,
        },
        pb::Server {
            hostname: "cache-b".to_string(),
            port: 40405,
        },
    ])
    .await;
    let config = ClientConfig::builder()
        .locator_addr(locator_addr.to_string())
        .build();

    let server = LocatorClient::new(&config).discover().await.unwrap();
    assert_eq!(server, ServerDescriptor::new("cache-a", 40404));
}

#[tokio::test]
async fn test_discovery_ignores_malformed_later_entries() {
    init_tracing();
    let locator_addr = spawn_locator(vec![
        pb::Server {
            hostname: "cache-a".to_string(),
            port: 40404,
        },
        pb::Server {
            hostname: String::new(),
            port: 70000,
        },
    ])
    .await;
    let config = ClientConfig::builder()
        .locator_addr(locator_addr.to_string())
        .build();
    let locator = LocatorClient::new(&config);

    let server = locator.discover().await.unwrap();
    assert_eq!(server, ServerDescriptor::new("cache-a", 40404));

    let servers = locator.available_servers().await.unwrap();
    assert_eq!(servers, vec![ServerDescriptor::new("cache-a", 40404)]);
}

#[tokio::test]
async fn test_no_servers_available() {
    init_tracing();
    let locator_addr = spawn_locator(Vec::new()).await;
    let config = ClientConfig::builder()
        .locator_addr(locator_addr.to_string())
        .build();

    let result = LocatorClient::new(&config).discover().await;
    assert!(matches!(result, Err(ClientError::NoServersAvailable)));

    let result = RegionClient::discover(&config, ProtobufCodec::new()).await;
    assert!(matches!(result, Err(ClientError::NoServersAvailable)));
}

#[tokio::test]
async fn test_version_mismatch_rejected() {
    init_tracing();
    let store: Store = Arc::new(MockRegion::new(REGION));
    let server_addr = spawn_server(store).await;
    let server = ServerDescriptor::new(server_addr.ip().to_string(), server_addr.port());
    let config = ClientConfig::builder()
        .versions(CURRENT_MAJOR_VERSION + 1, 0)
        .build();

    match RegionClient::connect(&server, &config, ProtobufCodec::new()).await {
        Err(ClientError::HandshakeRejected { major, minor }) => {
            assert_eq!(major, CURRENT_MAJOR_VERSION + 1);
            assert_eq!(minor, 0);
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("handshake should have been rejected"),
    }

    // The rejection is not fatal: a correctly configured client still connects.
    let mut client = RegionClient::connect(&server, &ClientConfig::default(), ProtobufCodec::new())
        .await
        .unwrap();
    assert_eq!(client.get(1).await.unwrap(), None);
}

#[tokio::test]
async fn test_probe_stops_at_first_hole_scan_does_not() {
    init_tracing();
    let store: Store = Arc::new(MockRegion::new(REGION));
    let mut client = connect(store.clone()).await;

    client.insert_values(100).await.unwrap();
    client.remove(57).await.unwrap();
    assert!(!store.contains_key(&"57".to_string()));

    let probed = client.probe_keys().await.unwrap();
    assert_eq!(probed, (1..=56).collect::<Vec<_>>());

    let scanned = client.scan_keys(1..=100).await.unwrap();
    assert_eq!(scanned.len(), 99);
    assert!(!scanned.contains(&57));
    assert_eq!(scanned.first(), Some(&1));
    assert_eq!(scanned.last(), Some(&100));
}

#[tokio::test]
async fn test_unknown_region_is_server_error() {
    init_tracing();
    let store: Store = Arc::new(MockRegion::new(REGION));
    let server_addr = spawn_server(store).await;
    let server = ServerDescriptor::new(server_addr.ip().to_string(), server_addr.port());
    let config = ClientConfig::builder().region_name("no-such-region").build();

    let mut client = RegionClient::connect(&server, &config, ProtobufCodec::new())
        .await
        .unwrap();
    assert!(matches!(
        client.get(1).await,
        Err(ClientError::Server { code: 11, .. })
    ));
}

#[tokio::test]
async fn test_listener_example_over_caching_proxy() {
    init_tracing();
    let store: Store = Arc::new(MockRegion::new(REGION));
    let client = connect(store.clone()).await;

    let example = ListenerExample::new();
    let mut factory = RegionFactory::new();
    for listener in example.cache_listeners() {
        factory = factory.add_cache_listener(listener.clone());
    }
    let mut region = factory.create_caching_proxy(client);

    let created = example.accept(&mut region).await.unwrap();
    assert_eq!(created, ITERATIONS);
    assert_eq!(store.len(), ITERATIONS);
    assert_eq!(region.local_len(), ITERATIONS);

    let events = example.events().drain();
    assert_eq!(events.len(), ITERATIONS);
    assert!(events.iter().all(|e| e.operation == Operation::Create));
    assert!(events.iter().all(|e| e.region_name == REGION));
}

#[tokio::test]
async fn test_caching_proxy_update_and_read_through() {
    init_tracing();
    let store: Store = Arc::new(MockRegion::new(REGION));
    store.put("9".to_string(), "from-server".to_string());
    let client = connect(store.clone()).await;

    let (listener, queue) = event_queue::<i32, String>(8);
    let listener: Arc<dyn CacheListener<i32, String>> = Arc::new(listener.with_updates());
    let mut region = RegionFactory::new()
        .add_cache_listener(listener)
        .create_caching_proxy(client);

    assert!(!region.contains_key_locally(9));
    assert_eq!(
        region.get(9).await.unwrap(),
        Some("from-server".to_string())
    );
    assert!(region.contains_key_locally(9));

    assert_eq!(region.put(1, "a".to_string()).await.unwrap(), None);
    assert_eq!(
        region.put(1, "b".to_string()).await.unwrap(),
        Some("a".to_string())
    );
    assert_eq!(store.get(&"1".to_string()), Some("b".to_string()));

    let ops: Vec<Operation> = queue.drain().into_iter().map(|e| e.operation).collect();
    assert_eq!(ops, vec![Operation::Create, Operation::Update]);
}
