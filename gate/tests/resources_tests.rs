//! Startup wiring tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use ticket_gate::resources::DEMO_OWNER;
use ticket_gate::server::serve;
use ticket_gate::{Config, GateError, ResourceManager};
use ticket_gate_core::{OwnerAddress, TicketRegistry};
use ticket_gate_testing::{InMemoryTicketRegistry, fixtures, test_clock};
use ticket_gate_web::build_router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_test::assert_ok;

fn config_from(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[tokio::test]
async fn test_in_memory_registry_with_demo_seed() {
    let config = config_from(&[("GATE_SEED_DEMO", "true")]);
    let resources = ResourceManager::from_config(&config).await.unwrap();

    let unused = resources.registry.lookup(&fixtures::identity("12345")).await.unwrap().unwrap();
    assert!(!unused.is_used());

    let used = resources.registry.lookup(&fixtures::identity("12346")).await.unwrap().unwrap();
    assert!(used.is_used());
    assert_eq!(used.event_name, "Base Developer Conference");
}

#[tokio::test]
async fn test_empty_registry_without_seed() {
    let resources = ResourceManager::from_config(&config_from(&[])).await.unwrap();

    let owned = resources
        .registry
        .tickets_owned_by(&OwnerAddress::new(DEMO_OWNER))
        .await
        .unwrap();
    assert!(owned.is_empty());
}

#[tokio::test]
async fn test_seeding_twice_is_harmless() {
    let registry = InMemoryTicketRegistry::new();
    let resources = ResourceManager::new(
        Arc::new(config_from(&[])),
        fixtures::venue(),
        Arc::new(registry.clone()),
        Arc::new(test_clock()),
    );

    assert_ok!(resources.seed_demo().await);
    assert_ok!(resources.seed_demo().await);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_invalid_venue_stops_startup() {
    let config = config_from(&[("GATE_NETWORK_ID", "")]);

    let result = ResourceManager::from_config(&config).await;
    assert!(matches!(result, Err(GateError::Identity(_))));
}

#[tokio::test]
async fn test_station_uses_configured_venue() {
    let config = config_from(&[("GATE_SEED_DEMO", "true")]);
    let resources = ResourceManager::from_config(&config).await.unwrap();

    let mut station = resources.station();
    assert!(station.submit_manual("12345").await.is_valid());
    assert!(resources.scanner().is_none());
}

#[tokio::test]
async fn test_server_serves_until_shutdown() {
    let config = config_from(&[("GATE_SEED_DEMO", "true")]);
    let resources = ResourceManager::from_config(&config).await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(
        listener,
        build_router(resources.app_state()),
        async move {
            let _ = stop_rx.await;
        },
        Duration::from_secs(5),
    ));

    let mut stream = TcpStream::connect(address).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK"));

    stop_tx.send(()).unwrap();
    assert_ok!(server.await.unwrap());
}
