// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Shared UDP listener and push reconciliation over loopback

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use garnet_bridge::frame::encode_frame;
use garnet_bridge::{
    DeviceState, EventReceiver, GarnetPanel, ListenerRegistry, PanelConfig, PanelEvent,
    PartitionState, SiaAction, SiaListener, ZoneFlags,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(2);

fn cid_block(account: &str, sequence: u16, event: &str) -> String {
    format!("\"ADM-CID\"{sequence:04}R0L0#{account}[#{account}|{event}]_12:34:56,10-15-2026")
}

fn loopback(addr: SocketAddr) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, addr.port()))
}

/// Send one datagram and return the reply, if any arrives in time.
async fn exchange(target: SocketAddr, datagram: &[u8]) -> Option<String> {
    let socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
    socket.send_to(datagram, loopback(target)).await.unwrap();
    let mut buf = [0u8; 256];
    match timeout(Duration::from_millis(300), socket.recv_from(&mut buf)).await {
        Ok(Ok((len, _))) => Some(String::from_utf8_lossy(&buf[..len]).into_owned()),
        _ => None,
    }
}

#[tokio::test]
async fn test_valid_report_is_queued_and_acked() {
    let listener = SiaListener::start(0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(4);
    listener.add("1234", tx);

    let block = cid_block("1234", 7, "3407 01 000");
    let ack = exchange(listener.local_addr(), &encode_frame(block.as_bytes()))
        .await
        .expect("no ACK");
    assert!(ack.starts_with('\n'));
    assert!(ack.ends_with("\"ACK\"0007R0L0#1234[]\r"), "{ack:?}");

    let message = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(message.account, "1234");
    assert_eq!(message.action, SiaAction::Arm);
    assert_eq!(message.partition, 1);
}

#[tokio::test]
async fn test_corrupt_frame_is_not_acked() {
    let listener = SiaListener::start(0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(4);
    listener.add("1234", tx);

    let mut datagram = encode_frame(cid_block("1234", 1, "1407 01 000").as_bytes());
    let last = datagram.len() - 2;
    datagram[last] ^= 0x01;

    assert_eq!(exchange(listener.local_addr(), &datagram).await, None);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unknown_account_is_acked() {
    let listener = SiaListener::start(0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(4);
    listener.add("1234", tx);

    let block = cid_block("9999", 2, "1407 01 000");
    let ack = exchange(listener.local_addr(), &encode_frame(block.as_bytes())).await;
    assert!(ack.is_some_and(|a| a.contains("#9999[]")));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_keepalive_is_acked() {
    let listener = SiaListener::start(0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(4);
    listener.add("1234", tx);

    let block = "\"NULL\"0003R0L0#1234[]_00:00:01,10-15-2026";
    assert!(exchange(listener.local_addr(), &encode_frame(block.as_bytes())).await.is_some());
    let message = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(message.action, SiaAction::Keepalive);
}

#[tokio::test]
async fn test_removing_last_subscriber_stops_listener() {
    let registry = ListenerRegistry::new();
    let listener = registry.acquire(0).await.unwrap();
    let (tx_a, _rx_a) = mpsc::channel(1);
    let (tx_b, _rx_b) = mpsc::channel(1);
    listener.add("1111", tx_a);
    listener.add("2222", tx_b);

    let shared = registry.acquire(0).await.unwrap();
    assert_eq!(shared.local_addr(), listener.local_addr());

    listener.remove("1111");
    assert!(listener.is_running());
    listener.remove("2222");
    timeout(WAIT, async {
        while listener.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

/// A port that was free a moment ago.
fn free_port() -> u16 {
    std::net::UdpSocket::bind("0.0.0.0:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::test]
async fn test_registry_rebinds_fixed_port_immediately() {
    let port = free_port();
    let registry = ListenerRegistry::new();

    let first = registry.acquire(port).await.unwrap();
    let (tx, _rx) = mpsc::channel(1);
    first.add("1234", tx);
    first.remove("1234");

    let second = registry.acquire(port).await.unwrap();
    assert_eq!(second.local_addr().port(), port);
    assert!(second.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registry_rebinds_fixed_port_repeatedly() {
    let port = free_port();
    let registry = ListenerRegistry::new();
    for round in 0..50 {
        let listener = registry
            .acquire(port)
            .await
            .unwrap_or_else(|e| panic!("round {round}: {e}"));
        let (tx, _rx) = mpsc::channel(1);
        listener.add("1234", tx);
        listener.remove("1234");
    }
}

// ── End to end ───────────────────────────────────────────────────────

const SYSTEM_ID: &str = "a10050008d96";
const DISARMED: &str = "100008000000000000000000000000000000000";

async fn mock_cloud() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users_api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "accessToken": "tok"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/users_api/v1/systems/{SYSTEM_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": { "sistema": {
                "id": SYSTEM_ID,
                "nombre": "Casa",
                "userPermissions": { "atributos": { "puedeArmar": true, "puedeDesarmar": true } },
                "programation": { "data": {
                    "partitions": [ { "number": 1, "name": "Casa", "enabled": true } ],
                    "zones": [
                        { "number": 1, "name": "Puerta", "enabled": true, "icon": 0 },
                        { "number": 2, "name": "Living", "enabled": true, "icon": 4 }
                    ]
                }}
            }}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/commands/state$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": { "status": DISARMED }
        })))
        .mount(&server)
        .await;
    server
}

fn panel_config(server: &MockServer) -> PanelConfig {
    PanelConfig::builder()
        .email("user@example.com")
        .password("secret")
        .system_id(SYSTEM_ID)
        .account("1234")
        .api_base_url(server.uri())
        .udp_port(0)
        .refresh_interval(Duration::ZERO)
        .build()
}

async fn next_devices(rx: &mut EventReceiver) -> Vec<garnet_bridge::Device> {
    timeout(WAIT, async {
        loop {
            if let Ok(PanelEvent::DevicesUpdated { devices }) = rx.recv().await {
                return devices;
            }
        }
    })
    .await
    .expect("no DevicesUpdated event")
}

#[tokio::test]
async fn test_push_arm_report_updates_panel() {
    let server = mock_cloud().await;
    let registry = ListenerRegistry::new();
    let mut panel = GarnetPanel::connect(panel_config(&server), &registry)
        .await
        .unwrap();
    let mut events = panel.subscribe();

    let partition = panel.device(1).await.unwrap();
    assert_eq!(partition.partition_state(), Some(PartitionState::Disarmed));

    let addr = panel.listener_addr().unwrap();
    let block = cid_block("1234", 1, "3407 01 000");
    assert!(exchange(addr, &encode_frame(block.as_bytes())).await.is_some());

    let devices = next_devices(&mut events).await;
    let partition = devices.iter().find(|d| d.id == 1).unwrap();
    assert_eq!(partition.state, DeviceState::Partition(PartitionState::ArmedAway));
    let zone = devices.iter().find(|d| d.id == 11).unwrap();
    assert_eq!(zone.state, DeviceState::Zone(ZoneFlags::LOCKED));

    panel.disconnect();
    assert!(panel.listener_addr().is_none());
}

#[tokio::test]
async fn test_two_panels_share_one_socket() {
    let server = mock_cloud().await;
    let registry = ListenerRegistry::new();
    let first = GarnetPanel::connect(panel_config(&server), &registry)
        .await
        .unwrap();
    let second_config = PanelConfig {
        account: "5678".to_string(),
        ..panel_config(&server)
    };
    let second = GarnetPanel::connect(second_config, &registry).await.unwrap();

    assert_eq!(first.listener_addr(), second.listener_addr());
    let mut second_events = second.subscribe();

    let addr = first.listener_addr().unwrap();
    let block = cid_block("5678", 1, "3407 01 000");
    exchange(addr, &encode_frame(block.as_bytes())).await;

    let devices = next_devices(&mut second_events).await;
    let partition = devices.iter().find(|d| d.id == 1).unwrap();
    assert_eq!(partition.partition_state(), Some(PartitionState::ArmedAway));
    let untouched = first.device(1).await.unwrap();
    assert_eq!(untouched.partition_state(), Some(PartitionState::Disarmed));
}

#[tokio::test]
async fn test_panel_reconnects_on_same_port() {
    let server = mock_cloud().await;
    let registry = ListenerRegistry::new();
    let config = PanelConfig {
        udp_port: free_port(),
        ..panel_config(&server)
    };

    let mut panel = GarnetPanel::connect(config.clone(), &registry).await.unwrap();
    let addr = panel.listener_addr().unwrap();
    panel.disconnect();

    let panel = GarnetPanel::connect(config, &registry).await.unwrap();
    assert_eq!(panel.listener_addr().map(|a| a.port()), Some(addr.port()));

    let block = cid_block("1234", 1, "3407 01 000");
    assert!(exchange(addr, &encode_frame(block.as_bytes())).await.is_some());
}
