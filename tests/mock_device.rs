//! End-to-end tests against an in-process mock Jasminer device.
//!
//! The mock speaks the same digest dialect as the firmware: it answers an
//! unauthenticated request with a 401 challenge and verifies the
//! `Authorization` response independently of the client code.

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use jasminer_exporter::{
    device::Device,
    digest::{Credentials, DigestClient, DigestError, ErrorKind, NonceCountFormat},
    metrics::{MetricAdapter, MetricTable, MetricsServer, MetricsServerConfig},
    Exporter, Observation, PollError,
};
use md5::{Digest, Md5};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const REALM: &str = "jasminer";
const NONCE: &str = "a3f5c2e1d4b6";

const IDENTITY_JSON: &str = r#"{
    "minertype": "X",
    "fs_version": "20221010-101010",
    "mem_total": "100",
    "mem_used": "50",
    "mem_free": "50",
    "nettype": "DHCP",
    "macaddr": "02:00:00:00:00:01",
    "ipaddress": "10.0.0.5",
    "netmask": "255.255.255.0",
    "gateway": "10.0.0.1",
    "dns1": "10.0.0.1",
    "dns2": "8.8.8.8"
}"#;

const STATUS_JSON: &str = r#"{
    "summary": {"uptime": 7200, "rt": "1050.25 MH/s", "avg": "1048.00 MH/s", "rejectRate": "0.12 %"},
    "boards": {
        "fan1": 5100,
        "fan2": 5220,
        "board": [{"rate": "350.10 MH/s", "asics": 80, "freq": 450, "temp": 65}]
    },
    "pools": {
        "pool": [{"status": "Alive", "url": "stratum+tcp://pool.example:4444", "works": 1200, "accept": 1180, "reject": 3}]
    }
}"#;

struct MockDevice {
    username: String,
    password: String,
    send_challenge: bool,
    status_body: String,
    hits: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
    peers: Mutex<HashSet<SocketAddr>>,
}

impl MockDevice {
    fn new() -> Self {
        Self {
            username: "root".to_string(),
            password: "root".to_string(),
            send_challenge: true,
            status_body: STATUS_JSON.to_string(),
            hits: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
            peers: Mutex::new(HashSet::new()),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }

    fn connections(&self) -> usize {
        self.peers.lock().unwrap().len()
    }

    fn respond(&self, peer: SocketAddr, headers: &HeaderMap, body: &str) -> Response {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.peers.lock().unwrap().insert(peer);

        let Some(authorization) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            if !self.send_challenge {
                return (StatusCode::OK, "{}").into_response();
            }
            let challenge = format!(
                r#"Digest realm="{}", nonce="{}", qop="auth", algorithm="MD5""#,
                REALM, NONCE
            );
            return (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, challenge)],
                "401 Unauthorized",
            )
                .into_response();
        };

        *self.last_authorization.lock().unwrap() = Some(authorization.to_string());
        if self.verify(authorization) {
            (StatusCode::OK, body.to_string()).into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    fn verify(&self, authorization: &str) -> bool {
        let Some(params) = authorization.strip_prefix("Digest ") else {
            return false;
        };
        let fields: HashMap<&str, &str> = params
            .split(", ")
            .filter_map(|p| p.split_once('='))
            .map(|(k, v)| (k, v.trim_matches('"')))
            .collect();
        let field = |name: &str| fields.get(name).copied().unwrap_or_default();

        let ha1 = md5_hex(&format!("{}:{}:{}", self.username, REALM, self.password));
        let ha2 = md5_hex(&format!("GET:{}", field("uri")));
        let expected = md5_hex(&format!(
            "{}:{}:{}:{}:{}:{}",
            ha1,
            NONCE,
            field("nc"),
            field("cnonce"),
            field("qop"),
            ha2
        ));

        field("username") == self.username
            && field("realm") == REALM
            && field("nonce") == NONCE
            && field("response") == expected
    }
}

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

async fn identity(
    State(device): State<Arc<MockDevice>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    device.respond(peer, &headers, IDENTITY_JSON)
}

async fn status(
    State(device): State<Arc<MockDevice>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let body = device.status_body.clone();
    device.respond(peer, &headers, &body)
}

async fn spawn_device(device: MockDevice) -> (Arc<MockDevice>, String) {
    let device = Arc::new(device);
    let app = Router::new()
        .route("/cgi-bin/index.cgi", get(identity))
        .route("/cgi-bin/minerStatus.cgi", get(status))
        .with_state(Arc::clone(&device));
    let addr = serve(app).await;
    (device, format!("http://{}", addr))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

fn client(password: &str, nc_format: NonceCountFormat) -> DigestClient {
    DigestClient::with_options(
        Credentials::new("root", password),
        Duration::from_secs(5),
        nc_format,
    )
    .unwrap()
}

fn exporter(base_uri: &str) -> Exporter {
    let device = Device::new(base_uri, client("root", NonceCountFormat::Decimal));
    Exporter::new(device, MetricAdapter::new(MetricTable::default()))
}

fn obs(name: &str, labels: &[(&'static str, &str)], value: f64) -> Observation {
    Observation {
        name: name.to_string(),
        labels: labels.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        value,
    }
}

#[tokio::test]
async fn test_fetch_answers_challenge() {
    let (device, base) = spawn_device(MockDevice::new()).await;
    let uri = format!("{}/cgi-bin/index.cgi", base);

    let body = client("root", NonceCountFormat::Decimal)
        .fetch(&uri)
        .await
        .unwrap();

    assert_eq!(body, IDENTITY_JSON.as_bytes());
    assert_eq!(device.hits(), 2);

    let authorization = device.last_authorization().unwrap();
    assert!(authorization.contains(", nc=1, "));
    assert!(authorization.contains(&format!(r#"uri="{}""#, uri)));
}

#[tokio::test]
async fn test_handshake_reuses_connection() {
    let (device, base) = spawn_device(MockDevice::new()).await;
    let client = client("root", NonceCountFormat::Decimal);

    client
        .fetch(&format!("{}/cgi-bin/index.cgi", base))
        .await
        .unwrap();

    assert_eq!(device.hits(), 2);
    assert_eq!(device.connections(), 1);
}

#[tokio::test]
async fn test_padded_nonce_count_accepted() {
    let (device, base) = spawn_device(MockDevice::new()).await;

    client("root", NonceCountFormat::Padded)
        .fetch(&format!("{}/cgi-bin/index.cgi", base))
        .await
        .unwrap();

    assert!(device.last_authorization().unwrap().contains(", nc=00000001, "));
}

#[tokio::test]
async fn test_missing_challenge_stops_after_one_request() {
    let mock = MockDevice {
        send_challenge: false,
        ..MockDevice::new()
    };
    let (device, base) = spawn_device(mock).await;

    let err = client("root", NonceCountFormat::Decimal)
        .fetch(&format!("{}/cgi-bin/index.cgi", base))
        .await
        .unwrap_err();

    assert!(matches!(err, DigestError::MissingChallenge));
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(device.hits(), 1);
    assert!(device.last_authorization().is_none());
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let (_device, base) = spawn_device(MockDevice::new()).await;

    let err = client("wrong", NonceCountFormat::Decimal)
        .fetch(&format!("{}/cgi-bin/index.cgi", base))
        .await
        .unwrap_err();

    assert!(matches!(err, DigestError::Rejected { status: 401, .. }));
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_unreachable_device_is_network_error() {
    // Bind and drop to get a port nothing listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = client("root", NonceCountFormat::Decimal)
        .fetch(&format!("http://{}/cgi-bin/index.cgi", addr))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_scrape_emits_exact_observations() {
    let (device, base) = spawn_device(MockDevice::new()).await;
    let scrape = exporter(&base).scrape().await;

    assert!(scrape.is_up());
    assert_eq!(device.hits(), 4);

    let expected = vec![
        obs("jasminer_miner", &[("type", "X")], 1.0),
        obs("jasminer_version", &[("datetime", "20221010-101010")], 1.0),
        obs("jasminer_mem_total", &[], 100.0),
        obs("jasminer_mem_used", &[], 50.0),
        obs("jasminer_mem_free", &[], 50.0),
        obs(
            "jasminer_network",
            &[
                ("type", "DHCP"),
                ("mac", "02:00:00:00:00:01"),
                ("ip", "10.0.0.5"),
                ("mask", "255.255.255.0"),
                ("gateway", "10.0.0.1"),
                ("dns1", "10.0.0.1"),
                ("dns2", "8.8.8.8"),
            ],
            1.0,
        ),
        obs("jasminer_uptime", &[], 7200.0),
        obs("jasminer_rate_realtime", &[], 1050.25),
        obs("jasminer_rate_average", &[], 1048.0),
        obs("jasminer_reject_rate", &[], 0.12),
        obs("jasminer_fan_speed", &[("device", "fan1")], 5100.0),
        obs("jasminer_fan_speed", &[("device", "fan2")], 5220.0),
        obs(
            "jasminer_board_rate",
            &[("device", "board0"), ("asics", "80"), ("freq", "450")],
            350.10,
        ),
        obs("jasminer_board_temp", &[("device", "board0")], 65.0),
        obs(
            "jasminer_pool_config",
            &[
                ("pool", "pool0"),
                ("status", "Alive"),
                ("user", ""),
                ("url", "stratum+tcp://pool.example:4444"),
            ],
            1.0,
        ),
        obs("jasminer_pool_works", &[("pool", "pool0")], 1200.0),
        obs("jasminer_pool_accepted", &[("pool", "pool0")], 1180.0),
        obs("jasminer_pool_rejected", &[("pool", "pool0")], 3.0),
    ];

    let (device_obs, self_obs) = scrape.observations.split_at(expected.len());
    assert_eq!(device_obs, expected.as_slice());
    assert_eq!(self_obs.len(), 2);
    assert_eq!(self_obs[0], obs("jasminer_up", &[], 1.0));
    assert_eq!(self_obs[1].name, "jasminer_scrape_duration_seconds");
}

#[tokio::test]
async fn test_parse_failure_contained() {
    let mock = MockDevice {
        status_body: STATUS_JSON.replace(r#""temp": 65"#, r#""temp": "65 C""#),
        ..MockDevice::new()
    };
    let (_device, base) = spawn_device(mock).await;
    let scrape = exporter(&base).scrape().await;

    assert!(!scrape.is_up());
    match scrape.error {
        Some(PollError::Parse(e)) => assert_eq!(e.path(), Some("boards.board[0].temp")),
        other => panic!("expected parse error, got {:?}", other),
    }
    assert_eq!(scrape.observations.len(), 2);
    assert_eq!(scrape.observations[0], obs("jasminer_up", &[], 0.0));
}

async fn spawn_exporter(base: &str) -> String {
    let server = MetricsServer::new(MetricsServerConfig::default(), exporter(base));
    let addr = serve(server.router()).await;
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (_device, base) = spawn_device(MockDevice::new()).await;
    let url = spawn_exporter(&base).await;

    let response = reqwest::get(format!("{}/metrics", url)).await.unwrap();
    assert_eq!(response.status(), 200);
    let text = response.text().await.unwrap();

    assert!(text.contains("# TYPE jasminer_uptime gauge"));
    assert!(text.contains("jasminer_uptime 7200"));
    assert!(text.contains(r#"jasminer_board_temp{device="board0"} 65"#));
    assert!(text.contains(r#"jasminer_pool_works{pool="pool0"} 1200"#));
    assert!(text.contains("jasminer_up 1"));
}

#[tokio::test]
async fn test_metrics_endpoint_with_failing_device() {
    let mock = MockDevice {
        send_challenge: false,
        ..MockDevice::new()
    };
    let (_device, base) = spawn_device(mock).await;
    let url = spawn_exporter(&base).await;

    let response = reqwest::get(format!("{}/metrics", url)).await.unwrap();
    assert_eq!(response.status(), 200);
    let text = response.text().await.unwrap();

    assert!(text.contains("jasminer_up 0"));
    assert!(!text.contains("jasminer_uptime"));
}

#[tokio::test]
async fn test_root_redirects_to_metrics() {
    let url = spawn_exporter("http://127.0.0.1:9").await;
    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = http.get(format!("{}/", url)).send().await.unwrap();
    assert_eq!(response.status(), 301);
    assert_eq!(response.headers()["location"], "/metrics");

    let health = http.get(format!("{}/health", url)).send().await.unwrap();
    assert_eq!(health.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_unmatched_paths_redirect_to_metrics() {
    let url = spawn_exporter("http://127.0.0.1:9").await;
    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    for path in ["/index.html", "/status/boards"] {
        let response = http.get(format!("{}{}", url, path)).send().await.unwrap();
        assert_eq!(response.status(), 301, "{}", path);
        assert_eq!(response.headers()["location"], "/metrics");
    }
}
