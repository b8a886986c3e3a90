use std::net::TcpListener;
use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use matchday_backend::clock::ManualClock;
use matchday_backend::config::settings::{get_config, get_jwt_settings, MatchSettings};
use matchday_backend::services::InMemoryPhotoStore;
use matchday_backend::store::ReplicatedStore;
use matchday_backend::telemetry::{get_subscriber, init_subscriber};
use matchday_backend::{run, AppContext};

pub const TEST_PHOTO_MAX_BYTES: usize = 1024;
pub const TEST_TICK_MS: u64 = 20;

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<ReplicatedStore>,
    pub clock: Arc<ManualClock>,
}

pub struct TestUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(MatchSettings {
        countdown_ticks: 3,
        tick_ms: TEST_TICK_MS,
    })
    .await
}

/// Spawns an app whose countdown uses `match_settings`, e.g. one long
/// enough that a test can act while the match is still counting down.
pub async fn spawn_app_with(match_settings: MatchSettings) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    let configuration = get_config().expect("Failed to read configuration.");

    let store = Arc::new(ReplicatedStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let server = run(
        listener,
        AppContext {
            store: Arc::clone(&store),
            clock: clock.clone(),
            photo_store: Arc::new(InMemoryPhotoStore::new(TEST_PHOTO_MAX_BYTES)),
            jwt_settings: get_jwt_settings(&configuration),
            match_settings,
            admin_emails: Vec::new(),
        },
    )
    .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp { address, store, clock }
}

pub async fn register_user(app_address: &str, name: &str) -> TestUser {
    let client = Client::new();
    let email = format!("{}{}@example.com", name.to_lowercase(), Uuid::new_v4().simple());
    let password = "password123".to_string();

    let response = client
        .post(&format!("{}/register_user", app_address))
        .json(&json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to register user.");
    assert_eq!(200, response.status().as_u16(), "Registration should succeed");

    let body: Value = response.json().await.expect("Failed to parse registration response");
    TestUser {
        user_id: body["data"]["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("No user id in response"),
        name: name.to_string(),
        email,
        password,
        token: body["data"]["token"].as_str().expect("No token in response").to_string(),
    }
}

pub async fn make_authenticated_request(
    client: &Client,
    method: Method,
    url: &str,
    token: &str,
    body: Option<Value>,
) -> Response {
    let mut request = client
        .request(method, url)
        .header("Authorization", format!("Bearer {}", token));
    if let Some(body) = body {
        request = request.json(&body);
    }
    request.send().await.expect("Failed to execute request.")
}

/// GET `path` and return the `data` field of the envelope.
pub async fn get_data(app_address: &str, path: &str, token: &str) -> Value {
    let client = Client::new();
    let response = make_authenticated_request(
        &client,
        Method::GET,
        &format!("{}{}", app_address, path),
        token,
        None,
    )
    .await;
    assert!(response.status().is_success(), "GET {} failed: {}", path, response.status());
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"].clone()
}
