use std::net::TcpListener;
use std::sync::Arc;

use matchday_backend::clock::SystemClock;
use matchday_backend::config::settings::{get_config, get_jwt_settings};
use matchday_backend::services::{InMemoryPhotoStore, RedisFanout};
use matchday_backend::store::ReplicatedStore;
use matchday_backend::telemetry::{get_subscriber, init_subscriber};
use matchday_backend::{run, AppContext};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "matchday-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let store = Arc::new(ReplicatedStore::new());

    // Redis fan-out is optional; the store works without it
    if config.redis.enabled {
        match RedisFanout::new(&config.redis) {
            Ok(fanout) => {
                fanout.spawn(&store);
            }
            Err(e) => {
                tracing::error!("❌ Failed to create Redis client: {}. Store changes stay in-process.", e);
            }
        }
    } else {
        tracing::info!("Redis fan-out disabled");
    }

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("🚀 Listening on {}", address);

    run(
        listener,
        AppContext {
            store,
            clock: Arc::new(SystemClock),
            photo_store: Arc::new(InMemoryPhotoStore::new(config.photos.max_bytes)),
            jwt_settings: get_jwt_settings(&config),
            match_settings: config.match_rules.clone(),
            admin_emails: config.application.admin_emails.clone(),
        },
    )?
    .await
}
