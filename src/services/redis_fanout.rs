use std::sync::Arc;

use redis::AsyncCommands;
use secrecy::ExposeSecret;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::redis::RedisSettings;
use crate::store::ReplicatedStore;

pub const CHANGES_CHANNEL: &str = "matchday:store:changes";

/// Re-publishes every store commit on Redis so other processes can follow
/// along. Publishing is best effort and never holds up a write.
#[derive(Clone, Debug)]
pub struct RedisFanout {
    client: Arc<redis::Client>,
}

impl RedisFanout {
    pub fn new(settings: &RedisSettings) -> Result<Self, redis::RedisError> {
        let client = match redis::Client::open(settings.get_redis_url().expose_secret()) {
            Ok(client) => {
                tracing::info!("Redis client created successfully");
                client
            }
            Err(e) => {
                tracing::error!("Failed to create Redis client: {}", e);
                return Err(e);
            }
        };
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn spawn(self, store: &ReplicatedStore) -> JoinHandle<()> {
        let mut changes = store.changes();
        tokio::spawn(async move {
            let mut conn = match self.client.get_multiplexed_async_connection().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!("❌ Redis fan-out disabled, could not connect: {}", e);
                    return;
                }
            };
            tracing::info!("📡 Publishing store changes on {}", CHANGES_CHANNEL);

            loop {
                let change = match changes.recv().await {
                    Ok(change) => change,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Redis fan-out lagged behind the store");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let message = match serde_json::to_string(&change) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::error!("Failed to encode store change: {}", e);
                        continue;
                    }
                };
                let result: Result<i32, redis::RedisError> = conn.publish(CHANGES_CHANNEL, message).await;
                match result {
                    Ok(subscribers) => {
                        tracing::debug!(version = change.version, subscribers, "Published store change")
                    }
                    Err(e) => tracing::error!(version = change.version, "❌ Failed to publish store change: {}", e),
                }
            }
            tracing::info!("Redis fan-out stopped");
        })
    }
}
