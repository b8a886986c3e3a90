use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::settings::MatchSettings;
use crate::services::match_lifecycle::MatchLifecycle;

/// The one authority that turns an expired countdown into an active match.
#[derive(Clone)]
pub struct CountdownScheduler {
    lifecycle: MatchLifecycle,
    delay: Duration,
    // match_id -> pending countdown task
    pending: Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>,
}

impl CountdownScheduler {
    pub fn new(lifecycle: MatchLifecycle, settings: &MatchSettings) -> Self {
        Self {
            lifecycle,
            delay: settings.countdown_delay(),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Activates `match_id` once the countdown delay has passed. The
    /// activation is a compare-and-transition, so a privileged client that
    /// got there first turns this into a no-op.
    pub async fn schedule(&self, match_id: Uuid) {
        let lifecycle = self.lifecycle.clone();
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;

        // Held until the handle is stored, so the task's own removal
        // always comes after the insert.
        let mut pending_tasks = self.pending.lock().await;
        // Anything still pending belongs to a match that has since been
        // replaced.
        for (stale_id, stale) in pending_tasks.drain() {
            tracing::debug!(match_id = %stale_id, "Dropping superseded countdown");
            stale.abort();
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match lifecycle.activate(match_id) {
                Ok(Some(_)) => tracing::info!(%match_id, "⏱️ Countdown finished, match started"),
                Ok(None) => tracing::debug!(%match_id, "Countdown finished, nothing to activate"),
                Err(e) => tracing::error!(%match_id, "❌ Countdown activation failed: {}", e),
            }
            pending.lock().await.remove(&match_id);
        });
        pending_tasks.insert(match_id, handle);
        drop(pending_tasks);
        tracing::info!(%match_id, delay_ms = delay.as_millis() as u64, "Scheduled countdown");
    }

    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }
}
