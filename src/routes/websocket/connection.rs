use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, AsyncContext, Handler, StreamHandler};
use actix_web_actors::ws;
use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::live_update::LiveUpdate;
use crate::routes::websocket::messages::LiveUpdateMessage;
use crate::store::ReplicatedStore;

// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

/// One observer following users, teams, the current match and history.
pub struct LiveConnection {
    heartbeat: Instant,
    user_id: Uuid,
    name: String,
    store: Arc<ReplicatedStore>,
    session_id: Uuid,
    subscriptions: Vec<JoinHandle<()>>,
}

impl Actor for LiveConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("🔗 LiveConnection started for user {} ({}) - session: {}",
            self.user_id, self.name, self.session_id);

        self.heartbeat(ctx);
        self.setup_store_subscriptions(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        for subscription in self.subscriptions.drain(..) {
            subscription.abort();
        }
        tracing::info!("❌ LiveConnection stopped for user {} ({}) - session: {}",
            self.user_id, self.name, self.session_id);
    }
}

impl LiveConnection {
    pub fn new(user_id: Uuid, name: String, store: Arc<ReplicatedStore>) -> Self {
        Self {
            heartbeat: Instant::now(),
            user_id,
            name,
            store,
            session_id: Uuid::new_v4(),
            subscriptions: Vec::new(),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.heartbeat) > CLIENT_TIMEOUT {
                tracing::warn!("💔 Live client heartbeat missed, disconnecting user: {} ({}) - session: {}",
                    act.user_id, act.name, act.session_id);
                ctx.stop();
                return;
            }
            ctx.ping(b"ping");
        });
    }

    /// One task per observed path, each forwarding typed snapshots to this
    /// actor until the connection stops.
    fn setup_store_subscriptions(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let paths = LiveUpdate::observed_paths();
        let channels: Vec<String> = paths.iter().map(|path| path.to_string()).collect();

        for path in paths {
            let mut subscription = self.store.subscribe(path);
            let addr = ctx.address();
            let session_id = self.session_id;

            self.subscriptions.push(tokio::spawn(async move {
                while let Some(snapshot) = subscription.next().await {
                    let update = match LiveUpdate::from_snapshot(&snapshot) {
                        Ok(Some(update)) => update,
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::error!("❌ Failed to decode {} for session {}: {}", snapshot.path, session_id, e);
                            continue;
                        }
                    };
                    match serde_json::to_string(&update) {
                        Ok(message) => addr.do_send(LiveUpdateMessage(message)),
                        Err(e) => tracing::error!("❌ Failed to encode live update: {}", e),
                    }
                }
                tracing::debug!("🔌 Store subscription {} ended for session {}", subscription.path(), session_id);
            }));
        }

        let ready = LiveUpdate::SubscriptionsReady {
            channels,
            timestamp: Utc::now(),
        };
        if let Ok(message) = serde_json::to_string(&ready) {
            ctx.text(message);
        }
        tracing::info!("📡 Store subscriptions ready for {} ({}) session: {}",
            self.user_id, self.name, self.session_id);
    }

    fn handle_client_message(&self, message: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Ok(command) = serde_json::from_str::<serde_json::Value>(message) else {
            tracing::debug!("❓ Unparseable message from session {}: {}", self.session_id, message);
            return;
        };
        match command.get("type").and_then(|t| t.as_str()) {
            Some("ping") => {
                let pong = serde_json::json!({
                    "type": "pong",
                    "timestamp": Utc::now().to_rfc3339(),
                    "session_id": self.session_id
                });
                ctx.text(pong.to_string());
            }
            _ => {
                tracing::debug!("❓ Unknown command from {} ({}) session {}: {}",
                    self.user_id, self.name, self.session_id, message);
            }
        }
    }
}

impl Handler<LiveUpdateMessage> for LiveConnection {
    type Result = ();

    fn handle(&mut self, msg: LiveUpdateMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for LiveConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.heartbeat = Instant::now();
                self.handle_client_message(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("⚠️  Received unexpected binary message from {} session: {}",
                    self.user_id, self.session_id);
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!("🔒 Live WebSocket closing for {} session {}: {:?}",
                    self.user_id, self.session_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
