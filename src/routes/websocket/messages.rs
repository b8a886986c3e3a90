use serde::Deserialize;

/// Message from a store subscription to the WebSocket
#[derive(actix::Message)]
#[rtype(result = "()")]
pub struct LiveUpdateMessage(pub String);

// Query parameter struct for token
#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: String,
}
