mod connection;
mod messages;

use std::sync::Arc;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::auth::jwt::decode_token;
use crate::config::jwt::JwtSettings;
use crate::services::IdentityDirectory;
use crate::store::ReplicatedStore;

pub use connection::LiveConnection;
pub use messages::TokenQuery;

/// Live observer channel. Browsers cannot set headers on a WebSocket
/// handshake, so the token travels as a query parameter.
pub async fn live_ws_route(
    req: HttpRequest,
    stream: web::Payload,
    query: Option<web::Query<TokenQuery>>,
    jwt_settings: web::Data<JwtSettings>,
    identity: web::Data<IdentityDirectory>,
    store: web::Data<Arc<ReplicatedStore>>,
) -> Result<HttpResponse, Error> {
    tracing::info!("New live WebSocket connection request");

    let Some(query) = query else {
        tracing::error!("No authentication provided for live WebSocket");
        return Err(actix_web::error::ErrorUnauthorized("No authentication"));
    };
    let claims = decode_token(&query.token, &jwt_settings).map_err(|e| {
        tracing::error!("Invalid JWT in query parameter: {}", e);
        actix_web::error::ErrorUnauthorized("Invalid token")
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| actix_web::error::ErrorBadRequest("Invalid user ID"))?;
    // Tokens of users that no longer exist are refused.
    let user = identity.get_user(user_id).map_err(|e| {
        tracing::warn!("Live WebSocket for unknown user {}: {}", user_id, e);
        actix_web::error::ErrorUnauthorized("Unknown user")
    })?;

    let resp = ws::start(
        LiveConnection::new(user.id, user.name, store.get_ref().clone()),
        &req,
        stream,
    )?;

    tracing::info!("Live WebSocket connection established for user: {}", user_id);
    Ok(resp)
}
