use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::services::MatchLifecycle;

#[tracing::instrument(name = "Get current match", skip(lifecycle))]
pub async fn get_current_match(lifecycle: web::Data<MatchLifecycle>) -> Result<HttpResponse, AppError> {
    let view = lifecycle.current_view()?;
    let message = match &view.match_state {
        Some(state) => format!("Match is {}", state.status.as_str()),
        None => "No match in progress".to_string(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(message, view)))
}
