use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::models::team::{DrawOutcome, DrawRequest};
use crate::services::{Actor, TeamDrawer};

#[tracing::instrument(
    name = "Admin: draw teams",
    skip(drawer, actor, body),
    fields(actor = %actor.user_id, players = body.player_ids.len(), force = body.force)
)]
pub async fn draw_teams(
    drawer: web::Data<TeamDrawer>,
    actor: web::ReqData<Actor>,
    body: web::Json<DrawRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = drawer.draw(&actor, &body.player_ids, body.force)?;
    let message = match &outcome {
        DrawOutcome::Drawn { .. } => "Teams drawn".to_string(),
        DrawOutcome::NeedsConfirmation { player_count } => {
            format!("{} players selected, confirm to draw uneven teams", player_count)
        }
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(message, outcome)))
}

#[tracing::instrument(name = "Admin: clear teams", skip(drawer, actor), fields(actor = %actor.user_id))]
pub async fn clear_teams(
    drawer: web::Data<TeamDrawer>,
    actor: web::ReqData<Actor>,
) -> Result<HttpResponse, AppError> {
    drawer.clear(&actor)?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Teams cleared")))
}
