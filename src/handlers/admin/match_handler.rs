use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::models::match_state::{ActivateMatchRequest, CreateMatchRequest, RecordEventRequest};
use crate::services::{Actor, CountdownScheduler, EventLedger, MatchLifecycle};

#[tracing::instrument(
    name = "Admin: create match",
    skip(lifecycle, countdown, actor, body),
    fields(actor = %actor.user_id, duration_minutes = body.duration_minutes, halves = body.halves)
)]
pub async fn create_match(
    lifecycle: web::Data<MatchLifecycle>,
    countdown: web::Data<CountdownScheduler>,
    actor: web::ReqData<Actor>,
    body: web::Json<CreateMatchRequest>,
) -> Result<HttpResponse, AppError> {
    let created = lifecycle.create(&actor, body.duration_minutes, body.halves)?;
    countdown.schedule(created.id).await;
    Ok(HttpResponse::Created().json(ApiResponse::success("Match countdown started", created)))
}

#[tracing::instrument(
    name = "Admin: activate match",
    skip(lifecycle, actor, body),
    fields(actor = %actor.user_id, match_id = %body.match_id)
)]
pub async fn activate_match(
    lifecycle: web::Data<MatchLifecycle>,
    actor: web::ReqData<Actor>,
    body: web::Json<ActivateMatchRequest>,
) -> Result<HttpResponse, AppError> {
    let response = match lifecycle.activate_as(&actor, body.match_id)? {
        Some(activated) => ApiResponse::success("Match started", activated),
        None => {
            // Someone else already won the race; report the state they left.
            let current = lifecycle
                .current()?
                .ok_or_else(|| AppError::invalid_state("No match in progress"))?;
            if current.id != body.match_id {
                return Err(AppError::invalid_state("Match is no longer current"));
            }
            ApiResponse::success(format!("Match is already {}", current.status.as_str()), current)
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

#[tracing::instrument(name = "Admin: advance half", skip(lifecycle, actor), fields(actor = %actor.user_id))]
pub async fn advance_half(
    lifecycle: web::Data<MatchLifecycle>,
    actor: web::ReqData<Actor>,
) -> Result<HttpResponse, AppError> {
    let updated = lifecycle.advance_half(&actor)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("Half {} started", updated.current_half),
        updated,
    )))
}

#[tracing::instrument(name = "Admin: finish match", skip(lifecycle, actor), fields(actor = %actor.user_id))]
pub async fn finish_match(
    lifecycle: web::Data<MatchLifecycle>,
    actor: web::ReqData<Actor>,
) -> Result<HttpResponse, AppError> {
    let entry = lifecycle.finish(&actor)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Match finished and archived", entry)))
}

#[tracing::instrument(name = "Admin: reset match", skip(lifecycle, actor), fields(actor = %actor.user_id))]
pub async fn reset_match(
    lifecycle: web::Data<MatchLifecycle>,
    actor: web::ReqData<Actor>,
) -> Result<HttpResponse, AppError> {
    lifecycle.reset(&actor)?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Match cleared")))
}

#[tracing::instrument(
    name = "Admin: record match event",
    skip(ledger, actor, body),
    fields(actor = %actor.user_id, player_id = %body.player_id, team = %body.team_number)
)]
pub async fn record_event(
    ledger: web::Data<EventLedger>,
    actor: web::ReqData<Actor>,
    body: web::Json<RecordEventRequest>,
) -> Result<HttpResponse, AppError> {
    let event = ledger.record_event(&actor, body.event_type, body.player_id, body.team_number)?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Event recorded", event)))
}
