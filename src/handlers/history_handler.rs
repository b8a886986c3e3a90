use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::services::HistoryArchive;

#[tracing::instrument(name = "List match history", skip(archive))]
pub async fn list_history(archive: web::Data<HistoryArchive>) -> Result<HttpResponse, AppError> {
    let entries = archive.list()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} archived matches", entries.len()),
        entries,
    )))
}

#[tracing::instrument(name = "Get history entry", skip(archive))]
pub async fn get_history_entry(
    archive: web::Data<HistoryArchive>,
    entry_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let entry = archive.get(&entry_id)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("History entry", entry)))
}

#[tracing::instrument(name = "Get player stats", skip(archive))]
pub async fn get_player_stats(
    archive: web::Data<HistoryArchive>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let stats = archive.player_stats(user_id.into_inner())?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Player stats", stats)))
}
