use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::models::team::TeamsResponse;
use crate::services::TeamDrawer;

#[tracing::instrument(name = "Get current teams", skip(drawer))]
pub async fn get_teams(drawer: web::Data<TeamDrawer>) -> Result<HttpResponse, AppError> {
    let assignment = drawer.current()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Current teams",
        TeamsResponse::from(assignment),
    )))
}
