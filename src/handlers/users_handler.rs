use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::common::ApiResponse;
use crate::services::IdentityDirectory;

#[tracing::instrument(name = "List users", skip(identity))]
pub async fn list_users(identity: web::Data<IdentityDirectory>) -> Result<HttpResponse, AppError> {
    let users = identity.list_users()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} users", users.len()),
        users,
    )))
}
