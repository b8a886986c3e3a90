use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::Claims;
use crate::models::common::ApiResponse;
use crate::models::user::UpdateProfileRequest;
use crate::services::{HistoryArchive, IdentityDirectory};

pub(crate) fn caller_id(claims: &Claims) -> Result<Uuid, AppError> {
    claims.user_id().ok_or_else(|| {
        tracing::error!("Failed to parse user ID from subject {}", claims.sub);
        AppError::Unauthorized
    })
}

#[tracing::instrument(
    name = "Get user profile",
    skip(identity, claims),
    fields(user = %claims.name)
)]
pub async fn get_user_profile(
    identity: web::Data<IdentityDirectory>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let user = identity.get_user(caller_id(&claims)?)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("User profile", user)))
}

#[tracing::instrument(
    name = "Update user profile",
    skip(identity, claims, body),
    fields(user = %claims.name)
)]
pub async fn update_user_profile(
    identity: web::Data<IdentityDirectory>,
    claims: web::ReqData<Claims>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let user = identity.update_profile(caller_id(&claims)?, &body)?;
    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(HttpResponse::Ok().json(ApiResponse::success("Profile updated", user)))
}

#[tracing::instrument(
    name = "Get own stats",
    skip(archive, claims),
    fields(user = %claims.name)
)]
pub async fn get_own_stats(
    archive: web::Data<HistoryArchive>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let stats = archive.player_stats(caller_id(&claims)?)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Player stats", stats)))
}
