use std::sync::Arc;

use actix_web::{get, patch, put, web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;
use crate::handlers::profile::profile::{get_own_stats, get_user_profile, update_user_profile};
use crate::handlers::profile::profile_picture::{get_profile_photo, upload_profile_photo};
use crate::middleware::auth::Claims;
use crate::models::user::{UpdateProfileRequest, UploadPhotoRequest};
use crate::services::{HistoryArchive, IdentityDirectory, PhotoStore};

#[get("/user")]
async fn get_user(
    identity: web::Data<IdentityDirectory>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    get_user_profile(identity, claims).await
}

#[patch("/user")]
async fn update_user(
    identity: web::Data<IdentityDirectory>,
    claims: web::ReqData<Claims>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    update_user_profile(identity, claims, body).await
}

#[get("/stats")]
async fn get_stats(
    archive: web::Data<HistoryArchive>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    get_own_stats(archive, claims).await
}

// Profile photo routes
#[put("/photo")]
async fn upload_photo(
    identity: web::Data<IdentityDirectory>,
    photos: web::Data<Arc<dyn PhotoStore>>,
    claims: web::ReqData<Claims>,
    body: web::Json<UploadPhotoRequest>,
) -> Result<HttpResponse, AppError> {
    upload_profile_photo(identity, photos, claims, body).await
}

#[get("/photo/{user_id}")]
async fn get_photo(
    photos: web::Data<Arc<dyn PhotoStore>>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_profile_photo(photos, user_id).await
}
