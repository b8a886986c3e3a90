use std::sync::Arc;

use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;
use crate::handlers::profile::profile::caller_id;
use crate::middleware::auth::Claims;
use crate::models::common::ApiResponse;
use crate::models::user::UploadPhotoRequest;
use crate::services::photo_store::{detect_content_type, PhotoStoreError};
use crate::services::{IdentityDirectory, PhotoStore};

/// Accepts plain base64 or a `data:image/...;base64,` URL.
pub fn decode_photo(raw: &str) -> Result<Bytes, PhotoStoreError> {
    let payload = match raw.split_once(";base64,") {
        Some((header, payload)) if header.starts_with("data:") => payload,
        _ => raw,
    };
    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| PhotoStoreError::InvalidEncoding(e.to_string()))?;
    if data.is_empty() {
        return Err(PhotoStoreError::InvalidEncoding("empty image".to_string()));
    }
    Ok(Bytes::from(data))
}

#[tracing::instrument(
    name = "Upload profile photo",
    skip(identity, photos, claims, body),
    fields(user = %claims.name)
)]
pub async fn upload_profile_photo(
    identity: web::Data<IdentityDirectory>,
    photos: web::Data<Arc<dyn PhotoStore>>,
    claims: web::ReqData<Claims>,
    body: web::Json<UploadPhotoRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&claims)?;
    // Fail early for unknown users before touching the blob store.
    identity.get_user(user_id)?;

    let data = decode_photo(&body.photo_base64)?;
    let content_type = detect_content_type(&data);
    let photo_ref = photos.put(user_id, content_type, data)?;
    let user = identity.set_photo_ref(user_id, &photo_ref)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Profile photo updated", user)))
}

#[tracing::instrument(name = "Get profile photo", skip(photos))]
pub async fn get_profile_photo(
    photos: web::Data<Arc<dyn PhotoStore>>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    let photo = photos
        .get(user_id)?
        .ok_or_else(|| AppError::NotFound(format!("Photo for user {}", user_id)))?;

    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .body(photo.data))
}
