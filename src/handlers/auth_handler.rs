use actix_web::{web, HttpResponse};
use secrecy::ExposeSecret;

use crate::auth::jwt::generate_token;
use crate::config::jwt::JwtSettings;
use crate::errors::AppError;
use crate::models::auth::{LoginRequest, LoginResponse};
use crate::models::common::ApiResponse;
use crate::services::IdentityDirectory;

#[tracing::instrument(
    name = "Login user attempt",
    skip(login_form, identity, jwt_settings),
    fields(
        email = %login_form.email
    )
)]
pub async fn login_user(
    login_form: web::Json<LoginRequest>,
    identity: web::Data<IdentityDirectory>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let user = identity.authenticate(&login_form.email, login_form.password.expose_secret())?;
    let token = generate_token(&user, &jwt_settings)?;
    tracing::info!(user_id = %user.id, "Login successful");

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Login successful",
        LoginResponse { token, user },
    )))
}
