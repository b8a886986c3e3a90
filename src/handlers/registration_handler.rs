use actix_web::{web, HttpResponse};

use crate::auth::jwt::generate_token;
use crate::config::jwt::JwtSettings;
use crate::errors::AppError;
use crate::models::auth::LoginResponse;
use crate::models::common::ApiResponse;
use crate::models::user::RegistrationRequest;
use crate::services::IdentityDirectory;

#[tracing::instrument(
    name = "Adding a new user",
    // Don't show arguments
    skip(user_form, identity, jwt_settings),
    fields(
        user = %user_form
    )
)]
pub async fn register_user(
    user_form: web::Json<RegistrationRequest>,
    identity: web::Data<IdentityDirectory>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let user = identity.register(&user_form)?;
    let token = generate_token(&user, &jwt_settings)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "User registered successfully",
        LoginResponse { token, user },
    )))
}
