use actix_web::{post, web, HttpResponse};

use crate::config::jwt::JwtSettings;
use crate::errors::AppError;
use crate::handlers::auth_handler::login_user;
use crate::models::auth::LoginRequest;
use crate::services::IdentityDirectory;

#[post("/login")]
async fn login(
    login_form: web::Json<LoginRequest>,
    identity: web::Data<IdentityDirectory>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    login_user(login_form, identity, jwt_settings).await
}
