use actix_web::{post, web, HttpResponse};

use crate::config::jwt::JwtSettings;
use crate::errors::AppError;
use crate::handlers::registration_handler::register_user;
use crate::models::user::RegistrationRequest;
use crate::services::IdentityDirectory;

#[post("/register_user")]
async fn register(
    user_form: web::Json<RegistrationRequest>,
    identity: web::Data<IdentityDirectory>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    register_user(user_form, identity, jwt_settings).await
}
