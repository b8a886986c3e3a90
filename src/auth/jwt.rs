use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;

use crate::config::jwt::JwtSettings;
use crate::middleware::auth::Claims;
use crate::models::user::User;

/// Signs an HS256 token for `user`. The role claim is informational only;
/// authorization always re-reads the role from the store.
pub fn generate_token(user: &User, jwt_settings: &JwtSettings) -> Result<String, jsonwebtoken::errors::Error> {
    let expires_at = Utc::now() + Duration::hours(jwt_settings.expiration_hours);
    let claims = Claims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        role: user.role,
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_settings.secret.expose_secret().as_bytes()),
    )
}

pub fn decode_token(token: &str, jwt_settings: &JwtSettings) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_settings.secret.expose_secret().as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
