use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use secrecy::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Standard,
    Privileged,
}

impl UserRole {
    pub fn is_privileged(self) -> bool {
        matches!(self, UserRole::Privileged)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Standard => write!(f, "standard"),
            UserRole::Privileged => write!(f, "privileged"),
        }
    }
}

/// Public profile replicated at `users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Opaque reference into the photo store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Password material kept at `credentials/{id}`, outside the replicated
/// profile so it never reaches observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub password_hash: String,
}

#[derive(Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "serialize_secret_string", deserialize_with = "deserialize_secret_string")]
    pub password: SecretString,
}

impl fmt::Display for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}, Email: {}", self.name, self.email)
    }
}

/// Self-service profile changes. Absent fields are left untouched; an
/// empty position clears it.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadPhotoRequest {
    /// Base64 encoded image, optionally prefixed with a `data:` URL header
    pub photo_base64: String,
}

pub fn serialize_secret_string<S>(_: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("[REDACTED]")
}

pub fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into_boxed_str()))
}
