use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use uuid::Uuid;

use crate::models::common::ApiResponse;
use crate::services::photo_store::PhotoStoreError;
use crate::store::StoreError;

/// Errors surfaced by the services to their callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("At least two players are required for a draw, got {0}")]
    InsufficientPlayers(usize),

    #[error("{0}")]
    InvalidMatchState(String),

    #[error("No team assignment has been drawn")]
    NoTeamAssignment,

    #[error("Unknown player {0}")]
    UnknownPlayer(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Action requires a privileged role")]
    Unauthorized,

    #[error("Users cannot change their own role")]
    SelfRoleChange,

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Photo(#[from] PhotoStoreError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Token generation failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InsufficientPlayers(_) => "insufficient_players",
            AppError::InvalidMatchState(_) => "invalid_match_state",
            AppError::NoTeamAssignment => "no_team_assignment",
            AppError::UnknownPlayer(_) => "unknown_player",
            AppError::Validation(_) => "validation_error",
            AppError::Unauthorized => "unauthorized",
            AppError::SelfRoleChange => "self_role_change",
            AppError::NotFound(_) => "not_found",
            AppError::Store(StoreError::Unavailable(_)) => "store_unavailable",
            AppError::Store(_) => "store_error",
            AppError::Photo(PhotoStoreError::TooLarge { .. }) => "photo_too_large",
            AppError::Photo(PhotoStoreError::InvalidEncoding(_)) => "invalid_photo",
            AppError::Photo(_) => "photo_store_error",
            AppError::PasswordHash(_) | AppError::Token(_) => "internal_error",
        }
    }

    /// Whether the caller may simply retry the same call.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            AppError::Store(StoreError::Unavailable(_)) | AppError::Photo(PhotoStoreError::Unavailable(_))
        )
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        AppError::InvalidMatchState(message.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InsufficientPlayers(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidMatchState(_) | AppError::NoTeamAssignment => StatusCode::CONFLICT,
            AppError::UnknownPlayer(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::SelfRoleChange => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Photo(PhotoStoreError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Photo(PhotoStoreError::InvalidEncoding(_)) => StatusCode::BAD_REQUEST,
            _ if self.is_retriable() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {}", self);
        } else {
            tracing::info!(code = self.code(), "Request rejected: {}", self);
        }
        HttpResponse::build(status).json(ApiResponse::<()>::error_with_code(self.code(), self.to_string()))
    }
}
