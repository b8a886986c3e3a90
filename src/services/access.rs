use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;

/// Identity behind a mutating call, with the role read from the store at
/// request time rather than trusted from a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Every mutating service operation starts with this check.
    pub fn require_privileged(&self) -> Result<(), AppError> {
        if self.is_privileged() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, role = %self.role, "Rejected privileged action");
            Err(AppError::Unauthorized)
        }
    }
}
