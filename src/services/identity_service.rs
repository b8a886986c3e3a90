use std::collections::HashSet;
use std::sync::Arc;

use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::user::{Credentials, RegistrationRequest, UpdateProfileRequest, User, UserRole};
use crate::services::access::Actor;
use crate::store::{paths, ReplicatedStore, StoreError, Transaction, Update};
use crate::utils::formatting::{email_index_key, format_display_name, normalize_email};
use crate::utils::password::{hash_password, verify_password};

/// Registers and authenticates players and owns their roles.
#[derive(Clone)]
pub struct IdentityDirectory {
    store: Arc<ReplicatedStore>,
    clock: Arc<dyn Clock>,
    admin_emails: Arc<HashSet<String>>,
}

impl IdentityDirectory {
    pub fn new(store: Arc<ReplicatedStore>, clock: Arc<dyn Clock>, admin_emails: &[String]) -> Self {
        Self {
            store,
            clock,
            admin_emails: Arc::new(admin_emails.iter().map(|email| normalize_email(email)).collect()),
        }
    }

    pub fn register(&self, request: &RegistrationRequest) -> Result<User, AppError> {
        let name = request.name.trim().to_string();
        let email = normalize_email(&request.email);
        let password = request.password.expose_secret();

        if name.is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AppError::Validation(format!("'{}' is not a valid email", request.email)));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        let role = if self.admin_emails.contains(&email) {
            UserRole::Privileged
        } else {
            UserRole::Standard
        };
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            position: None,
            photo_ref: None,
            created_at: self.clock.now(),
        };
        // Hash outside the store transaction, bcrypt is slow.
        let credentials = Credentials {
            password_hash: hash_password(password)?,
        };
        let index_path = paths::email_index(&email_index_key(&user.email));

        self.store.transact(|view| {
            if view.contains(&index_path) {
                return Err(AppError::DuplicateEmail);
            }
            Ok(Transaction::commit(
                vec![
                    Update::set(paths::user(user.id), &user)?,
                    Update::set(paths::credentials(user.id), &credentials)?,
                    Update::set(index_path.clone(), &user.id)?,
                ],
                (),
            ))
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let index_path = paths::email_index(&email_index_key(email));
        let Some(user_id) = self.store.read_as::<Uuid>(&index_path)? else {
            tracing::info!("Login for unknown email");
            return Err(AppError::InvalidCredentials);
        };
        let Some(credentials) = self.store.read_as::<Credentials>(&paths::credentials(user_id))? else {
            tracing::warn!(%user_id, "Email index points at a user without credentials");
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(password, &credentials.password_hash) {
            tracing::info!(%user_id, "Invalid password");
            return Err(AppError::InvalidCredentials);
        }
        self.get_user(user_id).map_err(|e| match e {
            AppError::NotFound(_) => AppError::InvalidCredentials,
            other => other,
        })
    }

    pub fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.store
            .read_as::<User>(&paths::user(user_id))?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    /// Public profiles sorted by name.
    pub fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.store.transact(|view| {
            let users = view.children_as::<User>(&paths::users())?;
            Ok::<_, StoreError>(Transaction::abort(users.into_iter().map(|(_, user)| user).collect()))
        })?;
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    /// Resolves the caller of a request with their current role.
    pub fn actor(&self, user_id: Uuid) -> Result<Actor, AppError> {
        match self.store.read_as::<UserRole>(&paths::user_role(user_id))? {
            Some(role) => Ok(Actor::new(user_id, role)),
            None => {
                tracing::warn!(%user_id, "Token subject is not a known user");
                Err(AppError::Unauthorized)
            }
        }
    }

    pub fn set_role(&self, actor: &Actor, target_id: Uuid, role: UserRole) -> Result<User, AppError> {
        // Checked before privilege so the answer does not depend on the caller's role.
        if actor.user_id == target_id {
            return Err(AppError::SelfRoleChange);
        }
        actor.require_privileged()?;

        let user = self.store.transact(|view| {
            let mut user = view
                .get_as::<User>(&paths::user(target_id))?
                .ok_or_else(|| AppError::NotFound(format!("User {}", target_id)))?;
            user.role = role;
            Ok::<_, AppError>(Transaction::commit(
                vec![Update::set(paths::user_role(target_id), &role)?],
                user,
            ))
        })?;

        tracing::info!(actor = %actor.user_id, target = %target_id, %role, "Changed user role");
        Ok(user)
    }

    pub fn update_profile(&self, user_id: Uuid, changes: &UpdateProfileRequest) -> Result<User, AppError> {
        let name = match &changes.name {
            Some(raw) => {
                let formatted = format_display_name(raw);
                if formatted.is_empty() {
                    return Err(AppError::Validation("Name must not be empty".to_string()));
                }
                Some(formatted)
            }
            None => None,
        };
        let position = changes.position.as_ref().map(|raw| raw.trim().to_string());

        self.store.transact(|view| {
            let mut user = view
                .get_as::<User>(&paths::user(user_id))?
                .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;
            let mut updates = Vec::new();
            if let Some(name) = &name {
                user.name = name.clone();
                updates.push(Update::set(paths::user(user_id).child("name"), name)?);
            }
            match position.as_deref() {
                Some("") => {
                    user.position = None;
                    updates.push(Update::remove(paths::user(user_id).child("position")));
                }
                Some(position) => {
                    user.position = Some(position.to_string());
                    updates.push(Update::set(paths::user(user_id).child("position"), position)?);
                }
                None => {}
            }
            Ok::<_, AppError>(Transaction::commit(updates, user))
        })
    }

    pub fn set_photo_ref(&self, user_id: Uuid, photo_ref: &str) -> Result<User, AppError> {
        self.store.transact(|view| {
            let mut user = view
                .get_as::<User>(&paths::user(user_id))?
                .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;
            user.photo_ref = Some(photo_ref.to_string());
            Ok::<_, AppError>(Transaction::commit(
                vec![Update::set(paths::user(user_id).child("photo_ref"), photo_ref)?],
                user,
            ))
        })
    }
}
