use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, NewUser, UpdateUser, User, UserChanges};
use crate::password::PasswordHasher;
use crate::repository::UserRepository;

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Service layer for User business logic
///
/// Owns the uniqueness rules and the create defaults. Every repository call is
/// bounded by `storage_timeout`.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: PasswordHasher,
    storage_timeout: Duration,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher: PasswordHasher::default(),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    async fn storage<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = UserResult<T>>,
    ) -> UserResult<T> {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.storage_timeout.as_millis() as u64,
                    "storage call timed out"
                );
                Err(UserError::Unavailable(format!(
                    "Storage did not respond in time ({operation})"
                )))
            }
        }
    }

    async fn hash_password(&self, plaintext: String) -> UserResult<String> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| UserError::Internal(format!("password hashing task failed: {e}")))??;
        Ok(hashed)
    }

    pub async fn list_users(&self, skip: u64, limit: u64) -> UserResult<Vec<User>> {
        self.storage("list", self.repository.list(skip, limit)).await
    }

    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.storage("get_by_id", self.repository.get_by_id(id))
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Create a new user with password hashing
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        if self
            .storage("get_by_email", self.repository.get_by_email(&input.email))
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateEmail(input.email));
        }

        if self
            .storage(
                "get_by_username",
                self.repository.get_by_username(&input.username),
            )
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let hashed_password = self.hash_password(input.password).await?;

        let new_user = NewUser {
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            is_active: input.is_active.unwrap_or(true),
            is_superuser: input.is_superuser.unwrap_or(false),
            hashed_password,
        };

        self.storage("insert", self.repository.insert(new_user)).await
    }

    /// Apply a partial update to a user that is known to exist.
    ///
    /// Email and username are re-checked only when they actually change.
    pub async fn update_user(&self, existing: User, input: UpdateUser) -> UserResult<User> {
        if let Some(email) = input.email.as_deref() {
            if email != existing.email {
                let owner = self
                    .storage("get_by_email", self.repository.get_by_email(email))
                    .await?;
                if owner.is_some_and(|other| other.id != existing.id) {
                    return Err(UserError::DuplicateEmail(email.to_string()));
                }
            }
        }

        if let Some(username) = input.username.as_deref() {
            if username != existing.username {
                let owner = self
                    .storage("get_by_username", self.repository.get_by_username(username))
                    .await?;
                if owner.is_some_and(|other| other.id != existing.id) {
                    return Err(UserError::DuplicateUsername(username.to_string()));
                }
            }
        }

        let hashed_password = match input.password {
            Some(password) if !password.is_empty() => Some(self.hash_password(password).await?),
            _ => None,
        };

        let changes = UserChanges {
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            is_active: input.is_active,
            is_superuser: input.is_superuser,
            hashed_password,
        };

        if changes.is_empty() {
            return Ok(existing);
        }

        self.storage("update", self.repository.update(&existing, changes))
            .await
    }

    pub async fn delete_user(&self, existing: User) -> UserResult<()> {
        self.storage("delete", self.repository.delete(&existing)).await
    }
}
