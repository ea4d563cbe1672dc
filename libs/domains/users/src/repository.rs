use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{self, NewUser, User, UserChanges};

/// Persistence for user records.
///
/// Implementations enforce email and username uniqueness atomically and
/// report a collision as `DuplicateEmail` before `DuplicateUsername`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Page of users ordered by id
    async fn list(&self, skip: u64, limit: u64) -> UserResult<Vec<User>>;

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Assign an id and timestamps, then store
    async fn insert(&self, user: NewUser) -> UserResult<User>;

    /// Overwrite the `Some` columns of `user` and bump `updated_at`
    async fn update(&self, user: &User, changes: UserChanges) -> UserResult<User>;

    /// Hard delete; `NotFound` if the row is already gone
    async fn delete(&self, user: &User) -> UserResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

impl Store {
    fn conflict(&self, email: &str, username: &str, except: Option<i64>) -> Option<UserError> {
        let others = || self.users.values().filter(|u| Some(u.id) != except);

        if others().any(|u| u.email == email) {
            return Some(UserError::DuplicateEmail(email.to_string()));
        }
        if others().any(|u| u.username == username) {
            return Some(UserError::DuplicateUsername(username.to_string()));
        }
        None
    }
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Ids count up from 1 and are not reused after a delete.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, skip: u64, limit: u64) -> UserResult<Vec<User>> {
        let store = self.store.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(store.users.values().skip(skip).take(limit).cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if let Some(conflict) = store.conflict(&user.email, &user.username, None) {
            return Err(conflict);
        }

        store.last_id += 1;
        let now = models::now();
        let created = User {
            id: store.last_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            hashed_password: user.hashed_password,
            created_at: now,
            updated_at: now,
        };

        store.users.insert(created.id, created.clone());
        tracing::info!(user_id = created.id, "user created");
        Ok(created)
    }

    async fn update(&self, user: &User, changes: UserChanges) -> UserResult<User> {
        let mut store = self.store.write().await;

        let mut updated = store
            .users
            .get(&user.id)
            .cloned()
            .ok_or(UserError::NotFound(user.id))?;

        changes.apply_to(&mut updated);

        if let Some(conflict) = store.conflict(&updated.email, &updated.username, Some(user.id)) {
            return Err(conflict);
        }

        updated.updated_at = models::next_update_time(updated.updated_at);
        store.users.insert(updated.id, updated.clone());
        tracing::info!(user_id = updated.id, "user updated");
        Ok(updated)
    }

    async fn delete(&self, user: &User) -> UserResult<()> {
        let mut store = self.store.write().await;

        store
            .users
            .remove(&user.id)
            .ok_or(UserError::NotFound(user.id))?;

        tracing::info!(user_id = user.id, "user deleted");
        Ok(())
    }
}
