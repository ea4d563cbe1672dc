use async_trait::async_trait;
use migration::UQ_USERS_USERNAME;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RuntimeErr, SqlErr, sqlx,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{self, NewUser, User, UserChanges},
    repository::UserRepository,
};

pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Translate a write error, naming the value that collided.
fn write_error(err: DbErr, email: &str, username: &str) -> UserError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return if detail.contains(UQ_USERS_USERNAME) {
            UserError::DuplicateUsername(username.to_string())
        } else {
            UserError::DuplicateEmail(email.to_string())
        };
    }
    read_error(err)
}

fn read_error(err: DbErr) -> UserError {
    if is_connection_loss(&err) {
        return UserError::Unavailable(err.to_string());
    }
    UserError::Internal(format!("Database error: {}", err))
}

/// The store could not be reached or dropped the connection mid-statement.
fn is_connection_loss(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Query(RuntimeErr::SqlxError(e)) | DbErr::Exec(RuntimeErr::SqlxError(e)) => matches!(
            e.as_ref(),
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut
        ),
        _ => false,
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self, skip: u64, limit: u64) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(read_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(read_error)?;

        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(read_error)?;

        Ok(model.map(Into::into))
    }

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(read_error)?;

        Ok(model.map(Into::into))
    }

    async fn insert(&self, user: NewUser) -> UserResult<User> {
        let now = models::now();
        let active_model = entity::ActiveModel {
            id: NotSet,
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            full_name: Set(user.full_name),
            is_active: Set(user.is_active),
            is_superuser: Set(user.is_superuser),
            hashed_password: Set(user.hashed_password),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &user.email, &user.username))?;

        tracing::info!(user_id = model.id, "user created");
        Ok(model.into())
    }

    async fn update(&self, user: &User, changes: UserChanges) -> UserResult<User> {
        let email = changes.email.clone().unwrap_or_else(|| user.email.clone());
        let username = changes
            .username
            .clone()
            .unwrap_or_else(|| user.username.clone());

        let mut active_model = entity::ActiveModel {
            id: Unchanged(user.id),
            ..Default::default()
        };
        if let Some(value) = changes.username {
            active_model.username = Set(value);
        }
        if let Some(value) = changes.email {
            active_model.email = Set(value);
        }
        if let Some(value) = changes.full_name {
            active_model.full_name = Set(Some(value));
        }
        if let Some(value) = changes.is_active {
            active_model.is_active = Set(value);
        }
        if let Some(value) = changes.is_superuser {
            active_model.is_superuser = Set(value);
        }
        if let Some(value) = changes.hashed_password {
            active_model.hashed_password = Set(value);
        }
        active_model.updated_at = Set(models::next_update_time(user.updated_at).into());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => UserError::NotFound(user.id),
                e => write_error(e, &email, &username),
            })?;

        tracing::info!(user_id = model.id, "user updated");
        Ok(model.into())
    }

    async fn delete(&self, user: &User) -> UserResult<()> {
        let result = entity::Entity::delete_by_id(user.id)
            .exec(&self.db)
            .await
            .map_err(read_error)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(user.id));
        }

        tracing::info!(user_id = user.id, "user deleted");
        Ok(())
    }
}
