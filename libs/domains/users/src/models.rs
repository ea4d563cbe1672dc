use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 500;

/// Stored user record.
///
/// Carries the password hash, so it never goes over the wire; handlers
/// convert it to [`UserResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice Liddell")]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `POST /users`.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "alice", min_length = 1, max_length = 50)]
    pub username: String,

    #[validate(email)]
    #[schema(example = "alice@example.com")]
    pub email: String,

    #[validate(length(max = 100))]
    #[schema(example = "Alice Liddell", max_length = 100)]
    pub full_name: Option<String>,

    /// Defaults to `true`
    pub is_active: Option<bool>,

    /// Defaults to `false`
    pub is_superuser: Option<bool>,

    #[validate(length(min = 8, max = 128))]
    #[schema(example = "correct horse battery", min_length = 8, max_length = 128, write_only)]
    pub password: String,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("is_active", &self.is_active)
            .field("is_superuser", &self.is_superuser)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `PUT /users/{id}`.
///
/// Every field is optional. A missing field and an explicit `null` both leave
/// the stored value as it is.
#[derive(Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 50))]
    #[schema(min_length = 1, max_length = 50)]
    pub username: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 100))]
    #[schema(max_length = 100)]
    pub full_name: Option<String>,

    pub is_active: Option<bool>,

    pub is_superuser: Option<bool>,

    #[validate(length(min = 8, max = 128))]
    #[schema(min_length = 8, max_length = 128, write_only)]
    pub password: Option<String>,
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("is_active", &self.is_active)
            .field("is_superuser", &self.is_superuser)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Offset pagination for `GET /users`.
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Rows to skip
    #[serde(default)]
    #[param(minimum = 0, default = 0)]
    pub skip: u64,

    /// Page size
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = MAX_LIMIT))]
    #[param(minimum = 1, maximum = 500, default = 100)]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A user ready to be inserted: password already hashed, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub hashed_password: String,
}

/// Columns to overwrite on update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub hashed_password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply to an in-memory record; `updated_at` is left to the caller.
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(is_superuser) = self.is_superuser {
            user.is_superuser = is_superuser;
        }
        if let Some(hashed_password) = self.hashed_password {
            user.hashed_password = hashed_password;
        }
    }
}

/// Current time at the precision PostgreSQL stores.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// `updated_at` for a write following one stamped `previous`.
///
/// Strictly later than `previous` even if the wall clock stepped back.
pub(crate) fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + TimeDelta::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let at = now();
        User {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: None,
            is_active: true,
            is_superuser: false,
            hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_response_has_no_password_hash() {
        let json = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_create_user_validation() {
        let input = CreateUser {
            username: String::new(),
            email: "nope".into(),
            full_name: Some("x".repeat(101)),
            is_active: None,
            is_superuser: None,
            password: "short".into(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["username", "email", "full_name", "password"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_create_user_debug_redacts_password() {
        let input = CreateUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: None,
            is_active: None,
            is_superuser: None,
            password: "hunter2hunter2".into(),
        };
        let debug = format!("{input:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_update_user_null_is_absent() {
        let input: UpdateUser =
            serde_json::from_value(serde_json::json!({"full_name": null, "email": null})).unwrap();
        assert!(input.full_name.is_none());
        assert!(input.email.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_update_user_short_password_rejected() {
        let input = UpdateUser {
            password: Some("1234567".into()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_list_query_bounds() {
        assert!(ListQuery::default().validate().is_ok());
        assert!(ListQuery { skip: 0, limit: 0 }.validate().is_err());
        let over = ListQuery {
            skip: 0,
            limit: MAX_LIMIT + 1,
        };
        assert!(over.validate().is_err());
        let at_max = ListQuery {
            skip: 10,
            limit: MAX_LIMIT,
        };
        assert!(at_max.validate().is_ok());
    }

    #[test]
    fn test_list_query_documented_bounds_match_validation() {
        let params = serde_json::to_value(ListQuery::into_params(|| None)).unwrap();
        let limit = params
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "limit")
            .unwrap();

        assert_eq!(limit["schema"]["maximum"].as_f64(), Some(MAX_LIMIT as f64));
        assert_eq!(limit["schema"]["default"].as_u64(), Some(DEFAULT_LIMIT));
    }

    #[test]
    fn test_next_update_time_is_strictly_later() {
        let ahead = now() + TimeDelta::hours(1);
        let next = next_update_time(ahead);
        assert!(next > ahead);
        assert_eq!(next, ahead + TimeDelta::microseconds(1));

        let past = now() - TimeDelta::hours(1);
        assert!(next_update_time(past) > past + TimeDelta::minutes(59));
    }

    #[test]
    fn test_changes_apply_only_present_fields() {
        let mut user = sample_user();
        let before = user.clone();

        UserChanges {
            full_name: Some("Alice L.".into()),
            ..Default::default()
        }
        .apply_to(&mut user);

        assert_eq!(user.full_name.as_deref(), Some("Alice L."));
        assert_eq!(user.email, before.email);
        assert_eq!(user.hashed_password, before.hashed_password);
        assert!(UserChanges::default().is_empty());
    }
}
