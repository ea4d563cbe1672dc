use crate::{ConfigError, FromEnv, env_flag_or, env_or_default};

/// Cross-origin policy for the HTTP layer.
///
/// An empty `allowed_origins` means "any origin". Browsers refuse a literal `*`
/// together with credentials, so the HTTP layer mirrors the request origin instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn permissive() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::permissive()
    }
}

impl FromEnv for CorsConfig {
    /// `CORS_ALLOWED_ORIGINS`: comma-separated list, `*` (default) for any.
    /// `CORS_ALLOW_CREDENTIALS`: defaults to true.
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("CORS_ALLOWED_ORIGINS", "*");
        let allowed_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .map(String::from)
            .collect();

        Ok(Self {
            allowed_origins,
            allow_credentials: env_flag_or("CORS_ALLOW_CREDENTIALS", true)?,
        })
    }
}
