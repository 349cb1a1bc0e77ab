use crate::CrudError;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "VITE_API_URL";

/// Backend connection settings shared by every resource client.
///
/// The base URL is a deployment-time setting. There is no runtime
/// fallback: a missing value is a configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash (e.g. `https://erp.example/api`).
    pub base_url: String,
}

impl ApiConfig {
    /// Build a config from an explicit URL.
    pub fn new(base_url: &str) -> Result<Self, CrudError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(CrudError::Config(format!("{} is empty", API_URL_ENV)));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(CrudError::Config(format!(
                "base URL '{}' must start with http:// or https://",
                trimmed
            )));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Read the base URL from `VITE_API_URL`.
    pub fn from_env() -> Result<Self, CrudError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the base URL through an arbitrary lookup (env, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CrudError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_URL_ENV) {
            Some(url) => Self::new(&url),
            None => Err(CrudError::Config(format!("{} is not set", API_URL_ENV))),
        }
    }

    /// Join a resource path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
