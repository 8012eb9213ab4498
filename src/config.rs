//! Session configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::guard::Views;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ME_PATH: &str = "/api/auth/me";
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/api/auth/logout";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_VIEW: &str = "/login";
pub const DEFAULT_HOME_VIEW: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
    #[error("invalid {var}: path must start with '/', got {value:?}")]
    RelativePath { var: &'static str, value: String },
    #[error("invalid {var}: expected a positive whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Endpoint paths on the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub me: String,
    pub login: String,
    pub logout: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Service origin without a trailing slash.
    pub api_base_url: String,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
    pub views: Views,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            endpoints: Endpoints {
                me: DEFAULT_ME_PATH.to_owned(),
                login: DEFAULT_LOGIN_PATH.to_owned(),
                logout: DEFAULT_LOGOUT_PATH.to_owned(),
            },
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            views: Views::new(DEFAULT_LOGIN_VIEW, DEFAULT_HOME_VIEW),
        }
    }
}

impl SessionConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `SESSION_API_BASE_URL`: default `http://localhost:5000`
    /// - `SESSION_ME_PATH`, `SESSION_LOGIN_PATH`, `SESSION_LOGOUT_PATH`
    /// - `SESSION_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SESSION_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SESSION_LOGIN_VIEW`: default `/login`
    /// - `SESSION_HOME_VIEW`: default `/`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a value is present but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] with an injectable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a value is present but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = parse_base_url(lookup("SESSION_API_BASE_URL").as_deref())?;
        let endpoints = Endpoints {
            me: parse_path("SESSION_ME_PATH", lookup("SESSION_ME_PATH"), DEFAULT_ME_PATH)?,
            login: parse_path("SESSION_LOGIN_PATH", lookup("SESSION_LOGIN_PATH"), DEFAULT_LOGIN_PATH)?,
            logout: parse_path("SESSION_LOGOUT_PATH", lookup("SESSION_LOGOUT_PATH"), DEFAULT_LOGOUT_PATH)?,
        };
        let timeouts = Timeouts {
            request_secs: parse_secs(
                "SESSION_REQUEST_TIMEOUT_SECS",
                lookup("SESSION_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_secs(
                "SESSION_CONNECT_TIMEOUT_SECS",
                lookup("SESSION_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };
        let views = Views::new(
            parse_path("SESSION_LOGIN_VIEW", lookup("SESSION_LOGIN_VIEW"), DEFAULT_LOGIN_VIEW)?,
            parse_path("SESSION_HOME_VIEW", lookup("SESSION_HOME_VIEW"), DEFAULT_HOME_VIEW)?,
        );

        Ok(Self { api_base_url, endpoints, timeouts, views })
    }

    /// Absolute URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(DEFAULT_API_BASE_URL);
    let url = reqwest::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        var: "SESSION_API_BASE_URL",
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var: "SESSION_API_BASE_URL",
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn parse_path(var: &'static str, raw: Option<String>, default: &str) -> Result<String, ConfigError> {
    let Some(value) = raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) else {
        return Ok(default.to_owned());
    };
    if !value.starts_with('/') {
        return Err(ConfigError::RelativePath { var, value });
    }
    Ok(value)
}

fn parse_secs(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw.map(|v| v.trim().to_owned()) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(default),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidNumber { var, value }),
        },
    }
}
