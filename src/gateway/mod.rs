//! Session gateway: the only boundary to the remote identity service.
//!
//! DESIGN
//! ======
//! `SessionGateway` is a trait so the store can be driven by the reqwest-backed
//! [`http::HttpGateway`] in production and by in-memory stubs in tests.
//! Every outcome is normalized into one of four [`GatewayError`] kinds; in
//! particular "confirmed anonymous" (`Unauthenticated`) and "could not
//! determine" (`Transport`) are never collapsed at this layer.
//!
//! Credentials are validated when [`Credentials`] is constructed, so no
//! gateway implementation can be handed an empty email or password.

pub mod http;
pub mod wire;


use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::identity::{Identity, normalize_email};

// =============================================================================
// ERRORS
// =============================================================================

/// Input rejected before anything is transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email is required")]
    EmptyEmail,
    #[error("email is not a valid address")]
    MalformedEmail,
    #[error("password is required")]
    EmptyPassword,
}

/// Connectivity or protocol failure; the identity service could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connect, timeout or body-read failure.
    #[error("request failed: {0}")]
    Request(String),
    /// The service answered with a status outside the contract.
    #[error("unexpected status {0}")]
    Status(u16),
    /// The service answered 2xx with a body that is not an identity.
    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Normalized outcome of a failed gateway call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No valid session. Expected; drives "show login", not an error banner.
    #[error("not authenticated")]
    Unauthenticated,
    /// Login rejected by the service.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Validation(_) => "E_VALIDATION",
            Self::Transport(_) => "E_TRANSPORT",
        }
    }

    /// Whether the UI should surface this as an error message.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Request(_)) => true,
            Self::Transport(TransportError::Status(status)) => matches!(status, 429 | 500..=599),
            _ => false,
        }
    }

    /// Form-level message for display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in to continue.".to_owned(),
            Self::InvalidCredentials => "Invalid email or password.".to_owned(),
            Self::Validation(err) => {
                let mut msg = err.to_string();
                if let Some(first) = msg.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                msg.push('.');
                msg
            }
            Self::Transport(_) => "Unable to reach the server. Check your connection and try again.".to_owned(),
        }
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Validated login input: canonical email plus an opaque password.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: SecretString,
}

impl Credentials {
    /// Trim and lower-case the email, reject empty or malformed input.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty email, an email without a
    /// single `@` separating non-empty parts, or an empty password.
    pub fn new(email: &str, password: SecretString) -> Result<Self, ValidationError> {
        if email.trim().is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        let email = normalize_email(email).ok_or(ValidationError::MalformedEmail)?;
        if password.expose_secret().is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        Ok(Self { email, password })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Remote identity operations.
#[async_trait::async_trait]
pub trait SessionGateway: Send + Sync {
    /// Ask the service who the ambient credential belongs to.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when the service confirms there is no session,
    /// `Transport` when it could not be determined.
    async fn resolve_current_identity(&self) -> Result<Identity, GatewayError>;

    /// Establish a session for `credentials`.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when the service rejects the pair, `Transport`
    /// otherwise.
    async fn login(&self, credentials: &Credentials) -> Result<Identity, GatewayError>;

    /// Ask the service to invalidate the session.
    ///
    /// # Errors
    ///
    /// `Transport` on any failure; callers clear local state regardless.
    async fn logout(&self) -> Result<(), GatewayError>;
}
