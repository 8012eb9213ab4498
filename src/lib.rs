//! # tedics-session
//!
//! Client-side session and authorization core for the Tedics web client.
//!
//! - [`store::SessionStore`] holds who is logged in and drives the
//!   startup hydration, login and logout transitions.
//! - [`gateway::SessionGateway`] is the boundary to the identity service;
//!   [`gateway::http::HttpGateway`] talks to its REST API.
//! - [`guard::AccessGuard`] turns a session snapshot plus a view's
//!   requirement into allow / redirect / wait.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tedics_session::{AccessGuard, AccessRequirement, HttpGateway, Role, SessionConfig, SessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::from_env()?;
//! let store = Arc::new(SessionStore::new(Arc::new(HttpGateway::new(&config)?)));
//! let guard = AccessGuard::new(config.views.clone());
//!
//! store.hydrate().await;
//! let decision = guard.evaluate(&store.current_state(), AccessRequirement::roles(Role::Admin, &[Role::Employee]));
//! println!("{decision:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;
pub mod guard;
pub mod identity;
pub mod store;

pub use config::{ConfigError, SessionConfig};
pub use gateway::http::HttpGateway;
pub use gateway::{Credentials, GatewayError, SessionGateway, TransportError, ValidationError};
pub use guard::routes::RouteTable;
pub use guard::{AccessGuard, AccessRequirement, Decision, Views};
pub use identity::{Identity, Role, RoleSet};
pub use store::{LogoutOutcome, SessionPhase, SessionState, SessionStore};
