//! Session store: the single source of truth for "who is logged in".
//!
//! DESIGN
//! ======
//! State lives in a `tokio::sync::watch` channel: readers take synchronous
//! snapshots, observers `subscribe()`, and every transition publishes one
//! complete `SessionState` so identity and the resolving flag never change
//! separately.
//!
//! Construct one store at startup and share it (`Arc<SessionStore>`); there
//! is no global.
//!
//! STATE MACHINE
//! =============
//! `Resolving -> Authenticated | Anonymous` via `hydrate` (exactly once).
//! `Anonymous -> Authenticated` via `login`; failures leave state untouched.
//! `Authenticated -> Anonymous` via `logout`, unconditionally.
//! Nothing re-enters `Resolving`.
//!
//! RACES
//! =====
//! The first `hydrate` call spawns the identity query onto the runtime; every
//! call, including that first one, then waits on the watch channel for
//! `resolving` to clear. Dropping a waiting caller never cancels the query,
//! and concurrent or repeated calls share it. Each explicit transition
//! (login, logout) bumps a generation counter inside the watch lock; a
//! hydration result that lands after one of those is stale and only clears
//! `resolving`.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use secrecy::SecretString;
use tokio::sync::watch;

use crate::gateway::{Credentials, GatewayError, SessionGateway};
use crate::identity::Identity;

// =============================================================================
// STATE
// =============================================================================

/// Observable session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True only until the startup hydration completes.
    pub resolving: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Resolving,
    Anonymous,
    Authenticated,
}

impl SessionState {
    /// Initial state: resolving, nobody known yet.
    #[must_use]
    pub fn resolving() -> Self {
        Self { identity: None, resolving: true }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { identity: None, resolving: false }
    }

    #[must_use]
    pub fn authenticated(identity: Identity) -> Self {
        Self { identity: Some(identity), resolving: false }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (self.resolving, &self.identity) {
            (true, _) => SessionPhase::Resolving,
            (false, None) => SessionPhase::Anonymous,
            (false, Some(_)) => SessionPhase::Authenticated,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// How a logout ended. Local state is anonymous in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The service invalidated the session.
    SignedOut,
    /// The service call failed; only local state was cleared.
    SignedOutLocally,
    /// Nobody was signed in; no call was made.
    AlreadySignedOut,
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    inner: Arc<StoreInner>,
}

/// State shared with the detached hydration task.
struct StoreInner {
    gateway: Arc<dyn SessionGateway>,
    state: watch::Sender<SessionState>,
    hydration_started: AtomicBool,
    /// Bumped by login/logout, only inside `send_modify`.
    generation: AtomicU64,
}

impl SessionStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn SessionGateway>) -> Self {
        let (state, _) = watch::channel(SessionState::resolving());
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                state,
                hydration_started: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Latest snapshot. Never waits on network I/O.
    #[must_use]
    pub fn current_state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Probe the ambient session once per store lifetime and wait for the
    /// outcome.
    ///
    /// Every outcome ends with `resolving == false`. A transport failure is
    /// treated like "not logged in": protected content is never shown when
    /// the identity cannot be confirmed. The query runs on its own task, so
    /// cancelling this future does not cancel it.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn hydrate(&self) {
        let mut updates = self.inner.state.subscribe();
        if !self.inner.hydration_started.swap(true, Ordering::AcqRel) {
            self.spawn_hydration();
        }
        if updates.wait_for(|state| !state.resolving).await.is_err() {
            tracing::debug!("session state channel closed before hydration finished");
        }
    }

    fn spawn_hydration(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let probe = tokio::spawn({
                let inner = Arc::clone(&inner);
                async move { inner.run_hydration().await }
            });
            if let Err(e) = probe.await {
                tracing::error!(error = %e, "session hydration task failed; treating as anonymous");
                inner.state.send_modify(|state| state.resolving = false);
            }
        });
    }

    /// Authenticate and, on success, replace the identity.
    ///
    /// # Errors
    ///
    /// `Validation` before any network call for empty or malformed input;
    /// otherwise whatever the gateway reported. State is unchanged on error.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<Identity, GatewayError> {
        let credentials = Credentials::new(email, password)?;
        let identity = self
            .inner
            .gateway
            .login(&credentials)
            .await
            .inspect_err(|e| tracing::info!(email = credentials.email(), code = e.error_code(), "login failed"))?;

        tracing::info!(email = %identity.email, role = %identity.role, "login succeeded");
        self.inner.state.send_modify(|state| {
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
            state.identity = Some(identity.clone());
        });
        Ok(identity)
    }

    /// Sign out. Local state always ends anonymous, even if the service call
    /// fails.
    pub async fn logout(&self) -> LogoutOutcome {
        let snapshot = self.current_state();
        if snapshot.phase() == SessionPhase::Anonymous {
            return LogoutOutcome::AlreadySignedOut;
        }

        let outcome = match self.inner.gateway.logout().await {
            Ok(()) => LogoutOutcome::SignedOut,
            Err(e) => {
                tracing::warn!(error = %e, "remote logout failed; clearing local session anyway");
                LogoutOutcome::SignedOutLocally
            }
        };

        self.inner.state.send_modify(|state| {
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
            state.identity = None;
        });
        tracing::info!(?outcome, "logged out");
        outcome
    }
}

impl StoreInner {
    async fn run_hydration(&self) {
        let started_at = self.generation.load(Ordering::Acquire);
        let resolved = match self.gateway.resolve_current_identity().await {
            Ok(identity) => {
                tracing::info!(email = %identity.email, role = %identity.role, "session hydrated: authenticated");
                Some(identity)
            }
            Err(GatewayError::Unauthenticated) => {
                tracing::info!("session hydrated: anonymous");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "session hydration failed; treating as anonymous");
                None
            }
        };

        self.state.send_modify(|state| {
            if self.generation.load(Ordering::Acquire) == started_at {
                state.identity = resolved;
            } else {
                tracing::debug!("discarding stale hydration result");
            }
            state.resolving = false;
        });
    }
}
