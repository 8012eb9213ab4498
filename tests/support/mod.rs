//! In-process identity service used by the end-to-end tests.
//!
//! Sessions are opaque cookie tokens. Email lookup is case-insensitive and
//! responses always carry the canonical lower-case address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

pub struct Account {
    pub email: &'static str,
    pub password: &'static str,
    pub role: &'static str,
}

pub const ACCOUNTS: &[Account] = &[
    Account { email: "admin@tedics.com", password: "tedics123", role: "admin" },
    Account { email: "employee@tedics.com", password: "tedics123", role: "employee" },
    Account { email: "customer@tedics.com", password: "tedics123", role: "customer" },
];

#[derive(Default)]
pub struct Service {
    sessions: Mutex<HashMap<String, &'static Account>>,
    next_token: AtomicUsize,
    pub me_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    /// When set, `/logout` answers 500 without invalidating anything.
    pub fail_logout: AtomicBool,
}

impl Service {
    /// Open a session out of band (as if the browser already held a cookie).
    pub fn open_session(&self, email: &str) -> String {
        let account = ACCOUNTS.iter().find(|a| a.email == email).unwrap();
        let token = format!("tok-{}", self.next_token.fetch_add(1, Ordering::SeqCst));
        self.sessions.lock().unwrap().insert(token.clone(), account);
        token
    }

    fn session_account(&self, headers: &HeaderMap) -> Option<&'static Account> {
        let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
        let token = cookies
            .split(';')
            .filter_map(|pair| pair.trim().strip_prefix("sid="))
            .next()?;
        self.sessions.lock().unwrap().get(token).copied()
    }
}

fn user_body(account: &Account) -> String {
    let local = account.email.split('@').next().unwrap_or_default();
    serde_json::json!({
        "user": {
            "_id": format!("id-{local}"),
            "email": account.email,
            "firstName": local,
            "lastName": "Tedics",
            "role": account.role,
            "company": "Tedics"
        }
    })
    .to_string()
}

async fn me(State(svc): State<Arc<Service>>, headers: HeaderMap) -> Response {
    svc.me_calls.fetch_add(1, Ordering::SeqCst);
    match svc.session_account(&headers) {
        Some(account) => (StatusCode::OK, user_body(account)).into_response(),
        None => (StatusCode::UNAUTHORIZED, r#"{"message":"not authenticated"}"#).into_response(),
    }
}

async fn login(State(svc): State<Arc<Service>>, Json(body): Json<serde_json::Value>) -> Response {
    svc.login_calls.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let Some(account) = ACCOUNTS
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(email) && a.password == password)
    else {
        return (StatusCode::UNAUTHORIZED, r#"{"message":"invalid credentials"}"#).into_response();
    };
    let token = svc.open_session(account.email);
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, format!("sid={token}; Path=/; HttpOnly"))],
        user_body(account),
    )
        .into_response()
}

async fn logout(State(svc): State<Arc<Service>>, headers: HeaderMap) -> Response {
    svc.logout_calls.fetch_add(1, Ordering::SeqCst);
    if svc.fail_logout.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        let mut sessions = svc.sessions.lock().unwrap();
        for pair in cookies.split(';') {
            if let Some(token) = pair.trim().strip_prefix("sid=") {
                sessions.remove(token);
            }
        }
    }
    (StatusCode::OK, [(header::SET_COOKIE, "sid=; Path=/; Max-Age=0")]).into_response()
}

/// Start the service on an ephemeral port.
pub async fn spawn() -> (SocketAddr, Arc<Service>) {
    let svc = Arc::new(Service::default());
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .with_state(svc.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, svc)
}
