use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// The unauthenticated surface: the health probe and the identity gateway.
/// Registration restricts the requested role to READER/CREATOR inside the
/// handler; login never reveals whether the email or the password was wrong.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/register
        // New account creation. Hashes the password, persists the user and
        // returns a signed token alongside the public user record.
        .route("/api/register", post(handlers::register))
        // POST /api/login
        // Credential verification and token issuance.
        .route("/api/login", post(handlers::login))
}
