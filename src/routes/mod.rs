pub mod cert_errors;
pub mod health;
pub mod timeouts;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::cert_errors::CertErrorTranslator;
use crate::policy::TimeoutPolicy;

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<CertErrorTranslator>,
    pub policy: TimeoutPolicy,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/timeouts", get(timeouts::timeout_table))
        .route("/api/cert-errors/:code", get(cert_errors::resolve_code))
        .route("/api/normalize", post(cert_errors::normalize))
        .with_state(state)
}
