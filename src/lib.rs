//! HTTP endpoint that relays website contact-form submissions as email
//! through an SMTP relay.

pub mod config;
pub mod dto;
pub mod handler;
pub mod render;
pub mod service;
pub mod transport;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::sync::Arc;

use service::ContactService;

pub fn router(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/send-email", post(handler::send_email))
        .route("/", get(handler::health_check))
        .with_state(service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
