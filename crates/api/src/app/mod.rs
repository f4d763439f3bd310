//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborators plus the user and movie handlers
//! - `routes/`: the declarative routing table
//! - `pages.rs` / `templates.rs`: browser pages
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::Router;

use crate::config::AppConfig;
use crate::dispatch::{RegistryError, RequestDispatcher, dispatch_handler};
use crate::middleware::AuthVerifier;

pub mod dto;
pub mod errors;
pub mod pages;
pub mod routes;
pub mod services;
pub mod templates;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Uses Postgres when `DATABASE_URL` is configured, in-memory stores otherwise.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres repositories");
            AppServices::postgres(url, &config.jwt_secret).await?
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory repositories");
            AppServices::in_memory(&config.jwt_secret)
        }
    };

    Ok(build_app_with(config, services)?)
}

/// Build the router around already-constructed services.
pub fn build_app_with(config: &AppConfig, services: AppServices) -> Result<Router, RegistryError> {
    let registry = routes::registry(&services, config)?;
    for key in registry.routes() {
        tracing::debug!(route = %key, "registered");
    }

    let dispatcher = RequestDispatcher::new(
        registry,
        AuthVerifier::new(services.signer.clone()),
        config.max_body_bytes,
    );

    Ok(Router::new()
        .fallback(dispatch_handler)
        .with_state(Arc::new(dispatcher)))
}
