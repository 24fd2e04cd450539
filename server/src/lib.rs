//! Storefront backend: account registration and login with JWT sessions,
//! and a product catalogue whose images live on a media host.
//!
//! Every request passes the access gate (`auth`) before routing.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use shared::types::server_config::AppConfig;

pub mod auth;
pub mod database;
pub mod error;
pub mod handlers;
pub mod media;
pub mod server;
pub mod tower_middle;

use auth::AccessGate;
use media::MediaStore;

pub use server::{serve, serve_with_shutdown};

/// Everything a handler can reach. Cheap to clone; all of it is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: Arc<AccessGate>,
    pub db: SqlitePool,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Build the gate from `config` and bundle it with the collaborators.
    /// Fails if the exemption table does not compile.
    pub fn new(config: AppConfig, db: SqlitePool, media: Arc<dyn MediaStore>) -> Result<Self> {
        let secret = config
            .auth
            .resolved_jwt_secret()
            .context("JWT secret is not configured")?;

        let gate = AccessGate::from_config(&config.auth, &secret, &config.server.api_url)
            .context("Invalid exemption table")?;

        info!(
            "Access gate ready: {} exemption rules, tokens valid for {}h",
            gate.exemptions().len(),
            config.auth.token_expiry_hours
        );

        Ok(Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            db,
            media,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_url", &self.config.server.api_url)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
