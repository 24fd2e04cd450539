use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError, ExemptionConfig};

/// Read, parse and validate the config file at `path`.
///
/// Environment overrides (`JWT_SECRET`, `MEDIA_*`) are folded in here, once;
/// nothing downstream reads the environment again.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    let config = parse_config(&contents)?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Parse and validate config text. Split out from `load_config` so the
/// rules can be exercised without touching the filesystem.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let mut config: AppConfig = toml::from_str(contents)?;

    config.auth.jwt_secret = config.auth.resolved_jwt_secret();
    config.media.apply_env();

    debug!(
        "Config: server={:?} database={:?} media={:?} exemptions={}",
        config.server,
        config.database,
        config.media,
        config.auth.exemptions.len()
    );

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

/// Ten years.
const MAX_TOKEN_EXPIRY_HOURS: u64 = 87_600;

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let api = &config.server.api_url;
    if !api.starts_with('/') || (api.len() > 1 && api.ends_with('/')) {
        return Err(ConfigError::InvalidConfig(
            "api_url must start with '/' and must not end with '/'".into(),
        ));
    }

    if config.server.max_body_bytes == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_body_bytes must be greater than 0".into(),
        ));
    }

    if config.auth.token_expiry_hours == 0 {
        return Err(ConfigError::InvalidConfig(
            "token_expiry_hours must be greater than 0".into(),
        ));
    }

    if config.auth.token_expiry_hours > MAX_TOKEN_EXPIRY_HOURS {
        return Err(ConfigError::InvalidConfig(format!(
            "token_expiry_hours must not exceed {}",
            MAX_TOKEN_EXPIRY_HOURS
        )));
    }

    // The secret is read once at startup and never rotated; a bad value has
    // to stop the process here rather than at the first login.
    match config.auth.jwt_secret.as_deref() {
        None => {
            return Err(ConfigError::InvalidConfig(
                "jwt_secret must be set via the JWT_SECRET env var or auth.jwt_secret config field"
                    .into(),
            ));
        }
        Some(secret) if secret.len() < 32 => {
            return Err(ConfigError::InvalidConfig(
                "jwt_secret must be at least 32 characters long".into(),
            ));
        }
        _ => {}
    }

    for (index, rule) in config.auth.exemptions.iter().enumerate() {
        validate_exemption(index, rule)?;
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "database.max_connections must be greater than 0".into(),
        ));
    }

    let media = &config.media;
    if media.cloud_name.is_empty() || media.api_key.is_empty() || media.api_secret.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "media.cloud_name, media.api_key and media.api_secret must all be set".into(),
        ));
    }

    Ok(())
}

fn validate_exemption(index: usize, rule: &ExemptionConfig) -> Result<(), ConfigError> {
    match (&rule.path, &rule.regex) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::InvalidConfig(format!(
                "auth.exemptions[{}]: set either path or regex, not both",
                index
            )));
        }
        (None, None) => {
            return Err(ConfigError::InvalidConfig(format!(
                "auth.exemptions[{}]: one of path or regex is required",
                index
            )));
        }
        (Some(p), None) | (None, Some(p)) if p.trim().is_empty() => {
            return Err(ConfigError::InvalidConfig(format!(
                "auth.exemptions[{}]: pattern cannot be empty",
                index
            )));
        }
        _ => {}
    }

    if rule.methods.is_empty() {
        return Err(ConfigError::InvalidConfig(format!(
            "auth.exemptions[{}]: methods cannot be empty",
            index
        )));
    }

    Ok(())
}
