use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base path every API route hangs off, e.g. `/api/v1`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// One row of the exemption table as written in the config file.
///
/// Exactly one of `path` (glob form) or `regex` must be set. `methods`
/// lists HTTP method names; `"*"` stands for every method.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExemptionConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
    pub methods: Vec<String>,
}

impl ExemptionConfig {
    pub fn path(path: &str, methods: &[&str]) -> Self {
        Self {
            path: Some(path.to_string()),
            regex: None,
            methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn regex(regex: &str, methods: &[&str]) -> Self {
        Self {
            path: None,
            regex: Some(regex.to_string()),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HMAC key used to sign and verify JWTs.
    ///
    /// Prefer supplying this through the `JWT_SECRET` environment variable,
    /// which `load_config` folds into this field once at startup.
    ///
    /// **Minimum length:** 32 characters.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: u64,
    /// Registrations using one of these emails are given the admin role.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    #[serde(default = "default_exemptions")]
    pub exemptions: Vec<ExemptionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_db_connections")]
    pub max_connections: u32,
}

#[derive(Deserialize, Clone)]
pub struct MediaConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_media_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:4000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            api_url: default_api_url(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_db_connections(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            base_url: default_media_base_url(),
        }
    }
}

impl AuthConfig {
    pub fn token_expiry_secs(&self) -> u64 {
        self.token_expiry_hours.saturating_mul(60 * 60)
    }

    /// Resolve the JWT secret with `JWT_SECRET` env-var taking priority over
    /// the config file field.
    pub fn resolved_jwt_secret(&self) -> Option<String> {
        std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.jwt_secret.clone())
            .filter(|s| !s.is_empty())
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|e| e.trim().eq_ignore_ascii_case(email.trim()))
    }
}

impl MediaConfig {
    /// Apply `MEDIA_CLOUD_NAME`, `MEDIA_API_KEY` and `MEDIA_API_SECRET` over
    /// whatever the file supplied.
    pub fn apply_env(&mut self) {
        let read = |key: &str| std::env::var(key).ok().filter(|s| !s.is_empty());
        if let Some(v) = read("MEDIA_CLOUD_NAME") {
            self.cloud_name = v;
        }
        if let Some(v) = read("MEDIA_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = read("MEDIA_API_SECRET") {
            self.api_secret = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    4000
}

pub fn default_api_url() -> String {
    "/api/v1".to_string()
}

pub fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

pub fn default_token_expiry_hours() -> u64 {
    24
}

pub fn default_database_url() -> String {
    "sqlite://storefront.db?mode=rwc".to_string()
}

pub fn default_max_db_connections() -> u32 {
    5
}

pub fn default_media_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

/// Public surface of the storefront: account creation, login and the
/// read/write catalogue endpoints. DELETE is absent from the
/// wildcard rows so removals always need a credential.
pub fn default_exemptions() -> Vec<ExemptionConfig> {
    const OPEN: &[&str] = &["GET", "POST", "PUT", "OPTIONS"];
    vec![
        ExemptionConfig::path("{api}/users*", OPEN),
        ExemptionConfig::path("{api}/products*", OPEN),
        ExemptionConfig::path("{api}/users", &["*"]),
        ExemptionConfig::path("{api}/users/login", &["*"]),
        ExemptionConfig::path("{api}/users/register", &["*"]),
        ExemptionConfig::path("/health", &["GET"]),
    ]
}
