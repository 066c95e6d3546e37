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
}

/// Names of the ambient bearer-token cookies. Only their presence is
/// checked at the route layer.
#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    #[serde(default = "default_admin_cookie")]
    pub admin_token: String,
    #[serde(default = "default_user_cookie")]
    pub auth_token: String,
}

/// Prefix lists that define the whole scope of route admission. A path
/// outside both lists is always allowed.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    #[serde(default = "default_admin_prefixes")]
    pub admin_prefixes: Vec<String>,
    /// Exact paths never treated as admin-protected (the login pages).
    #[serde(default = "default_admin_exempt")]
    pub admin_exempt: Vec<String>,
    #[serde(default = "default_admin_login")]
    pub admin_login: String,
    #[serde(default = "default_user_prefixes")]
    pub user_prefixes: Vec<String>,
    #[serde(default = "default_user_sign_in")]
    pub user_sign_in: String,
    #[serde(default = "default_redirect_param")]
    pub redirect_param: String,
    /// Treat a present but expired token as absent. Reads the `exp` claim
    /// only; signatures are still not checked.
    #[serde(default)]
    pub reject_expired: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_admin_user_key")]
    pub admin_user_key: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:3000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Segment-aware prefix match: `/cart` covers `/cart` and `/cart/42`, not
/// `/cartoon`. A trailing slash on the prefix is ignored.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl RoutesConfig {
    pub fn is_admin_exempt(&self, path: &str) -> bool {
        self.admin_exempt.iter().any(|p| p == path)
    }

    pub fn matches_admin(&self, path: &str) -> bool {
        !self.is_admin_exempt(path)
            && self
                .admin_prefixes
                .iter()
                .any(|prefix| path_has_prefix(path, prefix))
    }

    pub fn matches_user(&self, path: &str) -> bool {
        self.user_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_admin_cookie() -> String {
    "admin_token".to_string()
}

pub fn default_user_cookie() -> String {
    "auth_token".to_string()
}

pub fn default_admin_prefixes() -> Vec<String> {
    vec!["/dashboard".to_string()]
}

pub fn default_admin_exempt() -> Vec<String> {
    vec!["/login".to_string(), "/dashboard/login".to_string()]
}

pub fn default_admin_login() -> String {
    "/login".to_string()
}

pub fn default_user_prefixes() -> Vec<String> {
    ["/my-account", "/my-orders", "/wishlist", "/checkout", "/cart"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

pub fn default_user_sign_in() -> String {
    "/sign-in".to_string()
}

pub fn default_redirect_param() -> String {
    "redirect".to_string()
}

pub fn default_admin_user_key() -> String {
    "admin_user".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            admin_token: default_admin_cookie(),
            auth_token: default_user_cookie(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            admin_prefixes: default_admin_prefixes(),
            admin_exempt: default_admin_exempt(),
            admin_login: default_admin_login(),
            user_prefixes: default_user_prefixes(),
            user_sign_in: default_user_sign_in(),
            redirect_param: default_redirect_param(),
            reject_expired: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            admin_user_key: default_admin_user_key(),
        }
    }
}
