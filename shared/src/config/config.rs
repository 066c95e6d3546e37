use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError, RoutesConfig, path_has_prefix};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    let config = parse_config(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    Ok(config)
}

/// Parse and validate a TOML document. Every table is optional, but the
/// document itself must not be empty.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(contents)?;

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.cookies.admin_token.is_empty() || config.cookies.auth_token.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "cookie names cannot be empty".into(),
        ));
    }

    if config.storage.admin_user_key.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "admin_user_key cannot be empty".into(),
        ));
    }

    validate_routes(&config.routes)
}

fn validate_routes(routes: &RoutesConfig) -> Result<(), ConfigError> {
    if routes.redirect_param.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "redirect_param cannot be empty".into(),
        ));
    }

    let paths = routes
        .admin_prefixes
        .iter()
        .chain(routes.user_prefixes.iter())
        .chain(routes.admin_exempt.iter())
        .chain([&routes.admin_login, &routes.user_sign_in]);

    for path in paths {
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidConfig(format!(
                "route '{}' must start with '/'",
                path
            )));
        }
    }

    // A path may belong to at most one protected set.
    for admin in &routes.admin_prefixes {
        for user in &routes.user_prefixes {
            if path_has_prefix(admin, user) || path_has_prefix(user, admin) {
                return Err(ConfigError::InvalidConfig(format!(
                    "admin prefix '{}' overlaps user prefix '{}'",
                    admin, user
                )));
            }
        }
    }

    // Login pages must stay reachable without a token or the redirect loops.
    if routes.matches_admin(&routes.admin_login) || routes.matches_user(&routes.admin_login) {
        return Err(ConfigError::InvalidConfig(
            "admin_login must not be a protected route".into(),
        ));
    }

    if routes.matches_admin(&routes.user_sign_in) || routes.matches_user(&routes.user_sign_in) {
        return Err(ConfigError::InvalidConfig(
            "user_sign_in must not be a protected route".into(),
        ));
    }

    Ok(())
}
