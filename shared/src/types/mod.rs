pub mod admin_user;
pub mod json_error;
pub mod jwt;
pub mod permission;
pub mod server_config;

pub use self::admin_user::AdminUser;
pub use self::json_error::ErrorResponse;
pub use self::jwt::{AdminClaims, DecodedToken};
pub use self::permission::{Action, PermissionSet, Resource, UnknownName, codes};
pub use self::server_config::{AppConfig, ConfigError, CookieConfig, RoutesConfig, StorageConfig};
