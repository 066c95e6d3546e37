pub mod decode;
pub mod evaluate;
pub mod guard;
pub mod session;
pub mod storage;

pub use self::decode::{decode_admin_token, decode_admin_token_from_cookies, token_expiry};
pub use self::evaluate::{
    can_access_resource, can_access_resource_code, can_access_resource_in_token,
    has_all_permissions, has_all_permissions_in_token, has_any_permission,
    has_any_permission_in_token, has_permission, has_permission_in_token, permissions_from_token,
};
pub use self::guard::{GuardQuery, guard, guard_or_nothing};
pub use self::session::{AdminSession, IdentityObserver};
pub use self::storage::{
    CookieJar, FileStorage, MemoryCookieJar, MemoryStorage, SessionStorage, StorageError,
};
