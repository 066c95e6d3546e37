use tracing::{debug, info, warn};

use crate::auth::decode::{decode_admin_token, decode_admin_token_from_cookies};
use crate::auth::evaluate;
use crate::auth::guard::{self, GuardQuery};
use crate::auth::storage::{CookieJar, SessionStorage};
use crate::types::admin_user::AdminUser;
use crate::types::permission::{Action, PermissionSet, Resource};
use crate::types::server_config::{AppConfig, default_admin_cookie, default_admin_user_key};

/// Called with the new identity after every set, clear and hydrate.
pub type IdentityObserver = Box<dyn Fn(Option<&AdminUser>) + Send + Sync>;

/// The authenticated admin for one page lifetime or one request.
///
/// This is an explicit context object: create one per application (client
/// side) or per request (server side) and pass it to whatever needs it.
/// The identity snapshot is replaced wholesale, never edited in place.
///
/// # Persistence
/// Every [`set_identity`](Self::set_identity) writes the snapshot to
/// storage and every [`clear_identity`](Self::clear_identity) removes it.
/// Storage failures are logged and otherwise ignored; the in-memory
/// identity stays authoritative for the rest of the session.
pub struct AdminSession<C: CookieJar, S: SessionStorage> {
    identity: Option<AdminUser>,
    cookies: C,
    storage: S,
    token_cookie: String,
    storage_key: String,
    observers: Vec<IdentityObserver>,
}

impl<C: CookieJar, S: SessionStorage> std::fmt::Debug for AdminSession<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("identity", &self.identity)
            .field("token_cookie", &self.token_cookie)
            .field("storage_key", &self.storage_key)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<C: CookieJar, S: SessionStorage> AdminSession<C, S> {
    /// Empty session using the `admin_token` cookie and `admin_user` key.
    pub fn new(cookies: C, storage: S) -> Self {
        Self::with_names(cookies, storage, &default_admin_cookie(), &default_admin_user_key())
    }

    pub fn from_config(cookies: C, storage: S, config: &AppConfig) -> Self {
        Self::with_names(
            cookies,
            storage,
            &config.cookies.admin_token,
            &config.storage.admin_user_key,
        )
    }

    pub fn with_names(cookies: C, storage: S, token_cookie: &str, storage_key: &str) -> Self {
        Self {
            identity: None,
            cookies,
            storage,
            token_cookie: token_cookie.to_string(),
            storage_key: storage_key.to_string(),
            observers: Vec::new(),
        }
    }

    pub fn identity(&self) -> Option<&AdminUser> {
        self.identity.as_ref()
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the cookie jar and storage, e.g. to turn pending cookie
    /// changes into response headers.
    pub fn into_parts(self) -> (C, S) {
        (self.cookies, self.storage)
    }

    pub fn subscribe(&mut self, observer: impl Fn(Option<&AdminUser>) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(self.identity.as_ref());
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Replace the identity and persist it. `None` is a logout and behaves
    /// exactly like [`clear_identity`](Self::clear_identity).
    pub fn set_identity(&mut self, identity: Option<AdminUser>) {
        let Some(user) = identity else {
            self.clear_identity();
            return;
        };

        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(&self.storage_key, &json) {
                    warn!("Failed to persist admin identity: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize admin identity: {}", e),
        }

        debug!("Admin identity set: id={}", user.id);
        self.identity = Some(user);
        self.notify();
    }

    /// Logout boundary: drops the identity, its persisted copy, and the
    /// admin token cookie together.
    pub fn clear_identity(&mut self) {
        if let Some(user) = self.identity.take() {
            info!("Admin identity cleared: id={}", user.id);
        }

        if let Err(e) = self.storage.remove_item(&self.storage_key) {
            warn!("Failed to remove persisted admin identity: {}", e);
        }
        self.cookies.remove(&self.token_cookie);

        self.notify();
    }

    /// Install the persisted snapshot, if there is a well-formed one.
    /// Otherwise the session is left empty. A failed read keeps the current
    /// identity.
    pub fn hydrate(&mut self) {
        match self.storage.get_item(&self.storage_key) {
            Ok(Some(raw)) => match serde_json::from_str::<AdminUser>(&raw) {
                Ok(user) => {
                    debug!("Hydrated admin identity: id={}", user.id);
                    self.identity = Some(user);
                }
                Err(e) => {
                    warn!("Ignoring malformed persisted admin identity: {}", e);
                    self.identity = None;
                }
            },
            Ok(None) => {
                debug!("No persisted admin identity");
                self.identity = None;
            }
            // The in-memory identity stays authoritative.
            Err(e) => warn!("Failed to read persisted admin identity: {}", e),
        }

        self.notify();
    }

    /// Login step: decode `token`, store it as the admin cookie and set the
    /// identity. An undecodable token leaves the session untouched.
    pub fn establish(&mut self, token: &str) -> Option<&AdminUser> {
        let Some(decoded) = decode_admin_token(token) else {
            warn!("Refusing to establish admin session from undecodable token");
            return None;
        };

        self.cookies.set(&self.token_cookie, token);
        self.set_identity(Some(decoded.into()));
        self.identity.as_ref()
    }

    /// Set the identity from the token already in the cookie jar.
    pub fn establish_from_cookie(&mut self) -> Option<&AdminUser> {
        let decoded = decode_admin_token_from_cookies(&self.cookies, &self.token_cookie)?;
        self.set_identity(Some(decoded.into()));
        self.identity.as_ref()
    }

    /// Both a live token cookie and a decoded identity are required. Either
    /// one alone means the session is stale or not yet hydrated.
    pub fn is_authenticated(&self) -> bool {
        self.cookies.has(&self.token_cookie) && self.identity.is_some()
    }

    // -----------------------------------------------------------------------
    // Permission queries
    // -----------------------------------------------------------------------

    /// `None` without an identity, so every query below answers `false`.
    pub fn permissions(&self) -> Option<&PermissionSet> {
        self.identity.as_ref().map(|u| &u.permissions)
    }

    /// Sorted codes, empty without an identity.
    pub fn get_permissions(&self) -> Vec<String> {
        self.permissions().map(PermissionSet::to_vec).unwrap_or_default()
    }

    pub fn has_permission(&self, code: &str) -> bool {
        evaluate::has_permission(self.permissions(), code)
    }

    pub fn has_any_permission<T: AsRef<str>>(&self, codes: &[T]) -> bool {
        evaluate::has_any_permission(self.permissions(), codes)
    }

    pub fn has_all_permissions<T: AsRef<str>>(&self, codes: &[T]) -> bool {
        evaluate::has_all_permissions(self.permissions(), codes)
    }

    pub fn can(&self, code: &str) -> bool {
        self.has_permission(code)
    }

    pub fn cannot(&self, code: &str) -> bool {
        !self.has_permission(code)
    }

    pub fn can_access(&self, resource: Resource, action: Action) -> bool {
        evaluate::can_access_resource(self.permissions(), resource, action)
    }

    pub fn guard<T>(
        &self,
        query: Option<&GuardQuery>,
        granted: impl FnOnce() -> T,
        denied: impl FnOnce() -> T,
    ) -> T {
        guard::guard(self.permissions(), query, granted, denied)
    }

    pub fn guard_or_nothing<T>(
        &self,
        query: Option<&GuardQuery>,
        granted: impl FnOnce() -> T,
    ) -> Option<T> {
        guard::guard_or_nothing(self.permissions(), query, granted)
    }
}
