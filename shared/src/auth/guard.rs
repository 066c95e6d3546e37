//! Declarative permission gate for UI regions.

use crate::auth::evaluate::{has_all_permissions, has_any_permission, has_permission};
use crate::types::permission::PermissionSet;

/// What a guarded region requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardQuery {
    Permission(String),
    /// Any of `codes` by default, every one of them with `require_all`.
    Permissions { codes: Vec<String>, require_all: bool },
}

impl GuardQuery {
    pub fn permission(code: impl Into<String>) -> Self {
        GuardQuery::Permission(code.into())
    }

    pub fn any_of<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GuardQuery::Permissions {
            codes: codes.into_iter().map(Into::into).collect(),
            require_all: false,
        }
    }

    pub fn all_of<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GuardQuery::Permissions {
            codes: codes.into_iter().map(Into::into).collect(),
            require_all: true,
        }
    }

    pub fn is_satisfied_by(&self, permissions: Option<&PermissionSet>) -> bool {
        match self {
            GuardQuery::Permission(code) => has_permission(permissions, code),
            GuardQuery::Permissions {
                codes,
                require_all: true,
            } => has_all_permissions(permissions, codes.as_slice()),
            GuardQuery::Permissions {
                codes,
                require_all: false,
            } => has_any_permission(permissions, codes.as_slice()),
        }
    }
}

/// Pick a branch. A missing query is denied: a gate with nothing to check
/// fails closed.
pub fn guard<T>(
    permissions: Option<&PermissionSet>,
    query: Option<&GuardQuery>,
    granted: impl FnOnce() -> T,
    denied: impl FnOnce() -> T,
) -> T {
    match query {
        Some(q) if q.is_satisfied_by(permissions) => granted(),
        _ => denied(),
    }
}

/// [`guard`] with the default denied branch: render nothing.
pub fn guard_or_nothing<T>(
    permissions: Option<&PermissionSet>,
    query: Option<&GuardQuery>,
    granted: impl FnOnce() -> T,
) -> Option<T> {
    guard(permissions, query, || Some(granted()), || None)
}
