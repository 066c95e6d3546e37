//! Permission queries.
//!
//! Every query takes `Option<&PermissionSet>`: `None` means there is no
//! authenticated identity, and every query answers `false` for it. Nothing
//! here returns an error; "no access" is an ordinary answer.

use crate::auth::decode::decode_admin_token;
use crate::types::permission::{Action, PermissionSet, Resource};

pub fn has_permission(permissions: Option<&PermissionSet>, code: &str) -> bool {
    permissions.is_some_and(|set| set.contains(code))
}

pub fn has_any_permission<S: AsRef<str>>(permissions: Option<&PermissionSet>, codes: &[S]) -> bool {
    permissions.is_some_and(|set| codes.iter().any(|c| set.contains(c.as_ref())))
}

/// True for an empty `codes` list when an identity is present: requiring
/// all of nothing is always satisfied.
pub fn has_all_permissions<S: AsRef<str>>(permissions: Option<&PermissionSet>, codes: &[S]) -> bool {
    permissions.is_some_and(|set| codes.iter().all(|c| set.contains(c.as_ref())))
}

/// `MANAGE_<RESOURCE>` or `<ACTION>_<RESOURCE>`. Both codes are built at
/// call time; the stored set is never expanded.
pub fn can_access_resource(
    permissions: Option<&PermissionSet>,
    resource: Resource,
    action: Action,
) -> bool {
    permissions.is_some_and(|set| {
        set.contains(&resource.manage_code()) || set.contains(&resource.code(action))
    })
}

/// Untyped variant for resource/action names that arrive as strings. Names
/// outside the closed vocabulary are denied rather than concatenated.
pub fn can_access_resource_code(
    permissions: Option<&PermissionSet>,
    resource: &str,
    action: &str,
) -> bool {
    match (resource.parse::<Resource>(), action.parse::<Action>()) {
        (Ok(resource), Ok(action)) => can_access_resource(permissions, resource, action),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Token-string variants
// ---------------------------------------------------------------------------

/// Permissions carried by a token string, `None` when it does not decode.
pub fn permissions_from_token(token: &str) -> Option<PermissionSet> {
    decode_admin_token(token).map(|decoded| decoded.permissions)
}

pub fn has_permission_in_token(token: &str, code: &str) -> bool {
    has_permission(permissions_from_token(token).as_ref(), code)
}

pub fn has_any_permission_in_token<S: AsRef<str>>(token: &str, codes: &[S]) -> bool {
    has_any_permission(permissions_from_token(token).as_ref(), codes)
}

pub fn has_all_permissions_in_token<S: AsRef<str>>(token: &str, codes: &[S]) -> bool {
    has_all_permissions(permissions_from_token(token).as_ref(), codes)
}

pub fn can_access_resource_in_token(token: &str, resource: Resource, action: Action) -> bool {
    can_access_resource(permissions_from_token(token).as_ref(), resource, action)
}
