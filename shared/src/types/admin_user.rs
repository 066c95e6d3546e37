use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::jwt::null_as_default;
use crate::types::permission::PermissionSet;

/// Identity snapshot held by the admin session and persisted under the
/// `admin_user` storage key.
///
/// The token stays the source of truth; this is a cache of its decoded form
/// so a reload can rehydrate without decoding again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: PermissionSet,
}

impl fmt::Display for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={}, email={}, permissions={}",
            self.id,
            self.email,
            self.permissions.len()
        )
    }
}
