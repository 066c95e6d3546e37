use serde::{Deserialize, Deserializer, Serialize};

use crate::types::admin_user::AdminUser;
use crate::types::permission::PermissionSet;

/// Payload of an admin bearer token as issued by the remote backend.
///
/// This is the wire shape only. `sub` is a numeric id carried as a string;
/// [`DecodedToken`] is what the rest of the crate works with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClaims {
    /// Standard JWT subject: the admin's numeric id as a string.
    pub sub: String,

    pub email: String,

    pub full_name: String,

    /// Display only. Authorization decisions never look at roles.
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Optional list claims may be missing or an explicit `null`; both read as
/// empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A fully validated claim set. Either every field is present and typed, or
/// the decoder returned `None`; there is no partially populated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub subject_id: i64,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<String>,
    pub permissions: PermissionSet,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl DecodedToken {
    /// `None` when `sub` is not an integer.
    pub fn from_claims(claims: AdminClaims) -> Option<Self> {
        let subject_id = claims.sub.trim().parse::<i64>().ok()?;
        Some(Self {
            subject_id,
            email: claims.email,
            full_name: claims.full_name,
            roles: claims.roles,
            permissions: PermissionSet::new(claims.permissions),
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at <= now_secs
    }

    /// The snapshot persisted by the admin session.
    pub fn to_admin_user(&self) -> AdminUser {
        AdminUser {
            id: self.subject_id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

impl From<DecodedToken> for AdminUser {
    fn from(token: DecodedToken) -> Self {
        AdminUser {
            id: token.subject_id,
            full_name: token.full_name,
            email: token.email,
            roles: token.roles,
            permissions: token.permissions,
        }
    }
}
