//! Decode-only reading of admin bearer tokens.
//!
//! No signature, issuer or audience is checked here. The result is good for
//! deciding what to show, never for deciding what to allow; the remote
//! backend re-validates the token on every call it serves.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::debug;

use crate::auth::storage::CookieJar;
use crate::types::jwt::{AdminClaims, DecodedToken};

/// Decode an admin token string. Any malformation yields `None`.
pub fn decode_admin_token(token: &str) -> Option<DecodedToken> {
    let claims: AdminClaims = decode_payload(token)?;
    let decoded = DecodedToken::from_claims(claims);
    if decoded.is_none() {
        debug!("Token subject is not a numeric id");
    }
    decoded
}

/// Decode whatever admin token currently sits in the cookie jar.
pub fn decode_admin_token_from_cookies<C: CookieJar + ?Sized>(
    jar: &C,
    cookie_name: &str,
) -> Option<DecodedToken> {
    let token = jar.get(cookie_name).filter(|t| !t.is_empty())?;
    decode_admin_token(&token)
}

/// Read only the `exp` claim. Works for any token shape, including
/// end-user tokens that do not carry admin claims.
pub fn token_expiry(token: &str) -> Option<i64> {
    #[derive(Deserialize)]
    struct Expiry {
        exp: i64,
    }

    decode_payload::<Expiry>(token).map(|e| e.exp)
}

fn decode_payload<T: for<'de> Deserialize<'de>>(token: &str) -> Option<T> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        debug!("Token has {} segments, expected 3", segments.len());
        return None;
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = match URL_SAFE_NO_PAD.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Token payload is not base64url: {}", e);
            return None;
        }
    };

    match serde_json::from_slice::<T>(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!("Token payload is not a valid claim set: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryCookieJar;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    const FULL_PAYLOAD: &str = r#"{
        "sub": "17",
        "email": "ops@shop.test",
        "fullName": "Ops Admin",
        "roles": ["ADMIN"],
        "permissions": ["MANAGE_PRODUCTS", "READ_ORDERS"],
        "iat": 1700000000,
        "exp": 1700086400
    }"#;

    #[test]
    fn decodes_complete_claim_set() {
        let decoded = decode_admin_token(&token_with_payload(FULL_PAYLOAD)).unwrap();
        assert_eq!(decoded.subject_id, 17);
        assert_eq!(decoded.full_name, "Ops Admin");
        assert_eq!(decoded.roles, vec!["ADMIN"]);
        assert!(decoded.permissions.contains("READ_ORDERS"));
        assert_eq!(decoded.issued_at, 1_700_000_000);
        assert_eq!(decoded.expires_at, 1_700_086_400);
    }

    #[test]
    fn roles_and_permissions_default_to_empty() {
        let payload = r#"{"sub":"3","email":"a@b.c","fullName":"A","iat":1,"exp":2}"#;
        let decoded = decode_admin_token(&token_with_payload(payload)).unwrap();
        assert!(decoded.roles.is_empty());
        assert!(decoded.permissions.is_empty());
    }

    #[test]
    fn null_roles_read_as_empty() {
        let payload = r#"{"sub":"5","email":"a@b.c","fullName":"A","roles":null,
            "permissions":["READ_ORDERS"],"iat":1,"exp":2}"#;
        let decoded = decode_admin_token(&token_with_payload(payload)).unwrap();
        assert!(decoded.roles.is_empty());
        assert!(decoded.permissions.contains("READ_ORDERS"));
    }

    #[test]
    fn null_permissions_read_as_empty() {
        let payload = r#"{"sub":"5","email":"a@b.c","fullName":"A","roles":["ADMIN"],
            "permissions":null,"iat":1,"exp":2}"#;
        let decoded = decode_admin_token(&token_with_payload(payload)).unwrap();
        assert_eq!(decoded.roles, vec!["ADMIN"]);
        assert!(decoded.permissions.is_empty());
    }

    #[test]
    fn padded_payload_is_accepted() {
        let payload = URL_SAFE_NO_PAD.encode(FULL_PAYLOAD);
        let padding = "=".repeat((4 - payload.len() % 4) % 4);
        let token = format!("h.{}{}.s", payload, padding);
        assert!(decode_admin_token(&token).is_some());
    }

    #[test]
    fn numeric_sub_is_rejected() {
        let payload = r#"{"sub":17,"email":"a@b.c","fullName":"A","iat":1,"exp":2}"#;
        assert!(decode_admin_token(&token_with_payload(payload)).is_none());
    }

    #[test]
    fn non_numeric_sub_is_rejected() {
        let payload = r#"{"sub":"alice","email":"a@b.c","fullName":"A","iat":1,"exp":2}"#;
        assert!(decode_admin_token(&token_with_payload(payload)).is_none());
    }

    #[test]
    fn missing_required_claim_is_rejected() {
        let payload = r#"{"sub":"3","fullName":"A","iat":1,"exp":2}"#;
        assert!(decode_admin_token(&token_with_payload(payload)).is_none());
    }

    #[test]
    fn wrong_segment_count_is_rejected() {
        assert!(decode_admin_token("only.two").is_none());
        assert!(decode_admin_token("a.b.c.d").is_none());
        assert!(decode_admin_token("").is_none());
    }

    #[test]
    fn invalid_base64_and_json_are_rejected() {
        assert!(decode_admin_token("h.!!!.s").is_none());
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        assert!(decode_admin_token(&not_json).is_none());
    }

    #[test]
    fn cookie_variant_reads_named_cookie() {
        let jar = MemoryCookieJar::new().with("admin_token", &token_with_payload(FULL_PAYLOAD));
        assert!(decode_admin_token_from_cookies(&jar, "admin_token").is_some());
        assert!(decode_admin_token_from_cookies(&jar, "auth_token").is_none());
    }

    #[test]
    fn expiry_reads_any_token_shape() {
        let token = token_with_payload(r#"{"sub":"x","exp":42}"#);
        assert_eq!(token_expiry(&token), Some(42));
        assert_eq!(token_expiry("garbage"), None);
    }
}
