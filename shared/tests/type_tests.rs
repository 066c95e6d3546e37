/// Integration-level tests for the `shared` crate's wire types.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `permission.rs` and `server_config.rs`).
// ---------------------------------------------------------------------------
// Token claims
// ---------------------------------------------------------------------------
#[cfg(test)]
mod claims_tests {
    use shared::types::*;

    fn sample_claims() -> AdminClaims {
        AdminClaims {
            sub: "42".to_string(),
            email: "alice@shop.test".to_string(),
            full_name: "Alice Nguyen".to_string(),
            roles: vec!["ADMIN".to_string()],
            permissions: vec!["READ_ORDERS".to_string(), "MANAGE_BLOGS".to_string()],
            iat: 1_700_000_000,
            exp: 9_999_999_999,
        }
    }

    #[test]
    fn claims_json_uses_camel_case_keys() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        for key in &["sub", "email", "fullName", "roles", "permissions", "iat", "exp"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
        assert!(json.get("full_name").is_none());
    }

    #[test]
    fn decoded_token_parses_numeric_subject() {
        let decoded = DecodedToken::from_claims(sample_claims()).unwrap();
        assert_eq!(decoded.subject_id, 42);
        assert!(decoded.permissions.contains("MANAGE_BLOGS"));
    }

    #[test]
    fn decoded_token_rejects_non_numeric_subject() {
        let mut c = sample_claims();
        c.sub = "alice".to_string();
        assert!(DecodedToken::from_claims(c).is_none());
    }

    #[test]
    fn expiry_is_inclusive_of_exp_second() {
        let decoded = DecodedToken::from_claims(sample_claims()).unwrap();
        assert!(!decoded.is_expired(9_999_999_998));
        assert!(decoded.is_expired(9_999_999_999));
    }

    #[test]
    fn admin_user_snapshot_drops_timestamps() {
        let decoded = DecodedToken::from_claims(sample_claims()).unwrap();
        let user = decoded.to_admin_user();
        assert_eq!(user.id, 42);
        assert_eq!(user.full_name, "Alice Nguyen");
        assert_eq!(user, AdminUser::from(decoded));
    }
}

// ---------------------------------------------------------------------------
// Persisted admin snapshot
// ---------------------------------------------------------------------------

#[cfg(test)]
mod admin_user_tests {
    use shared::types::*;

    #[test]
    fn snapshot_json_has_persisted_shape() {
        let user = AdminUser {
            id: 1,
            full_name: "Bob".to_string(),
            email: "bob@shop.test".to_string(),
            roles: vec![],
            permissions: PermissionSet::new(["READ_USERS"]),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["fullName"], "Bob");
        assert_eq!(json["permissions"][0], "READ_USERS");
    }

    #[test]
    fn snapshot_without_permissions_deserializes_empty() {
        // Older snapshots were written before permissions were persisted.
        let json = r#"{"id":5,"fullName":"Cy","email":"cy@shop.test","roles":["EDITOR"]}"#;
        let user: AdminUser = serde_json::from_str(json).unwrap();
        assert!(user.permissions.is_empty());
        assert_eq!(user.roles, vec!["EDITOR"]);
    }

    #[test]
    fn display_does_not_leak_full_name() {
        let user = AdminUser {
            id: 9,
            full_name: "Secret Name".to_string(),
            email: "x@shop.test".to_string(),
            roles: vec![],
            permissions: PermissionSet::default(),
        };
        let shown = user.to_string();
        assert!(shown.contains("id=9"));
        assert!(!shown.contains("Secret Name"));
    }
}

// ---------------------------------------------------------------------------
// ErrorResponse
// ---------------------------------------------------------------------------

#[cfg(test)]
mod error_response_tests {
    use shared::types::ErrorResponse;

    #[test]
    fn error_response_has_error_status() {
        let e = ErrorResponse::new("INVALID_QUERY", "bad resource");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "INVALID_QUERY");
        assert_eq!(json["message"], "bad resource");
    }

    #[test]
    fn canned_responses_have_stable_codes() {
        assert_eq!(ErrorResponse::unauthenticated().code, "UNAUTHENTICATED");
        assert_eq!(ErrorResponse::not_found().code, "NOT_FOUND");
    }
}
