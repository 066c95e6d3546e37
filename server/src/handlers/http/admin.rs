use anyhow::{Context, Result};
use http::request::Parts;
use hyper::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

use shared::types::{Action, ErrorResponse, Resource};

use crate::AppState;
use crate::handlers::http::routes::RequestSession;
use crate::handlers::http::utils::*;

#[derive(Debug, Serialize)]
struct CanResponse {
    resource: &'static str,
    action: &'static str,
    allowed: bool,
}

/// GET /health
pub async fn handle_health(_parts: Parts, _state: AppState) -> Result<HttpResponse> {
    let res = hyper::Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, "text/plain")
        .body(full("ok"))
        .context("Failed to build health response")?;
    Ok(res)
}

/// GET /api/admin/me: the identity carried by the request's admin cookie.
pub async fn handle_me(
    _parts: Parts,
    _state: AppState,
    session: RequestSession,
) -> Result<HttpResponse> {
    let res = match session.identity() {
        Some(user) if session.is_authenticated() => {
            debug!("Serving identity for {}", user);
            deliver_serialized_json(user, StatusCode::OK)?
        }
        _ => deliver_error_json(&ErrorResponse::unauthenticated(), StatusCode::UNAUTHORIZED)?,
    };
    Ok(add_no_cache_headers(res))
}

/// GET /api/admin/can?resource=PRODUCTS&action=READ
///
/// An absent identity is an ordinary `allowed: false`, not an error.
pub async fn handle_can(
    parts: Parts,
    _state: AppState,
    session: RequestSession,
) -> Result<HttpResponse> {
    let Some((resource, action)) = parse_can_query(parts.uri.query().unwrap_or("")) else {
        let err = ErrorResponse::new(
            "INVALID_QUERY",
            "resource and action must name a known resource and action",
        );
        return Ok(add_no_cache_headers(deliver_error_json(
            &err,
            StatusCode::BAD_REQUEST,
        )?));
    };

    let allowed = session.can_access(resource, action);
    debug!(
        "Access check {} on {}: {}",
        action.as_str(),
        resource.as_str(),
        allowed
    );

    let body = CanResponse {
        resource: resource.as_str(),
        action: action.as_str(),
        allowed,
    };
    Ok(add_no_cache_headers(deliver_serialized_json(
        &body,
        StatusCode::OK,
    )?))
}

/// POST /api/admin/logout: drops the snapshot and expires the admin cookie.
pub async fn handle_logout(
    _parts: Parts,
    _state: AppState,
    mut session: RequestSession,
) -> Result<HttpResponse> {
    if let Some(user) = session.identity() {
        info!("Logging out {}", user);
    }
    session.clear_identity();

    let (cookies, _) = session.into_parts();
    let mut res = deliver_success_json::<()>(None)?;
    cookies.apply(&mut res);
    Ok(add_no_cache_headers(res))
}

fn parse_can_query(query: &str) -> Option<(Resource, Action)> {
    let mut resource = None;
    let mut action = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "resource" => resource = value.parse::<Resource>().ok(),
            "action" => action = value.parse::<Action>().ok(),
            _ => {}
        }
    }
    Some((resource?, action?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use http_body_util::BodyExt;
    use hyper::header;
    use hyper::{Request, header::HeaderValue};
    use shared::auth::{AdminSession, MemoryStorage};
    use shared::types::AppConfig;

    fn token(permissions: &[&str]) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = serde_json::json!({
            "sub": "7",
            "email": "ops@shop.test",
            "fullName": "Ops Admin",
            "roles": ["ADMIN"],
            "permissions": permissions,
            "iat": 1_700_000_000,
            "exp": 4_000_000_000i64,
        });
        let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{payload}.sig")
    }

    fn request(uri: &str, cookie: Option<&str>) -> (Parts, RequestSession) {
        let mut req = Request::builder().uri(uri).body(()).unwrap();
        if let Some(c) = cookie {
            req.headers_mut()
                .insert(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        let (parts, _) = req.into_parts();
        let mut session = AdminSession::from_config(
            RequestCookies::from_headers(&parts.headers),
            MemoryStorage::new(),
            &AppConfig::default(),
        );
        session.establish_from_cookie();
        (parts, session)
    }

    fn state() -> AppState {
        AppState::new(AppConfig::default())
    }

    async fn body_json(res: HttpResponse) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn me_returns_identity_from_cookie() {
        let cookie = format!("admin_token={}", token(&["READ_PRODUCTS"]));
        let (parts, session) = request("/api/admin/me", Some(&cookie));
        let res = handle_me(parts, state(), session).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("cache-control").unwrap(),
            "no-cache, no-store, must-revalidate"
        );
        let json = body_json(res).await;
        assert_eq!(json["id"], 7);
        assert_eq!(json["fullName"], "Ops Admin");
        assert_eq!(json["permissions"][0], "READ_PRODUCTS");
    }

    #[tokio::test]
    async fn me_without_cookie_is_unauthorized() {
        let (parts, session) = request("/api/admin/me", None);
        let res = handle_me(parts, state(), session).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn me_with_garbage_cookie_is_unauthorized() {
        let (parts, session) = request("/api/admin/me", Some("admin_token=not-a-jwt"));
        let res = handle_me(parts, state(), session).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn can_uses_manage_fallback() {
        let cookie = format!("admin_token={}", token(&["MANAGE_ORDERS"]));
        let (parts, session) =
            request("/api/admin/can?resource=ORDERS&action=CANCEL", Some(&cookie));
        let res = handle_can(parts, state(), session).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["resource"], "ORDERS");
        assert_eq!(json["action"], "CANCEL");
        assert_eq!(json["allowed"], true);
    }

    #[tokio::test]
    async fn can_without_identity_is_false() {
        let (parts, session) = request("/api/admin/can?resource=PRODUCTS&action=READ", None);
        let res = handle_can(parts, state(), session).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["allowed"], false);
    }

    #[tokio::test]
    async fn can_rejects_unknown_resource() {
        let (parts, session) = request("/api/admin/can?resource=REPORTS&action=READ", None);
        let res = handle_can(parts, state(), session).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn can_rejects_missing_action() {
        let (parts, session) = request("/api/admin/can?resource=PRODUCTS", None);
        let res = handle_can(parts, state(), session).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_expires_admin_cookie() {
        let cookie = format!("admin_token={}", token(&[]));
        let (parts, session) = request("/api/admin/logout", Some(&cookie));
        let res = handle_logout(parts, state(), session).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let set = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set.starts_with("admin_token=;"));
        assert!(set.contains("Max-Age=0"));
        assert_eq!(body_json(res).await["status"], "success");
    }

    #[test]
    fn query_parsing_decodes_percent_escapes() {
        assert_eq!(
            parse_can_query("action=READ&resource=%50RODUCTS"),
            Some((Resource::Products, Action::Read))
        );
        assert_eq!(parse_can_query(""), None);
        assert_eq!(parse_can_query("resource=products&action=read"), None);
    }
}
