//! Storefront gate: route admission in front of a small admin session API.
//!
//! Every admin session here is built per request from that request's
//! cookies. Tokens are decoded but never verified, so answers from this
//! server are display hints; the remote backend enforces access.

pub mod handlers;
pub mod tower_middle;

use shared::config::LiveConfig;
use shared::types::AppConfig;

use handlers::http::Router;
use handlers::http::admin;

/// State shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: LiveConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: LiveConfig::new(config),
        }
    }

    pub fn from_live(config: LiveConfig) -> Self {
        Self { config }
    }
}

pub fn app_router() -> Router {
    Router::new()
        .get("/health", admin::handle_health)
        .get_admin("/api/admin/me", admin::handle_me)
        .get_admin("/api/admin/can", admin::handle_can)
        .post_admin("/api/admin/logout", admin::handle_logout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::{Request, StatusCode, header};
    use std::convert::Infallible;
    use std::sync::Arc;
    use tower::{Layer, ServiceExt, service_fn};

    use crate::handlers::http::utils::HttpResponse;
    use crate::tower_middle::RouteAdmissionLayer;

    async fn send(state: AppState, req: Request<()>) -> HttpResponse {
        let router = Arc::new(app_router());
        let svc = RouteAdmissionLayer::new(state.config.clone()).layer(service_fn(
            move |req: Request<()>| {
                let router = router.clone();
                let state = state.clone();
                async move { Ok::<_, Infallible>(router.route(req, state).await) }
            },
        ));
        svc.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let req = Request::builder().uri("/health").body(()).unwrap();
        let res = send(AppState::new(AppConfig::default()), req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let req = Request::builder().uri("/api/nope").body(()).unwrap();
        let res = send(AppState::new(AppConfig::default()), req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn wrong_method_is_404() {
        let req = Request::builder()
            .method("GET")
            .uri("/api/admin/logout")
            .body(())
            .unwrap();
        let res = send(AppState::new(AppConfig::default()), req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn protected_page_redirects_before_routing() {
        let req = Request::builder().uri("/dashboard/products").body(()).unwrap();
        let res = send(AppState::new(AppConfig::default()), req).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/login?redirect=%2Fdashboard%2Fproducts"
        );
    }

    #[tokio::test]
    async fn me_is_unauthorized_without_cookie() {
        let req = Request::builder().uri("/api/admin/me").body(()).unwrap();
        let res = send(AppState::new(AppConfig::default()), req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn renamed_cookie_is_honoured() {
        let mut config = AppConfig::default();
        config.cookies.admin_token = "staff_token".to_string();

        let req = Request::builder()
            .method("POST")
            .uri("/api/admin/logout")
            .body(())
            .unwrap();
        let res = send(AppState::new(config), req).await;
        let set = res.headers().get(header::SET_COOKIE).unwrap();
        assert!(set.to_str().unwrap().starts_with("staff_token=;"));
    }
}
