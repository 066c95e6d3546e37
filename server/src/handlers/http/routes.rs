use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use http::request::Parts;
use hyper::{Method, Request, StatusCode};
use tracing::{debug, error, info};

use shared::auth::{AdminSession, MemoryStorage};
use shared::types::ErrorResponse;

use crate::AppState;
use crate::handlers::http::utils::*;

/// Session handed to admin handlers: the request's own cookies, and an
/// in-memory snapshot store that lives as long as the request.
pub type RequestSession = AdminSession<RequestCookies, MemoryStorage>;

type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send>>;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Two tiers:
//
//   RouteHandler: no session. Receives (parts, state).
//   Use for: /health.
//
//   AdminHandler: receives a per-request admin session built from the
//   request's cookies. The router never rejects here;
//   handlers decide what an absent identity means.

type RouteHandler = Box<dyn Fn(Parts, AppState) -> HandlerFuture + Send + Sync>;

type AdminHandler = Box<dyn Fn(Parts, AppState, RequestSession) -> HandlerFuture + Send + Sync>;

enum RouteKind {
    Open(RouteHandler),
    Admin(AdminHandler),
}

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// GET with no session, e.g. health checks.
    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Parts, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    /// GET with a per-request admin session.
    pub fn get_admin<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Parts, AppState, RequestSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.admin(Method::GET, path, handler)
    }

    /// POST with a per-request admin session.
    pub fn post_admin<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Parts, AppState, RequestSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.admin(Method::POST, path, handler)
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Parts, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |parts, state| Box::pin(handler(parts, state)))),
        });
        self
    }

    fn admin<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Parts, AppState, RequestSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Admin(Box::new(move |parts, state, session| {
                Box::pin(handler(parts, state, session))
            })),
        });
        self
    }

    /// Match `pattern` against `path`; `:name` segments match anything and
    /// the query string is ignored.
    pub(crate) fn path_matches(pattern: &str, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        let pattern_segments: Vec<&str> = pattern.split('/').collect();
        let path_segments: Vec<&str> = path.split('/').collect();

        pattern_segments.len() == path_segments.len()
            && pattern_segments
                .iter()
                .zip(path_segments.iter())
                .all(|(p, s)| p.starts_with(':') || p == s)
    }

    /// Dispatch a request. Never fails: handler errors become a 500.
    pub async fn route<B>(&self, req: Request<B>, state: AppState) -> HttpResponse {
        let (parts, _) = req.into_parts();
        let path = parts.uri.path().to_string();

        let Some(route) = self
            .routes
            .iter()
            .find(|r| r.method == parts.method && Self::path_matches(&r.path, &path))
        else {
            info!("No route for {} {}", parts.method, path);
            return deliver_error_json(&ErrorResponse::not_found(), StatusCode::NOT_FOUND)
                .unwrap_or_else(|_| internal_error());
        };

        debug!("Routing {} {}", parts.method, path);

        let result = match &route.kind {
            RouteKind::Open(handler) => handler(parts, state).await,
            RouteKind::Admin(handler) => {
                let session = Self::request_session(&parts, &state).await;
                handler(parts, state, session).await
            }
        };

        match result {
            Ok(res) => res,
            Err(e) => {
                error!("Handler for {} failed: {:#}", path, e);
                internal_error()
            }
        }
    }

    async fn request_session(parts: &Parts, state: &AppState) -> RequestSession {
        let config = state.config.read().await;
        let mut session = AdminSession::from_config(
            RequestCookies::from_headers(&parts.headers),
            MemoryStorage::new(),
            &config,
        );
        session.establish_from_cookie();
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_matches() {
        assert!(Router::path_matches("/api/admin/me", "/api/admin/me"));
    }

    #[test]
    fn different_paths_do_not_match() {
        assert!(!Router::path_matches("/api/admin/me", "/api/admin/can"));
    }

    #[test]
    fn trailing_slash_does_not_match_without_slash() {
        assert!(!Router::path_matches("/api/admin/me", "/api/admin/me/"));
    }

    #[test]
    fn wildcard_segment_matches_id() {
        assert!(Router::path_matches("/api/admin/users/:id", "/api/admin/users/42"));
    }

    #[test]
    fn query_string_stripped_before_match() {
        assert!(Router::path_matches(
            "/api/admin/can",
            "/api/admin/can?resource=PRODUCTS&action=READ"
        ));
    }

    #[test]
    fn router_new_has_no_routes() {
        assert!(Router::new().routes.is_empty());
    }

    #[test]
    fn builders_record_route_kind() {
        let r = Router::new()
            .get("/health", |_parts, _state| async move { deliver_success_json::<()>(None) })
            .post_admin("/api/admin/logout", |_parts, _state, _session| async move {
                deliver_success_json::<()>(None)
            });
        assert_eq!(r.routes.len(), 2);
        assert!(matches!(r.routes[0].kind, RouteKind::Open(_)));
        assert!(matches!(r.routes[1].kind, RouteKind::Admin(_)));
        assert_eq!(r.routes[1].method, Method::POST);
    }
}
