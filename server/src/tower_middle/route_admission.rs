use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Request, Response, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::{Layer, Service};
use tracing::{debug, info};

use shared::auth::token_expiry;
use shared::config::LiveConfig;
use shared::types::{CookieConfig, RoutesConfig};

use crate::handlers::http::utils::get_cookie;

/// Which protected set a path falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Admin,
    EndUser,
    Public,
}

/// Outcome of checking one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Redirected { location: String },
}

pub fn classify(routes: &RoutesConfig, path: &str) -> RouteClass {
    if routes.matches_admin(path) {
        RouteClass::Admin
    } else if routes.matches_user(path) {
        RouteClass::EndUser
    } else {
        RouteClass::Public
    }
}

/// `<login>?<param>=<path>`, with the path form-urlencoded.
pub fn redirect_location(login: &str, param: &str, path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(param, path)
        .finish();
    format!("{}?{}", login, query)
}

/// Presence check only. With `reject_expired` a token whose `exp` has
/// passed counts as absent; a token without a readable `exp` still counts.
fn token_present(headers: &HeaderMap, name: &str, routes: &RoutesConfig, now: i64) -> bool {
    let Some(token) = get_cookie(headers, name).filter(|t| !t.is_empty()) else {
        return false;
    };
    if !routes.reject_expired {
        return true;
    }
    match token_expiry(&token) {
        Some(exp) if exp <= now => {
            debug!("Cookie {} carries an expired token", name);
            false
        }
        _ => true,
    }
}

/// Decide whether a request for `path` may proceed.
pub fn admit(
    path: &str,
    headers: &HeaderMap,
    cookies: &CookieConfig,
    routes: &RoutesConfig,
    now: i64,
) -> Admission {
    let (cookie, login) = match classify(routes, path) {
        RouteClass::Public => return Admission::Allowed,
        RouteClass::Admin => (&cookies.admin_token, &routes.admin_login),
        RouteClass::EndUser => (&cookies.auth_token, &routes.user_sign_in),
    };

    if token_present(headers, cookie, routes, now) {
        Admission::Allowed
    } else {
        Admission::Redirected {
            location: redirect_location(login, &routes.redirect_param, path),
        }
    }
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Tower layer that redirects requests for protected prefixes when the
/// matching token cookie is missing.
///
/// Reads the routes and cookie names from the live config on every request,
/// so a reload takes effect without restarting.
#[derive(Clone, Debug)]
pub struct RouteAdmissionLayer {
    config: LiveConfig,
}

impl RouteAdmissionLayer {
    pub fn new(config: LiveConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for RouteAdmissionLayer {
    type Service = RouteAdmissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RouteAdmissionService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RouteAdmissionService<S> {
    inner: S,
    config: LiveConfig,
}

fn redirect_response<B: Default>(location: &str) -> Response<B> {
    let mut res = Response::new(B::default());
    *res.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    let value = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    res.headers_mut().insert(header::LOCATION, value);
    res
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RouteAdmissionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();
            let admission = {
                let config = config.read().await;
                admit(
                    &path,
                    req.headers(),
                    &config.cookies,
                    &config.routes,
                    unix_now(),
                )
            };

            match admission {
                Admission::Allowed => {
                    debug!("Admitted {}", path);
                    inner.call(req).await
                }
                Admission::Redirected { location } => {
                    info!("Redirecting {} to {}", path, location);
                    Ok(redirect_response(&location))
                }
            }
        })
    }
}
