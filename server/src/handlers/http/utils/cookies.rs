use std::collections::HashMap;

use hyper::Response;
use hyper::header::{self, HeaderMap, HeaderValue};
use tracing::error;

use shared::auth::CookieJar;

use crate::handlers::http::utils::headers::{create_session_cookie, delete_cookie, parse_cookies};

/// The cookies of one request, seen through the session's `CookieJar`
/// seam. Changes are queued as `Set-Cookie` headers for the response.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    values: HashMap<String, String>,
    pending: Vec<HeaderValue>,
}

impl RequestCookies {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            values: parse_cookies(headers),
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> &[HeaderValue] {
        &self.pending
    }

    /// Append every queued `Set-Cookie` to the response.
    pub fn apply<T>(&self, res: &mut Response<T>) {
        for value in &self.pending {
            res.headers_mut().append(header::SET_COOKIE, value.clone());
        }
    }
}

impl CookieJar for RequestCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        match create_session_cookie(name, value, true) {
            Ok(header) => {
                self.values.insert(name.to_string(), value.to_string());
                self.pending.push(header);
            }
            Err(e) => error!("Cannot set cookie {}: {}", name, e),
        }
    }

    fn remove(&mut self, name: &str) {
        self.values.remove(name);
        match delete_cookie(name) {
            Ok(header) => self.pending.push(header),
            Err(e) => error!("Cannot delete cookie {}: {}", name, e),
        }
    }
}
