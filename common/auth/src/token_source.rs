use std::collections::HashMap;
use std::fmt;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};

/// Where a presented token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    BearerHeader,
    Cookie,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::BearerHeader => "bearer_header",
            TokenSource::Cookie => "cookie",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw credential carriers of one inbound request: the bearer token from the
/// `Authorization` header and the cookie jar.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    bearer: Option<String>,
    cookies: HashMap<String, String>,
}

impl RequestCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers.get(AUTHORIZATION).and_then(parse_bearer);

        let mut cookies = HashMap::new();
        for value in headers.get_all(COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for (name, value) in parse_cookie_header(raw) {
                cookies.entry(name).or_insert(value);
            }
        }

        Self { bearer, cookies }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        self.bearer = (!token.is_empty()).then(|| token.to_string());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Bearer header first, then the named cookie. `None` is the anonymous
    /// case.
    pub fn token(&self, cookie_name: &str) -> Option<(TokenSource, &str)> {
        if let Some(token) = self.bearer() {
            return Some((TokenSource::BearerHeader, token));
        }
        self.cookie(cookie_name)
            .map(|token| (TokenSource::Cookie, token))
    }
}

/// Returns the token of a `Bearer` authorization header. Other schemes and
/// empty tokens yield `None` so the cookie fallback can still apply.
fn parse_bearer(value: &HeaderValue) -> Option<String> {
    let raw = value.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token.to_owned())
}

fn parse_cookie_header(raw: &str) -> impl Iterator<Item = (String, String)> + '_ {
    raw.split(';').filter_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = value.trim().trim_matches('"');
        Some((key.to_string(), value.to_string()))
    })
}
