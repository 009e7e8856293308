//! Request facts going into a route, and what comes out of it.

use bytes::Bytes;
use url::form_urlencoded;

use crate::method::Method;
use crate::negotiate::Format;
use crate::param::Params;

// ── RouteRequest ──────────────────────────────────────────────────────────────

/// The parts of an incoming HTTP request a route looks at.
#[derive(Clone, Debug)]
pub struct RouteRequest {
    method: String,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Bytes,
    files: Vec<UploadedFile>,
    secure: bool,
    base_path: String,
}

impl RouteRequest {
    /// A request for `uri` (path plus optional `?query`), deployed at `/`.
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };

        Self {
            method: method.into(),
            path: path.to_owned(),
            query: parse_query(query),
            headers: Vec::new(),
            body: Bytes::new(),
            files: Vec::new(),
            secure: false,
            base_path: "/".to_owned(),
        }
    }

    /// Collects the request facts from an HTTP request head.
    ///
    /// TLS is terminated in front of us, so the request counts as secure when
    /// the URI says `https` or the proxy sets `X-Forwarded-Proto: https`.
    pub fn from_parts(parts: &http::request::Parts, body: Bytes) -> Self {
        let headers: Vec<(String, String)> = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();

        let mut req = Self::new(parts.method.as_str(), "");
        req.path = parts.uri.path().to_owned();
        req.query = parse_query(parts.uri.query().unwrap_or(""));
        req.headers = headers;
        req.body = body;
        req.secure = parts.uri.scheme_str() == Some("https")
            || req.header("x-forwarded-proto").is_some_and(|p| p.eq_ignore_ascii_case("https"));
        req
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// URL prefix the application is deployed under. Always ends with `/`.
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> &[(String, String)] { &self.query }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn files(&self) -> &[UploadedFile] { &self.files }
    pub fn is_secure(&self) -> bool { self.secure }
    pub fn base_path(&self) -> &str { &self.base_path }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Last value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}

/// A file uploaded with the request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

// ── RouteMatch ────────────────────────────────────────────────────────────────

/// The outcome of a successful match.
///
/// `params` holds the query parameters first, then the placeholders in mask
/// order; a placeholder overwrites a query parameter of the same name.
#[derive(Clone, Debug)]
pub struct RouteMatch {
    pub presenter: String,
    pub method: Method,
    pub action: String,
    pub format: Format,
    pub secure: bool,
    pub body: Bytes,
    pub files: Vec<UploadedFile>,
    pub params: Params,
}

impl RouteMatch {
    /// Returns a parameter value; `None` when absent or empty.
    ///
    /// For a route `/users/<id>`, `m.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// A destination pointing back at the matched route with the same
    /// parameters.
    pub fn destination(&self) -> Destination {
        Destination {
            presenter: self.presenter.clone(),
            action: Some(self.action.clone()),
            params: self.params.clone(),
        }
    }
}

// ── Destination ───────────────────────────────────────────────────────────────

/// What a URL should be built for: a target, an action and parameters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Destination {
    pub presenter: String,
    pub action: Option<String>,
    pub params: Params,
}

impl Destination {
    pub fn new(presenter: impl Into<String>) -> Self {
        Self { presenter: presenter.into(), ..Self::default() }
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name, Some(value.to_string()));
        self
    }

    /// A parameter explicitly set to null.
    pub fn null_param(mut self, name: impl Into<String>) -> Self {
        self.params.insert(name, None);
        self
    }
}
