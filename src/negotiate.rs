//! Response format and effective HTTP method of a request.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;
use crate::method::Method;
use crate::request::RouteRequest;

/// Header that overrides the request method, for clients stuck with GET/POST.
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Query parameter that overrides the request method.
pub const METHOD_OVERRIDE_QUERY: &str = "__apiRouteMethod";

/// A response format a route can produce.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Formats in lookup order. The first one is the fallback.
    pub const ALL: [Format; 2] = [Format::Json, Format::Xml];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml  => "xml",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml  => "application/xml",
        }
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "xml"  => Ok(Self::Xml),
            _      => Err(ConfigError::UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed format wins. Otherwise the first format whose MIME type appears in
/// `accept` is picked, falling back to JSON.
pub fn resolve_format(fixed: Option<Format>, accept: Option<&str>) -> Format {
    if let Some(format) = fixed {
        return format;
    }

    accept
        .and_then(|accept| Format::ALL.into_iter().find(|f| accept.contains(f.mime())))
        .unwrap_or(Format::ALL[0])
}

/// The method a request is treated as, uppercased.
///
/// 1. A non-empty `X-HTTP-Method-Override` header.
/// 2. The `__apiRouteMethod` query parameter, if it names a known method.
/// 3. The request method itself.
///
/// The result may name a method no route knows; such a request never matches.
pub fn resolve_method(req: &RouteRequest) -> String {
    if let Some(method) = req.header(METHOD_OVERRIDE_HEADER).filter(|m| !m.is_empty()) {
        return method.to_ascii_uppercase();
    }

    if let Some(method) = req.query_param(METHOD_OVERRIDE_QUERY) {
        let method = method.to_ascii_uppercase();
        if method.parse::<Method>().is_ok() {
            return method;
        }
    }

    req.method().to_ascii_uppercase()
}
