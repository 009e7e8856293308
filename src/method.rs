//! HTTP methods understood by API routes, and the per-route action table.
//!
//! A REST route knows seven verbs. Each one may carry an application-level
//! action name (`GET` → `read`, …) or be left unset, which means "this verb is
//! not allowed on this route". A request with an unset verb simply does not
//! match; it is indistinguishable from a path that does not fit.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// An HTTP method that can carry an action.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Post,
    Get,
    Put,
    Delete,
    Options,
    Patch,
    Head,
}

impl Method {
    /// Every method, in canonical order.
    pub const ALL: [Method; 7] = [
        Method::Post,
        Method::Get,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Patch,
        Method::Head,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post    => "POST",
            Self::Get     => "GET",
            Self::Put     => "PUT",
            Self::Delete  => "DELETE",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Head    => "HEAD",
        }
    }

    /// The action a route assigns to this method unless told otherwise.
    pub fn default_action(self) -> &'static str {
        match self {
            Self::Post    => "create",
            Self::Get     => "read",
            Self::Put     => "update",
            Self::Delete  => "delete",
            Self::Options => "options",
            Self::Patch   => "patch",
            Self::Head    => "head",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive.
impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST"    => Ok(Self::Post),
            "GET"     => Ok(Self::Get),
            "PUT"     => Ok(Self::Put),
            "DELETE"  => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "HEAD"    => Ok(Self::Head),
            _         => Err(ConfigError::UnknownMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ActionTable ───────────────────────────────────────────────────────────────

/// Method → action mapping of a single route.
///
/// Every [`Method`] has a slot; a slot holding `None` means the method is not
/// allowed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionTable {
    actions: [Option<String>; 7],
}

impl ActionTable {
    /// A table with no method allowed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `POST → create`, `GET → read`, `PUT → update`, `DELETE → delete`,
    /// `OPTIONS → options`, `PATCH → patch`, `HEAD → head`.
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        for method in Method::ALL {
            table.insert(method, method.default_action());
        }
        table
    }

    /// Builds an explicit table. Methods not listed stay unset.
    pub fn from_pairs<I, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Method, A)>,
        A: Into<String>,
    {
        let mut table = Self::empty();
        for (method, action) in pairs {
            table.insert(method, action);
        }
        table
    }

    pub fn insert(&mut self, method: Method, action: impl Into<String>) {
        self.actions[method.index()] = Some(action.into());
    }

    /// Assigns `action` to a method.
    ///
    /// With `method` given, it must name one of the seven methods (any case);
    /// otherwise the call is ignored. Without it, the method whose default
    /// action is `action` is used; if there is none, the call is ignored.
    pub fn set_action(&mut self, action: &str, method: Option<&str>) {
        let target = match method {
            Some(name) => name.to_ascii_uppercase().parse::<Method>().ok(),
            None => Method::ALL.into_iter().find(|m| m.default_action() == action),
        };

        if let Some(method) = target {
            self.insert(method, action);
        }
    }

    /// The action configured for `method`, if the method is allowed.
    pub fn action(&self, method: Method) -> Option<&str> {
        self.actions[method.index()].as_deref()
    }

    /// Whether any method maps to `action`.
    pub fn contains_action(&self, action: &str) -> bool {
        self.iter().any(|(_, a)| a == action)
    }

    /// Allowed methods, in canonical order.
    pub fn methods(&self) -> Vec<Method> {
        self.iter().map(|(m, _)| m).collect()
    }

    /// Allowed `(method, action)` pairs, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Method, &str)> {
        Method::ALL
            .into_iter()
            .filter_map(|m| self.action(m).map(|a| (m, a)))
    }
}
