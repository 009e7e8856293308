//! A single API route: mask, parameters, actions, and the two directions
//! between URLs and destinations.
//!
//! ```text
//! RouteRequest ──match_request──▶ RouteMatch
//!                    Route
//! URL          ◀─construct_url── Destination
//! ```
//!
//! A [`Route`] is built once at startup and never changes afterwards. Its
//! pattern is compiled inside [`RouteBuilder::build`], so a route is plain
//! immutable data that can be shared freely across request tasks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};
use url::form_urlencoded;

use crate::error::ConfigError;
use crate::mask::{CompiledPattern, Mask, PLACEHOLDER, strip_segments};
use crate::method::{ActionTable, Method};
use crate::negotiate::{self, Format};
use crate::param::{ParameterSpec, Params};
use crate::request::{Destination, RouteMatch, RouteRequest};

/// Colour given to tags declared without one.
pub const DEFAULT_TAG_COLOR: &str = "#9b59b6";

/// Callback fired after every successful match.
pub type MatchHook = Arc<dyn Fn(&Route, &RouteMatch) + Send + Sync + 'static>;

// ── Route ─────────────────────────────────────────────────────────────────────

/// One route definition.
///
/// ```rust
/// use apiroute::{Destination, Route, RouteRequest};
///
/// let route = Route::builder("/users/<id>[/<f>-<b>]", "Resources:Users").build().unwrap();
///
/// let m = route.match_request(&RouteRequest::new("GET", "/users/8")).unwrap();
/// assert_eq!(m.action, "read");
/// assert_eq!(m.param("id"), Some("8"));
///
/// let dest = Destination::new("Resources:Users").action("read").param("id", 8);
/// assert_eq!(route.construct_url(&dest, "http://foo.com/").as_deref(), Some("http://foo.com/users/8"));
/// ```
#[derive(Clone)]
pub struct Route {
    mask: Mask,
    presenter: String,
    parameters: BTreeMap<String, ParameterSpec>,
    actions: ActionTable,
    format: Option<Format>,
    priority: i32,
    disabled: bool,
    auto_base_path: bool,
    info: RouteInfo,
    pattern: CompiledPattern,
    required: Vec<String>,
    hooks: Vec<MatchHook>,
}

/// Documentation-only fields.
#[derive(Clone, Debug, Default)]
struct RouteInfo {
    description: Option<String>,
    section: Option<String>,
    example: Option<serde_json::Value>,
    tags: Vec<(String, String)>,
    response_codes: BTreeMap<u16, String>,
}

impl Route {
    /// Starts a route for `mask`, dispatching to `presenter`.
    pub fn builder(mask: impl Into<String>, presenter: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(mask, presenter)
    }

    /// A route with default actions and no parameter specs.
    pub fn new(mask: impl Into<String>, presenter: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder(mask, presenter).build()
    }

    pub fn mask(&self) -> &Mask { &self.mask }
    pub fn presenter(&self) -> &str { &self.presenter }
    pub fn parameters(&self) -> &BTreeMap<String, ParameterSpec> { &self.parameters }
    pub fn actions(&self) -> &ActionTable { &self.actions }
    pub fn format(&self) -> Option<Format> { self.format }
    pub fn priority(&self) -> i32 { self.priority }
    pub fn is_disabled(&self) -> bool { self.disabled }
    pub fn auto_base_path(&self) -> bool { self.auto_base_path }
    pub fn pattern(&self) -> &CompiledPattern { &self.pattern }
    pub fn description(&self) -> Option<&str> { self.info.description.as_deref() }
    pub fn section(&self) -> Option<&str> { self.info.section.as_deref() }
    pub fn example(&self) -> Option<&serde_json::Value> { self.info.example.as_ref() }
    pub fn response_codes(&self) -> &BTreeMap<u16, String> { &self.info.response_codes }

    /// `(tag, colour)` pairs in declaration order.
    pub fn tags(&self) -> &[(String, String)] {
        &self.info.tags
    }

    /// Methods that have an action on this route.
    pub fn methods(&self) -> Vec<Method> {
        self.actions.methods()
    }

    /// Every placeholder of the mask, in order.
    pub fn placeholder_parameters(&self) -> Vec<&str> {
        self.mask.placeholders()
    }

    /// Placeholders that must be present for the route to match.
    pub fn required_parameters(&self) -> &[String] {
        &self.required
    }

    // ── Matching ──────────────────────────────────────────────────────────────

    /// Maps a request onto this route.
    ///
    /// `None` means "try the next route": the route is disabled, the path is
    /// outside the base path or does not fit the mask, the method has no
    /// action here, or a required parameter is empty.
    pub fn match_request(&self, req: &RouteRequest) -> Option<RouteMatch> {
        if self.disabled {
            trace!(mask = %self.mask, "route disabled");
            return None;
        }

        let Some(path) = self.routable_path(req) else {
            trace!(mask = %self.mask, path = req.path(), base = req.base_path(), "outside base path");
            return None;
        };

        let Some(captures) = self.pattern.captures(&path) else {
            trace!(mask = %self.mask, %path, "path does not fit mask");
            return None;
        };

        let format = negotiate::resolve_format(self.format, req.header("accept"));
        let resolved = negotiate::resolve_method(req);
        let Some((method, action)) = resolved
            .parse::<Method>()
            .ok()
            .and_then(|m| self.actions.action(m).map(|a| (m, a)))
        else {
            trace!(mask = %self.mask, method = %resolved, "method not allowed on route");
            return None;
        };

        let mut params: Params = req.query().iter()
            .map(|(k, v)| (k.as_str(), Some(v.clone())))
            .collect();

        for (name, value) in captures {
            if value.is_none() && self.required.iter().any(|r| r == name) {
                trace!(mask = %self.mask, param = name, "required parameter empty");
                return None;
            }
            params.insert(name, value.map(str::to_owned));
        }

        let matched = RouteMatch {
            presenter: self.presenter.clone(),
            method,
            action: action.to_owned(),
            format,
            secure: req.is_secure(),
            body: req.body().clone(),
            files: req.files().to_vec(),
            params,
        };

        debug!(
            mask = %self.mask,
            presenter = %self.presenter,
            method = %method,
            action = %matched.action,
            "route matched"
        );
        for hook in &self.hooks {
            hook(self, &matched);
        }

        Some(matched)
    }

    /// The path the pattern runs against.
    ///
    /// With `auto_base_path`, the request's base path must prefix the path
    /// and is cut off, leaving a single leading `/`.
    fn routable_path(&self, req: &RouteRequest) -> Option<String> {
        if !self.auto_base_path {
            return Some(req.path().to_owned());
        }

        let rest = req.path().strip_prefix(req.base_path())
            .or_else(|| (req.path() == req.base_path().trim_end_matches('/')).then_some(""))?;
        Some(format!("/{rest}"))
    }

    // ── Reverse building ──────────────────────────────────────────────────────

    /// Builds `base_url` + path (+ query) for `dest`.
    ///
    /// Placeholders are filled from the destination's parameters; optional
    /// segments with an unfilled placeholder are dropped. Parameters that fill
    /// no placeholder end up in the query string, in their original order.
    /// `None` when the destination targets another presenter, names an action
    /// this route does not have, or leaves a required placeholder unfilled.
    pub fn construct_url(&self, dest: &Destination, base_url: &str) -> Option<String> {
        if dest.presenter != self.presenter {
            return None;
        }

        let action = dest.action.as_deref()?;
        if !self.actions.contains_action(action) {
            return None;
        }

        let value_of = |name: &str| {
            dest.params.iter().find(|(n, _)| *n == name).and_then(|(_, v)| v)
        };

        // Segments are resolved on the mask alone; values are inserted last
        // and never rescanned.
        let skeleton = strip_segments(self.mask.as_str().trim_start_matches('/'), |segment| {
            if PLACEHOLDER.captures_iter(segment).any(|caps| value_of(&caps[1]).is_none()) {
                String::new()
            } else {
                segment[1..segment.len() - 1].to_owned()
            }
        });

        if PLACEHOLDER.captures_iter(&skeleton).any(|caps| value_of(&caps[1]).is_none()) {
            trace!(mask = %self.mask, "required placeholder not supplied");
            return None;
        }

        let skeleton: String = skeleton.chars().filter(|c| *c != '[' && *c != ']').collect();
        let path = PLACEHOLDER.replace_all(&skeleton, |caps: &regex::Captures<'_>| {
            value_of(&caps[1]).unwrap_or_default().to_owned()
        });

        let mut pending = dest.params.clone();
        for name in self.mask.placeholders() {
            if value_of(name).is_some() {
                pending.remove(name);
            }
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in pending.iter() {
            if let Some(value) = value {
                query.append_pair(name, value);
            }
        }
        let query = query.finish();

        let mut url = String::with_capacity(base_url.len() + path.len() + query.len() + 2);
        url.push_str(base_url);
        if !base_url.ends_with('/') {
            url.push('/');
        }
        url.push_str(&path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Some(url)
    }

    // ── Description ───────────────────────────────────────────────────────────

    /// A serialisable summary of the route, for API documentation.
    pub fn describe(&self) -> RouteDescription<'_> {
        RouteDescription {
            format: self.format,
            path: self.mask.as_str(),
            description: self.description(),
            methods: self.methods().into_iter().map(Method::as_str).collect(),
            parameters: &self.parameters,
            section: self.section(),
            tags: self.info.tags.iter().map(|(t, c)| (t.as_str(), c.as_str())).collect(),
            example: self.example(),
            response_codes: &self.info.response_codes,
            priority: self.priority,
            disabled: self.disabled,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("mask", &self.mask)
            .field("presenter", &self.presenter)
            .field("parameters", &self.parameters)
            .field("actions", &self.actions)
            .field("format", &self.format)
            .field("priority", &self.priority)
            .field("disabled", &self.disabled)
            .field("auto_base_path", &self.auto_base_path)
            .field("pattern", &self.pattern.as_str())
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// See [`Route::describe`].
#[derive(Debug, Serialize)]
pub struct RouteDescription<'a> {
    pub format: Option<Format>,
    pub path: &'a str,
    pub description: Option<&'a str>,
    pub methods: Vec<&'static str>,
    pub parameters: &'a BTreeMap<String, ParameterSpec>,
    pub section: Option<&'a str>,
    pub tags: BTreeMap<&'a str, &'a str>,
    pub example: Option<&'a serde_json::Value>,
    pub response_codes: &'a BTreeMap<u16, String>,
    pub priority: i32,
    pub disabled: bool,
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Route`]. Validation happens in [`build`](Self::build).
pub struct RouteBuilder {
    mask: String,
    presenter: String,
    parameters: BTreeMap<String, ParameterSpec>,
    actions: ActionTable,
    format: Option<Format>,
    priority: i32,
    disabled: bool,
    auto_base_path: bool,
    info: RouteInfo,
    hooks: Vec<MatchHook>,
}

impl RouteBuilder {
    pub fn new(mask: impl Into<String>, presenter: impl Into<String>) -> Self {
        Self {
            mask: mask.into(),
            presenter: presenter.into(),
            parameters: BTreeMap::new(),
            actions: ActionTable::with_defaults(),
            format: None,
            priority: 0,
            disabled: false,
            auto_base_path: true,
            info: RouteInfo::default(),
            hooks: Vec::new(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    /// Replaces the default actions with an explicit table.
    pub fn methods(mut self, actions: ActionTable) -> Self {
        self.actions = actions;
        self
    }

    /// See [`ActionTable::set_action`].
    pub fn set_action(mut self, action: &str, method: Option<&str>) -> Self {
        self.actions.set_action(action, method);
        self
    }

    /// Fixes the response format instead of negotiating it from `Accept`.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn disable(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Whether the request's base path is cut off before matching. On by default.
    pub fn auto_base_path(mut self, enabled: bool) -> Self {
        self.auto_base_path = enabled;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.info.section = Some(section.into());
        self
    }

    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.info.example = Some(example);
        self
    }

    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.tag_with_color(tag, DEFAULT_TAG_COLOR)
    }

    pub fn tag_with_color(mut self, tag: impl Into<String>, color: impl Into<String>) -> Self {
        self.info.tags.push((tag.into(), color.into()));
        self
    }

    pub fn response_code(mut self, code: u16, description: impl Into<String>) -> Self {
        self.info.response_codes.insert(code, description.into());
        self
    }

    /// Registers a callback fired after every successful match.
    pub fn on_match<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Route, &RouteMatch) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Validates the definition and compiles its mask.
    pub fn build(self) -> Result<Route, ConfigError> {
        let mask = Mask::new(self.mask)?;

        if let Some(name) = self.parameters.keys().find(|name| !mask.contains_placeholder(name)) {
            return Err(ConfigError::UnknownPlaceholder { name: name.clone() });
        }

        let pattern = mask.compile(&self.parameters)?;
        let required = mask.required_placeholders();

        Ok(Route {
            mask,
            presenter: self.presenter,
            parameters: self.parameters,
            actions: self.actions,
            format: self.format,
            priority: self.priority,
            disabled: self.disabled,
            auto_base_path: self.auto_base_path,
            info: self.info,
            pattern,
            required,
            hooks: self.hooks,
        })
    }
}
