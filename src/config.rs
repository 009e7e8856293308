//! Declarative route configuration (TOML).
//!
//! # Format
//! ```toml
//! [[route]]
//! path = "/users/<id>[/<f>-<b>]"
//! presenter = "Resources:Users"
//! methods = { GET = "read", DELETE = "delete" }
//! format = "json"
//! tags = ["public", { secured = "#e74c3c" }]
//!
//! [route.parameters.id]
//! requirement = "\\d+"
//! type = "integer"
//! ```
//!
//! # Design Decisions
//! - The set of keys is closed. An unknown key fails the whole load with the
//!   key's name, instead of being silently ignored.
//! - Parameter infos must be scalars; they are kept as strings
//! - Loading either yields every route or none

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::method::{ActionTable, Method};
use crate::param::{INFO_KEYS, ParameterSpec};
use crate::route::{Route, RouteBuilder};
use crate::router::RouteList;

const DOCUMENT_KEYS: [&str; 1] = ["route"];

const ROUTE_KEYS: [&str; 13] = [
    "path",
    "presenter",
    "methods",
    "parameters",
    "priority",
    "format",
    "disable",
    "auto_base_path",
    "description",
    "section",
    "tags",
    "example",
    "response_codes",
];

/// One `[[route]]` table, after the key check.
#[derive(Debug, Deserialize)]
struct RouteConfig {
    path: String,
    presenter: String,
    methods: Option<BTreeMap<String, String>>,
    #[serde(default)]
    parameters: BTreeMap<String, toml::Table>,
    #[serde(default)]
    priority: i32,
    format: Option<String>,
    #[serde(default)]
    disable: bool,
    #[serde(default = "enabled")]
    auto_base_path: bool,
    description: Option<String>,
    section: Option<String>,
    tags: Option<toml::Value>,
    example: Option<toml::Value>,
    #[serde(default)]
    response_codes: BTreeMap<String, String>,
}

fn enabled() -> bool {
    true
}

/// Load routes from a TOML file.
pub fn load_routes(path: &Path) -> Result<RouteList, ConfigError> {
    let content = fs::read_to_string(path)?;
    let routes = parse_routes(&content)?;
    debug!(path = %path.display(), routes = routes.len(), "routes loaded");
    Ok(routes)
}

/// Parse routes from TOML source.
pub fn parse_routes(source: &str) -> Result<RouteList, ConfigError> {
    let document: toml::Table = source.parse()?;
    check_keys(document.keys(), &DOCUMENT_KEYS)?;

    let Some(routes) = document.get("route") else {
        return Ok(RouteList::new());
    };
    let toml::Value::Array(routes) = routes else {
        return Err(invalid("route", "expected an array of tables"));
    };

    routes
        .iter()
        .map(|value| match value {
            toml::Value::Table(table) => route_from_table(table.clone()),
            _ => Err(invalid("route", "expected an array of tables")),
        })
        .collect()
}

/// Build a single route from its table.
pub fn route_from_table(table: toml::Table) -> Result<Route, ConfigError> {
    check_keys(table.keys(), &ROUTE_KEYS)?;
    let config: RouteConfig = toml::Value::Table(table).try_into()?;

    let mut builder = Route::builder(&config.path, &config.presenter)
        .priority(config.priority)
        .disable(config.disable)
        .auto_base_path(config.auto_base_path);

    for (name, info) in &config.parameters {
        builder = builder.parameter(name, parameter_spec(info)?);
    }

    if let Some(methods) = &config.methods {
        let mut actions = ActionTable::empty();
        for (method, action) in methods {
            actions.insert(method.to_ascii_uppercase().parse::<Method>()?, action);
        }
        builder = builder.methods(actions);
    }

    if let Some(format) = &config.format {
        builder = builder.format(format.parse()?);
    }
    if let Some(description) = config.description {
        builder = builder.description(description);
    }
    if let Some(section) = config.section {
        builder = builder.section(section);
    }
    if let Some(tags) = &config.tags {
        builder = apply_tags(builder, tags)?;
    }
    if let Some(example) = &config.example {
        let example = serde_json::to_value(example)
            .map_err(|e| invalid("example", &e.to_string()))?;
        builder = builder.example(example);
    }
    for (code, description) in config.response_codes {
        let code: u16 = code
            .parse()
            .map_err(|_| invalid("response_codes", &format!("`{code}` is not a status code")))?;
        builder = builder.response_code(code, description);
    }

    builder.build()
}

fn check_keys<'a>(
    keys: impl IntoIterator<Item = &'a String>,
    known: &[&str],
) -> Result<(), ConfigError> {
    match keys.into_iter().find(|k| !known.contains(&k.as_str())) {
        Some(key) => Err(ConfigError::UnknownProperty { key: key.clone() }),
        None => Ok(()),
    }
}

fn parameter_spec(info: &toml::Table) -> Result<ParameterSpec, ConfigError> {
    let mut spec = ParameterSpec::new();

    for (key, value) in info {
        if !INFO_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::UnknownParameterInfo { key: key.clone() });
        }

        let value = scalar(value)
            .ok_or_else(|| ConfigError::NonScalarParameterInfo { key: key.clone() })?;

        match key.as_str() {
            "requirement" => spec.requirement = Some(value),
            "type"        => spec.kind = Some(value),
            "description" => spec.description = Some(value),
            _             => spec.default = Some(value),
        }
    }

    Ok(spec)
}

/// String form of a scalar; `None` for arrays and tables.
fn scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s)   => Some(s.clone()),
        toml::Value::Integer(i)  => Some(i.to_string()),
        toml::Value::Float(f)    => Some(f.to_string()),
        toml::Value::Boolean(b)  => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Tags are either bare names or `name = colour` tables, freely mixed.
fn apply_tags(mut builder: RouteBuilder, tags: &toml::Value) -> Result<RouteBuilder, ConfigError> {
    let colored = |mut builder: RouteBuilder, table: &toml::Table| {
        for (tag, color) in table {
            let color = color.as_str().ok_or_else(|| invalid("tags", "tag colour must be a string"))?;
            builder = builder.tag_with_color(tag, color);
        }
        Ok::<_, ConfigError>(builder)
    };

    match tags {
        toml::Value::Array(items) => {
            for item in items {
                builder = match item {
                    toml::Value::String(tag) => builder.tag(tag),
                    toml::Value::Table(table) => colored(builder, table)?,
                    _ => return Err(invalid("tags", "expected tag names or tables")),
                };
            }
            Ok(builder)
        }
        toml::Value::Table(table) => colored(builder, table),
        _ => Err(invalid("tags", "expected an array or a table")),
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_owned(), reason: reason.to_owned() }
}
