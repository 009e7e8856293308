//! Error types.
//!
//! Two kinds of failure exist in apiroute, and they never mix:
//!
//! - **Configuration errors** ([`ConfigError`]) surface while routes are being
//!   built or loaded. They are fatal to startup.
//! - **Matching outcomes** are not errors at all. A route that does not fit a
//!   request, or cannot build a URL, returns `None` and the caller moves on to
//!   the next route.

use thiserror::Error;

use crate::param::INFO_KEYS;

/// A route definition that cannot be accepted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("route mask can not be empty")]
    EmptyMask,

    #[error("unbalanced optional segment brackets in mask `{mask}`")]
    UnbalancedBrackets { mask: String },

    #[error("parameter <{name}> is not present in the url mask")]
    UnknownPlaceholder { name: String },

    #[error("placeholder <{name}> occurs more than once in the url mask")]
    DuplicatePlaceholder { name: String },

    #[error("only these parameter informations can be set: [{}] - \"{key}\" given", INFO_KEYS.join(", "))]
    UnknownParameterInfo { key: String },

    #[error("only scalar parameter informations can be set (key [{key}])")]
    NonScalarParameterInfo { key: String },

    #[error("unknown property \"{key}\" on route")]
    UnknownProperty { key: String },

    #[error("unknown http method `{0}`")]
    UnknownMethod(String),

    #[error("unknown response format `{0}`")]
    UnknownFormat(String),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("mask `{mask}` does not compile: {source}")]
    InvalidPattern {
        mask: String,
        #[source]
        source: regex::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The error type returned by the server.
///
/// Application-level outcomes (404 and friends) are HTTP
/// [`Response`](crate::Response) values, not `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
