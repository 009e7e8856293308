//! Route masks and the mask compiler.
//!
//! A mask is a URL template:
//!
//! ```text
//! /users/<id>[/<l>-<r>]
//! ^^^^^^^ literal
//!        ^^^^ placeholder, captured into `id`
//!            ^^^^^^^^^^ optional segment, may nest
//! ```
//!
//! Compilation happens once, when the route is built. Each placeholder becomes
//! a named capture group, each optional segment a non-capturing `(?:…)?`
//! group, and every other character is copied into the pattern unchanged.
//! Named groups mean captured values are looked up by placeholder name, so
//! neither optional segments nor user requirements can shift them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::error::ConfigError;
use crate::param::ParameterSpec;

/// `<name>` token, or an optional-segment bracket.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z0-9_]+)>|\[|\]").expect("valid token regex"));

/// A `<name>` token.
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z0-9_]+)>").expect("valid placeholder regex"));

/// An optional segment containing no other optional segment.
pub(crate) static INNERMOST_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]").expect("valid segment regex"));

/// Group names are prefixed so any placeholder name is a valid group name.
const GROUP_PREFIX: &str = "ph_";

// ── Mask ──────────────────────────────────────────────────────────────────────

/// A validated route mask: non-empty, with balanced `[` `]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mask(String);

impl Mask {
    pub fn new(mask: impl Into<String>) -> Result<Self, ConfigError> {
        let mask = mask.into();
        if mask.is_empty() {
            return Err(ConfigError::EmptyMask);
        }

        let mut depth = 0usize;
        for c in mask.chars() {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| ConfigError::UnbalancedBrackets { mask: mask.clone() })?;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(ConfigError::UnbalancedBrackets { mask });
        }

        Ok(Self(mask))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `<name>` occurs literally in the mask.
    pub fn contains_placeholder(&self, name: &str) -> bool {
        self.0.contains(&format!("<{name}>"))
    }

    /// Every placeholder, in mask order.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholders_in(&self.0)
    }

    /// Placeholders outside every optional segment, in mask order.
    ///
    /// Innermost `[…]` groups are stripped repeatedly until none remain;
    /// whatever placeholders survive are required.
    pub fn required_placeholders(&self) -> Vec<String> {
        let stripped = strip_segments(&self.0, |_| String::new());
        placeholders_in(&stripped)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Turns the mask into an anchored pattern.
    ///
    /// Placeholders without a spec use the default requirement. A placeholder
    /// whose spec declares a default value gets an optional group.
    pub fn compile(
        &self,
        specs: &BTreeMap<String, ParameterSpec>,
    ) -> Result<CompiledPattern, ConfigError> {
        let fallback = ParameterSpec::default();
        let mut pattern = String::with_capacity(self.0.len() * 2);
        let mut placeholders: Vec<String> = Vec::new();
        let mut last = 0;

        pattern.push('^');
        for caps in TOKEN.captures_iter(&self.0) {
            let Some(token) = caps.get(0) else { continue };
            pattern.push_str(&self.0[last..token.start()]);
            last = token.end();

            match token.as_str() {
                "[" => pattern.push_str("(?:"),
                "]" => pattern.push_str(")?"),
                _ => {
                    let name = &caps[1];
                    if placeholders.iter().any(|p| p == name) {
                        return Err(ConfigError::DuplicatePlaceholder { name: name.to_owned() });
                    }

                    let spec = specs.get(name).unwrap_or(&fallback);
                    pattern.push_str(&format!(
                        "(?P<{GROUP_PREFIX}{name}>{})",
                        non_capturing(spec.pattern())
                    ));
                    if spec.has_default() {
                        pattern.push('?');
                    }
                    placeholders.push(name.to_owned());
                }
            }
        }
        pattern.push_str(&self.0[last..]);
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
            mask: self.0.clone(),
            source,
        })?;

        trace!(mask = %self, pattern = %regex.as_str(), "route mask compiled");

        Ok(CompiledPattern { regex, placeholders })
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── CompiledPattern ───────────────────────────────────────────────────────────

/// What one capturing group of a compiled pattern stands for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CaptureRole {
    Placeholder(String),
    /// A group that carries no parameter.
    Anonymous,
}

/// The anchored pattern of a mask.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    regex: Regex,
    placeholders: Vec<String>,
}

impl CompiledPattern {
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// One role per capturing group, in group order.
    pub fn roles(&self) -> Vec<CaptureRole> {
        self.regex
            .capture_names()
            .skip(1)
            .map(|name| match name.and_then(|n| n.strip_prefix(GROUP_PREFIX)) {
                Some(placeholder) => CaptureRole::Placeholder(placeholder.to_owned()),
                None => CaptureRole::Anonymous,
            })
            .collect()
    }

    /// Matches `path` and pairs every placeholder with its captured value.
    ///
    /// A placeholder whose group did not participate, or captured nothing,
    /// yields `None`.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, Option<&'p str>)>> {
        let caps = self.regex.captures(path)?;
        let values = self
            .placeholders
            .iter()
            .map(|name| {
                let value = caps
                    .name(&format!("{GROUP_PREFIX}{name}"))
                    .map(|m| m.as_str())
                    .filter(|v| !v.is_empty());
                (name.as_str(), value)
            })
            .collect();
        Some(values)
    }
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn placeholders_in(s: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(s)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Rewrites innermost optional segments with `replace` until none are left.
pub(crate) fn strip_segments(s: &str, mut replace: impl FnMut(&str) -> String) -> String {
    let mut current = s.to_owned();
    while INNERMOST_SEGMENT.is_match(&current) {
        current = INNERMOST_SEGMENT
            .replace_all(&current, |caps: &regex::Captures<'_>| replace(&caps[0]))
            .into_owned();
    }
    current
}

/// Turns every plain `(` of a requirement into `(?:`.
///
/// Escaped parentheses, parentheses inside character classes and groups that
/// already start with `?` are left alone.
fn non_capturing(requirement: &str) -> String {
    let mut out = String::with_capacity(requirement.len() + 8);
    let mut chars = requirement.chars().peekable();
    // character classes nest, e.g. `[a-z&&[^x]]`
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '[' => class_depth += 1,
            ']' if class_depth > 0 => class_depth -= 1,
            '(' if class_depth == 0 && chars.peek() != Some(&'?') => out.push_str("?:"),
            _ => {}
        }
    }
    out
}
