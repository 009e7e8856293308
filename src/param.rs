//! Placeholder constraints and ordered parameter maps.

use serde::Serialize;

/// The keys a parameter spec may carry.
pub const INFO_KEYS: [&str; 4] = ["requirement", "type", "description", "default"];

/// Sub-pattern used for a placeholder without an explicit requirement.
pub(crate) const DEFAULT_REQUIREMENT: &str = r"\w+";

/// Constraint metadata for one `<name>` placeholder.
///
/// Only `requirement` and the *presence* of `default` affect matching. `kind`
/// and `description` are carried for documentation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ParameterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requirement(mut self, pattern: impl Into<String>) -> Self {
        self.requirement = Some(pattern.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The pattern placed inside the placeholder's capture group.
    pub fn pattern(&self) -> &str {
        self.requirement.as_deref().unwrap_or(DEFAULT_REQUIREMENT)
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Insertion-ordered `name → value` map.
///
/// A `None` value is a parameter that is known but empty: an optional
/// placeholder that did not take part in the match, or a null handed to the
/// URL builder. Re-inserting a name overwrites it in place.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, Option<String>)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Value of `name`; `None` when absent *or* empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
