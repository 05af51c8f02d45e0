//! Transform argument lists.
//!
//! Arguments are addressed by a `(namespace, name)` pair and carry any JSON
//! value. The list keeps insertion order, and merging two lists is a
//! last-writer-wins union so caller-supplied arguments override cached
//! defaults.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single named transform argument.
///
/// The namespace may be empty for arguments addressed by bare name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    pub value: Value,
}

/// Ordered `(namespace, name) -> value` mapping passed to a transform.
///
/// # Example
///
/// ```
/// use remap::ArgumentList;
/// use serde_json::json;
///
/// let defaults = ArgumentList::new()
///     .with_argument("", "a", json!(1))
///     .with_argument("", "b", json!(2));
/// let overrides = ArgumentList::new()
///     .with_argument("", "b", json!(3))
///     .with_argument("", "c", json!(4));
///
/// let merged = defaults.union(&overrides);
/// assert_eq!(merged.get("", "a"), Some(&json!(1)));
/// assert_eq!(merged.get("", "b"), Some(&json!(3)));
/// assert_eq!(merged.get("", "c"), Some(&json!(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentList {
    entries: IndexMap<(String, String), Value>,
}

impl ArgumentList {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style argument assignment.
    pub fn with_argument(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: Value,
    ) -> Self {
        self.set(namespace, name, value);
        self
    }

    /// Set an argument, replacing any existing value under the same key.
    pub fn set(&mut self, namespace: impl Into<String>, name: impl Into<String>, value: Value) {
        self.entries
            .insert((namespace.into(), name.into()), value);
    }

    /// Look an argument up by namespace and name.
    pub fn get(&self, namespace: &str, name: &str) -> Option<&Value> {
        self.entries
            .get(&(namespace.to_string(), name.to_string()))
    }

    /// Union this list with `overrides`; `overrides` wins on key collision.
    ///
    /// Entries keep the position of their first insertion, so defaults stay
    /// in declaration order even when overridden.
    pub fn union(&self, overrides: &ArgumentList) -> ArgumentList {
        let mut merged = self.clone();
        for ((namespace, name), value) in &overrides.entries {
            merged
                .entries
                .insert((namespace.clone(), name.clone()), value.clone());
        }
        merged
    }

    /// Iterate over `((namespace, name), value)` entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Argument> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        let mut list = ArgumentList::new();
        for argument in iter {
            list.set(argument.namespace, argument.name, argument.value);
        }
        list
    }
}

impl From<&[Argument]> for ArgumentList {
    fn from(arguments: &[Argument]) -> Self {
        arguments.iter().cloned().collect()
    }
}
