//! Field name normalization

use std::fmt;

/// A normalized log field name.
///
/// Qualified keys of the form `namespace/name` are reduced to `name`. Only
/// the first `/` separates the namespace, so `a/b/c` becomes `b/c`. Either
/// side may be empty; a lone `/` is kept as the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    namespace: Option<String>,
    name: String,
}

impl FieldKey {
    /// Parse a raw key into its field name
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('/') {
            Some((namespace, name)) if raw != "/" => Self {
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            },
            _ => Self {
                namespace: None,
                name: raw.to_string(),
            },
        }
    }

    /// Name written into the JSON record
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace stripped during normalization, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl From<&str> for FieldKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for FieldKey {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&String> for FieldKey {
    fn from(raw: &String) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
