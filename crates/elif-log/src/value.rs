//! Field values and the per-value encoding policy
//!
//! Every value goes through the same steps: deferred references are forced,
//! the concrete value is encoded with `serde_json`, and if that fails a
//! warning is logged and the value's print-form (its `Debug` rendering) is
//! used instead.

use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;

use crate::key::FieldKey;

/// A value that can be written into a log field.
///
/// Implemented for everything that is both `Serialize` and `Debug`.
pub trait Encode {
    /// Encode the value as JSON text
    fn to_json(&self) -> serde_json::Result<String>;

    /// Canonical literal rendering used when JSON encoding fails
    fn print_form(&self) -> String;
}

impl<T> Encode for T
where
    T: Serialize + fmt::Debug + ?Sized,
{
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn print_form(&self) -> String {
        format!("{:?}", self)
    }
}

/// A deferred reference that must be forced before its value can be encoded.
///
/// Forcing must be idempotent: repeated calls return the same value and the
/// underlying computation runs at most once.
pub trait Resolve {
    fn resolve(&self) -> &dyn Encode;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self) -> &dyn Encode {
        (**self).resolve()
    }
}

impl<T, F> Resolve for Lazy<T, F>
where
    T: Encode,
    F: FnOnce() -> T,
{
    fn resolve(&self) -> &dyn Encode {
        let value: &T = Lazy::force(self);
        value
    }
}

/// Lazily computed field value
pub struct Deferred<T, F = fn() -> T> {
    cell: Lazy<T, F>,
}

impl<T, F> Deferred<T, F>
where
    F: FnOnce() -> T,
{
    pub fn new(init: F) -> Self {
        Self {
            cell: Lazy::new(init),
        }
    }

    /// Compute the value on first use and return it
    pub fn force(&self) -> &T {
        Lazy::force(&self.cell)
    }

    pub fn is_resolved(&self) -> bool {
        Lazy::get(&self.cell).is_some()
    }
}

impl<T, F> Resolve for Deferred<T, F>
where
    T: Encode,
    F: FnOnce() -> T,
{
    fn resolve(&self) -> &dyn Encode {
        self.force()
    }
}

impl<T, F> fmt::Debug for Deferred<T, F>
where
    T: fmt::Debug,
    F: FnOnce() -> T,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Lazy::get(&self.cell) {
            Some(value) => f.debug_tuple("Deferred").field(value).finish(),
            None => f.write_str("Deferred(<unresolved>)"),
        }
    }
}

/// A value held by a marker, either ready to encode or deferred
pub enum FieldValue<'a> {
    Ready(Box<dyn Encode + 'a>),
    Deferred(Box<dyn Resolve + 'a>),
}

impl<'a> FieldValue<'a> {
    pub fn ready<V: Encode + 'a>(value: V) -> Self {
        Self::Ready(Box::new(value))
    }

    pub fn deferred<R: Resolve + 'a>(value: R) -> Self {
        Self::Deferred(Box::new(value))
    }

    /// Concrete value, forcing a deferred reference if needed
    pub fn resolve(&self) -> &dyn Encode {
        match self {
            Self::Ready(value) => value.as_ref(),
            Self::Deferred(value) => value.resolve(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => write!(f, "Ready({})", value.print_form()),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Outcome of rendering one field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Pre-serialized JSON text
    Json(String),
    /// Print-form text, used after a JSON encoding failure
    PrintForm(String),
}

impl Rendered {
    /// Rendered text without any additional quoting
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json(text) | Self::PrintForm(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::PrintForm(_))
    }
}

/// Render a field value as JSON, falling back to its print-form.
///
/// Encoding errors are logged at WARN and never returned.
pub fn render(key: &FieldKey, value: &FieldValue<'_>) -> Rendered {
    let value = value.resolve();
    match value.to_json() {
        Ok(json) => Rendered::Json(json),
        Err(err) => {
            warn!(field = key.name(), error = %err, "Serialization error");
            Rendered::PrintForm(value.print_form())
        }
    }
}
