//! Structured field marker
//!
//! A [`StructuredFieldMarker`] carries extra fields for a single log
//! statement. It can be spliced into a JSON record through a [`JsonSink`],
//! rendered as text for plain log output, or serialized with serde as a map.
//! All three paths share the render policy from [`crate::value::render`].

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::MarkerError;
use crate::generator::{JsonGenerator, JsonSink};
use crate::key::FieldKey;
use crate::value::{render, Encode, FieldValue, Rendered, Resolve};

/// Log marker wrapping an ordered set of fields.
///
/// A marker built with [`StructuredFieldMarker::absent`] has no mapping at
/// all and writes nothing.
#[derive(Debug)]
pub struct StructuredFieldMarker<'a> {
    fields: Option<Vec<(FieldKey, FieldValue<'a>)>>,
}

impl<'a> StructuredFieldMarker<'a> {
    /// Marker name reported to logging backends
    pub const NAME: &'static str = "ELIF_FIELD_MARKER";

    /// Create a marker with an empty mapping
    pub fn new() -> Self {
        Self {
            fields: Some(Vec::new()),
        }
    }

    /// Create a marker without a mapping
    pub fn absent() -> Self {
        Self { fields: None }
    }

    /// Create a marker from key/value pairs, keeping their order
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldKey>,
        V: Encode + 'a,
    {
        fields.into_iter().collect()
    }

    /// Create a marker from a mapping that may be missing
    pub fn from_optional<I, K, V>(fields: Option<I>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldKey>,
        V: Encode + 'a,
    {
        match fields {
            Some(fields) => Self::from_fields(fields),
            None => Self::absent(),
        }
    }

    /// Create a marker borrowing the members of a JSON object
    pub fn from_json_object(object: &'a Map<String, Value>) -> Self {
        Self::from_fields(object.iter())
    }

    /// Append a field
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<FieldKey>,
        V: Encode + 'a,
    {
        self.push(key.into(), FieldValue::ready(value));
        self
    }

    /// Append a field whose value is computed when the marker is written
    pub fn with_deferred<K, R>(mut self, key: K, value: R) -> Self
    where
        K: Into<FieldKey>,
        R: Resolve + 'a,
    {
        self.push(key.into(), FieldValue::deferred(value));
        self
    }

    fn push(&mut self, key: FieldKey, value: FieldValue<'a>) {
        self.fields.get_or_insert_with(Vec::new).push((key, value));
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn len(&self) -> usize {
        self.fields.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the marker was built without a mapping
    pub fn is_absent(&self) -> bool {
        self.fields.is_none()
    }

    /// Normalized field names in write order
    pub fn keys(&self) -> Vec<&FieldKey> {
        self.iter().map(|(key, _)| key).collect()
    }

    fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue<'a>)> + '_ {
        self.fields
            .iter()
            .flatten()
            .map(|(key, value)| (key, value))
    }

    /// Write every field into an open JSON object.
    ///
    /// Values that fail to encode are written as their print-form string and
    /// reported with a warning. Only a failing sink aborts the write.
    pub fn write_to<S>(&self, sink: &mut S) -> Result<(), MarkerError>
    where
        S: JsonSink + ?Sized,
    {
        for (key, value) in self.iter() {
            sink.write_field_name(key.name())
                .map_err(|err| MarkerError::sink(key.name(), err))?;

            let written = match render(key, value) {
                Rendered::Json(json) => sink.write_raw_value(&json),
                Rendered::PrintForm(text) => sink.write_string(&text),
            };
            written.map_err(|err| MarkerError::sink(key.name(), err))?;
        }
        Ok(())
    }

    /// Fields as a JSON object body, without the surrounding braces
    pub fn to_json_body(&self) -> Result<String, MarkerError> {
        let mut generator = JsonGenerator::new(Vec::new());
        self.write_to(&mut generator)?;
        Ok(String::from_utf8_lossy(&generator.into_inner()).into_owned())
    }

    /// Fields as JSON values.
    ///
    /// A rendering that cannot be read back as a `Value` (nesting beyond the
    /// parser's depth limit) is replaced by the print-form string with a warning.
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        for (key, value) in self.iter() {
            let field = match render(key, value) {
                Rendered::Json(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                    warn!(field = key.name(), error = %err, "Serialization error");
                    Value::String(value.resolve().print_form())
                }),
                Rendered::PrintForm(text) => Value::String(text),
            };
            fields.insert(key.name().to_string(), field);
        }
        fields
    }
}

impl Default for StructuredFieldMarker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> FromIterator<(K, V)> for StructuredFieldMarker<'a>
where
    K: Into<FieldKey>,
    V: Encode + 'a,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: Some(
                iter.into_iter()
                    .map(|(key, value)| (key.into(), FieldValue::ready(value)))
                    .collect(),
            ),
        }
    }
}

/// Text rendering: `name value, ` per field, separator kept after the last one.
impl fmt::Display for StructuredFieldMarker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            write!(f, "{} {}, ", key.name(), render(key, value).as_str())?;
        }
        Ok(())
    }
}

impl Serialize for StructuredFieldMarker<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            match render(key, value) {
                Rendered::Json(json) => match RawValue::from_string(json) {
                    Ok(raw) => map.serialize_entry(key.name(), &raw)?,
                    Err(err) => {
                        warn!(field = key.name(), error = %err, "Serialization error");
                        map.serialize_entry(key.name(), &value.resolve().print_form())?;
                    }
                },
                Rendered::PrintForm(text) => map.serialize_entry(key.name(), &text)?,
            }
        }
        map.end()
    }
}
