//! Structured log records carrying marker fields

use std::io::Write;

use serde_json::{json, Value};
use tracing::Level;

use crate::error::MarkerError;
use crate::generator::{JsonGenerator, JsonSink};
use crate::marker::StructuredFieldMarker;

/// Field name reported when the enclosing record itself cannot be written
const RECORD: &str = "<record>";

/// Create a structured log entry with the marker's fields merged in
pub fn log_entry(level: Level, message: &str, marker: &StructuredFieldMarker<'_>) -> Value {
    let mut entry = json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "message": message
    });

    if let Value::Object(entry_map) = &mut entry {
        entry_map.extend(marker.to_json_map());
    }

    entry
}

/// Write one JSON log line with the standard keys followed by the marker's fields
pub fn write_record<W: Write>(
    writer: W,
    level: Level,
    target: &str,
    message: &str,
    marker: &StructuredFieldMarker<'_>,
) -> Result<W, MarkerError> {
    let mut generator = JsonGenerator::new(writer);
    generator
        .begin_object()
        .map_err(|err| MarkerError::sink(RECORD, err))?;

    let timestamp = chrono::Utc::now().to_rfc3339();
    let standard = [
        ("timestamp", timestamp.as_str()),
        ("level", level.as_str()),
        ("target", target),
        ("message", message),
    ];
    for (name, value) in standard {
        generator
            .write_field_name(name)
            .and_then(|_| generator.write_string(value))
            .map_err(|err| MarkerError::sink(name, err))?;
    }

    marker.write_to(&mut generator)?;

    generator
        .end_object()
        .map_err(|err| MarkerError::sink(RECORD, err))?;

    let mut writer = generator.into_inner();
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|err| MarkerError::sink(RECORD, err))?;
    Ok(writer)
}
