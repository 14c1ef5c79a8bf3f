//! Streaming JSON object writer
//!
//! Markers never open or close the enclosing object. They receive a
//! [`JsonSink`] that is already positioned inside one and append fields.

use std::io::{self, Write};

/// Destination for the fields of a JSON object
pub trait JsonSink {
    /// Write a field name; the next call must write its value
    fn write_field_name(&mut self, name: &str) -> io::Result<()>;

    /// Write pre-serialized JSON text as the pending field's value
    fn write_raw_value(&mut self, raw: &str) -> io::Result<()>;

    /// Write a string as the pending field's value
    fn write_string(&mut self, value: &str) -> io::Result<()>;
}

/// [`JsonSink`] over any `io::Write`.
///
/// Separators between fields are inserted automatically. Names and string
/// values are escaped with `serde_json`; raw values are written verbatim.
#[derive(Debug)]
pub struct JsonGenerator<W: Write> {
    writer: W,
    fields_written: usize,
    pending_value: bool,
}

impl<W: Write> JsonGenerator<W> {
    /// Create a generator positioned just after an opening brace
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fields_written: 0,
            pending_value: false,
        }
    }

    /// Create a generator for an object that already holds `fields` fields
    pub fn continuing(writer: W, fields: usize) -> Self {
        Self {
            writer,
            fields_written: fields,
            pending_value: false,
        }
    }

    /// Write the opening brace and reset the field count
    pub fn begin_object(&mut self) -> io::Result<()> {
        self.writer.write_all(b"{")?;
        self.fields_written = 0;
        self.pending_value = false;
        Ok(())
    }

    /// Write the closing brace
    pub fn end_object(&mut self) -> io::Result<()> {
        if self.pending_value {
            return Err(missing_value());
        }
        self.writer.write_all(b"}")
    }

    pub fn fields_written(&self) -> usize {
        self.fields_written
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn begin_value(&mut self) -> io::Result<()> {
        if !self.pending_value {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "JSON value written without a field name",
            ));
        }
        self.pending_value = false;
        self.fields_written += 1;
        Ok(())
    }
}

impl<W: Write> JsonSink for JsonGenerator<W> {
    fn write_field_name(&mut self, name: &str) -> io::Result<()> {
        if self.pending_value {
            return Err(missing_value());
        }
        if self.fields_written > 0 {
            self.writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.writer, name)?;
        self.writer.write_all(b":")?;
        self.pending_value = true;
        Ok(())
    }

    fn write_raw_value(&mut self, raw: &str) -> io::Result<()> {
        self.begin_value()?;
        self.writer.write_all(raw.as_bytes())
    }

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.begin_value()?;
        serde_json::to_writer(&mut self.writer, value)?;
        Ok(())
    }
}

fn missing_value() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "JSON field name written without a value",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(generator: JsonGenerator<Vec<u8>>) -> String {
        String::from_utf8(generator.into_inner()).unwrap()
    }

    #[test]
    fn test_fields_are_comma_separated() {
        let mut generator = JsonGenerator::new(Vec::new());
        generator.write_field_name("user").unwrap();
        generator.write_string("alice").unwrap();
        generator.write_field_name("count").unwrap();
        generator.write_raw_value("3").unwrap();

        assert_eq!(generator.fields_written(), 2);
        assert_eq!(written(generator), r#""user":"alice","count":3"#);
    }

    #[test]
    fn test_names_and_strings_are_escaped() {
        let mut generator = JsonGenerator::new(Vec::new());
        generator.write_field_name("say \"hi\"").unwrap();
        generator.write_string("line\nbreak").unwrap();

        assert_eq!(written(generator), r#""say \"hi\"":"line\nbreak""#);
    }

    #[test]
    fn test_full_object() {
        let mut generator = JsonGenerator::new(Vec::new());
        generator.begin_object().unwrap();
        generator.write_field_name("ok").unwrap();
        generator.write_raw_value("true").unwrap();
        generator.end_object().unwrap();

        let output = written(generator);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["ok"], true);
    }

    #[test]
    fn test_continuing_object_starts_with_separator() {
        let mut generator = JsonGenerator::continuing(Vec::new(), 1);
        generator.write_field_name("extra").unwrap();
        generator.write_raw_value("null").unwrap();

        assert_eq!(written(generator), r#","extra":null"#);
    }

    #[test]
    fn test_value_without_name_is_rejected() {
        let mut generator = JsonGenerator::new(Vec::new());
        let err = generator.write_raw_value("1").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        generator.write_field_name("a").unwrap();
        assert!(generator.write_field_name("b").is_err());
        assert!(generator.end_object().is_err());
    }
}
