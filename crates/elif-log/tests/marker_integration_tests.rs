//! Integration tests for marker output in JSON and text mode

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::thread;

use elif_log::{
    log_entry, write_record, Deferred, JsonGenerator, JsonSink, MarkerError,
    StructuredFieldMarker,
};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tracing::Level;

#[derive(Debug)]
struct Connection(&'static str);

impl Serialize for Connection {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("connections are not serializable"))
    }
}

/// Writer that fails once `limit` bytes have been accepted
struct LimitedWriter {
    buf: Vec<u8>,
    limit: usize,
}

impl Write for LimitedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len() + data.len() > self.limit {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "writer full"));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn parse_body(body: &str) -> Value {
    serde_json::from_str(&format!("{{{}}}", body)).unwrap()
}

#[test]
fn test_every_field_is_written_with_normalized_name() {
    let marker = StructuredFieldMarker::new()
        .with_field("request/id", "r-42")
        .with_field("latency_ms", 12.5)
        .with_field("tags", vec!["db", "slow"])
        .with_field("user", Option::<&str>::None);

    let mut generator = JsonGenerator::new(Vec::new());
    marker.write_to(&mut generator).unwrap();
    assert_eq!(generator.fields_written(), marker.len());

    let body = String::from_utf8(generator.into_inner()).unwrap();
    assert_eq!(
        parse_body(&body),
        json!({"id": "r-42", "latency_ms": 12.5, "tags": ["db", "slow"], "user": null})
    );
}

#[test]
fn test_documented_examples() {
    let marker = StructuredFieldMarker::from_fields([("user", json!("alice")), ("count", json!(3))]);
    assert_eq!(marker.to_json_body().unwrap(), r#""user":"alice","count":3"#);
    assert_eq!(marker.to_string(), r#"user "alice", count 3, "#);

    let marker = StructuredFieldMarker::from_fields([("ns/key", 1)]);
    assert_eq!(marker.to_json_body().unwrap(), r#""key":1"#);
}

#[test]
fn test_unencodable_field_keeps_record_valid() {
    let marker = StructuredFieldMarker::new()
        .with_field("status", 503)
        .with_field("conn", Connection("10.0.0.7:5432"));

    let body = marker.to_json_body().unwrap();
    assert_eq!(
        parse_body(&body),
        json!({"status": 503, "conn": "Connection(\"10.0.0.7:5432\")"})
    );
    assert_eq!(
        marker.to_string(),
        "status 503, conn Connection(\"10.0.0.7:5432\"), "
    );
}

#[test]
fn test_text_and_json_agree_on_each_value() {
    let mut odd_keys = BTreeMap::new();
    odd_keys.insert([1u8, 2], "x");

    let marker = StructuredFieldMarker::new()
        .with_field("name", "svc \"main\"")
        .with_field("ratio", 0.25)
        .with_field("odd", odd_keys)
        .with_deferred("lazy", Deferred::new(|| vec![1, 2, 3]));

    let json_values: Vec<String> = parse_body(&marker.to_json_body().unwrap())
        .as_object()
        .unwrap()
        .values()
        .map(|value| match value {
            Value::String(text) if text.starts_with('{') => text.clone(),
            other => other.to_string(),
        })
        .collect();

    let text = marker.to_string();
    for value in &json_values {
        assert!(text.contains(value.as_str()), "{} missing from {}", value, text);
    }
    assert!(text.contains("odd {[1, 2]: \"x\"}, "));
}

#[test]
fn test_deferred_and_direct_values_match() {
    let direct = StructuredFieldMarker::new().with_field("cfg", json!({"retries": 3}));
    let deferred =
        StructuredFieldMarker::new().with_deferred("cfg", Deferred::new(|| json!({"retries": 3})));

    assert_eq!(direct.to_json_body().unwrap(), deferred.to_json_body().unwrap());
    assert_eq!(direct.to_string(), deferred.to_string());
}

#[test]
fn test_absent_mapping_is_a_no_op() {
    let marker = StructuredFieldMarker::absent();
    let mut generator = JsonGenerator::continuing(Vec::new(), 2);
    marker.write_to(&mut generator).unwrap();

    assert_eq!(generator.fields_written(), 2);
    assert!(generator.into_inner().is_empty());
}

#[test]
fn test_sink_failure_is_propagated() {
    let marker = StructuredFieldMarker::new()
        .with_field("first", "ok")
        .with_field("second", "x".repeat(64));

    let mut generator = JsonGenerator::new(LimitedWriter {
        buf: Vec::new(),
        limit: 24,
    });

    let MarkerError::Sink { field, source } = marker.write_to(&mut generator).unwrap_err();
    assert_eq!(field, "second");
    assert_eq!(source.kind(), io::ErrorKind::WriteZero);
}

#[test]
fn test_markers_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            thread::spawn(move || {
                let marker = StructuredFieldMarker::new()
                    .with_field("worker", worker)
                    .with_deferred("square", Deferred::new(move || worker * worker));
                marker.to_json_body().unwrap()
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let body = handle.join().unwrap();
        assert_eq!(body, format!(r#""worker":{},"square":{}"#, worker, worker * worker));
    }
}

#[test]
fn test_record_helpers_embed_marker_fields() {
    let marker = StructuredFieldMarker::new()
        .with_field("user", "alice")
        .with_field("conn", Connection("db"));

    let entry = log_entry(Level::ERROR, "query failed", &marker);
    assert_eq!(entry["level"], "ERROR");
    assert_eq!(entry["user"], "alice");
    assert_eq!(entry["conn"], "Connection(\"db\")");

    let line = write_record(Vec::new(), Level::ERROR, "elif::db", "query failed", &marker).unwrap();
    let record: Value = serde_json::from_slice(&line).unwrap();
    assert_eq!(record["target"], "elif::db");
    assert_eq!(record["conn"], entry["conn"]);
}

#[test]
fn test_custom_sink_receives_raw_and_string_values() {
    #[derive(Default)]
    struct Recording {
        calls: Vec<String>,
    }

    impl JsonSink for Recording {
        fn write_field_name(&mut self, name: &str) -> io::Result<()> {
            self.calls.push(format!("name:{}", name));
            Ok(())
        }

        fn write_raw_value(&mut self, raw: &str) -> io::Result<()> {
            self.calls.push(format!("raw:{}", raw));
            Ok(())
        }

        fn write_string(&mut self, value: &str) -> io::Result<()> {
            self.calls.push(format!("string:{}", value));
            Ok(())
        }
    }

    let marker = StructuredFieldMarker::new()
        .with_field("n", 1)
        .with_field("conn", Connection("p"));

    let mut sink = Recording::default();
    marker.write_to(&mut sink).unwrap();
    assert_eq!(
        sink.calls,
        [
            "name:n",
            "raw:1",
            "name:conn",
            "string:Connection(\"p\")"
        ]
    );
}
