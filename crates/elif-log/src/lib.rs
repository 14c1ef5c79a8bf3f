//! # elif-log
//!
//! Structured field markers for JSON logging in the elif.rs framework.
//!
//! A [`StructuredFieldMarker`] wraps the extra fields of one log statement.
//! Each value is encoded with `serde_json`; when that fails the field is
//! still written, as a string holding the value's `Debug` form, and a
//! warning is logged. One bad value never drops or corrupts a record.
//!
//! ```rust
//! use elif_log::StructuredFieldMarker;
//!
//! let marker = StructuredFieldMarker::new()
//!     .with_field("user", "alice")
//!     .with_field("count", 3);
//!
//! assert_eq!(marker.to_json_body().unwrap(), r#""user":"alice","count":3"#);
//! assert_eq!(marker.to_string(), r#"user "alice", count 3, "#);
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod key;
pub mod marker;
pub mod record;
pub mod value;

pub use config::{init_logging, LogFormat, LoggingConfig};
pub use error::{ConfigError, MarkerError};
pub use generator::{JsonGenerator, JsonSink};
pub use key::FieldKey;
pub use marker::StructuredFieldMarker;
pub use record::{log_entry, write_record};
pub use value::{render, Deferred, Encode, FieldValue, Rendered, Resolve};

#[doc(hidden)]
pub use tracing as __tracing;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
