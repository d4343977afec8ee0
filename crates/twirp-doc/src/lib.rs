//! Markdown reference documentation for Twirp services.
//!
//! The crate turns a resolved [`Schema`] into one markdown document per
//! service: a method index, request and response sections with example JSON
//! payloads and field tables, a section per referenced message or enum, and
//! the table of standard Twirp error codes.
//!
//! # Example
//!
//! ```
//! use twirp_doc::{Field, Generator, Kind, Message, Method, Schema, Service};
//!
//! let schema = Schema::new()
//!     .with_service(
//!         Service::new("acme.Echo").with_method(Method::new("Say", "acme.Msg", "acme.Msg")),
//!     )
//!     .with_message(Message::new("acme.Msg").with_field(Field::new("text", 1, Kind::String)));
//!
//! let mut out = Vec::new();
//! Generator::new(&schema, "https://api.example.com/twirp")
//!     .generate_service_document(&schema.services()[0], &mut out)
//!     .unwrap();
//!
//! let doc = String::from_utf8(out).unwrap();
//! assert!(doc.starts_with("# Echo\n\n`acme.Echo`\n"));
//! assert!(doc.contains("Base URL: `https://api.example.com/twirp/acme.Echo`"));
//! ```

mod description;
mod error;
pub mod example;
mod generator;
pub mod known;
pub mod schema;
mod twirp_errors;

pub use error::{GenerateError, SchemaError};
pub use example::{DEFAULT_MAX_DEPTH, ExampleGenerator, ExampleMessage, ExampleValue};
pub use generator::Generator;
pub use schema::{Comments, Enum, EnumValue, Field, Kind, Label, Message, Method, Schema, Service};
pub use twirp_errors::{ERROR_CODES, ErrorCode};
