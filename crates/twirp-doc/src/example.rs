//! Synthetic example payloads.
//!
//! [`ExampleGenerator`] fabricates a deterministic instance of a message
//! type by walking its fields: scalars get a fixed sample value, lists get
//! three elements, maps get one entry and nested messages recurse until the
//! depth limit. The result is formatted with the protobuf JSON mapping
//! (64-bit integers as strings, bytes as base64, enums by name).

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Number, Value};

use crate::error::SchemaError;
use crate::known;
use crate::schema::{Field, Kind, Message, Schema};

/// Nesting level past which messages are left empty.
pub const DEFAULT_MAX_DEPTH: usize = 3;

const LIST_ITEMS: usize = 3;
const SAMPLE_INT: i32 = 1 << 30;
const SAMPLE_FLOAT: f32 = 3.141_592_7;
const SAMPLE_DOUBLE: f64 = 3.141_592_65;
const SAMPLE_BYTES: &[u8] = b"bytes";
const SAMPLE_STRINGS: [&str; LIST_ITEMS] = ["foo", "bar", "baz"];
const SAMPLE_DURATION_SECONDS: i64 = 13;
const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// One node of a synthetic payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ExampleValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    /// Enum number with the name of the matching value, if declared.
    Enum { name: Option<String>, number: i32 },
    List(Vec<ExampleValue>),
    Map(Vec<(ExampleValue, ExampleValue)>),
    Message(ExampleMessage),
    /// `google.protobuf.Any` packing a wrapper type.
    Any {
        type_name: String,
        value: Box<ExampleValue>,
    },
    Duration { seconds: i64, nanos: i32 },
}

/// Populated message: JSON field names with values, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct ExampleMessage {
    pub type_name: String,
    pub fields: Vec<(String, ExampleValue)>,
}

impl ExampleMessage {
    fn empty(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_owned(),
            fields: Vec::new(),
        }
    }

    /// Value of the field with the given JSON name.
    pub fn get(&self, json_name: &str) -> Option<&ExampleValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == json_name)
            .map(|(_, value)| value)
    }

    pub fn to_json(&self) -> Value {
        match self.type_name.as_str() {
            known::TIMESTAMP => {
                let (seconds, nanos) = self.seconds_and_nanos();
                if let Some(formatted) = format_timestamp(seconds, nanos) {
                    return Value::String(formatted);
                }
            }
            known::DURATION => {
                let (seconds, nanos) = self.seconds_and_nanos();
                return Value::String(format_duration(seconds, nanos));
            }
            name => {
                if let Some(kind) = known::wrapper_kind(name) {
                    return self
                        .get("value")
                        .map_or_else(|| zero_json(kind), ExampleValue::to_json);
                }
            }
        }

        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    fn seconds_and_nanos(&self) -> (i64, i32) {
        let seconds = match self.get("seconds") {
            Some(ExampleValue::Int64(n)) => *n,
            _ => 0,
        };
        let nanos = match self.get("nanos") {
            Some(ExampleValue::Int32(n)) => *n,
            _ => 0,
        };
        (seconds, nanos)
    }
}

impl ExampleValue {
    /// Convert to a JSON value following the protobuf JSON mapping.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int32(n) => Value::from(*n),
            Self::Uint32(n) => Value::from(*n),
            Self::Int64(n) => Value::String(n.to_string()),
            Self::Uint64(n) => Value::String(n.to_string()),
            // Shortest decimal form of the 32-bit value, not of its f64 widening.
            Self::Float(f) => float_json(format!("{f}").parse().unwrap_or(f64::from(*f))),
            Self::Double(f) => float_json(*f),
            Self::Bytes(bytes) => Value::String(STANDARD.encode(bytes)),
            Self::String(s) => Value::String(s.clone()),
            Self::Enum { name, number } => name
                .as_ref()
                .map_or_else(|| Value::from(*number), |name| Value::String(name.clone())),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.map_key(), value.to_json()))
                    .collect(),
            ),
            Self::Message(message) => message.to_json(),
            Self::Any { type_name, value } => {
                let mut object = Map::new();
                object.insert(
                    "@type".to_owned(),
                    Value::String(format!("{}{type_name}", known::TYPE_URL_PREFIX)),
                );
                object.insert("value".to_owned(), value.to_json());
                Value::Object(object)
            }
            Self::Duration { seconds, nanos } => Value::String(format_duration(*seconds, *nanos)),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json())
    }

    /// JSON object key for a map entry key.
    fn map_key(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Int32(n) => n.to_string(),
            Self::Int64(n) => n.to_string(),
            Self::Uint32(n) => n.to_string(),
            Self::Uint64(n) => n.to_string(),
            other => other.to_json().to_string(),
        }
    }
}

/// Builds example payloads for messages of a schema.
#[derive(Debug)]
pub struct ExampleGenerator<'a> {
    schema: &'a Schema,
    max_depth: usize,
}

impl<'a> ExampleGenerator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build an example instance of the message `full_name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a reachable type is missing or a field
    /// kind has no sample value.
    pub fn generate(&self, full_name: &str) -> Result<ExampleValue, SchemaError> {
        let message = self.schema.message(full_name)?;
        Ok(ExampleValue::Message(self.fill(message, 0, 0)?))
    }

    /// Populate every field of `message`.
    ///
    /// `index` is the position of this message in an enclosing list and
    /// selects sample strings and `Any` payloads.
    fn fill(
        &self,
        message: &Message,
        depth: usize,
        index: usize,
    ) -> Result<ExampleMessage, SchemaError> {
        let mut example = ExampleMessage::empty(&message.full_name);
        if depth > self.max_depth {
            return Ok(example);
        }

        // Setting a oneof member clears the others, so only the last one stays.
        let mut oneof_winners: HashMap<&str, i32> = HashMap::new();
        for field in &message.fields {
            if let Some(oneof) = field.oneof.as_deref() {
                oneof_winners.insert(oneof, field.number);
            }
        }

        for field in &message.fields {
            if let Some(oneof) = field.oneof.as_deref()
                && oneof_winners.get(oneof) != Some(&field.number)
            {
                continue;
            }

            let value = if field.is_map(self.schema) {
                self.map_value(field, depth, index)?
            } else if field.is_repeated() {
                self.list_value(message, field, depth)?
            } else if field.kind.is_message() {
                self.message_value(field.referenced_type()?, depth, index)?
            } else {
                self.scalar_value(message, field, index)?
            };
            example.fields.push((field.json_name.clone(), value));
        }

        Ok(example)
    }

    fn list_value(
        &self,
        owner: &Message,
        field: &Field,
        depth: usize,
    ) -> Result<ExampleValue, SchemaError> {
        let items = if field.kind.is_message() {
            let type_name = field.referenced_type()?;
            (0..LIST_ITEMS)
                .map(|i| self.element_value(type_name, depth, i))
                .collect::<Result<_, _>>()?
        } else {
            (0..LIST_ITEMS)
                .map(|i| self.scalar_value(owner, field, i))
                .collect::<Result<_, _>>()?
        };
        Ok(ExampleValue::List(items))
    }

    /// List element of message type; its fields use the element index.
    fn element_value(
        &self,
        type_name: &str,
        depth: usize,
        index: usize,
    ) -> Result<ExampleValue, SchemaError> {
        match type_name {
            known::ANY | known::DURATION => self.message_value(type_name, depth, index),
            _ if known::wrapper_kind(type_name).is_some() => {
                self.message_value(type_name, depth, index)
            }
            _ => {
                let message = self.schema.message(type_name)?;
                Ok(ExampleValue::Message(self.fill(message, depth + 1, index)?))
            }
        }
    }

    fn map_value(
        &self,
        field: &Field,
        depth: usize,
        index: usize,
    ) -> Result<ExampleValue, SchemaError> {
        let entry = self.schema.message(field.referenced_type()?)?;
        let (key_field, value_field) = entry.map_fields()?;

        let key = self.scalar_value(entry, key_field, index)?;
        let value = if value_field.kind.is_message() {
            self.message_value(value_field.referenced_type()?, depth, index)?
        } else {
            self.scalar_value(entry, value_field, index)?
        };
        Ok(ExampleValue::Map(vec![(key, value)]))
    }

    /// Singular nested message; well-known `Any`, `Duration` and wrapper
    /// types get canned values at any depth.
    fn message_value(
        &self,
        type_name: &str,
        depth: usize,
        index: usize,
    ) -> Result<ExampleValue, SchemaError> {
        match type_name {
            known::ANY => Ok(any_payload(index)),
            known::DURATION => Ok(ExampleValue::Duration {
                seconds: SAMPLE_DURATION_SECONDS,
                nanos: 0,
            }),
            _ => {
                if let Some(value) = wrapper_value(type_name, index) {
                    return Ok(value);
                }
                let message = self.schema.message(type_name)?;
                Ok(ExampleValue::Message(self.fill(message, depth + 1, 0)?))
            }
        }
    }

    fn scalar_value(
        &self,
        owner: &Message,
        field: &Field,
        index: usize,
    ) -> Result<ExampleValue, SchemaError> {
        match field.kind {
            Kind::Enum => {
                let enum_type = self.schema.enum_type(field.referenced_type()?)?;
                Ok(ExampleValue::Enum {
                    name: enum_type.value_by_number(1).map(|v| v.name.clone()),
                    number: 1,
                })
            }
            kind => sample_scalar(kind, index).ok_or_else(|| SchemaError::UnknownKind {
                field: format!("{}.{}", owner.full_name, field.name),
                kind,
            }),
        }
    }
}

/// Sample for a plain scalar kind; `None` for enums, messages and unknown kinds.
fn sample_scalar(kind: Kind, index: usize) -> Option<ExampleValue> {
    let value = match kind {
        Kind::Bool => ExampleValue::Bool(true),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => ExampleValue::Int32(SAMPLE_INT),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => ExampleValue::Int64(i64::from(SAMPLE_INT)),
        Kind::Uint32 | Kind::Fixed32 => ExampleValue::Uint32(SAMPLE_INT.unsigned_abs()),
        Kind::Uint64 | Kind::Fixed64 => {
            ExampleValue::Uint64(u64::from(SAMPLE_INT.unsigned_abs()))
        }
        Kind::Float => ExampleValue::Float(SAMPLE_FLOAT),
        Kind::Double => ExampleValue::Double(SAMPLE_DOUBLE),
        Kind::Bytes => ExampleValue::Bytes(SAMPLE_BYTES.to_vec()),
        Kind::String => ExampleValue::String(SAMPLE_STRINGS[index % LIST_ITEMS].to_owned()),
        Kind::Enum | Kind::Message | Kind::Group | Kind::Unknown(_) => return None,
    };
    Some(value)
}

/// Wrapper message holding the sample of its value kind.
fn wrapper_value(type_name: &str, index: usize) -> Option<ExampleValue> {
    let value = sample_scalar(known::wrapper_kind(type_name)?, index)?;
    Some(ExampleValue::Message(ExampleMessage {
        type_name: type_name.to_owned(),
        fields: vec![("value".to_owned(), value)],
    }))
}

/// JSON of an unset wrapper value.
fn zero_json(kind: Kind) -> Value {
    match kind {
        Kind::Bool => Value::Bool(false),
        Kind::Int64 | Kind::Uint64 => Value::String("0".to_owned()),
        Kind::String | Kind::Bytes => Value::String(String::new()),
        _ => Value::from(0),
    }
}

fn any_payload(index: usize) -> ExampleValue {
    let (type_name, value) = match index % LIST_ITEMS {
        0 => (known::INT64_VALUE, ExampleValue::Int64(12345)),
        1 => (known::BOOL_VALUE, ExampleValue::Bool(true)),
        _ => (known::STRING_VALUE, ExampleValue::String("string".to_owned())),
    };
    ExampleValue::Any {
        type_name: type_name.to_owned(),
        value: Box::new(value),
    }
}

fn float_json(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// RFC 3339 in UTC; out-of-range nanos wrap into the current second.
fn format_timestamp(seconds: i64, nanos: i32) -> Option<String> {
    let nanos = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND)).ok()?;
    DateTime::from_timestamp(seconds, nanos)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Seconds with a fractional part of 0, 3, 6 or 9 digits and an `s` suffix.
fn format_duration(seconds: i64, nanos: i32) -> String {
    let seconds = seconds.saturating_add(i64::from(nanos / NANOS_PER_SECOND));
    let nanos = nanos % NANOS_PER_SECOND;
    let sign = if seconds < 0 || nanos < 0 { "-" } else { "" };
    let (seconds, nanos) = (seconds.unsigned_abs(), nanos.unsigned_abs());
    if nanos == 0 {
        return format!("{sign}{seconds}s");
    }

    let mut fraction = format!("{nanos:09}");
    while fraction.ends_with("000") {
        fraction.truncate(fraction.len() - 3);
    }
    format!("{sign}{seconds}.{fraction}s")
}
