//! Display labels for scalar kinds and well-known types.
//!
//! Labels describe how a value travels in the JSON encoding, following
//! <https://protobuf.dev/programming-guides/proto3/#json>.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::schema::Kind;

pub const ANY: &str = "google.protobuf.Any";
pub const STRING_VALUE: &str = "google.protobuf.StringValue";
pub const BYTES_VALUE: &str = "google.protobuf.BytesValue";
pub const BOOL_VALUE: &str = "google.protobuf.BoolValue";
pub const INT32_VALUE: &str = "google.protobuf.Int32Value";
pub const INT64_VALUE: &str = "google.protobuf.Int64Value";
pub const UINT32_VALUE: &str = "google.protobuf.UInt32Value";
pub const UINT64_VALUE: &str = "google.protobuf.UInt64Value";
pub const FLOAT_VALUE: &str = "google.protobuf.FloatValue";
pub const DOUBLE_VALUE: &str = "google.protobuf.DoubleValue";
pub const TIMESTAMP: &str = "google.protobuf.Timestamp";
pub const DURATION: &str = "google.protobuf.Duration";

/// Prefix of the `@type` URL of packed `Any` values.
pub const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

static KNOWN_TYPE_LABELS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (ANY, ANY),
        (STRING_VALUE, "nullable string"),
        (BYTES_VALUE, "bytes as nullable base64 string"),
        (BOOL_VALUE, "nullable bool"),
        (INT32_VALUE, "nullable int32"),
        (INT64_VALUE, "nullable int64"),
        (UINT32_VALUE, "nullable uint32"),
        (UINT64_VALUE, "uint64 as nullable numeric string"),
        (FLOAT_VALUE, "nullable float"),
        (DOUBLE_VALUE, "nullable double"),
        (TIMESTAMP, "datetime as nullable RFC3339 string"),
        (DURATION, "duration as nullable string"),
    ])
});

/// Label of a scalar kind, `None` for message, enum, group and unknown kinds.
pub fn kind_label(kind: Kind) -> Option<&'static str> {
    let label = match kind {
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => "int32",
        Kind::Uint32 | Kind::Fixed32 => "uint32",
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => "int64 as numeric string",
        Kind::Uint64 | Kind::Fixed64 => "uint64 as numeric string",
        Kind::Float => "float",
        Kind::Double => "double",
        Kind::Bool => "bool",
        Kind::String => "string",
        Kind::Bytes => "bytes as base64 string",
        Kind::Group | Kind::Message | Kind::Enum | Kind::Unknown(_) => return None,
    };
    Some(label)
}

/// Label of a well-known message type rendered inline instead of as a model.
pub fn known_type_label(full_name: &str) -> Option<&'static str> {
    KNOWN_TYPE_LABELS.get(full_name).copied()
}

/// Whether `full_name` is rendered inline rather than listed as a model.
pub fn is_known_type(full_name: &str) -> bool {
    KNOWN_TYPE_LABELS.contains_key(full_name)
}

/// Kind of the `value` field of a scalar wrapper type (`Int32Value`, ...).
pub(crate) fn wrapper_kind(full_name: &str) -> Option<Kind> {
    let kind = match full_name {
        STRING_VALUE => Kind::String,
        BYTES_VALUE => Kind::Bytes,
        BOOL_VALUE => Kind::Bool,
        INT32_VALUE => Kind::Int32,
        INT64_VALUE => Kind::Int64,
        UINT32_VALUE => Kind::Uint32,
        UINT64_VALUE => Kind::Uint64,
        FLOAT_VALUE => Kind::Float,
        DOUBLE_VALUE => Kind::Double,
        _ => return None,
    };
    Some(kind)
}
