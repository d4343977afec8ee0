//! Resolved service schema.
//!
//! The schema is produced by a descriptor front end (see the
//! `twirp-doc-protoc` crate) or assembled by hand, and is read-only for
//! the rest of this crate. Type references between fields, messages and
//! enums are full names without the leading dot (`acme.users.v1.User`).

use std::collections::HashMap;
use std::fmt;

use heck::ToLowerCamelCase;

use crate::error::SchemaError;

/// Field type as declared in the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    /// Type code without any known meaning.
    Unknown(i32),
}

impl Kind {
    /// Whether values of this kind are messages.
    pub fn is_message(self) -> bool {
        matches!(self, Self::Message | Self::Group)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Int32 => "int32",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Group => "group",
            Self::Message => "message",
            Self::Bytes => "bytes",
            Self::Uint32 => "uint32",
            Self::Enum => "enum",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Unknown(code) => return write!(f, "unknown({code})"),
        };
        f.write_str(name)
    }
}

/// Field cardinality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

/// Comments attached to a schema element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comments {
    /// Comment block directly above the element.
    pub leading: Option<String>,
    /// Comment on the same line or directly below the element.
    pub trailing: Option<String>,
}

impl Comments {
    /// Comments with only a leading block.
    pub fn leading(text: impl Into<String>) -> Self {
        Self {
            leading: Some(text.into()),
            trailing: None,
        }
    }

    /// Set the trailing comment.
    #[must_use]
    pub fn with_trailing(mut self, text: impl Into<String>) -> Self {
        self.trailing = Some(text.into());
        self
    }
}

/// Message field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Name used in the JSON encoding.
    pub json_name: String,
    pub number: i32,
    pub kind: Kind,
    pub label: Label,
    /// Full name of the referenced message or enum.
    pub type_name: Option<String>,
    /// Name of the oneof this field belongs to.
    pub oneof: Option<String>,
    pub comments: Comments,
}

impl Field {
    /// Singular field; the JSON name defaults to lowerCamelCase of `name`.
    pub fn new(name: impl Into<String>, number: i32, kind: Kind) -> Self {
        let name = name.into();
        Self {
            json_name: name.to_lower_camel_case(),
            name,
            number,
            kind,
            label: Label::Optional,
            type_name: None,
            oneof: None,
            comments: Comments::default(),
        }
    }

    /// Singular message-typed field.
    pub fn message(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self::new(name, number, Kind::Message).with_type_name(type_name)
    }

    /// Singular enum-typed field.
    pub fn enumeration(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self::new(name, number, Kind::Enum).with_type_name(type_name)
    }

    /// Mark the field as repeated.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.label = Label::Repeated;
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(normalize(&type_name.into()).to_owned());
        self
    }

    #[must_use]
    pub fn in_oneof(mut self, oneof: impl Into<String>) -> Self {
        self.oneof = Some(oneof.into());
        self
    }

    #[must_use]
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Whether this is a map field in `schema`.
    pub fn is_map(&self, schema: &Schema) -> bool {
        schema.is_map_field(self)
    }

    /// Whether this is a repeated field that is not a map.
    pub fn is_list(&self, schema: &Schema) -> bool {
        self.is_repeated() && !self.is_map(schema)
    }

    /// Full name of the referenced type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedType`] when the field carries no type reference.
    pub fn referenced_type(&self) -> Result<&str, SchemaError> {
        self.type_name
            .as_deref()
            .ok_or_else(|| SchemaError::UnresolvedType(format!("<type of field {}>", self.name)))
    }
}

/// Message type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub comments: Comments,
    pub fields: Vec<Field>,
    /// Synthesized entry type of a map field (key is field 1, value field 2).
    pub map_entry: bool,
}

impl Message {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = normalize(&full_name.into()).to_owned();
        Self {
            name: short_name(&full_name).to_owned(),
            full_name,
            comments: Comments::default(),
            fields: Vec::new(),
            map_entry: false,
        }
    }

    /// Map entry type with the given key and value fields.
    pub fn map_entry(full_name: impl Into<String>, key: Field, value: Field) -> Self {
        let mut entry = Self::new(full_name)
            .with_field(Field { number: 1, ..key })
            .with_field(Field { number: 2, ..value });
        entry.map_entry = true;
        entry
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    pub fn field_by_number(&self, number: i32) -> Option<&Field> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Key and value fields of a map entry.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidMapEntry`] if either field is missing.
    pub fn map_fields(&self) -> Result<(&Field, &Field), SchemaError> {
        match (self.field_by_number(1), self.field_by_number(2)) {
            (Some(key), Some(value)) if self.map_entry => Ok((key, value)),
            _ => Err(SchemaError::InvalidMapEntry(self.full_name.clone())),
        }
    }
}

/// Enum value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
    pub comments: Comments,
}

/// Enum type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    pub full_name: String,
    pub comments: Comments,
    pub values: Vec<EnumValue>,
}

impl Enum {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = normalize(&full_name.into()).to_owned();
        Self {
            name: short_name(&full_name).to_owned(),
            full_name,
            comments: Comments::default(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_value(self, name: impl Into<String>, number: i32) -> Self {
        self.with_commented_value(name, number, Comments::default())
    }

    #[must_use]
    pub fn with_commented_value(
        mut self,
        name: impl Into<String>,
        number: i32,
        comments: Comments,
    ) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
            comments,
        });
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    pub fn value_by_number(&self, number: i32) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.number == number)
    }
}

/// Service method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Full name of the request message.
    pub input_type: String,
    /// Full name of the response message.
    pub output_type: String,
    pub comments: Comments,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_type: normalize(&input_type.into()).to_owned(),
            output_type: normalize(&output_type.into()).to_owned(),
            comments: Comments::default(),
        }
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }
}

/// Service with its methods in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub full_name: String,
    pub comments: Comments,
    pub methods: Vec<Method>,
}

impl Service {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = normalize(&full_name.into()).to_owned();
        Self {
            name: short_name(&full_name).to_owned(),
            full_name,
            comments: Comments::default(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }
}

/// Registry of every type a set of services can reach.
#[derive(Debug, Default)]
pub struct Schema {
    messages: HashMap<String, Message>,
    enums: HashMap<String, Enum>,
    services: Vec<Service>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message, replacing any previous one with the same full name.
    pub fn add_message(&mut self, message: Message) {
        self.messages.insert(message.full_name.clone(), message);
    }

    /// Register an enum, replacing any previous one with the same full name.
    pub fn add_enum(&mut self, enum_type: Enum) {
        self.enums.insert(enum_type.full_name.clone(), enum_type);
    }

    pub fn add_service(&mut self, service: Service) {
        self.services.push(service);
    }

    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.add_message(message);
        self
    }

    #[must_use]
    pub fn with_enum(mut self, enum_type: Enum) -> Self {
        self.add_enum(enum_type);
        self
    }

    #[must_use]
    pub fn with_service(mut self, service: Service) -> Self {
        self.add_service(service);
        self
    }

    /// Look up a message by full name (a leading dot is ignored).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedType`] if no such message is registered.
    pub fn message(&self, full_name: &str) -> Result<&Message, SchemaError> {
        let full_name = normalize(full_name);
        self.messages
            .get(full_name)
            .ok_or_else(|| SchemaError::UnresolvedType(full_name.to_owned()))
    }

    /// Look up an enum by full name (a leading dot is ignored).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedType`] if no such enum is registered.
    pub fn enum_type(&self, full_name: &str) -> Result<&Enum, SchemaError> {
        let full_name = normalize(full_name);
        self.enums
            .get(full_name)
            .ok_or_else(|| SchemaError::UnresolvedType(full_name.to_owned()))
    }

    /// Services in registration order.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Find a service by full name.
    pub fn service(&self, full_name: &str) -> Option<&Service> {
        let full_name = normalize(full_name);
        self.services.iter().find(|s| s.full_name == full_name)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// Whether `field` is a map, i.e. a repeated field of a map entry type.
    pub fn is_map_field(&self, field: &Field) -> bool {
        field.is_repeated()
            && field.kind == Kind::Message
            && field
                .type_name
                .as_deref()
                .and_then(|name| self.message(name).ok())
                .is_some_and(|m| m.map_entry)
    }
}

fn normalize(full_name: &str) -> &str {
    full_name.strip_prefix('.').unwrap_or(full_name)
}

fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}
