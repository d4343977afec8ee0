//! Descriptor to schema conversion.

use std::collections::HashMap;

use prost_types::field_descriptor_proto::{Label as ProtoLabel, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    ServiceDescriptorProto,
};
use twirp_doc::{Comments, Enum, Field, Kind, Label, Message, Method, Schema, SchemaError, Service};

use crate::error::ProtocError;

// Field numbers used in `SourceCodeInfo` location paths.
const FILE_MESSAGE: i32 = 4;
const FILE_ENUM: i32 = 5;
const FILE_SERVICE: i32 = 6;
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED: i32 = 3;
const MESSAGE_ENUM: i32 = 4;
const ENUM_VALUE: i32 = 2;
const SERVICE_METHOD: i32 = 2;

/// Build a schema from every message, enum and service in `files`.
///
/// Nested types are registered under their qualified names
/// (`pkg.Outer.Inner`) and comments are attached from source info.
///
/// # Errors
///
/// Returns [`ProtocError::Schema`] if a message or enum field carries no
/// type reference.
pub fn resolve_files(files: &[FileDescriptorProto]) -> Result<Schema, ProtocError> {
    let mut schema = Schema::new();
    for file in files {
        FileResolver::new(file).resolve(&mut schema)?;
    }

    tracing::debug!(
        files = files.len(),
        messages = schema.message_count(),
        enums = schema.enum_count(),
        services = schema.services().len(),
        "Resolved descriptors"
    );
    Ok(schema)
}

struct FileResolver<'a> {
    file: &'a FileDescriptorProto,
    comments: HashMap<&'a [i32], Comments>,
}

impl<'a> FileResolver<'a> {
    fn new(file: &'a FileDescriptorProto) -> Self {
        let comments = file
            .source_code_info
            .iter()
            .flat_map(|info| &info.location)
            .filter(|loc| loc.leading_comments.is_some() || loc.trailing_comments.is_some())
            .map(|loc| {
                let comments = Comments {
                    leading: loc.leading_comments.clone(),
                    trailing: loc.trailing_comments.clone(),
                };
                (loc.path.as_slice(), comments)
            })
            .collect();
        Self { file, comments }
    }

    fn comments(&self, path: &[i32]) -> Comments {
        self.comments.get(path).cloned().unwrap_or_default()
    }

    fn resolve(&self, schema: &mut Schema) -> Result<(), ProtocError> {
        let scope = self.file.package();

        for (i, message) in self.file.message_type.iter().enumerate() {
            self.add_message(schema, scope, message, &child_path(&[], FILE_MESSAGE, i))?;
        }
        for (i, enum_type) in self.file.enum_type.iter().enumerate() {
            self.add_enum(schema, scope, enum_type, &child_path(&[], FILE_ENUM, i));
        }
        for (i, service) in self.file.service.iter().enumerate() {
            schema.add_service(self.service(scope, service, &child_path(&[], FILE_SERVICE, i)));
        }
        Ok(())
    }

    fn add_message(
        &self,
        schema: &mut Schema,
        scope: &str,
        descriptor: &DescriptorProto,
        path: &[i32],
    ) -> Result<(), ProtocError> {
        let full_name = qualify(scope, descriptor.name());

        let mut message = Message::new(&full_name).with_comments(self.comments(path));
        message.map_entry = descriptor
            .options
            .as_ref()
            .is_some_and(|options| options.map_entry());

        for (i, field) in descriptor.field.iter().enumerate() {
            let field_path = child_path(path, MESSAGE_FIELD, i);
            message.fields.push(self.field(&full_name, descriptor, field, &field_path)?);
        }
        schema.add_message(message);

        for (i, nested) in descriptor.nested_type.iter().enumerate() {
            self.add_message(schema, &full_name, nested, &child_path(path, MESSAGE_NESTED, i))?;
        }
        for (i, nested) in descriptor.enum_type.iter().enumerate() {
            self.add_enum(schema, &full_name, nested, &child_path(path, MESSAGE_ENUM, i));
        }
        Ok(())
    }

    fn field(
        &self,
        owner: &str,
        message: &DescriptorProto,
        descriptor: &FieldDescriptorProto,
        path: &[i32],
    ) -> Result<Field, ProtocError> {
        let kind = descriptor.r#type.map_or(Kind::Unknown(0), kind_from_code);
        let mut field = Field::new(descriptor.name(), descriptor.number(), kind)
            .with_comments(self.comments(path));

        if let Some(json_name) = descriptor.json_name.as_deref().filter(|n| !n.is_empty()) {
            field = field.with_json_name(json_name);
        }

        field.label = match descriptor.label() {
            ProtoLabel::Optional => Label::Optional,
            ProtoLabel::Required => Label::Required,
            ProtoLabel::Repeated => Label::Repeated,
        };

        match descriptor.type_name.as_deref().filter(|n| !n.is_empty()) {
            Some(type_name) => field = field.with_type_name(type_name),
            None if matches!(kind, Kind::Message | Kind::Group | Kind::Enum) => {
                return Err(SchemaError::UnresolvedType(format!(
                    "<type of field {owner}.{}>",
                    descriptor.name()
                ))
                .into());
            }
            None => {}
        }

        // Synthetic oneofs of proto3 `optional` fields have a single member.
        if !descriptor.proto3_optional() {
            field.oneof = descriptor
                .oneof_index
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| message.oneof_decl.get(i))
                .map(|oneof| oneof.name().to_owned());
        }

        Ok(field)
    }

    fn add_enum(
        &self,
        schema: &mut Schema,
        scope: &str,
        descriptor: &EnumDescriptorProto,
        path: &[i32],
    ) {
        let mut enum_type =
            Enum::new(qualify(scope, descriptor.name())).with_comments(self.comments(path));
        for (i, value) in descriptor.value.iter().enumerate() {
            enum_type = enum_type.with_commented_value(
                value.name(),
                value.number(),
                self.comments(&child_path(path, ENUM_VALUE, i)),
            );
        }
        schema.add_enum(enum_type);
    }

    fn service(&self, scope: &str, descriptor: &ServiceDescriptorProto, path: &[i32]) -> Service {
        let mut service =
            Service::new(qualify(scope, descriptor.name())).with_comments(self.comments(path));
        for (i, method) in descriptor.method.iter().enumerate() {
            service = service.with_method(
                Method::new(method.name(), method.input_type(), method.output_type())
                    .with_comments(self.comments(&child_path(path, SERVICE_METHOD, i))),
            );
        }
        service
    }
}

/// Map a `FieldDescriptorProto.type` code to a field kind.
pub(crate) fn kind_from_code(code: i32) -> Kind {
    let Ok(ty) = Type::try_from(code) else {
        return Kind::Unknown(code);
    };
    match ty {
        Type::Double => Kind::Double,
        Type::Float => Kind::Float,
        Type::Int64 => Kind::Int64,
        Type::Uint64 => Kind::Uint64,
        Type::Int32 => Kind::Int32,
        Type::Fixed64 => Kind::Fixed64,
        Type::Fixed32 => Kind::Fixed32,
        Type::Bool => Kind::Bool,
        Type::String => Kind::String,
        Type::Group => Kind::Group,
        Type::Message => Kind::Message,
        Type::Bytes => Kind::Bytes,
        Type::Uint32 => Kind::Uint32,
        Type::Enum => Kind::Enum,
        Type::Sfixed32 => Kind::Sfixed32,
        Type::Sfixed64 => Kind::Sfixed64,
        Type::Sint32 => Kind::Sint32,
        Type::Sint64 => Kind::Sint64,
    }
}

/// `scope.name`, or `name` at the root scope.
pub(crate) fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_owned()
    } else {
        format!("{scope}.{name}")
    }
}

fn child_path(parent: &[i32], tag: i32, index: usize) -> Vec<i32> {
    let mut path = Vec::with_capacity(parent.len() + 2);
    path.extend_from_slice(parent);
    path.push(tag);
    path.push(i32::try_from(index).unwrap_or(i32::MAX));
    path
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::users_file;

    #[test]
    fn test_registers_qualified_names() {
        let schema = resolve_files(&[users_file()]).unwrap();

        assert!(schema.message("acme.users.v1.GetUserRequest").is_ok());
        let entry = schema.message("acme.users.v1.User.LabelsEntry").unwrap();
        assert!(entry.map_entry);
        assert_eq!(entry.name, "LabelsEntry");
        assert!(schema.enum_type("acme.users.v1.Status").is_ok());
        assert!(schema.enum_type("acme.users.v1.User.Role").is_ok());

        let service = schema.service("acme.users.v1.Users").unwrap();
        assert_eq!(service.methods[0].input_type, "acme.users.v1.GetUserRequest");
        assert_eq!(service.methods[0].output_type, "acme.users.v1.User");
    }

    #[test]
    fn test_field_attributes() {
        let schema = resolve_files(&[users_file()]).unwrap();
        let user = schema.message("acme.users.v1.User").unwrap();

        let labels = &user.fields[1];
        assert_eq!(labels.json_name, "labels");
        assert_eq!(labels.kind, Kind::Message);
        assert_eq!(labels.label, Label::Repeated);
        assert_eq!(labels.type_name.as_deref(), Some("acme.users.v1.User.LabelsEntry"));
        assert!(labels.is_map(&schema));

        let status = &user.fields[2];
        assert_eq!(status.kind, Kind::Enum);
        assert_eq!(status.type_name.as_deref(), Some("acme.users.v1.Status"));

        let request = schema.message("acme.users.v1.GetUserRequest").unwrap();
        assert_eq!(request.fields[0].json_name, "userId");
    }

    #[test]
    fn test_json_name_derived_when_missing() {
        let mut file = users_file();
        file.message_type[0].field[0].json_name = None;
        let schema = resolve_files(&[file]).unwrap();

        let request = schema.message("acme.users.v1.GetUserRequest").unwrap();
        assert_eq!(request.fields[0].json_name, "userId");
    }

    #[test]
    fn test_comments_attached_by_path() {
        let schema = resolve_files(&[users_file()]).unwrap();

        let service = schema.service("acme.users.v1.Users").unwrap();
        assert_eq!(service.comments.leading.as_deref(), Some(" Users manages accounts.\n"));
        assert_eq!(service.methods[0].comments.leading.as_deref(), Some(" Fetch a user.\n"));

        let user = schema.message("acme.users.v1.User").unwrap();
        assert_eq!(user.fields[0].comments.leading.as_deref(), Some(" Display name.\n"));
        assert_eq!(user.fields[1].comments, Comments::default());

        let status = schema.enum_type("acme.users.v1.Status").unwrap();
        assert_eq!(
            status.values[1].comments,
            Comments::leading(" Active.\n").with_trailing(" Can log in.\n")
        );
    }

    #[test]
    fn test_oneof_membership() {
        let schema = resolve_files(&[users_file()]).unwrap();
        let user = schema.message("acme.users.v1.User").unwrap();

        assert_eq!(user.fields[3].oneof.as_deref(), Some("contact"));
        assert_eq!(user.fields[4].oneof.as_deref(), Some("contact"));
        // proto3 optional
        assert_eq!(user.fields[5].oneof, None);
    }

    #[test]
    fn test_unknown_type_code() {
        assert_eq!(kind_from_code(99), Kind::Unknown(99));
        assert_eq!(kind_from_code(10), Kind::Group);
        assert_eq!(kind_from_code(17), Kind::Sint32);
    }

    #[test]
    fn test_message_field_without_type_name() {
        let mut file = users_file();
        file.message_type[1].field[1].type_name = None;
        let err = resolve_files(&[file]).unwrap_err();
        assert!(matches!(err, ProtocError::Schema(SchemaError::UnresolvedType(_))));
    }

    #[test]
    fn test_qualify_without_package() {
        assert_eq!(qualify("", "User"), "User");
        assert_eq!(qualify("acme", "User"), "acme.User");
    }
}
