//! Descriptor fixtures shared by the unit tests.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::source_code_info::Location;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions, MethodDescriptorProto, OneofDescriptorProto,
    ServiceDescriptorProto, SourceCodeInfo,
};

pub(crate) const USERS_PROTO: &str = "acme/users/v1/users.proto";

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_owned()),
        ..field(name, number, ty)
    }
}

fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_owned()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).to_owned()),
                number: Some(*number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn comment(path: &[i32], leading: &str, trailing: Option<&str>) -> Location {
    Location {
        path: path.to_vec(),
        leading_comments: Some(leading.to_owned()),
        trailing_comments: trailing.map(str::to_owned),
        ..Default::default()
    }
}

/// `acme.users.v1` with one service, a map field, a oneof, a proto3
/// optional field and a nested enum.
pub(crate) fn users_file() -> FileDescriptorProto {
    let request = DescriptorProto {
        name: Some("GetUserRequest".to_owned()),
        field: vec![FieldDescriptorProto {
            json_name: Some("userId".to_owned()),
            ..field("user_id", 1, Type::String)
        }],
        ..Default::default()
    };

    let labels_entry = DescriptorProto {
        name: Some("LabelsEntry".to_owned()),
        field: vec![field("key", 1, Type::String), field("value", 2, Type::String)],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };

    let user = DescriptorProto {
        name: Some("User".to_owned()),
        field: vec![
            FieldDescriptorProto {
                json_name: Some("displayName".to_owned()),
                ..field("display_name", 1, Type::String)
            },
            FieldDescriptorProto {
                label: Some(Label::Repeated as i32),
                json_name: Some("labels".to_owned()),
                ..typed("labels", 2, Type::Message, ".acme.users.v1.User.LabelsEntry")
            },
            typed("status", 3, Type::Enum, ".acme.users.v1.Status"),
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..field("email", 4, Type::String)
            },
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..field("phone", 5, Type::String)
            },
            FieldDescriptorProto {
                oneof_index: Some(1),
                proto3_optional: Some(true),
                ..field("nickname", 6, Type::String)
            },
        ],
        nested_type: vec![labels_entry],
        enum_type: vec![enumeration("Role", &[("ROLE_UNSPECIFIED", 0), ("ROLE_ADMIN", 1)])],
        oneof_decl: vec![
            OneofDescriptorProto {
                name: Some("contact".to_owned()),
                ..Default::default()
            },
            OneofDescriptorProto {
                name: Some("_nickname".to_owned()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let service = ServiceDescriptorProto {
        name: Some("Users".to_owned()),
        method: vec![MethodDescriptorProto {
            name: Some("GetUser".to_owned()),
            input_type: Some(".acme.users.v1.GetUserRequest".to_owned()),
            output_type: Some(".acme.users.v1.User".to_owned()),
            ..Default::default()
        }],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some(USERS_PROTO.to_owned()),
        package: Some("acme.users.v1".to_owned()),
        syntax: Some("proto3".to_owned()),
        message_type: vec![request, user],
        enum_type: vec![enumeration(
            "Status",
            &[("STATUS_UNSPECIFIED", 0), ("STATUS_ACTIVE", 1)],
        )],
        service: vec![service],
        source_code_info: Some(SourceCodeInfo {
            location: vec![
                comment(&[6, 0], " Users manages accounts.\n", None),
                comment(&[6, 0, 2, 0], " Fetch a user.\n", None),
                comment(&[4, 1, 2, 0], " Display name.\n", None),
                comment(&[5, 0, 2, 1], " Active.\n", Some(" Can log in.\n")),
            ],
        }),
        ..Default::default()
    }
}

/// A file with only messages, used to check that service-less files
/// produce no output.
pub(crate) fn types_only_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("acme/types.proto".to_owned()),
        package: Some("acme".to_owned()),
        message_type: vec![DescriptorProto {
            name: Some("Money".to_owned()),
            field: vec![field("units", 1, Type::Int64)],
            ..Default::default()
        }],
        ..Default::default()
    }
}
