//! Service document assembly.

use std::collections::BTreeMap;
use std::io::Write;

use twirp_doc_markdown::{Align, Document, Node, Table};

use crate::description::{description_block, description_cell_text};
use crate::error::{GenerateError, SchemaError};
use crate::example::ExampleGenerator;
use crate::known::{is_known_type, kind_label, known_type_label};
use crate::schema::{Enum, Field, Kind, Message, Schema, Service};
use crate::twirp_errors::error_codes_section;

/// Message or enum listed in the Models section.
#[derive(Clone, Copy, Debug)]
enum Model<'a> {
    Message(&'a Message),
    Enum(&'a Enum),
}

/// Models keyed by full name, iterated in lexicographic order.
type Models<'a> = BTreeMap<&'a str, Model<'a>>;

/// Generates one markdown reference document per service.
///
/// The generator only reads the schema, so one instance can produce
/// documents for several services, in any order.
#[derive(Debug)]
pub struct Generator<'a> {
    schema: &'a Schema,
    base_url: String,
    examples: ExampleGenerator<'a>,
}

impl<'a> Generator<'a> {
    /// Create a generator; `base_url` prefixes every service route.
    pub fn new(schema: &'a Schema, base_url: impl Into<String>) -> Self {
        Self {
            schema,
            base_url: base_url.into(),
            examples: ExampleGenerator::new(schema),
        }
    }

    /// Override the nesting limit of example payloads.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.examples = self.examples.with_max_depth(max_depth);
        self
    }

    /// Write the document for `service` to `w`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Schema`] if the schema has a construct with
    /// no rendering rule and [`GenerateError::Write`] if `w` fails. Nothing
    /// is written in the first case; in the second the output is partial
    /// and must be discarded.
    pub fn generate_service_document(
        &self,
        service: &Service,
        w: &mut dyn Write,
    ) -> Result<(), GenerateError> {
        let doc = self.build_service_document(service)?;
        doc.generate(w).map_err(|source| GenerateError::Write {
            service: service.full_name.clone(),
            source,
        })
    }

    /// Assemble the document for `service` without writing it.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] if a referenced type is missing or a field
    /// kind has no label or example value.
    pub fn build_service_document(&self, service: &Service) -> Result<Document, GenerateError> {
        let mut models = Models::new();
        for method in &service.methods {
            self.collect_models(self.schema.message(&method.input_type)?, &mut models)?;
            self.collect_models(self.schema.message(&method.output_type)?, &mut models)?;
        }

        tracing::debug!(
            service = %service.full_name,
            methods = service.methods.len(),
            models = models.len(),
            "Building service document"
        );

        let mut doc = Document::new();
        doc.append(Node::h1(Node::text(&service.name)));
        doc.append(Node::paragraph(Node::code(&service.full_name)));
        doc.append_opt(description_block(service.comments.leading.as_deref()));

        doc.append(Node::h3(Node::text("Methods")));
        doc.append(Node::unordered_list(
            service
                .methods
                .iter()
                .map(|m| Node::link_to_header(&format!("POST /{}", m.name), &m.name))
                .collect(),
        ));

        if !models.is_empty() {
            doc.append(Node::h3(Node::text("Models")));
            doc.append(Node::unordered_list(
                models
                    .keys()
                    .map(|name| Node::link_to_header(name, *name))
                    .collect(),
            ));
        }

        doc.append(Node::rule());

        doc.append(Node::h2(Node::text("Methods")));
        doc.append(Node::paragraph(Node::group(vec![
            Node::text("Base URL: "),
            Node::code(format!("{}/{}", self.base_url, service.full_name)),
        ])));

        for method in &service.methods {
            let input = self.schema.message(&method.input_type)?;
            let output = self.schema.message(&method.output_type)?;

            doc.append(Node::h3(Node::group(vec![
                Node::text("POST "),
                Node::code(format!("/{}", method.name)),
            ])));
            doc.append_opt(description_block(method.comments.leading.as_deref()));

            doc.append(Node::h4(Node::text("Request")));
            doc.append(Node::paragraph(Node::code(&input.full_name)));
            doc.append(Node::paragraph(Node::code(format!(
                "POST /{}/{}",
                service.full_name, method.name
            ))));
            doc.append(self.example_block(input)?);
            self.append_message_fields(&mut doc, input)?;

            doc.append(Node::h4(Node::text("Response")));
            doc.append(Node::paragraph(Node::code(&output.full_name)));
            doc.append(Node::paragraph(Node::code("HTTP 200 OK")));
            doc.append(self.example_block(output)?);
            self.append_message_fields(&mut doc, output)?;
        }

        if !models.is_empty() {
            doc.append(Node::h2(Node::text("Models")));
            for (name, model) in &models {
                doc.append(Node::h3(Node::text(*name)));
                match model {
                    Model::Message(message) => self.append_message_fields(&mut doc, message)?,
                    Model::Enum(enum_type) => append_enum_values(&mut doc, enum_type),
                }
            }
        }

        doc.append(Node::h2(Node::text("Twirp Errors")));
        doc.append(error_codes_section());

        Ok(doc)
    }

    /// Record every message and enum reachable from the fields of `message`.
    ///
    /// Well-known types are skipped, map entries are walked but not listed.
    fn collect_models(&self, message: &'a Message, models: &mut Models<'a>) -> Result<(), SchemaError> {
        for field in &message.fields {
            match field.kind {
                Kind::Message => {
                    let type_name = field.referenced_type()?;
                    if is_known_type(type_name) || models.contains_key(type_name) {
                        continue;
                    }
                    let nested = self.schema.message(type_name)?;
                    if !field.is_map(self.schema) {
                        models.insert(&nested.full_name, Model::Message(nested));
                    }
                    self.collect_models(nested, models)?;
                }
                Kind::Enum => {
                    let enum_type = self.schema.enum_type(field.referenced_type()?)?;
                    models.insert(&enum_type.full_name, Model::Enum(enum_type));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn example_block(&self, message: &Message) -> Result<Node, GenerateError> {
        let example = self.examples.generate(&message.full_name)?;
        Ok(Node::code_block(example.to_json_string()?, Some("json")))
    }

    fn append_message_fields(&self, doc: &mut Document, message: &Message) -> Result<(), SchemaError> {
        doc.append_opt(description_block(message.comments.leading.as_deref()));

        let mut table = Table::new();
        table.add_column("Field", Align::Left);
        table.add_column("Type", Align::Center);
        table.add_column("Description", Align::Left);

        for field in &message.fields {
            table.append_row(vec![
                Node::code(&field.json_name),
                self.field_type(message, field)?,
                description_cell_text(field.comments.leading.as_deref())
                    .unwrap_or_else(|| Node::text("")),
            ]);
        }

        doc.append(table);
        Ok(())
    }

    /// Human-readable type of `field`, with links to model sections.
    fn field_type(&self, owner: &Message, field: &Field) -> Result<Node, SchemaError> {
        let node = match field.kind {
            Kind::Message => {
                let type_name = field.referenced_type()?;
                if let Some(label) = known_type_label(type_name) {
                    Node::text(label)
                } else if field.is_map(self.schema) {
                    let entry = self.schema.message(type_name)?;
                    let (key, value) = entry.map_fields()?;
                    Node::group(vec![
                        Node::text("map "),
                        self.field_type(entry, key)?,
                        Node::text(" to "),
                        self.field_type(entry, value)?,
                    ])
                } else {
                    Node::link_to_header(type_name, type_name)
                }
            }
            Kind::Enum => {
                let type_name = field.referenced_type()?;
                Node::link_to_header(type_name, type_name)
            }
            kind => Node::text(kind_label(kind).ok_or_else(|| SchemaError::UnknownKind {
                field: format!("{}.{}", owner.full_name, field.name),
                kind,
            })?),
        };

        if field.is_list(self.schema) {
            Ok(Node::group(vec![Node::text("array of "), node]))
        } else {
            Ok(node)
        }
    }
}

fn append_enum_values(doc: &mut Document, enum_type: &Enum) {
    doc.append_opt(description_block(enum_type.comments.leading.as_deref()));

    let mut table = Table::new();
    table.add_column("Value", Align::Left);
    table.add_column("Description", Align::Left);

    for value in &enum_type.values {
        let leading = description_cell_text(value.comments.leading.as_deref());
        let trailing = description_cell_text(value.comments.trailing.as_deref());
        let description = match (leading, trailing) {
            (Some(leading), Some(trailing)) => Node::group(vec![
                Node::cell_paragraph(vec![leading]),
                Node::cell_paragraph(vec![trailing]),
            ]),
            (Some(text), None) | (None, Some(text)) => text,
            (None, None) => Node::text(""),
        };
        table.append_row(vec![Node::code(&value.name), description]);
    }

    doc.append(table);
}

#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::known;
    use crate::schema::{Comments, Method};

    const BASE_URL: &str = "https://api.example.com/twirp";

    fn users_schema() -> Schema {
        Schema::new()
            .with_service(
                Service::new("acme.users.v1.Users")
                    .with_comments(Comments::leading(" Users manages accounts.\n"))
                    .with_method(
                        Method::new("GetUser", "acme.users.v1.GetUserRequest", "acme.users.v1.User")
                            .with_comments(Comments::leading(" Fetch a user.\n")),
                    ),
            )
            .with_message(
                Message::new("acme.users.v1.GetUserRequest").with_field(
                    Field::new("id", 1, Kind::String).with_comments(Comments::leading(" User ID.\n")),
                ),
            )
            .with_message(
                Message::new("acme.users.v1.User")
                    .with_comments(Comments::leading(" A registered user.\n"))
                    .with_field(Field::new("name", 1, Kind::String))
                    .with_field(Field::new("ids", 2, Kind::Int32).repeated())
                    .with_field(Field::enumeration("status", 3, "acme.users.v1.Status"))
                    .with_field(Field::message("profile", 4, "acme.users.v1.Profile")),
            )
            .with_message(
                Message::new("acme.users.v1.Profile").with_field(Field::new("bio", 1, Kind::String)),
            )
            .with_enum(
                Enum::new("acme.users.v1.Status")
                    .with_value("STATUS_UNSPECIFIED", 0)
                    .with_commented_value(
                        "STATUS_ACTIVE",
                        1,
                        Comments::leading(" Active.\n").with_trailing(" Can log in.\n"),
                    ),
            )
    }

    fn generate(schema: &Schema, service: &str) -> String {
        let service = schema.service(service).unwrap();
        let mut out = Vec::new();
        Generator::new(schema, BASE_URL)
            .generate_service_document(service, &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_service_document() {
        let schema = users_schema();
        let output = generate(&schema, "acme.users.v1.Users");
        let (head, errors) = output.split_once("## Twirp Errors\n").unwrap();

        assert_eq!(
            head,
            r#"# Users

`acme.users.v1.Users`

*Users manages accounts.*

### Methods

* [GetUser](#post-getuser)

### Models

* [acme.users.v1.Profile](#acmeusersv1profile)
* [acme.users.v1.Status](#acmeusersv1status)

---

## Methods

Base URL: `https://api.example.com/twirp/acme.users.v1.Users`

### POST `/GetUser`

*Fetch a user.*

#### Request

`acme.users.v1.GetUserRequest`

`POST /acme.users.v1.Users/GetUser`

```json
{
  "id": "foo"
}
```

| Field |  Type  | Description |
|:------|:------:|:------------|
| `id`  | string | User ID.    |

#### Response

`acme.users.v1.User`

`HTTP 200 OK`

```json
{
  "name": "foo",
  "ids": [
    1073741824,
    1073741824,
    1073741824
  ],
  "status": "STATUS_ACTIVE",
  "profile": {
    "bio": "foo"
  }
}
```

*A registered user.*

| Field     |                     Type                     | Description |
|:----------|:--------------------------------------------:|:------------|
| `name`    |                    string                    |             |
| `ids`     |                array of int32                |             |
| `status`  |  [acme.users.v1.Status](#acmeusersv1status)  |             |
| `profile` | [acme.users.v1.Profile](#acmeusersv1profile) |             |

## Models

### acme.users.v1.Profile

| Field |  Type  | Description |
|:------|:------:|:------------|
| `bio` | string |             |

### acme.users.v1.Status

| Value                | Description                  |
|:---------------------|:-----------------------------|
| `STATUS_UNSPECIFIED` |                              |
| `STATUS_ACTIVE`      | Active.<br/>Can log in.<br/> |

"#
        );
        assert!(errors.starts_with("\n[Official documentation]("));
        let last_row = errors.lines().last().unwrap();
        assert!(last_row.starts_with("| `dataloss`"));
        assert!(last_row.contains("| The operation resulted in unrecoverable data loss or corruption."));
    }

    #[test]
    fn test_output_is_deterministic() {
        let schema = users_schema();
        let first = generate(&schema, "acme.users.v1.Users");
        let second = generate(&schema, "acme.users.v1.Users");
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_field_rows() {
        let message = Message::new("acme.Req")
            .with_field(Field::new("name", 1, Kind::String))
            .with_field(Field::new("ids", 2, Kind::Int32).repeated());
        let schema = Schema::new().with_message(message.clone());
        let generator = Generator::new(&schema, BASE_URL);

        let mut doc = Document::new();
        generator.append_message_fields(&mut doc, &message).unwrap();
        let mut out = Vec::new();
        doc.generate(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "| Field  |      Type      | Description |\n\
             |:-------|:--------------:|:------------|\n\
             | `name` |     string     |             |\n\
             | `ids`  | array of int32 |             |\n"
        );
    }

    #[test]
    fn test_field_type_labels() {
        let schema = Schema::new()
            .with_message(Message::map_entry(
                "acme.User.LabelsEntry",
                Field::new("key", 1, Kind::String),
                Field::message("value", 2, "acme.Label"),
            ))
            .with_message(Message::new("acme.Label"));
        let owner = Message::new("acme.User");
        let generator = Generator::new(&schema, BASE_URL);
        let render = |field: Field| {
            generator
                .field_type(&owner, &field)
                .unwrap()
                .render_to_string()
                .unwrap()
        };

        assert_eq!(render(Field::new("count", 1, Kind::Uint64)), "uint64 as numeric string");
        assert_eq!(
            render(Field::message("at", 2, known::TIMESTAMP)),
            "datetime as nullable RFC3339 string"
        );
        assert_eq!(
            render(Field::message("ats", 3, known::TIMESTAMP).repeated()),
            "array of datetime as nullable RFC3339 string"
        );
        assert_eq!(
            render(Field::message("labels", 4, "acme.User.LabelsEntry").repeated()),
            "map string to [acme.Label](#acmelabel)"
        );
        assert_eq!(
            render(Field::enumeration("kinds", 5, "acme.Kind").repeated()),
            "array of [acme.Kind](#acmekind)"
        );
    }

    #[test]
    fn test_unknown_kind_in_field_type() {
        let schema = Schema::new();
        let owner = Message::new("acme.Legacy");
        let generator = Generator::new(&schema, BASE_URL);

        for kind in [Kind::Group, Kind::Unknown(19)] {
            let err = generator
                .field_type(&owner, &Field::new("old", 1, kind))
                .unwrap_err();
            assert_eq!(
                err,
                SchemaError::UnknownKind {
                    field: "acme.Legacy.old".to_owned(),
                    kind,
                }
            );
        }
    }

    #[test]
    fn test_unknown_kind_aborts_document() {
        let schema = Schema::new()
            .with_service(Service::new("acme.Svc").with_method(Method::new("Do", "acme.Req", "acme.Req")))
            .with_message(Message::new("acme.Req").with_field(Field::new("x", 1, Kind::Unknown(30))));

        let mut out = Vec::new();
        let err = Generator::new(&schema, BASE_URL)
            .generate_service_document(&schema.services()[0], &mut out)
            .unwrap_err();
        assert!(matches!(err, GenerateError::Schema(SchemaError::UnknownKind { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_models_collected_once_for_recursive_types() {
        let schema = Schema::new()
            .with_service(
                Service::new("acme.Tree").with_method(Method::new("Get", "acme.Req", "acme.Node")),
            )
            .with_message(Message::new("acme.Req").with_field(Field::message("root", 1, "acme.Node")))
            .with_message(
                Message::new("acme.Node")
                    .with_field(Field::message("children", 1, "acme.Node").repeated())
                    .with_field(Field::message("attrs", 2, "acme.Node.AttrsEntry").repeated())
                    .with_field(Field::message("created", 3, known::TIMESTAMP)),
            )
            .with_message(Message::map_entry(
                "acme.Node.AttrsEntry",
                Field::new("key", 1, Kind::String),
                Field::message("value", 2, "acme.Attr"),
            ))
            .with_message(Message::new("acme.Attr").with_field(Field::new("v", 1, Kind::String)))
            .with_message(
                Message::new(known::TIMESTAMP)
                    .with_field(Field::new("seconds", 1, Kind::Int64))
                    .with_field(Field::new("nanos", 2, Kind::Int32)),
            );

        let generator = Generator::new(&schema, BASE_URL);
        let mut models = Models::new();
        generator
            .collect_models(schema.message("acme.Req").unwrap(), &mut models)
            .unwrap();

        assert_eq!(
            models.keys().copied().collect::<Vec<_>>(),
            vec!["acme.Attr", "acme.Node"]
        );
    }

    #[test]
    fn test_no_models_section_without_references() {
        let schema = Schema::new()
            .with_service(Service::new("acme.Ping").with_method(Method::new("Ping", "acme.Empty", "acme.Empty")))
            .with_message(Message::new("acme.Empty"));

        let output = generate(&schema, "acme.Ping");
        assert!(!output.contains("### Models"));
        assert!(!output.contains("## Models"));
        assert!(output.contains("```json\n{}\n```\n"));
    }

    #[test]
    fn test_missing_method_type() {
        let schema = Schema::new()
            .with_service(Service::new("acme.Svc").with_method(Method::new("Do", "acme.Nope", "acme.Nope")));
        let err = Generator::new(&schema, BASE_URL)
            .build_service_document(&schema.services()[0])
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Schema(SchemaError::UnresolvedType(ref name)) if name == "acme.Nope"
        ));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_names_service() {
        let schema = users_schema();
        let err = Generator::new(&schema, BASE_URL)
            .generate_service_document(&schema.services()[0], &mut BrokenPipe)
            .unwrap_err();

        match err {
            GenerateError::Write { service, source } => {
                assert_eq!(service, "acme.users.v1.Users");
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
