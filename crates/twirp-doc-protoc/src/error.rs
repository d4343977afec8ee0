use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use twirp_doc::{GenerateError, SchemaError};

/// Failure while turning descriptors into documents.
#[derive(Debug, thiserror::Error)]
pub enum ProtocError {
    #[error("failed to decode protobuf input: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("file {0} is not part of the descriptor input")]
    MissingFile(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{file}: {}", describe(.source))]
    Generate {
        file: String,
        #[source]
        source: GenerateError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("generated document is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Schema problems are labelled as such; other failures speak for themselves.
fn describe(err: &GenerateError) -> String {
    match err {
        GenerateError::Schema(schema) => format!("schema: {schema}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_error_labels_schema_failures() {
        let err = ProtocError::Generate {
            file: "acme/users.proto".to_owned(),
            source: GenerateError::Schema(SchemaError::UnresolvedType("acme.User".to_owned())),
        };
        assert_eq!(err.to_string(), "acme/users.proto: schema: unresolved type acme.User");
    }

    #[test]
    fn test_generate_error_write_failure_not_labelled_schema() {
        let err = ProtocError::Generate {
            file: "acme/users.proto".to_owned(),
            source: GenerateError::Write {
                service: "acme.Users".to_owned(),
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            },
        };
        let message = err.to_string();
        assert!(message.starts_with("acme/users.proto: failed to write document for service acme.Users"));
        assert!(!message.contains("schema:"));
    }
}
