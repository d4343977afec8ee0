//! Protobuf descriptor front end for `twirp-doc`.
//!
//! Converts `FileDescriptorProto`s into a [`twirp_doc::Schema`] and drives
//! the generator in two modes:
//!
//! - [`run_plugin`] answers a protoc `CodeGeneratorRequest` with one
//!   document per service, reporting failures in the response.
//! - [`generate_descriptor_set`] writes documents for a
//!   `FileDescriptorSet` produced by `protoc --descriptor_set_out`.
//!
//! Documents are placed next to their proto file as
//! `<dir>/<Service>.<extension>`.

mod error;
mod plugin;
mod resolve;
#[cfg(test)]
mod testing;

pub use error::ProtocError;
pub use plugin::{
    decode_descriptor_set, decode_request, encode_response, generate_descriptor_set, run_plugin,
};
pub use resolve::resolve_files;

pub use prost_types::FileDescriptorSet;
pub use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
