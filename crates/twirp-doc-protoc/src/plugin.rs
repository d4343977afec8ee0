//! protoc plugin protocol and descriptor set file mode.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use prost::Message as _;
use prost_types::compiler::code_generator_response::{self, Feature};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use twirp_doc::{Generator, Schema, Service};
use twirp_doc_config::Config;

use crate::error::ProtocError;
use crate::resolve::{qualify, resolve_files};

/// Decode a `CodeGeneratorRequest` as protoc writes it to plugin stdin.
///
/// # Errors
///
/// Returns [`ProtocError::Decode`] for malformed input.
pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest, ProtocError> {
    Ok(CodeGeneratorRequest::decode(bytes)?)
}

/// Decode a `FileDescriptorSet` written by `protoc --descriptor_set_out`.
///
/// # Errors
///
/// Returns [`ProtocError::Decode`] for malformed input.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<FileDescriptorSet, ProtocError> {
    Ok(FileDescriptorSet::decode(bytes)?)
}

/// Encode a response for protoc to read from plugin stdout.
pub fn encode_response(response: &CodeGeneratorResponse) -> Vec<u8> {
    response.encode_to_vec()
}

/// Answer a plugin request with one document per service.
///
/// Failures never escape: they are reported through the response `error`
/// field and no files are returned with them.
pub fn run_plugin(request: &CodeGeneratorRequest, config: &Config) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    match plugin_files(request, config) {
        Ok(files) => response.file = files,
        Err(err) => {
            tracing::debug!(error = %err, "Plugin request failed");
            response.error = Some(err.to_string());
        }
    }
    response
}

fn plugin_files(
    request: &CodeGeneratorRequest,
    config: &Config,
) -> Result<Vec<code_generator_response::File>, ProtocError> {
    let schema = resolve_files(&request.proto_file)?;
    let generator = Generator::new(&schema, &config.docs.base_url);

    let mut files = Vec::new();
    for job in jobs(&request.proto_file, &request.file_to_generate, &schema)? {
        let mut content = Vec::new();
        generator
            .generate_service_document(job.service, &mut content)
            .map_err(|source| ProtocError::Generate {
                file: job.proto_path.to_owned(),
                source,
            })?;

        files.push(code_generator_response::File {
            name: Some(job.output_path(config)),
            content: Some(String::from_utf8(content)?),
            ..Default::default()
        });
    }

    tracing::debug!(files = files.len(), "Generated plugin response");
    Ok(files)
}

/// Write documents for the services of `set` under `out_dir`.
///
/// An empty `files` filter selects every file of the set. Each document is
/// assembled before its output file is created, so schema errors leave no
/// file behind.
///
/// # Errors
///
/// Returns [`ProtocError`] if a filtered file is not in the set, the schema
/// is inconsistent or an output file cannot be written.
pub fn generate_descriptor_set(
    set: &FileDescriptorSet,
    files: &[String],
    config: &Config,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ProtocError> {
    let schema = resolve_files(&set.file)?;
    let generator = Generator::new(&schema, &config.docs.base_url);

    let targets: Vec<String> = if files.is_empty() {
        set.file.iter().map(|f| f.name().to_owned()).collect()
    } else {
        files.to_vec()
    };

    let mut written = Vec::new();
    for job in jobs(&set.file, &targets, &schema)? {
        let doc = generator
            .build_service_document(job.service)
            .map_err(|source| ProtocError::Generate {
                file: job.proto_path.to_owned(),
                source,
            })?;

        let path = out_dir.join(job.output_path(config));
        let result = write_file(&path, |w| doc.generate(w));
        if let Err(source) = result {
            // Best effort: the file may not exist if creation failed.
            let _ = fs::remove_file(&path);
            return Err(ProtocError::Io { path, source });
        }

        tracing::debug!(path = %path.display(), service = %job.service.full_name, "Wrote document");
        written.push(path);
    }
    Ok(written)
}

fn write_file(
    path: &Path,
    render: impl FnOnce(&mut dyn Write) -> std::io::Result<()>,
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    render(&mut writer)?;
    writer.flush()
}

/// One service to document, with the proto file that declares it.
struct Job<'a> {
    proto_path: &'a str,
    service: &'a Service,
}

impl Job<'_> {
    /// `<dir of proto file>/<Service>.<ext>`.
    fn output_path(&self, config: &Config) -> String {
        let name = config.output_file_name(&self.service.name);
        match self.proto_path.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{name}"),
            None => name,
        }
    }
}

fn jobs<'a>(
    files: &'a [FileDescriptorProto],
    targets: &'a [String],
    schema: &'a Schema,
) -> Result<Vec<Job<'a>>, ProtocError> {
    let mut jobs = Vec::new();
    for target in targets {
        let file = files
            .iter()
            .find(|f| f.name() == target)
            .ok_or_else(|| ProtocError::MissingFile(target.clone()))?;

        for descriptor in &file.service {
            let full_name = qualify(file.package(), descriptor.name());
            let service = schema
                .service(&full_name)
                .ok_or_else(|| ProtocError::MissingFile(format!("{target} ({full_name})")))?;
            jobs.push(Job {
                proto_path: file.name(),
                service,
            });
        }
    }
    Ok(jobs)
}
