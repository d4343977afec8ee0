//! File mode: document a `FileDescriptorSet` into a directory.

use std::path::{Path, PathBuf};

use twirp_doc_config::{CliSettings, Config};
use twirp_doc_protoc::{decode_descriptor_set, generate_descriptor_set};

use crate::error::CliError;
use crate::output::Output;

pub(crate) struct GenerateArgs<'a> {
    pub descriptor_set: &'a Path,
    pub files: &'a [String],
    pub output_dir: &'a Path,
    pub config: Option<&'a Path>,
}

/// Write one document per service and report each written path.
pub(crate) fn execute(
    args: &GenerateArgs<'_>,
    flags: &CliSettings,
) -> Result<Vec<PathBuf>, CliError> {
    let output = Output::new();
    let config = Config::load(args.config, Some(flags))?;
    if let Some(line) = config_line(&config) {
        output.info(&line);
    }

    let bytes = std::fs::read(args.descriptor_set).map_err(|source| CliError::Read {
        path: args.descriptor_set.to_path_buf(),
        source,
    })?;
    let set = decode_descriptor_set(&bytes)?;

    let written = generate_descriptor_set(&set, args.files, &config, args.output_dir)?;
    if written.is_empty() {
        output.info("No services found");
    }
    for path in &written {
        output.success(&format!("Wrote {}", path.display()));
    }
    Ok(written)
}

/// Status line naming the loaded config file, if one was used.
fn config_line(config: &Config) -> Option<String> {
    config
        .config_path
        .as_ref()
        .map(|path| format!("Using config {}", path.display()))
}
