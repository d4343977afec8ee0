//! Plugin mode: `CodeGeneratorRequest` on stdin, response on stdout.

use std::io::{Read, Write};
use std::path::Path;

use twirp_doc_config::{CliSettings, Config};
use twirp_doc_protoc::{CodeGeneratorResponse, decode_request, encode_response, run_plugin};

use crate::error::CliError;

/// Serve one protoc invocation over stdin and stdout.
pub(crate) fn execute(config_path: Option<&Path>, flags: CliSettings) -> Result<(), CliError> {
    let mut input = Vec::new();
    std::io::stdin().lock().read_to_end(&mut input)?;

    let output = respond(&input, config_path, flags)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}

/// Encoded response for an encoded request.
///
/// Configuration problems, including a malformed plugin parameter, are
/// reported to protoc through the response rather than as a process error.
pub(crate) fn respond(
    input: &[u8],
    config_path: Option<&Path>,
    flags: CliSettings,
) -> Result<Vec<u8>, CliError> {
    let request = decode_request(input)?;
    tracing::debug!(
        files = request.file_to_generate.len(),
        parameter = request.parameter(),
        "Received plugin request"
    );

    let config = CliSettings::from_plugin_parameter(request.parameter())
        .map(|settings| settings.merged(flags))
        .and_then(|settings| Config::load(config_path, Some(&settings)));

    let response = match config {
        Ok(config) => {
            tracing::debug!(
                config = ?config.config_path,
                base_url = %config.docs.base_url,
                "Loaded configuration"
            );
            run_plugin(&request, &config)
        }
        Err(err) => CodeGeneratorResponse {
            error: Some(err.to_string()),
            ..Default::default()
        },
    };
    Ok(encode_response(&response))
}
