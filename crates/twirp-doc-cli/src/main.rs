//! `protoc-gen-twirp-doc` - markdown docs for Twirp services.
//!
//! Runs as a protoc plugin when started without `--descriptor-set`:
//!
//! ```text
//! protoc --twirp-doc_out=docs --twirp-doc_opt=base_url=https://api.acme.dev/twirp users.proto
//! ```
//!
//! With `--descriptor-set` it documents a prebuilt `FileDescriptorSet`
//! (`protoc --include_source_info --descriptor_set_out=set.pb`).

mod error;
mod generate;
mod output;
mod plugin;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use twirp_doc_config::CliSettings;

use generate::GenerateArgs;
use output::Output;

/// Generate markdown reference documentation for Twirp services.
#[derive(Debug, Parser)]
#[command(name = "protoc-gen-twirp-doc", version, about)]
struct Cli {
    /// Document a FileDescriptorSet instead of serving a protoc request on stdin.
    #[arg(short, long, value_name = "FILE")]
    descriptor_set: Option<PathBuf>,

    /// Only document this proto file (repeatable, file mode only).
    #[arg(short, long = "file", value_name = "PROTO", requires = "descriptor_set")]
    files: Vec<String>,

    /// Directory for generated documents (file mode only).
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Base URL of the Twirp routes (overrides config and plugin parameter).
    #[arg(long, env = "TWIRP_DOC_BASE_URL")]
    base_url: Option<String>,

    /// Extension of generated files (overrides config and plugin parameter).
    #[arg(long)]
    extension: Option<String>,

    /// Path to configuration file (default: auto-discover twirp-doc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> CliSettings {
        CliSettings {
            base_url: self.base_url.clone(),
            extension: self.extension.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise RUST_LOG decides
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.descriptor_set {
        Some(descriptor_set) => generate::execute(
            &GenerateArgs {
                descriptor_set,
                files: &cli.files,
                output_dir: &cli.output_dir,
                config: cli.config.as_deref(),
            },
            &cli.settings(),
        )
        .map(drop),
        None => plugin::execute(cli.config.as_deref(), cli.settings()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
