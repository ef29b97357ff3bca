use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use linemap_core::source::DwarfSymbolSource;
use linemap_core::{BuildOptions, EmbedMode, LineMapBuilder, LineMapError, Result as LineMapResult};
use linemap_utils::{error, info, init_logging_with_config, LogFormat, LogLevel, LoggingConfig};

/// Extract a source line map from a module's debug information and embed it
/// into the module (or write it next to it) so stripped release builds can
/// still report file and line numbers.
#[derive(Parser, Debug)]
#[command(name = "linemap")]
#[command(version)]
#[command(about = "Embed compact source line maps into release binaries", long_about = None)]
struct Cli
{
    /// Module (executable or shared library) to process
    module: Option<PathBuf>,

    /// Also write a human-readable <MODULE>.linemapreport
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Write the map to a <MODULE>.lmp side-car file
    #[arg(long, default_value_t = false, overrides_with_all = ["resource", "api_resource"])]
    file: bool,

    /// Embed the map into the module image (default)
    #[arg(long, default_value_t = false, overrides_with_all = ["file", "api_resource"])]
    resource: bool,

    /// Same as --resource
    #[arg(long = "api-resource", default_value_t = false, overrides_with_all = ["file", "resource"])]
    api_resource: bool,

    /// Write the result here instead of next to (or into) the module
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format (pretty or json); overrides LINEMAP_LOG_FORMAT
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli
{
    fn build_options(&self) -> BuildOptions
    {
        BuildOptions {
            mode: if self.file { EmbedMode::File } else { EmbedMode::Resource },
            report: self.report,
            output: self.out.clone(),
        }
    }
}

fn main() -> ExitCode
{
    let cli = Cli::parse_from(normalize_args(env::args()));

    let Some(module) = cli.module.clone() else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    // Held until exit so buffered file output is flushed
    let config = LoggingConfig::from_env()
        .with_level(cli.log_level)
        .with_format(cli.log_format);
    let _guard = match init_logging_with_config(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(module, cli.build_options()) {
        Ok(written) => {
            info!("Line map written to {}", written.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(module: PathBuf, options: BuildOptions) -> LineMapResult<PathBuf>
{
    let mut builder = LineMapBuilder::new(module, options)?;
    info!("Loading symbols for {}", builder.module().display());

    let source = DwarfSymbolSource::open(builder.module())
        .map_err(|err| LineMapError::SymbolEnumerationFailed(err.to_string()))?;
    builder.run(&source)
}

/// Rewrite the slash-style switches of older build scripts into clap flags.
///
/// `/out:"C:\out dir\app.exe"` becomes `--out` followed by the unquoted path.
/// Anything that is not a known switch passes through untouched, so absolute
/// Unix module paths are safe.
fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String>
{
    let mut normalized = Vec::new();
    for arg in args {
        let lower = arg.to_ascii_lowercase();
        let flag = match lower.as_str() {
            "/report" => "--report",
            "/file" => "--file",
            "/resource" => "--resource",
            "/apiresource" => "--api-resource",
            "/?" | "/h" => "--help",
            _ if lower.starts_with("/out:") => {
                normalized.push("--out".to_string());
                normalized.push(arg["/out:".len()..].trim_matches('"').to_string());
                continue;
            }
            _ => {
                normalized.push(arg);
                continue;
            }
        };
        normalized.push(flag.to_string());
    }
    normalized
}
