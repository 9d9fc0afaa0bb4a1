//! Binary entry point for threadkb.
//!
//! This binary serves the analysis endpoint and runs one-off analyses from
//! the command line.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use threadkb::io::{DEFAULT_EXPORT_FILE_NAME, Format};
use threadkb::models::{AnalyzeRequest, ModelConfigInput};
use threadkb::observability::{self, InitOptions};
use threadkb::{AnalysisService, AppConfig, rendering, server};

/// threadkb - Turn chat transcripts into problem/solution pairs.
#[derive(Parser)]
#[command(name = "threadkb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Address to bind (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze one chat transcript.
    Analyze {
        /// Transcript file; reads stdin when omitted or `-`.
        file: Option<PathBuf>,

        /// Model provider: openai or ollama.
        #[arg(long)]
        provider: Option<String>,

        /// Model name for the selected provider.
        #[arg(short, long)]
        model: Option<String>,

        /// Base URL of the local Ollama server.
        #[arg(long)]
        ollama_url: Option<String>,

        /// Output format: json, yaml, csv, or markdown.
        #[arg(short, long)]
        format: Option<String>,

        /// Write the export to a file instead of stdout.
        ///
        /// Given without a value, writes `chat-analysis-results.json`.
        #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE_NAME)]
        output: Option<PathBuf>,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let expose_metrics = matches!(cli.command, Commands::Serve { .. });
    if let Err(e) = observability::init_from_config(
        &config.observability,
        InitOptions {
            verbose: cli.verbose,
            metrics_expose: expose_metrics,
        },
    ) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => cmd_serve(config, host, port).await,

        Commands::Analyze {
            file,
            provider,
            model,
            ollama_url,
            format,
            output,
        } => {
            let overrides = ModelConfigInput {
                provider,
                openai_model: model.clone(),
                ollama_model: model,
                ollama_url,
            };
            cmd_analyze(&config, file, overrides, format, output).await
        },

        Commands::Config { show } => cmd_config(&config, show),

        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "threadkb", &mut io::stdout());
            Ok(())
        },
    }
}

/// Serve command.
async fn cmd_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = AnalysisService::from_config(&config);
    tracing::info!(
        provider = %service.defaults().provider,
        model = service.defaults().model_name(),
        "Default model configuration"
    );
    server::serve(&config.server, service).await?;
    Ok(())
}

/// Analyze command.
async fn cmd_analyze(
    config: &AppConfig,
    file: Option<PathBuf>,
    overrides: ModelConfigInput,
    format: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let format = match (format.as_deref(), output.as_deref()) {
        (Some(name), _) => name.parse::<Format>()?,
        (None, Some(path)) => Format::from_path(path)?,
        (None, None) => Format::Json,
    };

    let chat_text = read_transcript(file.as_deref())?;
    let request = AnalyzeRequest::new(chat_text).with_model_config(overrides);
    let result = AnalysisService::from_config(config).analyze(request).await?;
    let exported = threadkb::io::export(&result, format)?;

    match output {
        Some(path) => {
            std::fs::write(&path, exported)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                rendering::summarize(result.results().unwrap_or_default())
            );
            eprintln!("Saved results to {}", path.display());
        },
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{exported}")?;
            stdout.flush()?;
        },
    }

    Ok(())
}

/// Reads the transcript from `file`, or stdin for `None` and `-`.
fn read_transcript(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read transcript from stdin")?;
            Ok(text)
        },
    }
}

/// Config command.
fn cmd_config(config: &AppConfig, show: bool) -> anyhow::Result<()> {
    if show {
        print!("{}", config.to_redacted_toml()?);
    } else {
        println!("Use --show to display configuration");
    }
    Ok(())
}
