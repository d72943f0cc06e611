//! dualtext CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dualtext::{DocumentRequest, DualtextError, ExtractionConfig, Orchestrator, ProcessOutput, ProcessingMode};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// CLI enum for processing mode
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Run the text-layer and OCR strategies at the same time
    Concurrent,
    /// Run the text layer first, then OCR
    Sequential,
}

impl From<CliMode> for ProcessingMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Concurrent => ProcessingMode::Concurrent,
            CliMode::Sequential => ProcessingMode::Sequential,
        }
    }
}

/// CLI enum for output format
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Extracted text only
    #[default]
    Text,
    /// `{text, strategy_used, error}` as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "dualtext", version)]
#[command(about = "Extract text from PDFs and images via the text layer and OCR", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a single document
    Extract {
        /// Path to a PDF or image
        path: Option<PathBuf>,

        /// Base64-encoded document (a data URI is accepted)
        #[arg(long)]
        base64: Option<String>,

        /// Document URL (http or https)
        #[arg(long)]
        url: Option<String>,

        /// Read the document bytes from stdin
        #[arg(long)]
        stdin: bool,

        /// Processing mode (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<CliMode>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Timeout in seconds for the whole request
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Configuration file (TOML, YAML or JSON); defaults to a discovered dualtext.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tesseract language, e.g. "eng" or "eng+deu"
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Configuration file (TOML, YAML or JSON); defaults to a discovered dualtext.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            let code = err.downcast_ref::<DualtextError>().map(exit_code).unwrap_or(1);
            eprintln!("Error: {:#}", err);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Config { config } => {
            let config = load_config(config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Extract {
            path,
            base64,
            url,
            stdin,
            mode,
            format,
            timeout,
            config,
            language,
        } => {
            let mut config = load_config(config)?;
            if let Some(seconds) = timeout {
                config.timeout_secs = Some(seconds);
            }
            if let Some(language) = language {
                config.ocr.language = language;
            }
            let mode = mode.map(ProcessingMode::from).unwrap_or(config.mode);

            let bytes = if stdin {
                let mut buffer = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buffer)
                    .context("Failed to read document from stdin")?;
                Some(buffer)
            } else {
                None
            };

            let source = DocumentRequest {
                path,
                bytes,
                base64,
                url,
            }
            .into_source()?;

            let orchestrator = Orchestrator::new(config)?;
            let outcome = orchestrator.process(source, mode).await;
            let code = match &outcome {
                Ok(_) => 0,
                Err(err) => exit_code(err),
            };

            match format {
                OutputFormat::Json => {
                    let output = ProcessOutput::from(outcome);
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => match outcome {
                    Ok(result) => {
                        for failure in &result.suppressed {
                            eprintln!("Warning: {}: {}", failure.strategy, failure.message);
                        }
                        tracing::debug!(strategy_used = %result.strategy_used, "writing extracted text");
                        println!("{}", result.text);
                    }
                    Err(err) => eprintln!("Error: {}", err),
                },
            }

            Ok(ExitCode::from(code))
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ExtractionConfig> {
    let config = match path {
        Some(path) => ExtractionConfig::from_file(&path)?,
        None => ExtractionConfig::discover()?.unwrap_or_default(),
    };
    Ok(config.with_env_overrides())
}

fn exit_code(error: &DualtextError) -> u8 {
    match error {
        DualtextError::Validation { .. } | DualtextError::UnsupportedFormat(_) => 2,
        DualtextError::NotFound { .. } => 3,
        DualtextError::Combined { .. } => 4,
        DualtextError::Timeout { .. } => 5,
        DualtextError::Fetch { .. } => 6,
        _ => 1,
    }
}
