// validasexo - declared sex validation service and CLI

mod exit_codes;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use validasexo_config::Settings;
use validasexo_model::{first_name, ArtifactClassifier, SexClassifier};
use validasexo_recon::Status;
use validasexo_server::http::{output_filename, router, AppState};
use validasexo_server::pipeline;

use exit_codes::{EXIT_INPUT, EXIT_IO, EXIT_MODEL, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "validasexo")]
#[command(about = "Validate declared sex against first-name predictions")]
#[command(version)]
struct Cli {
    /// Model artifact, overriding MODEL_GENERO / MODEL_PATH
    #[arg(long, global = true, value_name = "PATH")]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Listen address, overriding VALIDASEXO_BIND
        #[arg(long)]
        bind: Option<String>,
    },

    /// Annotate a table offline and write the XLSX result
    Validate {
        /// Input spreadsheet or CSV file
        input: PathBuf,

        /// Output file (default: <input stem>_validado.xlsx next to the input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the prediction for each name as a JSON line
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message }) => {
            eprintln!("error: {message}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::load().map_err(|e| CliError::usage(e.to_string()))?;
    if let Some(model) = cli.model {
        settings.model_path = model;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            let addr = settings.bind_addr().map_err(|e| CliError::usage(e.to_string()))?;
            let classifier = load_classifier(&settings.model_path)?;
            cmd_serve(addr, &settings, classifier).map_err(|e| CliError::io(format!("{e:#}")))
        }
        Commands::Validate { input, output } => {
            let classifier = load_classifier(&settings.model_path)?;
            cmd_validate(&input, output, classifier.as_ref())
        }
        Commands::Classify { names } => {
            let classifier = load_classifier(&settings.model_path)?;
            cmd_classify(&names, classifier.as_ref())
        }
    }
}

fn load_classifier(path: &Path) -> Result<Arc<dyn SexClassifier>, CliError> {
    let classifier = ArtifactClassifier::load(path).map_err(|e| CliError::model(e.to_string()))?;
    Ok(Arc::new(classifier))
}

// ============================================================================
// serve
// ============================================================================

fn cmd_serve(addr: SocketAddr, settings: &Settings, classifier: Arc<dyn SexClassifier>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async {
        let app = router(AppState::new(classifier), settings.max_upload_bytes);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind to {addr}"))?;
        tracing::info!(%addr, model = %settings.model_path.display(), "validasexo listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(input: &Path, output: Option<PathBuf>, classifier: &dyn SexClassifier) -> Result<(), CliError> {
    let bytes = std::fs::read(input).map_err(|e| CliError::io(format!("{}: {}", input.display(), e)))?;

    let processed = pipeline::process_file(&bytes, classifier).map_err(|e| {
        if e.is_user_error() {
            CliError::input(e.to_string())
        } else {
            CliError::io(e.to_string())
        }
    })?;

    let output = output.unwrap_or_else(|| {
        let uploaded = input.file_name().map(|n| n.to_string_lossy().into_owned());
        input.with_file_name(output_filename(uploaded.as_deref()))
    });
    std::fs::write(&output, &processed.xlsx).map_err(|e| CliError::io(format!("{}: {}", output.display(), e)))?;

    let summary = &processed.summary;
    println!("source:   {}", processed.source);
    println!("rows:     {}", summary.total);
    for status in Status::ALL {
        println!("{:<9} {}", status.as_str(), summary.count(status));
    }
    println!("output:   {}", output.display());
    Ok(())
}

// ============================================================================
// classify
// ============================================================================

fn cmd_classify(names: &[String], classifier: &dyn SexClassifier) -> Result<(), CliError> {
    for name in names {
        let prediction = classifier.classify_with_proba(&first_name(Some(name)));
        let line = serde_json::to_string(&prediction).map_err(|e| CliError::io(e.to_string()))?;
        println!("{line}");
    }
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into() }
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MODEL, message: msg.into() }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into() }
    }
}
