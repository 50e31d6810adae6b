use anyhow::Result;
use clap::{Parser, ValueEnum};
use fhirload::api::http::FhirHttpClient;
use fhirload::config::{RunArgs, RunConfig};
use fhirload::resource;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Load FHIR resources through a terminology service.
///
/// `post` creates every resource found under INPUT_DIR; `delete` removes each
/// resource's own version and its HEAD version.
///
/// Example:
///   fhirload post 891b4b17feab99f3ff7e5b5d04ccc5da7aa96da6 ./codesystems/ http://localhost:8080/orgs/HL7/CodeSystem/
#[derive(Parser, Debug)]
#[command(name = "fhirload", version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    run: RunArgs,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_path.display(), e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // Dependencies (hyper, rustls) only above warn
    let filter = EnvFilter::new(format!("warn,fhirload={}", tracing_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("fhirload started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("fhirload").join("fhirload.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".fhirload").join("fhirload.log");
    }
    PathBuf::from("fhirload.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = RunConfig::from_args(&args.run)?;
    tracing::info!(
        "Operation: {}, input: {}, base URL: {}, force: {}",
        config.operation.as_str(),
        config.input_dir.display(),
        config.base_url,
        config.force
    );

    let client = FhirHttpClient::new(&config)?;
    let payloads = resource::load_payloads(&config.input_dir)?;

    let summary = resource::run(&config, &client, &payloads).await?;
    println!("{}", summary.totals_line());

    Ok(())
}
