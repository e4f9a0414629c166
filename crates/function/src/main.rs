//! krm-exec - Pipeline function entry point
//! Reads a ResourceList on stdin, runs one adapter, writes the ResourceList to stdout

mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use krm_exec_core::application::{AdapterKind, AdapterOutcome, ExecAdapter, StreamFormat};
use krm_exec_core::domain::ResourceList;
use krm_exec_core::port::time_provider::SystemTimeProvider;
use krm_exec_infra_system::{TokioProcessRunner, TracingLogSink};
use settings::SettingsOverrides;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "krm-exec")]
#[command(about = "Run clusterctl / kpt as configuration pipeline functions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an adapter over the ResourceList read from stdin
    Run {
        /// Adapter name (clusterctl, live, kpt)
        adapter: AdapterKind,

        /// Executable to run instead of the adapter's default
        #[arg(long, env = "KRM_EXEC_BINARY")]
        binary: Option<String>,

        /// Path inline configuration is staged to
        #[arg(long, env = "KRM_EXEC_CONFIG_PATH")]
        config_path: Option<String>,

        /// stdin payload format (resource-list, resource-list-json, yaml)
        #[arg(long, env = "KRM_EXEC_INPUT_FORMAT")]
        input_format: Option<StreamFormat>,
    },

    /// Print usage of an adapter
    Usage {
        /// Adapter name (clusterctl, live, kpt)
        adapter: AdapterKind,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 1. Initialize logging (stderr only: stdout carries the ResourceList)
    init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Usage { adapter } => {
            println!("{}", adapter.profile().usage);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            adapter,
            binary,
            config_path,
            input_format,
        } => {
            let overrides = SettingsOverrides {
                binary,
                config_path,
                input_format,
            };
            run_function(adapter, overrides).await
        }
    }
}

fn init_logging() -> Result<()> {
    let log_format = std::env::var("KRM_EXEC_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("krm_exec=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Development: human readable
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

async fn run_function(kind: AdapterKind, overrides: SettingsOverrides) -> Result<ExitCode> {
    info!(adapter = %kind, "krm-exec v{} starting", VERSION);

    // 2. Read the pipeline input
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read ResourceList from stdin")?;
    let list: ResourceList =
        serde_yaml::from_str(&input).context("Failed to parse ResourceList from stdin")?;
    let mut collection = list
        .into_collection()
        .context("Invalid ResourceList on stdin")?;

    // 3. Wire the adapter
    let profile = kind.profile();
    let settings = settings::resolve(&profile, overrides);
    let runner = Arc::new(TokioProcessRunner::new(Arc::new(SystemTimeProvider)));
    let log = Arc::new(TracingLogSink::new(kind.name()));
    let adapter = ExecAdapter::new(profile, settings, runner, log);

    // 4. Run (never fails: errors land in the results)
    match adapter.run(&mut collection).await {
        AdapterOutcome::Skipped(reason) => info!(adapter = %kind, reason = %reason, "Adapter skipped"),
        AdapterOutcome::Completed { ingested, .. } => {
            info!(adapter = %kind, ingested, "Adapter completed")
        }
        AdapterOutcome::Failed(message) => info!(adapter = %kind, error = %message, "Adapter failed"),
    }

    // 5. Emit the pipeline output
    let failed = collection.has_errors();
    let output = serde_yaml::to_string(&ResourceList::from(collection))
        .context("Failed to serialize ResourceList")?;
    let mut stdout = tokio::io::stdout();
    stdout.write_all(output.as_bytes()).await?;
    stdout.flush().await?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
