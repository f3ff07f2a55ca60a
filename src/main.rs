use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablerelay_lib::data_transfer::connection_resolver::{
    open_sink, open_source, resolve_connection_by_id,
};
use tablerelay_lib::{make_safe_label_value, JobFile, TransferEngine, WriteMode, MAX_LABEL_LEN};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "tablerelay", about = "Copy a warehouse table into a relational table page by page", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the transfer described by a job file
    Run {
        /// Path to the job file (TOML)
        config: PathBuf,

        /// Override the job's write mode (insert or replace)
        #[arg(long)]
        mode: Option<WriteMode>,

        /// Override the job's page size
        #[arg(long)]
        batch_size: Option<usize>,

        /// Read and normalize every page without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a value cleaned up for use as a label
    SafeLabel {
        value: String,

        #[arg(long, default_value_t = MAX_LABEL_LEN)]
        max_length: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            mode,
            batch_size,
            dry_run,
        } => run(config, mode, batch_size, dry_run).await,
        Command::SafeLabel { value, max_length } => {
            println!("{}", make_safe_label_value(&value, max_length));
            Ok(())
        }
    }
}

async fn run(
    config: PathBuf,
    mode: Option<WriteMode>,
    batch_size: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    let mut job = JobFile::load(&config).map_err(|e| anyhow!(e))?;
    if let Some(mode) = mode {
        job.mode = mode;
    }
    if let Some(batch_size) = batch_size {
        job.batch_size = batch_size;
    }
    job.dry_run |= dry_run;
    job.validate().map_err(|e| anyhow!(e))?;

    let run_label = make_safe_label_value(
        &format!("{}-to-{}", job.source_table, job.destination_table),
        MAX_LABEL_LEN,
    );
    log::info!("Job '{}' loaded from {}", run_label, config.display());

    let source_connection = resolve_connection_by_id(&job.connections, &job.source_connection_id)
        .map_err(|e| anyhow!(e))?;
    let sink_connection = resolve_connection_by_id(&job.connections, &job.sink_connection_id)
        .map_err(|e| anyhow!(e))?;

    let source = open_source(&source_connection).map_err(|e| anyhow!(e))?;
    let sink = open_sink(&sink_connection, job.normalized_database())
        .await
        .map_err(|e| anyhow!(e))?;

    let cancellation = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancellation.clone()));

    let engine = TransferEngine::new(source, sink).with_cancellation(cancellation);
    let report = engine.run(&job.to_request()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        log::warn!("Interrupt received, stopping after the current batch");
        token.cancel();
    }
}
