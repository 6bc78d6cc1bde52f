use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{AppConfig, AssistantSettings, StoreBackend};
use crate::models::event::EventRecord;
use crate::runtime::build_store;
use crate::service::assistant_service::OpenAIAssistantService;
use crate::service::event_service::EventService;
use crate::service::output_writer::write_results;
use crate::service::spreadsheet::read_rows;
use crate::tasks::normalize_job::{NormalizeOptions, run_normalization};

#[derive(Parser)]
#[command(about = "Event backend command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send spreadsheet rows to the assistant in batches and save its answers.
    Normalize {
        #[arg(long, default_value = "events.xlsx")]
        input: PathBuf,
        #[arg(long, default_value = "normalized_events.json")]
        output: PathBuf,
        #[arg(long, default_value = "10")]
        batch_size: NonZeroUsize,
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
        #[arg(long, default_value_t = 3)]
        poll_interval_secs: u64,
    },
    /// Store one event given as a JSON object.
    Create { payload: String },
    /// Print every stored event.
    List,
}

pub async fn cli(config: AppConfig) -> Result<()> {
    // Fine to exit here on bad arguments
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize {
            input,
            output,
            batch_size,
            timeout_secs,
            poll_interval_secs,
        } => {
            let options = NormalizeOptions {
                batch_size,
                timeout: Duration::from_secs(timeout_secs),
                poll_interval: Duration::from_secs(poll_interval_secs),
            };
            normalize(&config, &input, &output, &options).await
        }
        Commands::Create { payload } => create_event(&config, &payload).await,
        Commands::List => list_events(&config).await,
    }
}

async fn normalize(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    options: &NormalizeOptions,
) -> Result<()> {
    let settings = AssistantSettings::from_config(config)?;
    let assistant = OpenAIAssistantService::new(
        settings.api_key,
        settings.assistant_id,
        settings.base_url,
    );

    let rows = read_rows(input).with_context(|| format!("reading {}", input.display()))?;
    info!(rows = rows.len(), input = %input.display(), "loaded spreadsheet");

    // Results only reach disk once every batch is done.
    let report = tokio::select! {
        report = run_normalization(&assistant, rows, options) => report?,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, no output written");
            bail!("normalization interrupted");
        }
    };

    write_results(output, &report.results)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(output = %output.display(), "all done, results saved");
    Ok(())
}

async fn event_service(config: &AppConfig) -> Result<EventService> {
    let backend = StoreBackend::from_config(config)?;
    let store = build_store(&backend).await?;
    Ok(EventService::new(store))
}

async fn create_event(config: &AppConfig, payload: &str) -> Result<()> {
    let Value::Object(document) = serde_json::from_str(payload).context("parsing event payload")? else {
        bail!("event payload must be a JSON object");
    };
    let service = event_service(config).await?;
    let event_id = service.create(document).await?;
    println!("Event created: {}", event_id);
    Ok(())
}

async fn list_events(config: &AppConfig) -> Result<()> {
    let service = event_service(config).await?;
    let events = service.list().await?;
    if events.is_empty() {
        println!("No events stored");
    }
    for event in &events {
        println!("{}", EventRecord::from_document(event).summary_line());
    }
    Ok(())
}
