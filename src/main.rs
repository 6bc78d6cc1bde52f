#![allow(non_snake_case)]

use std::env;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use eventBackend::cli;
use eventBackend::config::{ApiSettings, AppConfig};
use eventBackend::runtime;

const DEFAULT_RUN_MODE: &str = "cli";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path)?,
        Err(_) => AppConfig::default(),
    };

    let run_mode = config
        .get_prop("RUN_MODE")
        .unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "api" {
        let settings = ApiSettings::from_config(&config)?;
        runtime::run_api(settings)
            .await
            .context("event api stopped")?;
    } else if run_mode == "cli" {
        cli::cli(config).await?;
    } else {
        bail!("Invalid run mode {}", run_mode);
    }
    Ok(())
}
