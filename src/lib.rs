pub mod cli;
pub mod core;
pub mod providers;

use anyhow::Result;
use tracing::{debug, info};

pub async fn run(days: u32, config_path: Option<&str>) -> Result<()> {
    info!("pbrates starting...");

    let config = crate::core::config::AppConfig::load(config_path)?;
    debug!("Loaded config: {config:#?}");

    crate::cli::rates::run(&config, days).await
}
