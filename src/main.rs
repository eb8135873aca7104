use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use geoalert::config::GeoAlertConfig;
use geoalert::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = GeoAlertConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);

    web::run(config).await
}

fn init_tracing(config: &GeoAlertConfig) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
