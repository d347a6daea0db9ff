use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use brandscope_api::{router, ApiState};
use brandscope_common::observability::{init_logging, LogConfig};
use brandscope_config::{BrandscopeConfig, BrandscopeConfigLoader};
use brandscope_ingest::Ingestor;
use brandscope_scrape::{HttpFetcher, MetadataExtractor};
use brandscope_store::WebsiteStore;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "brandscope", version, about = "Website brand metadata ingestion service")]
struct Args {
    /// Path to the YAML configuration file. Optional; environment variables
    /// with the BRANDSCOPE_ prefix apply either way.
    #[arg(long, default_value = "brandscope.yaml")]
    config: String,

    /// Override the configured listen address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let cfg: BrandscopeConfig = BrandscopeConfigLoader::new().with_file(&args.config).load()?;

    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    let bind = args.bind.unwrap_or_else(|| cfg.server.bind.clone());

    let store = WebsiteStore::connect(&cfg.database.url).await?;
    store.migrate().await?;

    let fetcher = HttpFetcher::new(
        &cfg.scrape.user_agent,
        Duration::from_millis(cfg.scrape.timeout_ms),
    )?;
    let extractor = MetadataExtractor::new(Arc::new(fetcher));
    let ingestor = Ingestor::new(store.clone(), extractor);
    let app = router(ApiState::new(ingestor, store));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %bind, database = %cfg.database.url, "app.listening");
    axum::serve(listener, app).await?;
    Ok(())
}
