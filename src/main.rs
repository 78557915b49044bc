use anyhow::Context;
use serde_json::json;
use std::sync::Arc;
use uniledger::config::{CacheBackend, Config};
use uniledger::{init_db, FileDataSource, InMemoryPnlCache, PnlCache, PnlEngine, Repository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let source = Arc::new(
        FileDataSource::load(&config.snapshot_path)
            .await
            .with_context(|| format!("loading snapshot {}", config.snapshot_path))?,
    );

    let cache: Arc<dyn PnlCache> = match config.cache_backend {
        CacheBackend::Memory => Arc::new(InMemoryPnlCache::new()),
        CacheBackend::Sqlite => {
            let path = config
                .database_path
                .as_deref()
                .context("DATABASE_PATH is required for the sqlite cache")?;
            let pool = init_db(path)
                .await
                .with_context(|| format!("initializing database {}", path))?;
            Arc::new(Repository::new(pool))
        }
    };

    let engine = PnlEngine::new(source.clone(), source.clone(), source.clone(), cache);

    let ids = source.position_ids();
    tracing::info!("Computing PnL for {} positions", ids.len());

    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        let pnl = engine
            .get_pnl_breakdown(id)
            .await
            .with_context(|| format!("computing PnL for {}", id))?;
        let apr = if config.apr_enabled {
            Some(
                engine
                    .get_apr_breakdown(id, Some(pnl.unclaimed_fees))
                    .await
                    .with_context(|| format!("computing APR for {}", id))?,
            )
        } else {
            None
        };
        results.push(json!({ "pnl": pnl, "apr": apr }));
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
