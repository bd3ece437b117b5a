use clap::Parser;
use newsrelay::{Config, Engine, Result, Store, logging};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log at debug level, overriding the `debug` config flag
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    logging::init_tracing(args.debug || config.debug);

    info!("Loaded configuration from {}", args.config.display());
    let store = Store::open(&config.database)?;
    let engine = Arc::new(Engine::from_config(&config, store).await?);

    let running = Arc::clone(&engine);
    let mut run = tokio::spawn(async move { running.run().await });

    let interrupted = tokio::select! {
        result = &mut run => {
            match result {
                Ok(Ok(())) => info!("All services stopped"),
                Ok(Err(e)) => error!("Engine failed: {}", e),
                Err(e) => error!("Engine task failed: {}", e),
            }
            false
        }
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
            true
        }
    };

    engine.stop().await;
    if interrupted && let Ok(Err(e)) = run.await {
        error!("Engine failed during shutdown: {}", e);
    }
    Ok(())
}
