use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use deep_researcher::cli::Args;
use deep_researcher::research::workflow::launch;

fn init_tracing(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 中的凭证需要在构建默认配置之前加载
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let topic = args.topic.clone();
    let config = args.into_config()?;
    init_tracing(config.verbose)?;

    launch(&config, &topic).await?;
    Ok(())
}
