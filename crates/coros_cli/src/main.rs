use clap::Parser;
use coros_cli::args::Cli;
use coros_client::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `COROS_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("COROS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    // Keep connection-pool internals quiet by default
    let combined_filter = format!("{},hyper_util=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper_util=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("coros: log filter: {}", log_env);

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let mut stdout = std::io::stdout().lock();
    coros_cli::run(cli, config, &mut stdout).await
}
