use clap::Parser;
use karaoke_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  karaoke_lib::run(Cli::parse()).await
}
