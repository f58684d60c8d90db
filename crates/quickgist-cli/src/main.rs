use clap::Parser;
use eyre::Result;

use quickgist_cli::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tokio::select! {
        result = quickgist_cli::run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            Err(eyre::eyre!("interrupted"))
        }
    }
}
