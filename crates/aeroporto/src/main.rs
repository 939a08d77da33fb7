// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use aeroporto::config::Config;

#[derive(Parser)]
#[command(
    name = "aeroporto",
    version,
    about = "Airport ground-control coordination simulator."
)]
struct Cli {
    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = cli.config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    if let Err(e) = aeroporto::run::run(cli.config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
