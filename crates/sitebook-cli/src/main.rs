//! SiteBook CLI entry point.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use sitebook_cli::cli::Cli;
use sitebook_cli::commands;
use sitebook_cli::config::{self, Settings, ENV_FILE};

fn main() {
    // Load .env.local if it exists (SITEBOOK_BACKEND_URL, SITEBOOK_API_TOKEN etc.)
    let _ = dotenvy::from_filename(ENV_FILE);

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let state_dir = config::state_dir(cli.state_dir.clone());
    config::load_state_env(&state_dir);

    let result = Settings::resolve(
        state_dir,
        cli.backend.clone(),
        cli.token.clone(),
        Duration::from_secs(cli.timeout),
    )
    .map_err(Into::into)
    .and_then(|settings| commands::execute(cli.command, &settings));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
