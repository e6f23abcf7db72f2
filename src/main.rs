// Entrypoint for the CLI application.
// - Keeps `main` small: load configuration, set up logging, build the API
//   client and hand it to the UI loop.

use anyhow::Context;
use card_tracker_cli::{api::ApiClient, config::Config, picker::picker_for, ui::main_menu};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they never interleave with the menu on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let api = ApiClient::new(&config).context("Failed to build HTTP client")?;
    tracing::info!(base_url = api.base_url(), "using card backend");

    main_menu(api, picker_for(config.picker))?;
    Ok(())
}
