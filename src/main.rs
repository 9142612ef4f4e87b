use anyhow::{Context, Result};
use clap::{crate_version, App};
use orgpress::build::{build_site, step};
use orgpress::config::{Config, CONFIG_FILE};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    App::new("orgpress")
        .version(crate_version!())
        .about("Builds a static site from Org-mode posts")
        .after_help(
            "Reads config.yml from the current directory and writes the site \
             to the configured output directory. Set RUST_LOG for diagnostics.",
        )
        .get_matches();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "orgpress=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    println!("> Orgpress");
    let base_directory = std::env::current_dir().context("Getting working directory")?;
    let mut stdout = io::stdout();

    let config = step(&mut stdout, "> Read config file...", || {
        Config::from_directory(&base_directory)
    })?;
    tracing::debug!("loaded {} from {}", CONFIG_FILE, base_directory.display());

    println!("> Start rendering...");
    build_site(&config, &mut stdout)?;
    println!("> Done rendering...");
    Ok(())
}
