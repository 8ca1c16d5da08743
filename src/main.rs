#[macro_use]
extern crate log;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use clap::Parser;

use gifsmith_core::{app, config::Config, config::SharedConfig};

/// Turns photos sent to a Telegram bot into animated GIFs.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

fn load_config(path: &Path) -> Result<Config, Error> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();

    let args = Args::parse();
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    };

    info!("Bot is starting...");
    app::run(SharedConfig::new(config)).await;
}
