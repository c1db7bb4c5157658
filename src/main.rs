mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_fs;
mod core_ftpcommand;
mod core_log;
mod core_network;
mod core_policy;
mod core_tls;
mod driver;
mod server;
mod session;

use crate::config::Config;
use crate::constants::DEFAULT_CONFIG_PATH;
use crate::core_cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    core_log::init(args.verbose);

    if let Some(password) = args.hash_password {
        let hash = core_auth::hash_password(&password).context("Failed to hash password")?;
        println!("{}", hash);
        return Ok(());
    }

    // Load configuration from the TOML file
    let config_path = if args.config.is_empty() {
        DEFAULT_CONFIG_PATH
    } else {
        args.config.as_str()
    };
    let config = Config::load_from_file(config_path)?;

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
