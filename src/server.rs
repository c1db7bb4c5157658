use crate::config::Config;
use crate::core_network::{start_server, EngineOptions};
use crate::driver::{FtpDriver, ServerDriver};
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration.
///
/// Users, TLS material and policy are all loaded before the listener is
/// bound, so a bad users file or certificate stops the server at startup.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config: {:?}", config);

    let driver = FtpDriver::from_config(&config)?;
    let options = EngineOptions {
        pasv_address: driver.session_policy().pasv_address(),
        auth_timeout: driver.session_policy().auth_timeout(),
    };
    let driver: Arc<dyn ServerDriver> = Arc::new(driver);

    // Start the FTP server
    match start_server(driver, options).await {
        Ok(_) => info!("Server stopped."),
        Err(e) => {
            error!("Failed to start server: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
