use crate::constants::DATA_CONNECTION_TIMEOUT_SECS;
use crate::core_fs::ScopedFs;
use crate::core_network::pasv::accept_data_connection;
use crate::core_network::Control;
use crate::session::Session;
use log::{error, info, warn};
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Handles the RETR (Retrieve) FTP command.
///
/// The file is opened through the session's jail before the data connection
/// is accepted, so a refused path never opens a transfer.
///
/// # Arguments
///
/// * `control` - The control channel to reply on.
/// * `session` - The session, holding the passive listener.
/// * `fs` - The session's jailed filesystem.
/// * `arg` - The name of the file to retrieve.
pub async fn handle_retr_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), io::Error> {
    if arg.is_empty() {
        warn!("RETR command received with no arguments");
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }
    if session.passive.is_none() {
        return control.reply(425, "Use PASV first.").await;
    }

    let path = session.virtual_path(arg);
    let file = match fs.open(&path) {
        Ok(file) => file,
        Err(e) => {
            warn!("RETR {} refused: {}", path, e);
            return control.send_line(&e.to_ftp_response()).await;
        }
    };
    match file.metadata() {
        Ok(metadata) if metadata.is_file() => {}
        _ => return control.reply(550, "Not a regular file.").await,
    }

    control.reply(150, "Opening data connection.").await?;

    let timeout = Duration::from_secs(DATA_CONNECTION_TIMEOUT_SECS);
    let mut data = match accept_data_connection(session, timeout).await {
        Ok(data) => data,
        Err(e) => {
            warn!("RETR data connection failed: {}", e);
            return control.reply(425, "Can't open data connection.").await;
        }
    };

    let mut file = tokio::fs::File::from_std(file);
    let sent = async {
        let bytes = tokio::io::copy(&mut file, &mut data).await?;
        data.shutdown().await?;
        Ok::<u64, io::Error>(bytes)
    }
    .await;

    match sent {
        Ok(bytes) => {
            info!("Sent {} bytes: {}", bytes, path);
            control.reply(226, "Transfer complete.").await
        }
        Err(e) => {
            error!("Error sending {}: {}", path, e);
            control
                .reply(426, "Connection closed; transfer aborted.")
                .await
        }
    }
}
