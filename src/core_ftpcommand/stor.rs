use crate::constants::DATA_CONNECTION_TIMEOUT_SECS;
use crate::core_fs::ScopedFs;
use crate::core_network::pasv::accept_data_connection;
use crate::core_network::Control;
use crate::session::Session;
use log::{error, info, warn};
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Handles STOR and, with `append` set, APPE.
///
/// The path is checked against the session's jail before anything else, but
/// the target is only created, truncated or opened for appending once the
/// data connection is up, so a failed transfer setup leaves it untouched.
pub async fn handle_stor_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
    append: bool,
) -> io::Result<()> {
    if arg.is_empty() {
        warn!("STOR command received with no arguments");
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }
    if session.passive.is_none() {
        return control.reply(425, "Use PASV first.").await;
    }

    let path = session.virtual_path(arg);
    if let Err(e) = fs.resolve(&path) {
        warn!("STOR {} refused: {}", path, e);
        return control.send_line(&e.to_ftp_response()).await;
    }

    control.reply(150, "Ok to send data.").await?;

    let timeout = Duration::from_secs(DATA_CONNECTION_TIMEOUT_SECS);
    let mut data = match accept_data_connection(session, timeout).await {
        Ok(data) => data,
        Err(e) => {
            warn!("STOR data connection failed: {}", e);
            return control.reply(425, "Can't open data connection.").await;
        }
    };

    let opened = if append {
        fs.append(&path)
    } else {
        fs.create(&path)
    };
    let file = match opened {
        Ok(file) => file,
        Err(e) => {
            warn!("STOR {} failed: {}", path, e);
            drop(data);
            return control.send_line(&e.to_ftp_response()).await;
        }
    };

    let mut file = tokio::fs::File::from_std(file);
    let received = async {
        let bytes = tokio::io::copy(&mut data, &mut file).await?;
        file.flush().await?;
        Ok::<u64, io::Error>(bytes)
    }
    .await;

    match received {
        Ok(bytes) => {
            info!("Stored {} bytes: {}", bytes, path);
            control.reply(226, "Transfer complete.").await
        }
        Err(e) => {
            error!("Error receiving {}: {}", path, e);
            control
                .reply(426, "Connection closed; transfer aborted.")
                .await
        }
    }
}
