use crate::constants::DATA_CONNECTION_TIMEOUT_SECS;
use crate::core_fs::ScopedFs;
use crate::core_ftpcommand::utils::format_list_line;
use crate::core_network::pasv::accept_data_connection;
use crate::core_network::Control;
use crate::session::Session;
use log::{debug, warn};
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Handles LIST and NLST over the passive data connection.
///
/// `names_only` selects the NLST format. Options such as `-la` are ignored.
pub async fn handle_list_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
    names_only: bool,
) -> Result<(), io::Error> {
    if session.passive.is_none() {
        return control.reply(425, "Use PASV first.").await;
    }

    let target = list_target(arg);
    let path = if target.is_empty() {
        session.current_dir.clone()
    } else {
        session.virtual_path(target)
    };

    let lines = match fs.stat(&path) {
        Ok(metadata) if metadata.is_dir() => match fs.list(&path) {
            Ok(entries) => entries
                .iter()
                .map(|entry| {
                    if names_only {
                        entry.name.clone()
                    } else {
                        format_list_line(&entry.name, &entry.metadata)
                    }
                })
                .collect::<Vec<_>>(),
            Err(e) => return control.send_line(&e.to_ftp_response()).await,
        },
        Ok(metadata) => {
            let name = path.rsplit('/').next().unwrap_or(&path).to_string();
            if names_only {
                vec![name]
            } else {
                vec![format_list_line(&name, &metadata)]
            }
        }
        Err(e) => return control.send_line(&e.to_ftp_response()).await,
    };

    control
        .reply(150, "Opening data connection for file list.")
        .await?;

    let timeout = Duration::from_secs(DATA_CONNECTION_TIMEOUT_SECS);
    let mut data = match accept_data_connection(session, timeout).await {
        Ok(data) => data,
        Err(e) => {
            warn!("LIST data connection failed: {}", e);
            return control.reply(425, "Can't open data connection.").await;
        }
    };

    let mut body = String::new();
    for line in &lines {
        body.push_str(line);
        body.push_str("\r\n");
    }

    let sent = async {
        data.write_all(body.as_bytes()).await?;
        data.shutdown().await
    }
    .await;

    match sent {
        Ok(()) => {
            debug!("Listed {} entries of {}", lines.len(), path);
            control.reply(226, "Transfer complete.").await
        }
        Err(e) => {
            warn!("LIST transfer failed: {}", e);
            control
                .reply(426, "Connection closed; transfer aborted.")
                .await
        }
    }
}

/// Strips leading `ls` style options from a LIST argument.
fn list_target(arg: &str) -> &str {
    let mut rest = arg.trim();
    while rest.starts_with('-') {
        rest = rest
            .split_once(' ')
            .map(|(_, tail)| tail.trim_start())
            .unwrap_or("");
    }
    rest
}
