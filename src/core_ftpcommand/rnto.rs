use crate::core_fs::ScopedFs;
use crate::core_network::Control;
use crate::session::Session;
use log::{info, warn};

/// Handles the RNTO (Rename To) FTP command.
///
/// Both names are resolved through the session's jail; a target outside the
/// user's root is refused.
pub async fn handle_rnto_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), std::io::Error> {
    let from = match session.rename_from.take() {
        Some(path) => path,
        None => return control.reply(503, "Bad sequence of commands.").await,
    };

    if arg.is_empty() {
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    let to = session.virtual_path(arg);
    match fs.rename(&from, &to) {
        Ok(()) => {
            info!("Renamed {} to {}", from, to);
            control.reply(250, "File or directory renamed successfully.").await
        }
        Err(e) => {
            warn!("RNTO {} -> {} failed: {}", from, to, e);
            control.send_line(&e.to_ftp_response()).await
        }
    }
}
