use crate::core_fs::ScopedFs;
use crate::core_network::Control;
use crate::session::Session;
use log::{info, warn};

/// Handles the DELE FTP command.
pub async fn handle_dele_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    let path = session.virtual_path(arg);
    match fs.remove_file(&path) {
        Ok(()) => {
            info!("File deleted: {}", path);
            control.reply(250, "File successfully deleted.").await
        }
        Err(e) => {
            warn!("DELE {} failed: {}", path, e);
            control.send_line(&e.to_ftp_response()).await
        }
    }
}
