use crate::core_fs::ScopedFs;
use crate::core_network::Control;
use crate::session::Session;
use log::{info, warn};

/// Handles the RMD (Remove Directory) FTP command. Only empty directories go.
pub async fn handle_rmd_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    let path = session.virtual_path(arg);
    match fs.remove_dir(&path) {
        Ok(()) => {
            info!("Directory removed: {}", path);
            control.reply(250, "Directory successfully removed.").await
        }
        Err(e) => {
            warn!("RMD {} failed: {}", path, e);
            control.send_line(&e.to_ftp_response()).await
        }
    }
}
