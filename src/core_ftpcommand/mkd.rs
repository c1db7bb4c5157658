use crate::core_fs::ScopedFs;
use crate::core_ftpcommand::utils::quote_path;
use crate::core_network::Control;
use crate::session::Session;
use log::{info, warn};

/// Handles the MKD (Make Directory) FTP command.
///
/// # Arguments
///
/// * `control` - The control channel to reply on.
/// * `session` - The session, for its current directory.
/// * `fs` - The session's jailed filesystem.
/// * `arg` - The directory to create.
pub async fn handle_mkd_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        warn!("MKD command received with no arguments");
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    let path = session.virtual_path(arg);
    match fs.create_dir(&path) {
        Ok(()) => {
            info!("Directory created: {}", path);
            control
                .reply(257, &format!("{} directory created.", quote_path(&path)))
                .await
        }
        Err(e) => {
            warn!("MKD {} failed: {}", path, e);
            control.send_line(&e.to_ftp_response()).await
        }
    }
}
