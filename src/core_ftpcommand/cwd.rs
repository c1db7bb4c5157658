use crate::core_fs::{FsError, ScopedFs};
use crate::core_network::Control;
use crate::session::Session;
use log::debug;

/// Handles CWD. The target is resolved through the jail, so `..` past the
/// user's root is refused rather than pinned to `/`.
pub async fn handle_cwd_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    let target = session.virtual_path(arg);
    match fs.virtual_dir(&target) {
        Ok(new_dir) => {
            debug!("#{} changed directory to {}", session.cx.id, new_dir);
            session.current_dir = new_dir;
            control.reply(250, "Directory successfully changed.").await
        }
        Err(FsError::AccessDenied(_)) => control.reply(550, "Permission denied.").await,
        Err(_) => control.reply(550, "Failed to change directory.").await,
    }
}

pub async fn handle_cdup_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
) -> Result<(), std::io::Error> {
    handle_cwd_command(control, session, fs, "..").await
}
