use crate::core_fs::ScopedFs;
use crate::core_network::Control;
use crate::session::Session;
use log::info;

/// Handles RNFR: remembers the source of the next RNTO if it exists.
pub async fn handle_rnfr_command(
    control: &mut Control,
    session: &mut Session,
    fs: &ScopedFs,
    arg: &str,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    let path = session.virtual_path(arg);
    match fs.stat(&path) {
        Ok(_) => {
            info!("RNFR {}", path);
            session.rename_from = Some(path);
            control.reply(350, "Ready for RNTO.").await
        }
        Err(e) => {
            session.rename_from = None;
            control.send_line(&e.to_ftp_response()).await
        }
    }
}
