use crate::core_fs::ScopedFs;
use crate::core_network::Control;
use crate::session::Session;

pub async fn handle_size_command(
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
        Ok(metadata) if metadata.is_file() => {
            control.reply(213, &metadata.len().to_string()).await
        }
        Ok(_) => control.reply(550, "Not a regular file.").await,
        Err(e) => control.send_line(&e.to_ftp_response()).await,
    }
}
