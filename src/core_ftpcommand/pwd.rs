// src/core_ftpcommand/pwd.rs
use crate::core_ftpcommand::utils::quote_path;
use crate::core_network::Control;
use crate::session::Session;

pub async fn handle_pwd_command(control: &mut Control, session: &Session) -> std::io::Result<()> {
    let response = format!("{} is the current directory.", quote_path(&session.current_dir));
    control.reply(257, &response).await
}
