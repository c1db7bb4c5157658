use crate::core_network::Control;
use crate::session::Session;
use log::{info, warn};

/// Handles the USER FTP command.
///
/// Records the username for the following PASS and drops any previous login.
/// When TLS is mandatory, the command is refused on a plaintext channel.
pub async fn handle_user_command(
    control: &mut Control,
    session: &mut Session,
    username: &str,
) -> Result<(), std::io::Error> {
    if session.tls_required && !session.tls_active() {
        warn!(
            "USER before AUTH TLS from {} (#{}), refusing",
            session.cx.remote_addr, session.cx.id
        );
        return control
            .reply(530, "TLS required, use AUTH TLS first.")
            .await;
    }

    if username.is_empty() {
        return control.reply(501, "Syntax error in parameters or arguments.").await;
    }

    info!("Received USER command with username: {}", username);
    session.logout();
    session.username = Some(username.to_string());

    control.reply(331, "User name okay, need password.").await
}
