use crate::core_network::Control;
use crate::driver::ServerDriver;
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;

/// Handles the PASS FTP command.
///
/// The credential check runs on the blocking pool: bcrypt verification is
/// deliberately slow. On success the session receives its jailed filesystem.
pub async fn handle_pass_command(
    control: &mut Control,
    session: &mut Session,
    driver: &Arc<dyn ServerDriver>,
    password: &str,
) -> Result<(), std::io::Error> {
    if session.tls_required && !session.tls_active() {
        return control
            .reply(530, "TLS required, use AUTH TLS first.")
            .await;
    }

    if session.is_authenticated() {
        return control.reply(230, "Already logged in.").await;
    }

    let username = match session.username.clone() {
        Some(username) => username,
        None => return control.reply(503, "Login with USER first.").await,
    };

    let driver = Arc::clone(driver);
    let cx = session.cx.clone();
    let password = password.to_string();
    let user = username.clone();
    let outcome =
        tokio::task::spawn_blocking(move || driver.auth_user(&cx, &user, &password)).await;

    match outcome {
        Ok(Ok(fs)) => {
            session.fs = Some(fs);
            session.current_dir = String::from("/");
            info!("User {} logged in (#{})", username, session.cx.id);
            control.reply(230, "User logged in, proceed.").await
        }
        Ok(Err(e)) => {
            session.username = None;
            control.send_line(&e.to_ftp_response()).await
        }
        Err(e) => {
            error!("Authentication task failed: {}", e);
            session.username = None;
            control.reply(530, "Login incorrect.").await
        }
    }
}
