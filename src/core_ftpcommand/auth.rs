use crate::core_network::{Control, FtpStream};
use crate::driver::ServerDriver;
use crate::session::Session;
use log::{error, info};
use std::io;

/// Handles AUTH TLS.
///
/// Takes the control channel by value: on success it comes back wrapped in
/// TLS. A failed handshake leaves nothing to talk to and ends the connection.
pub async fn handle_auth_command(
    mut control: Control,
    session: &mut Session,
    driver: &dyn ServerDriver,
    arg: &str,
) -> io::Result<Control> {
    let mechanism = arg.to_ascii_uppercase();
    if mechanism != "TLS" && mechanism != "SSL" && mechanism != "TLS-C" {
        control.reply(504, "AUTH mechanism not supported.").await?;
        return Ok(control);
    }

    if session.tls_active() {
        control.reply(503, "TLS already active.").await?;
        return Ok(control);
    }

    let policy = match driver.tls_config(&session.cx) {
        Ok(policy) => policy,
        Err(e) => {
            control.send_line(&e.to_ftp_response()).await?;
            return Ok(control);
        }
    };

    control.reply(234, "AUTH TLS successful.").await?;

    let stream = match control.into_inner() {
        FtpStream::Plain(stream) => stream,
        FtpStream::Tls(_) => {
            return Err(io::Error::new(io::ErrorKind::Other, "control already encrypted"))
        }
    };

    match policy.accept(stream).await {
        Ok(tls) => {
            info!(
                "Control connection #{} from {} upgraded to TLS",
                session.cx.id, session.cx.remote_addr
            );
            session.tls = Some(policy);
            Ok(Control::new(FtpStream::Tls(Box::new(tls))))
        }
        Err(e) => {
            error!("TLS handshake with {} failed: {}", session.cx.remote_addr, e);
            Err(io::Error::new(io::ErrorKind::Other, e.to_string()))
        }
    }
}

/// Handles PBSZ. Only a zero buffer size makes sense over TLS.
pub async fn handle_pbsz_command(
    control: &mut Control,
    session: &Session,
    _arg: &str,
) -> io::Result<()> {
    if !session.tls_active() {
        return control.reply(503, "PBSZ requires AUTH TLS first.").await;
    }
    control.reply(200, "PBSZ=0").await
}

/// Handles PROT: `C` for clear data connections, `P` for TLS-protected ones.
pub async fn handle_prot_command(
    control: &mut Control,
    session: &mut Session,
    arg: &str,
) -> io::Result<()> {
    match arg.to_ascii_uppercase().as_str() {
        "C" => {
            session.protect_data = false;
            control.reply(200, "Protection level set to C.").await
        }
        "P" if session.tls_active() => {
            session.protect_data = true;
            control.reply(200, "Protection level set to P.").await
        }
        "P" => control.reply(503, "PROT P requires AUTH TLS first.").await,
        _ => control.reply(504, "Protection level not supported.").await,
    }
}
