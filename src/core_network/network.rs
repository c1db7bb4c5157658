use crate::core_ftpcommand::auth;
use crate::core_ftpcommand::ftpcommand::{parse_command_line, FtpCommand};
use crate::core_ftpcommand::handlers::dispatch;
use crate::core_network::stream::{Control, FtpStream};
use crate::core_policy::ConnectionContext;
use crate::driver::ServerDriver;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout_at, Instant};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Engine settings that are not part of the driver's listen policy.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Address sent in PASV replies; the control socket's local IP if unset.
    pub pasv_address: Option<IpAddr>,
    /// Time a client has to log in before being disconnected.
    pub auth_timeout: Duration,
}

/// Binds the driver's listen address and serves until the listener fails.
pub async fn start_server(driver: Arc<dyn ServerDriver>, options: EngineOptions) -> Result<()> {
    let settings = driver.get_settings();
    let listener = TcpListener::bind(settings.listen_address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_address))?;
    info!(
        "Server listening on {} (passive ports {}-{})",
        settings.listen_address,
        settings.passive_ports.start(),
        settings.passive_ports.end()
    );

    serve(listener, driver, options).await
}

/// Accept loop. Each connection runs in its own task and ends with the
/// driver's disconnect hook, whatever the reason.
pub async fn serve(
    listener: TcpListener,
    driver: Arc<dyn ServerDriver>,
    options: EngineOptions,
) -> Result<()> {
    let passive_ports = driver.get_settings().passive_ports;
    let bind_ip = listener.local_addr()?.ip();

    loop {
        let (socket, addr) = listener.accept().await?;
        let cx = ConnectionContext::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed), addr);
        info!("New connection from {} (#{})", addr, cx.id);

        let driver = Arc::clone(&driver);
        tokio::spawn(async move {
            let session = Session::new(cx.clone(), passive_ports, bind_ip, bind_ip);
            if let Err(e) = handle_connection(socket, session, &driver, options).await {
                warn!("Connection error on #{}: {}", cx.id, e);
            }
            driver.client_disconnected(&cx);
        });
    }
}

async fn handle_connection(
    socket: TcpStream,
    mut session: Session,
    driver: &Arc<dyn ServerDriver>,
    options: EngineOptions,
) -> std::io::Result<()> {
    session.advertised_ip = match options.pasv_address {
        Some(ip) => ip,
        None => socket.local_addr()?.ip(),
    };
    if let Ok(policy) = driver.tls_config(&session.cx) {
        session.tls_offered = true;
        session.tls_required = policy.is_required();
    }

    let mut control = Control::new(FtpStream::Plain(socket));
    let greeting = driver.client_connected(&session.cx);
    control.reply(220, &greeting).await?;

    let mut auth_deadline = Instant::now() + options.auth_timeout;
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let n = if session.is_authenticated() {
            control.read_line(&mut buffer).await?
        } else {
            match timeout_at(auth_deadline, control.read_line(&mut buffer)).await {
                Ok(n) => n?,
                Err(_) => {
                    warn!(
                        "Login timeout for {} (#{})",
                        session.cx.remote_addr, session.cx.id
                    );
                    control.reply(421, "Login timeout, closing control connection.").await?;
                    break;
                }
            }
        };
        if n == 0 {
            debug!("Client #{} closed the control connection", session.cx.id);
            break;
        }

        let (verb, arg) = parse_command_line(&buffer);
        if verb.is_empty() {
            continue;
        }
        if verb.eq_ignore_ascii_case("PASS") {
            debug!("Received command #{}: PASS ****", session.cx.id);
        } else {
            debug!("Received command #{}: {} {}", session.cx.id, verb, arg);
        }

        let command = match FtpCommand::from_str(verb) {
            Some(command) => command,
            None => {
                control.reply(502, "Command not implemented.").await?;
                continue;
            }
        };

        match command {
            FtpCommand::QUIT => {
                control.reply(221, "Goodbye.").await?;
                break;
            }
            FtpCommand::AUTH => {
                control = auth::handle_auth_command(control, &mut session, driver.as_ref(), arg)
                    .await?;
            }
            _ => {
                let was_authenticated = session.is_authenticated();
                if let Err(e) = dispatch(command, &mut control, &mut session, driver, arg).await {
                    error!("Error handling {:?} on #{}: {}", command, session.cx.id, e);
                    return Err(e);
                }
                // A new USER drops the login; the next one gets a full window.
                if was_authenticated && !session.is_authenticated() {
                    auth_deadline = Instant::now() + options.auth_timeout;
                }
            }
        }
    }

    if let Err(e) = control.shutdown().await {
        debug!("Shutdown of #{} failed: {}", session.cx.id, e);
    }
    Ok(())
}
