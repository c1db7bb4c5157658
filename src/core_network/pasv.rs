use crate::core_policy::PortRange;
use crate::core_network::stream::{Control, FtpStream};
use crate::session::Session;
use log::{debug, error, trace, warn};
use rand::Rng;
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;

/// Handles PASV: opens a listener in the passive range and tells the client
/// where to connect. Any previous listener of the session is dropped.
pub async fn handle_pasv_command(control: &mut Control, session: &mut Session) -> io::Result<()> {
    session.passive = None;

    let listener = match bind_passive_listener(session.bind_ip, session.passive_ports).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to set up PASV listener: {}", e);
            return control.reply(425, "Can't open data connection.").await;
        }
    };
    let port = listener.local_addr()?.port();

    match pasv_response(session.advertised_ip, port) {
        Some(text) => {
            session.passive = Some(listener);
            control.reply(227, &text).await
        }
        None => control.reply(425, "PASV requires an IPv4 address.").await,
    }
}

/// Binds a passive listener on the first free port of `ports`, starting the
/// scan at a random offset so concurrent sessions spread over the range.
pub async fn bind_passive_listener(bind_ip: IpAddr, ports: PortRange) -> io::Result<TcpListener> {
    let offset = rand::thread_rng().gen_range(0..ports.port_count());
    for port in ports.ports_from(offset) {
        match TcpListener::bind((bind_ip, port)).await {
            Ok(listener) => {
                debug!("PASV listener set up on IP: {}, Port: {}", bind_ip, port);
                return Ok(listener);
            }
            Err(e) => trace!("Passive port {} unavailable: {}", port, e),
        }
    }

    warn!(
        "No free port in passive range {}-{}",
        ports.start(),
        ports.end()
    );
    Err(io::Error::new(
        io::ErrorKind::AddrInUse,
        "no free port in passive range",
    ))
}

/// Text of the 227 reply. PASV can only advertise IPv4 addresses.
pub fn pasv_response(ip: IpAddr, port: u16) -> Option<String> {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            Some(format!(
                "Entering Passive Mode ({},{},{},{},{},{}).",
                o[0],
                o[1],
                o[2],
                o[3],
                port / 256,
                port % 256
            ))
        }
        IpAddr::V6(_) => None,
    }
}

/// Accepts the client's data connection on the session's passive listener,
/// wrapping it in TLS when the session asked for `PROT P`.
pub async fn accept_data_connection(
    session: &mut Session,
    wait: Duration,
) -> io::Result<FtpStream> {
    let listener = session.passive.take().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotConnected, "no passive listener")
    })?;

    let (stream, addr) = timeout(wait, listener.accept())
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "data connection timed out"))??;
    debug!("Accepted data connection from: {}", addr);

    if addr.ip() != session.cx.remote_addr.ip() {
        warn!(
            "Data connection from {} does not match control peer {}",
            addr, session.cx.remote_addr
        );
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "data connection from foreign address",
        ));
    }

    match (&session.tls, session.protect_data) {
        (Some(policy), true) => {
            let tls = policy
                .accept(stream)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            Ok(FtpStream::Tls(Box::new(tls)))
        }
        _ => Ok(FtpStream::Plain(stream)),
    }
}
