use crate::core_fs::ScopedFs;
use crate::core_policy::{ConnectionContext, PortRange};
use crate::core_tls::EncryptionPolicy;
use std::net::IpAddr;
use tokio::net::TcpListener;

/// State of one control connection.
#[derive(Debug)]
pub struct Session {
    pub cx: ConnectionContext,
    pub current_dir: String,      // Virtual path, "/" is the user's root
    pub username: Option<String>, // Set by USER, kept after login
    pub fs: Option<ScopedFs>,     // Present once authenticated
    pub rename_from: Option<String>,
    pub passive: Option<TcpListener>,
    pub passive_ports: PortRange,
    pub bind_ip: IpAddr,          // Where passive listeners are bound
    pub advertised_ip: IpAddr,    // Address sent in PASV replies
    pub tls_offered: bool,
    pub tls_required: bool,       // No login before AUTH TLS
    pub tls: Option<EncryptionPolicy>, // Set once AUTH TLS succeeded
    pub protect_data: bool,       // PROT P
}

impl Session {
    pub fn new(
        cx: ConnectionContext,
        passive_ports: PortRange,
        bind_ip: IpAddr,
        advertised_ip: IpAddr,
    ) -> Self {
        Self {
            cx,
            current_dir: String::from("/"),
            username: None,
            fs: None,
            rename_from: None,
            passive: None,
            passive_ports,
            bind_ip,
            advertised_ip,
            tls_offered: false,
            tls_required: false,
            tls: None,
            protect_data: false,
        }
    }

    pub fn tls_active(&self) -> bool {
        self.tls.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.fs.is_some()
    }

    /// Joins a client-supplied path onto the current directory. The result is
    /// still virtual; the jail decides where it lands.
    pub fn virtual_path(&self, arg: &str) -> String {
        if arg.starts_with('/') {
            arg.to_string()
        } else if self.current_dir.ends_with('/') {
            format!("{}{}", self.current_dir, arg)
        } else {
            format!("{}/{}", self.current_dir, arg)
        }
    }

    /// Drops the authenticated state, e.g. on a new USER command.
    pub fn logout(&mut self) {
        self.fs = None;
        self.current_dir = String::from("/");
        self.rename_from = None;
        self.passive = None;
    }
}
