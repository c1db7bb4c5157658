use crate::config::{ConfigError, ServerConfig};
use crate::constants::DEFAULT_GREETING;
use crate::core_policy::context::ConnectionContext;
use log::{debug, info};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Inclusive range of ports offered for passive data connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, ConfigError> {
        if start == 0 || start > end {
            return Err(ConfigError::InvalidPortRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn port_count(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    /// Every port of the range exactly once, starting `offset` ports in and
    /// wrapping around.
    pub fn ports_from(&self, offset: usize) -> impl Iterator<Item = u16> {
        let start = usize::from(self.start);
        let len = self.port_count();
        (0..len).map(move |i| (start + (offset + i) % len) as u16)
    }
}

/// What the engine needs to start listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenPolicy {
    pub listen_address: SocketAddr,
    pub passive_ports: PortRange,
}

/// Static per-server settings plus the connect/disconnect hooks.
///
/// Built once at startup; every accessor returns the same value on every call.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    listen: ListenPolicy,
    pasv_address: Option<IpAddr>,
    greeting: String,
    auth_timeout: Duration,
}

impl SessionPolicy {
    pub fn new(
        listen: ListenPolicy,
        pasv_address: Option<IpAddr>,
        greeting: Option<String>,
        auth_timeout: Duration,
    ) -> Self {
        let greeting = greeting
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());
        Self {
            listen,
            pasv_address,
            greeting,
            auth_timeout,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let listen_address: SocketAddr = config
            .listen_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(config.listen_address.clone()))?;

        let pasv_address = match config.pasv_address.trim() {
            "" => None,
            addr => Some(
                addr.parse::<IpAddr>()
                    .map_err(|_| ConfigError::InvalidAddress(addr.to_string()))?,
            ),
        };

        let passive_ports = PortRange::new(config.passive_port_start, config.passive_port_end)?;

        Ok(Self::new(
            ListenPolicy {
                listen_address,
                passive_ports,
            },
            pasv_address,
            config.greeting.clone(),
            Duration::from_secs(config.auth_timeout_secs),
        ))
    }

    pub fn get_listen_policy(&self) -> ListenPolicy {
        self.listen
    }

    /// Address advertised in PASV replies, if fixed by configuration.
    pub fn pasv_address(&self) -> Option<IpAddr> {
        self.pasv_address
    }

    pub fn auth_timeout(&self) -> Duration {
        self.auth_timeout
    }

    pub fn on_client_connected(&self, cx: &ConnectionContext) -> String {
        debug!("Greeting connection #{} from {}", cx.id, cx.remote_addr);
        self.greeting.clone()
    }

    pub fn on_client_disconnected(&self, cx: &ConnectionContext) {
        info!(
            "Client disconnected: {} (#{}, {}s)",
            cx.remote_addr,
            cx.id,
            cx.elapsed_secs()
        );
    }
}
