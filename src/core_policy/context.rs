use chrono::{DateTime, Utc};
use std::net::SocketAddr;

/// Per-connection facts, owned by the protocol engine and lent to hooks.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub id: u64,
    pub remote_addr: SocketAddr,
    pub connected_at: DateTime<Utc>,
}

impl ConnectionContext {
    pub fn new(id: u64, remote_addr: SocketAddr) -> Self {
        Self {
            id,
            remote_addr,
            connected_at: Utc::now(),
        }
    }

    /// Whole seconds since the connection was accepted.
    pub fn elapsed_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.connected_at)
            .num_seconds()
    }
}
