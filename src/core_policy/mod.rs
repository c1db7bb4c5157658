// Listen settings, passive ports and per-connection hooks.

pub mod context;
pub mod policy;

pub use context::ConnectionContext;
pub use policy::{ListenPolicy, PortRange, SessionPolicy};
