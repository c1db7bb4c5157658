// SSL/TLS support (AUTH TLS) for vaultftpd

pub mod encryption_policy;
pub mod error;
pub mod tls_config;

pub use encryption_policy::EncryptionPolicy;
pub use error::TlsError;
pub use tls_config::{TlsConfig, TlsMode};
