use crate::core_tls::error::TlsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether clients may, must, or cannot upgrade with `AUTH TLS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    #[default]
    Disabled,
    Optional,
    Required,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub mode: TlsMode,

    /// PEM certificate chain presented to clients.
    pub cert_file: PathBuf,

    /// PEM PKCS#8 private key matching `cert_file`.
    pub key_file: PathBuf,

    /// Trust roots for client certificates.
    pub client_ca_file: Option<PathBuf>,

    /// Verify client certificates. Turning this off is an explicit opt-in
    /// and is logged.
    pub verify_client_certs: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            mode: TlsMode::Disabled,
            cert_file: PathBuf::from("etc/ssl/cert.pem"),
            key_file: PathBuf::from("etc/ssl/key.pem"),
            client_ca_file: None,
            verify_client_certs: true,
        }
    }
}

impl TlsConfig {
    pub fn is_enabled(&self) -> bool {
        self.mode != TlsMode::Disabled
    }

    /// Checks that the configured files exist.
    pub fn validate(&self) -> Result<(), TlsError> {
        if !self.is_enabled() {
            return Ok(());
        }

        if !self.cert_file.exists() {
            return Err(TlsError::CertificateLoadError(format!(
                "Certificate file not found: {:?}",
                self.cert_file
            )));
        }

        if !self.key_file.exists() {
            return Err(TlsError::PrivateKeyLoadError(format!(
                "Private key file not found: {:?}",
                self.key_file
            )));
        }

        if let Some(ca_file) = &self.client_ca_file {
            if !ca_file.exists() {
                return Err(TlsError::ClientCaLoadError(format!(
                    "Client CA file not found: {:?}",
                    ca_file
                )));
            }
        }

        Ok(())
    }
}
