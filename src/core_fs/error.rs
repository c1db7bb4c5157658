use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    /// The path escapes the jail root. Carries the client-supplied path only.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("No such file or directory: {0}")]
    NotFound(String),

    /// The jail root itself is missing or unusable. Operator-facing only.
    #[error("Root directory unavailable: {0}")]
    RootUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Classifies an I/O error raised while operating on `path`.
    pub fn from_io(path: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => FsError::AccessDenied(path.to_string()),
            _ => FsError::Io(err),
        }
    }

    pub fn to_ftp_response(&self) -> String {
        match self {
            FsError::AccessDenied(_) => "550 Permission denied.".to_string(),
            FsError::NotFound(_) => "550 File not found.".to_string(),
            FsError::RootUnavailable(_) => {
                "451 Requested action aborted. Local error in processing.".to_string()
            }
            FsError::Io(_) => "550 Requested action not taken.".to_string(),
        }
    }
}
