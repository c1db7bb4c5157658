use crate::core_fs::FsError;
use thiserror::Error;

/// The only authentication outcome a remote client ever sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication failed")]
    Rejected,
}

impl AuthError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            AuthError::Rejected => "530 Login incorrect.".to_string(),
        }
    }
}

/// Why an attempt was rejected. Logged for operators, never sent to clients.
#[derive(Error, Debug)]
pub enum AuthFailure {
    #[error("unknown user {0:?}")]
    UnknownUser(String),

    #[error("wrong password for user {0:?}")]
    BadPassword(String),

    #[error("root directory of user {user:?} is unavailable: {source}")]
    RootUnavailable {
        user: String,
        #[source]
        source: FsError,
    },
}
