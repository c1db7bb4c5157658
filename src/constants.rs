// src/constants.rs

pub const DEFAULT_CONFIG_PATH: &str = "/etc/vaultftpd.conf";
pub const DEFAULT_USERS_FILE: &str = "etc/users.json";

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:2121";
pub const DEFAULT_PASSIVE_PORT_START: u16 = 2122;
pub const DEFAULT_PASSIVE_PORT_END: u16 = 2130;
pub const DEFAULT_GREETING: &str = "Connection established!";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 60;

/// Usernames: 1 to 64 characters, no whitespace or control characters.
pub const USERNAME_REGEX: &str = r"^[^\s\p{Cc}]{1,64}$";

pub const DATA_CONNECTION_TIMEOUT_SECS: u64 = 30;
