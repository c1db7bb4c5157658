use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "vaultftpd", about = "A jailed FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a bcrypt hash of the given password for users.json and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["vaultftpd"]);
        assert!(cli.config.is_empty());
        assert!(!cli.verbose);
        assert!(cli.hash_password.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "vaultftpd",
            "-c",
            "/tmp/vaultftpd.conf",
            "--verbose",
            "--hash-password",
            "hunter2",
        ]);
        assert_eq!(cli.config, "/tmp/vaultftpd.conf");
        assert!(cli.verbose);
        assert_eq!(cli.hash_password.as_deref(), Some("hunter2"));
    }
}
