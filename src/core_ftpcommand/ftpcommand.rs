#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    AUTH,
    PBSZ,
    PROT,
    QUIT,
    PWD,
    LIST,
    NLST,
    CWD,
    CDUP,
    NOOP,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    RETR,
    STOR,
    APPE,
    SIZE,
    PASV,
    FEAT,
    SYST,
    TYPE,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "AUTH" => Some(FtpCommand::AUTH),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            "QUIT" => Some(FtpCommand::QUIT),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "NOOP" => Some(FtpCommand::NOOP),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "SIZE" => Some(FtpCommand::SIZE),
            "PASV" => Some(FtpCommand::PASV),
            "FEAT" => Some(FtpCommand::FEAT),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            _ => None,
        }
    }

    /// Commands that only make sense once the session has a filesystem.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            FtpCommand::PWD
                | FtpCommand::LIST
                | FtpCommand::NLST
                | FtpCommand::CWD
                | FtpCommand::CDUP
                | FtpCommand::MKD
                | FtpCommand::RMD
                | FtpCommand::DELE
                | FtpCommand::RNFR
                | FtpCommand::RNTO
                | FtpCommand::RETR
                | FtpCommand::STOR
                | FtpCommand::APPE
                | FtpCommand::SIZE
                | FtpCommand::PASV
        )
    }
}

/// Splits a control line into its verb and the (possibly empty) argument.
/// Arguments keep inner spaces, so file names with blanks survive.
pub fn parse_command_line(line: &str) -> (&str, &str) {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    match line.split_once(' ') {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line.trim(), ""),
    }
}
