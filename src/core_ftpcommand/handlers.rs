use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{
    auth, cwd, dele, feat, list, mkd, noop, pass, pwd, retr, rmd, rnfr, rnto, size, stor, syst,
    type_, user,
};
use crate::core_network::pasv;
use crate::core_network::Control;
use crate::driver::ServerDriver;
use crate::session::Session;
use std::io;
use std::sync::Arc;

/// Routes one command to its handler.
///
/// QUIT and AUTH are handled by the connection loop, since they end or
/// replace the control channel. File commands are refused until the session
/// holds a filesystem, and then only ever see that filesystem.
pub async fn dispatch(
    command: FtpCommand,
    control: &mut Control,
    session: &mut Session,
    driver: &Arc<dyn ServerDriver>,
    arg: &str,
) -> io::Result<()> {
    let fs = match (command.requires_login(), session.fs.clone()) {
        (false, _) => None,
        (true, Some(fs)) => Some(fs),
        (true, None) => {
            return control
                .reply(530, "Please login with USER and PASS.")
                .await
        }
    };

    match (command, fs) {
        (FtpCommand::USER, _) => user::handle_user_command(control, session, arg).await,
        (FtpCommand::PASS, _) => pass::handle_pass_command(control, session, driver, arg).await,
        (FtpCommand::PBSZ, _) => auth::handle_pbsz_command(control, session, arg).await,
        (FtpCommand::PROT, _) => auth::handle_prot_command(control, session, arg).await,
        (FtpCommand::SYST, _) => syst::handle_syst_command(control).await,
        (FtpCommand::NOOP, _) => noop::handle_noop_command(control).await,
        (FtpCommand::TYPE, _) => type_::handle_type_command(control, arg).await,
        (FtpCommand::FEAT, _) => feat::handle_feat_command(control, session.tls_offered).await,
        (FtpCommand::PWD, Some(_)) => pwd::handle_pwd_command(control, session).await,
        (FtpCommand::CWD, Some(fs)) => cwd::handle_cwd_command(control, session, &fs, arg).await,
        (FtpCommand::CDUP, Some(fs)) => cwd::handle_cdup_command(control, session, &fs).await,
        (FtpCommand::MKD, Some(fs)) => mkd::handle_mkd_command(control, session, &fs, arg).await,
        (FtpCommand::RMD, Some(fs)) => rmd::handle_rmd_command(control, session, &fs, arg).await,
        (FtpCommand::DELE, Some(fs)) => dele::handle_dele_command(control, session, &fs, arg).await,
        (FtpCommand::SIZE, Some(fs)) => size::handle_size_command(control, session, &fs, arg).await,
        (FtpCommand::RNFR, Some(fs)) => rnfr::handle_rnfr_command(control, session, &fs, arg).await,
        (FtpCommand::RNTO, Some(fs)) => rnto::handle_rnto_command(control, session, &fs, arg).await,
        (FtpCommand::PASV, Some(_)) => pasv::handle_pasv_command(control, session).await,
        (FtpCommand::LIST, Some(fs)) => {
            list::handle_list_command(control, session, &fs, arg, false).await
        }
        (FtpCommand::NLST, Some(fs)) => {
            list::handle_list_command(control, session, &fs, arg, true).await
        }
        (FtpCommand::RETR, Some(fs)) => retr::handle_retr_command(control, session, &fs, arg).await,
        (FtpCommand::STOR, Some(fs)) => {
            stor::handle_stor_command(control, session, &fs, arg, false).await
        }
        (FtpCommand::APPE, Some(fs)) => {
            stor::handle_stor_command(control, session, &fs, arg, true).await
        }
        _ => control.reply(502, "Command not implemented.").await,
    }
}
