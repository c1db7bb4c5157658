use crate::core_network::Control;
use log::info;

/// Handles the SYST (System) FTP command.
pub async fn handle_syst_command(control: &mut Control) -> Result<(), std::io::Error> {
    info!("Responding to SYST command with system type.");
    control.reply(215, "UNIX Type: L8").await
}
