use crate::core_network::Control;

pub async fn handle_noop_command(control: &mut Control) -> Result<(), std::io::Error> {
    control.reply(200, "OK, n00p n00p !").await
}
