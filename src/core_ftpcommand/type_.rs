use crate::core_network::Control;

/// Handles the TYPE FTP command.
///
/// ASCII and Image are accepted and nothing is stored: data always moves
/// unchanged, which is what every client that sends `TYPE A` for listings
/// expects.
pub async fn handle_type_command(
    control: &mut Control,
    arg: &str,
) -> Result<(), std::io::Error> {
    let primary_type = arg
        .split_whitespace()
        .next()
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default();

    match primary_type.as_str() {
        "A" | "I" => {
            control
                .reply(200, &format!("Type set to {}", primary_type))
                .await
        }
        _ => control.reply(504, "Command not implemented for that parameter.").await,
    }
}
