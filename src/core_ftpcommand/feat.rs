use crate::core_network::Control;

pub async fn handle_feat_command(control: &mut Control, tls_enabled: bool) -> std::io::Result<()> {
    control.send_line("211-Features:").await?;
    if tls_enabled {
        for feature in [" AUTH TLS", " PBSZ", " PROT"] {
            control.send_line(feature).await?;
        }
    }
    for feature in [" PASV", " SIZE", " UTF8"] {
        control.send_line(feature).await?;
    }
    control.send_line("211 End").await
}
