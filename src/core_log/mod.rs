use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the global logger. `RUST_LOG` wins over the default level,
/// which is `info`, or `debug` in verbose mode.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();
}
