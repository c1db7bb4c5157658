pub mod network;
pub mod pasv;
pub mod stream;

pub use network::{serve, start_server, EngineOptions};
pub use stream::{Control, FtpStream};
