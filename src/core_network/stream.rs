use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;

/// A control or data connection, before or after `AUTH TLS`/`PROT P`.
pub enum FtpStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for FtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            FtpStream::Tls(s) => Pin::new(&mut **s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for FtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            FtpStream::Tls(s) => Pin::new(&mut **s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            FtpStream::Tls(s) => Pin::new(&mut **s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            FtpStream::Tls(s) => Pin::new(&mut **s).poll_shutdown(cx),
        }
    }
}

/// The control channel: line-oriented reads, CRLF-terminated replies.
pub struct Control {
    reader: BufReader<FtpStream>,
}

impl Control {
    pub fn new(stream: FtpStream) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }

    pub async fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.reader.read_line(buf).await
    }

    /// Sends a reply. Multi-line text becomes a `code-` continuation block.
    pub async fn reply(&mut self, code: u16, text: &str) -> io::Result<()> {
        let lines: Vec<&str> = text.lines().collect();
        let mut message = String::new();
        match lines.split_last() {
            Some((last, rest)) => {
                for line in rest {
                    message.push_str(&format!("{}-{}\r\n", code, line));
                }
                message.push_str(&format!("{} {}\r\n", code, last));
            }
            None => message.push_str(&format!("{} \r\n", code)),
        }
        self.send(&message).await
    }

    /// Sends a preformatted reply line; CRLF is appended.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.send(&format!("{}\r\n", line)).await
    }

    async fn send(&mut self, message: &str) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(message.as_bytes()).await?;
        stream.flush().await
    }

    /// Takes the underlying stream back, e.g. to run a TLS handshake on it.
    pub fn into_inner(self) -> FtpStream {
        self.reader.into_inner()
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.reader.get_mut().shutdown().await
    }
}
