//! TCP connection to the backend: framed sends and buffered framed reads.
//!
//! Outbound commands are fire-and-forget — no retry, no timeout.  Inbound
//! frames that decode to something unrecognisable are logged and skipped;
//! only a closed socket or an I/O fault ends the connection.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{info, warn};

use deck_proto::protocol::{Message, UiBackCommand, UiCommand};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("connection closed by backend")]
    Closed,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode command: {0}")]
    Encode(anyhow::Error),
}

pub async fn connect(addr: &str) -> anyhow::Result<(Reader, Writer)> {
    let stream = TcpStream::connect(addr).await?;
    info!("Connected to backend at {}", addr);
    let (read_half, write_half) = stream.into_split();
    Ok((
        Reader {
            half: read_half,
            read_buf: Vec::with_capacity(4096),
        },
        Writer { half: write_half },
    ))
}

pub struct Writer {
    half: OwnedWriteHalf,
}

impl Writer {
    pub async fn send(&mut self, cmd: &UiBackCommand) -> Result<(), ConnectionError> {
        let encoded = Message::Outbound(cmd.clone())
            .encode()
            .map_err(ConnectionError::Encode)?;
        self.half.write_all(&encoded).await?;
        Ok(())
    }
}

pub struct Reader {
    half: OwnedReadHalf,
    read_buf: Vec<u8>,
}

impl Reader {
    /// Next decoded backend message.  Complete frames that fail to decode,
    /// and client-bound shapes echoed back by a confused backend, are
    /// dropped with a warning.
    pub async fn next(&mut self) -> Result<UiCommand, ConnectionError> {
        loop {
            while self.read_buf.len() >= 4 {
                let len = u32::from_be_bytes([
                    self.read_buf[0],
                    self.read_buf[1],
                    self.read_buf[2],
                    self.read_buf[3],
                ]) as usize;
                if self.read_buf.len() < 4 + len {
                    break;
                }
                let frame: Result<Message, _> = serde_json::from_slice(&self.read_buf[4..4 + len]);
                self.read_buf.drain(..4 + len);
                match frame {
                    Ok(Message::Inbound(cmd)) => return Ok(cmd),
                    Ok(Message::Outbound(cmd)) => {
                        warn!(?cmd, "dropping client-originated shape from backend")
                    }
                    Err(e) => warn!("dropping undecodable frame: {}", e),
                }
            }

            let mut tmp = [0u8; 4096];
            match self.half.read(&mut tmp).await {
                Ok(0) => return Err(ConnectionError::Closed),
                Ok(n) => self.read_buf.extend_from_slice(&tmp[..n]),
                Err(e) => return Err(e.into()),
            }
        }
    }
}
