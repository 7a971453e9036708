//! Length-prefixed JSON frames over TCP.
//!
//! Each frame is a big-endian `u32` byte count followed by that many bytes
//! of JSON. Frames in either direction are capped in size, and writes are
//! bounded by a timeout. A bad length prefix ends the connection; a
//! well-framed body that does not decode is handed up as malformed.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

use crate::config::{DEFAULT_IO_TIMEOUT, MAX_FRAME_SIZE};
use crate::protocol::{decode_request, encode_event, Event};
use crate::transport::{Incoming, Inbound, Outbound};

fn map_io(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe => {
            anyhow::anyhow!("Connection reset by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

/// Read one frame body.
pub async fn read_frame<R>(reader: &mut R, max_frame: u32) -> anyhow::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(map_io)?;
    let len = u32::from_be_bytes(len_buf);
    if len == 0 {
        return Err(anyhow::anyhow!("Invalid frame length: 0"));
    }
    if len > max_frame {
        return Err(anyhow::anyhow!(
            "Frame too large: {} bytes (max: {})",
            len,
            max_frame
        ));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.map_err(map_io)?;
    Ok(buf)
}

/// Write one frame body.
pub async fn write_frame<W>(writer: &mut W, body: &[u8], max_frame: u32) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if body.len() > max_frame as usize {
        return Err(anyhow::anyhow!(
            "Frame too large: {} bytes (max: {})",
            body.len(),
            max_frame
        ));
    }
    writer
        .write_all(&(body.len() as u32).to_be_bytes())
        .await
        .map_err(map_io)?;
    writer.write_all(body).await.map_err(map_io)?;
    writer.flush().await.map_err(map_io)?;
    Ok(())
}

/// Limits applied to a TCP connection.
#[derive(Debug, Clone, Copy)]
pub struct FrameLimits {
    /// Bound on writing one frame. Reads wait for the client indefinitely.
    pub io_timeout: Duration,
    pub max_frame: u32,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            io_timeout: DEFAULT_IO_TIMEOUT,
            max_frame: MAX_FRAME_SIZE,
        }
    }
}

/// Request half of a TCP connection.
pub struct TcpInbound {
    reader: OwnedReadHalf,
    limits: FrameLimits,
}

/// Event half of a TCP connection.
pub struct TcpOutbound {
    writer: OwnedWriteHalf,
    limits: FrameLimits,
}

/// Split an accepted stream into its two transport halves.
pub fn split(stream: TcpStream, limits: FrameLimits) -> (TcpInbound, TcpOutbound) {
    let (reader, writer) = stream.into_split();
    (
        TcpInbound { reader, limits },
        TcpOutbound { writer, limits },
    )
}

#[async_trait::async_trait]
impl Inbound for TcpInbound {
    async fn recv(&mut self) -> anyhow::Result<Incoming> {
        let body = read_frame(&mut self.reader, self.limits.max_frame).await?;
        Ok(match decode_request(&body) {
            Ok(request) => Incoming::Request(request),
            Err(e) => Incoming::Malformed(e),
        })
    }
}

#[async_trait::async_trait]
impl Outbound for TcpOutbound {
    async fn send(&mut self, event: &Event) -> anyhow::Result<()> {
        let body = encode_event(event)?;
        let limits = self.limits;
        timeout(
            limits.io_timeout,
            write_frame(&mut self.writer, &body, limits.max_frame),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limits.io_timeout))?
    }
}
