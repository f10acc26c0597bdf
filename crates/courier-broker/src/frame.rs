//! Length-prefixed broker frames
//!
//! One frame is a 4-byte big-endian length followed by a bincode-encoded
//! [`BrokerFrame`]. The same framing serves both directions.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::BrokerError;

/// Upper bound on one frame body, in bytes.
pub const MAX_FRAME: usize = 1024 * 1024;

// ----------------------------------------------------------------------------
// Frame Type
// ----------------------------------------------------------------------------

/// One unit of the broker exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrokerFrame {
    /// Invoke the servant registered under `key` with an encoded envelope.
    Request { key: String, envelope: Vec<u8> },
    /// The servant's raw reply bytes.
    Reply { payload: Vec<u8> },
    /// No servant is registered under the requested key.
    NoSuchObject { key: String },
    /// Broker-level failure while handling the request.
    Fault { reason: String },
}

// ----------------------------------------------------------------------------
// Frame I/O
// ----------------------------------------------------------------------------

/// Write one frame.
pub async fn write_frame<W>(writer: &mut W, frame: &BrokerFrame, max: usize) -> Result<(), BrokerError>
where
    W: AsyncWrite + Unpin,
{
    let body = bincode::serialize(frame)?;
    if body.len() > max {
        return Err(BrokerError::FrameTooLarge {
            size: body.len(),
            max,
        });
    }
    writer.write_all(&(body.len() as u32).to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame.
///
/// A clean end of stream before the length prefix surfaces as
/// [`BrokerError::ConnectionClosed`].
pub async fn read_frame<R>(reader: &mut R, max: usize) -> Result<BrokerFrame, BrokerError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            BrokerError::ConnectionClosed
        } else {
            BrokerError::Io(err)
        }
    })?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max {
        return Err(BrokerError::FrameTooLarge { size: len, max });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(bincode::deserialize(&body)?)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frame_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let frame = BrokerFrame::Request {
            key: "acc".to_string(),
            envelope: vec![1, 2, 3],
        };

        write_frame(&mut client, &frame, MAX_FRAME).await.unwrap();
        assert_eq!(read_frame(&mut server, MAX_FRAME).await.unwrap(), frame);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected_on_write() {
        let (mut client, _server) = tokio::io::duplex(4096);
        let frame = BrokerFrame::Reply {
            payload: vec![0u8; 128],
        };
        match write_frame(&mut client, &frame, 16).await {
            Err(BrokerError::FrameTooLarge { .. }) => {}
            other => panic!("expected frame-too-large, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_stream_is_connection_closed() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        match read_frame(&mut server, MAX_FRAME).await {
            Err(BrokerError::ConnectionClosed) => {}
            other => panic!("expected connection-closed, got {other:?}"),
        }
    }
}
