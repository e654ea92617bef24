//! Bus frame codec
//!
//! ```text
//! ┌────────┬────────────┬────────────────┬──────────┬─────────┐
//! │ type 1 │ request 16 │ correlation 16 │ len 4 LE │ payload │
//! └────────┴────────────┴────────────────┴──────────┴─────────┘
//! ```
//!
//! A nil correlation id means "no correlation".

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use crate::error::MessageError;
use shared::message::{BusMessage, EventType};

/// Largest payload accepted from the wire
pub const MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Read one frame
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<BusMessage, MessageError> {
    // Read event type (1 byte)
    let mut type_buf = [0u8; 1];
    reader.read_exact(&mut type_buf).await?;

    let event_type = EventType::try_from(type_buf[0]).map_err(|_| {
        MessageError::InvalidMessage(format!("Invalid event type: {}", type_buf[0]))
    })?;

    // Read Request ID (16 bytes)
    let mut uuid_buf = [0u8; 16];
    reader.read_exact(&mut uuid_buf).await?;
    let request_id = Uuid::from_bytes(uuid_buf);

    // Read Correlation ID (16 bytes)
    let mut correlation_buf = [0u8; 16];
    reader.read_exact(&mut correlation_buf).await?;
    let correlation_id = Some(Uuid::from_bytes(correlation_buf)).filter(|id| !id.is_nil());

    // Read payload length (4 bytes)
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_PAYLOAD_LEN {
        return Err(MessageError::InvalidMessage(format!(
            "Payload too large: {} bytes",
            len
        )));
    }

    // Read payload
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    Ok(BusMessage {
        request_id,
        event_type,
        correlation_id,
        payload,
    })
}

/// Write one frame
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg: &BusMessage,
) -> Result<(), MessageError> {
    if msg.payload.len() > MAX_PAYLOAD_LEN {
        return Err(MessageError::InvalidMessage(format!(
            "Payload too large: {} bytes",
            msg.payload.len()
        )));
    }

    let mut data = Vec::with_capacity(37 + msg.payload.len());
    data.push(msg.event_type as u8);
    data.extend_from_slice(msg.request_id.as_bytes());
    data.extend_from_slice(msg.correlation_id.unwrap_or(Uuid::nil()).as_bytes());
    data.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&msg.payload);

    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}
