//! Frame encoding and decoding.
//!
//! [`encode`] and [`decode`] operate on in-memory buffers; [`read_message`]
//! and [`write_message`] move whole frames over any tokio byte stream.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    errors::{ProtocolError, Result},
    header::FrameHeader,
    message::Message,
};

/// Encode a message into a complete frame (header + payload).
pub fn encode(message: &Message) -> Result<Bytes> {
    let mut payload = Vec::new();
    ciborium::into_writer(message, &mut payload)
        .map_err(|e| ProtocolError::Cbor(e.to_string()))?;

    if payload.len() > FrameHeader::MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: FrameHeader::MAX_PAYLOAD_SIZE,
        });
    }

    let header = FrameHeader::new(payload.len() as u32);
    let mut buf = BytesMut::with_capacity(FrameHeader::SIZE + payload.len());
    buf.put_slice(&header.to_bytes());
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

/// Decode one frame from the front of `buf`.
///
/// Returns the message and the number of bytes consumed. Trailing bytes
/// belong to subsequent frames and are left untouched.
pub fn decode(buf: &[u8]) -> Result<(Message, usize)> {
    let header = FrameHeader::from_bytes(buf)?;
    let total = FrameHeader::SIZE + header.payload_len();

    let Some(payload) = buf.get(FrameHeader::SIZE..total) else {
        return Err(ProtocolError::Truncated { needed: total, available: buf.len() });
    };

    Ok((decode_payload(payload)?, total))
}

fn decode_payload(payload: &[u8]) -> Result<Message> {
    ciborium::from_reader(payload).map_err(|e| ProtocolError::Cbor(e.to_string()))
}

/// Read exactly one message from `reader`.
///
/// A stream that ends cleanly before the first header byte yields
/// [`ProtocolError::ConnectionClosed`]; ending mid-frame is an I/O error.
pub async fn read_message<R>(reader: &mut R) -> Result<Message>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; FrameHeader::SIZE];
    let first = reader.read(&mut header_buf).await?;
    if first == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    reader.read_exact(&mut header_buf[first..]).await?;

    let header = FrameHeader::from_bytes(&header_buf)?;
    let mut payload = vec![0u8; header.payload_len()];
    reader.read_exact(&mut payload).await?;

    decode_payload(&payload)
}

/// Write one message to `writer` and flush it.
pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
