//! Length-prefixed framing over async byte streams
//!
//! Each frame is `u32` length in network order followed by the message
//! record. The length must equal [`MESSAGE_LEN`] exactly; anything else
//! is a framing error and the caller is expected to drop the
//! connection.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::message::{Message, ProtocolError, MESSAGE_LEN};

/// Read exactly one framed message.
///
/// A clean EOF before the length prefix, a short frame, or a length
/// prefix different from the record size all surface as errors; the
/// connection is no longer usable afterwards.
pub async fn read_message<R>(stream: &mut R) -> Result<Message, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;

    if len != MESSAGE_LEN {
        return Err(ProtocolError::BadLength {
            expected: MESSAGE_LEN,
            got: len,
        });
    }

    let mut body = vec![0u8; MESSAGE_LEN];
    stream.read_exact(&mut body).await?;
    Message::decode(&body)
}

/// Write one framed message and flush it.
pub async fn write_message<W>(stream: &mut W, msg: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let body = msg.encode();
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);

    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}
