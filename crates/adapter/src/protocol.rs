//! Line codec for peer messages.

use thiserror::Error;
use tracing::warn;

use crate::engine::PeerMessage;

/// Longest line accepted from a peer, newline excluded.
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed peer message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line of {len} bytes exceeds the {max} byte limit")]
    TooLong { len: usize, max: usize },
    #[error("peer line is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Serialize one message as a complete wire line, trailing newline included.
pub fn encode_line(message: &PeerMessage) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Parse one wire line. Blank lines yield `Ok(None)`.
pub fn decode_line(line: &str) -> Result<Option<PeerMessage>, ProtocolError> {
    let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r').trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > MAX_LINE_LEN {
        return Err(ProtocolError::TooLong {
            len: trimmed.len(),
            max: MAX_LINE_LEN,
        });
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// Parse one raw line as read off the socket.
pub fn decode_bytes(line: &[u8]) -> Result<Option<PeerMessage>, ProtocolError> {
    decode_line(std::str::from_utf8(line)?)
}

/// Like [`decode_line`], but logs and drops anything that does not parse.
pub fn decode_line_lossy(line: &str) -> Option<PeerMessage> {
    drop_on_error(decode_line(line))
}

/// Like [`decode_bytes`], but logs and drops anything that does not parse.
pub fn decode_bytes_lossy(line: &[u8]) -> Option<PeerMessage> {
    drop_on_error(decode_bytes(line))
}

fn drop_on_error(decoded: Result<Option<PeerMessage>, ProtocolError>) -> Option<PeerMessage> {
    match decoded {
        Ok(message) => message,
        Err(err) => {
            warn!(%err, "dropping peer line");
            None
        }
    }
}
