//! JSON codec between WebSocket frames and the wire message enums.
//!
//! Outbound board events become [`ServerMessage`]s; inbound frames are
//! decoded into [`ClientMessage`]s. Anything that is not exactly one of
//! the known single-key objects is [`CodecError::Malformed`].

use askboard_core::BoardEvent;
use askboard_types::{ClientMessage, ServerMessage};

/// Errors produced while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The inbound payload is not a recognised client message.
    #[error("malformed client message: {0}")]
    Malformed(#[source] serde_json::Error),

    /// An outbound message could not be serialized.
    #[error("failed to encode server message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Serialize an outbound message to its JSON text.
pub fn encode(message: &ServerMessage) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(CodecError::Encode)
}

/// Decode a text frame.
pub fn decode(text: &str) -> Result<ClientMessage, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Malformed)
}

/// Decode a binary frame holding UTF-8 JSON.
pub fn decode_bytes(bytes: &[u8]) -> Result<ClientMessage, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Malformed)
}

/// Outbound messages for one board event.
///
/// Additions become a single `questions` message carrying only the new
/// items; each removed id becomes its own `remove` message.
pub fn messages_for(event: BoardEvent) -> Vec<ServerMessage> {
    match event {
        BoardEvent::Added(questions) if questions.is_empty() => Vec::new(),
        BoardEvent::Added(questions) => vec![ServerMessage::Questions(questions)],
        BoardEvent::Removed(ids) => ids.into_iter().map(ServerMessage::Remove).collect(),
    }
}
