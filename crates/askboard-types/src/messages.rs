//! Wire message shapes exchanged over the live WebSocket.
//!
//! Each frame carries exactly one JSON object with exactly one key. Serde's
//! externally tagged enum representation maps each variant to that key:
//!
//! | Direction | Variant | JSON |
//! |-----------|---------|------|
//! | server -> client | [`ServerMessage::Questions`] | `{"questions":[{"id":1001,"text":"..."}]}` |
//! | server -> client | [`ServerMessage::Remove`] | `{"remove":1001}` |
//! | client -> server | [`ClientMessage::Ask`] | `{"ask":"..."}` |
//! | client -> server | [`ClientMessage::Report`] | `{"report":1001}` |

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::QuestionId;
use crate::question::Question;

/// A message pushed from the server to a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Questions the client has not seen yet: the full board on connect,
    /// or just the newly added items afterwards.
    Questions(Vec<Question>),
    /// A question that has left the board.
    Remove(QuestionId),
}

/// A message sent by a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Submit a new question with the given text.
    Ask(String),
    /// Flag a question for delayed removal.
    Report(QuestionId),
}
