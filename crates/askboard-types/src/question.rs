//! The question record shared between the board and every client.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::QuestionId;

/// A question submitted to the live board.
///
/// Immutable once created; identity is [`Question::id`]. The text is
/// passed through verbatim and is not sanitized at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Question {
    /// Board-assigned (or seeded) identifier.
    pub id: QuestionId,
    /// Free-form question text.
    pub text: String,
}

impl Question {
    /// Build a question with an explicit id.
    pub fn new(id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
