//! Strongly-typed identifiers.
//!
//! [`QuestionId`] is the wire-visible identity of a question and is
//! serialized as a plain JSON integer. [`SessionId`] only ever appears in
//! logs, so it stays a UUID.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identifier of a question on the board.
///
/// Ids are assigned by the board from a monotonic counter and are never
/// reused within a process. Seed data may use fixed ids below the
/// counter's starting point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct QuestionId(pub u32);

impl QuestionId {
    /// The id immediately after this one, saturating at `u32::MAX`.
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QuestionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of one live connection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&QuestionId(1001)).ok();
        assert_eq!(json.as_deref(), Some("1001"));
    }

    #[test]
    fn question_id_from_path_integer() {
        let id = QuestionId::from(1002_u32);
        assert_eq!(id, QuestionId(1002));
        assert_eq!(id.to_string(), "1002");
    }

    #[test]
    fn next_saturates() {
        assert_eq!(QuestionId(7).next(), QuestionId(8));
        assert_eq!(QuestionId(u32::MAX).next(), QuestionId(u32::MAX));
    }

    #[test]
    fn session_ids_are_distinct() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
