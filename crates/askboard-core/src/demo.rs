//! Scripted demo traffic for an otherwise quiet board.
//!
//! A [`DemoScript`] is played against the board like any other client:
//! it seeds questions with fixed ids and removes one of them later, so a
//! freshly opened page has something to show. Connected sessions cannot
//! tell demo mutations from real ones.

use std::sync::Arc;
use std::time::Duration;

use askboard_types::{Question, QuestionId};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::board::QuestionBoard;

/// One mutation in a demo script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DemoAction {
    /// Insert a question with a fixed id.
    Add {
        /// Seeded id; keep it below `board.first_question_id`.
        id: QuestionId,
        /// Question text.
        text: String,
    },
    /// Remove a question.
    Remove {
        /// Id to remove.
        id: QuestionId,
    },
}

/// A scheduled [`DemoAction`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoStep {
    /// Offset from the start of the script, in milliseconds.
    pub at_ms: u64,
    /// What to do at that offset.
    #[serde(flatten)]
    pub action: DemoAction,
}

impl DemoStep {
    fn add(at_ms: u64, id: u32, text: &str) -> Self {
        Self {
            at_ms,
            action: DemoAction::Add {
                id: QuestionId(id),
                text: text.to_owned(),
            },
        }
    }

    const fn remove(at_ms: u64, id: u32) -> Self {
        Self {
            at_ms,
            action: DemoAction::Remove { id: QuestionId(id) },
        }
    }
}

/// Ordered list of demo steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DemoScript(Vec<DemoStep>);

impl DemoScript {
    /// Build a script from explicit steps.
    pub const fn new(steps: Vec<DemoStep>) -> Self {
        Self(steps)
    }

    /// The steps, in the order they were given.
    pub fn steps(&self) -> &[DemoStep] {
        &self.0
    }
}

impl Default for DemoScript {
    /// Two questions arrive, one abusive question is posted alongside the
    /// second and taken down two seconds later, then a last question.
    fn default() -> Self {
        Self(vec![
            DemoStep::add(250, 1, "What are some good resources for getting started with HTML5?"),
            DemoStep::add(1000, 2, "Can you explain more about the Web Socket API please?"),
            DemoStep::add(1000, 3, "This is an #&!%!* inappropriate message!!"),
            DemoStep::remove(3000, 3),
            DemoStep::add(4000, 4, "How much of CSS3 can I use right now?"),
        ])
    }
}

/// Outcome counters of a finished demo run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoReport {
    /// Questions inserted.
    pub added: usize,
    /// Questions removed.
    pub removed: usize,
    /// Steps that had no effect (duplicate id or id not on the board).
    pub skipped: usize,
}

/// Play `script` against `board` on a background task.
///
/// Steps run at their offset from the moment this is called, in offset
/// order; steps sharing an offset keep their script order.
pub fn spawn_demo(board: Arc<QuestionBoard>, script: DemoScript) -> JoinHandle<DemoReport> {
    let start = Instant::now();
    let mut steps = script.0;
    steps.sort_by_key(|step| step.at_ms);

    info!(steps = steps.len(), "demo script started");

    tokio::spawn(async move {
        let mut report = DemoReport::default();
        for step in steps {
            let due = start
                .checked_add(Duration::from_millis(step.at_ms))
                .unwrap_or(start);
            tokio::time::sleep_until(due).await;
            apply(&board, step.action, &mut report);
        }
        info!(
            added = report.added,
            removed = report.removed,
            skipped = report.skipped,
            "demo script finished"
        );
        report
    })
}

fn apply(board: &QuestionBoard, action: DemoAction, report: &mut DemoReport) {
    match action {
        DemoAction::Add { id, text } => match board.insert(Question::new(id, text)) {
            Ok(question) => {
                debug!(id = %question.id, "demo question added");
                report.added = report.added.saturating_add(1);
            }
            Err(e) => {
                warn!(error = %e, "demo step skipped");
                report.skipped = report.skipped.saturating_add(1);
            }
        },
        DemoAction::Remove { id } => {
            if board.remove(id) {
                debug!(%id, "demo question removed");
                report.removed = report.removed.saturating_add(1);
            } else {
                debug!(%id, "demo removal had nothing to remove");
                report.skipped = report.skipped.saturating_add(1);
            }
        }
    }
}
