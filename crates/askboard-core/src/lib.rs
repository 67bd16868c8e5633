//! Shared question board for the Askboard live question service.
//!
//! This crate owns the only shared mutable state in the service and the
//! configuration that shapes it:
//!
//! - [`board`] -- [`QuestionBoard`]: ordered questions, atomic
//!   add/remove, and per-subscriber event queues
//! - [`config`] -- YAML configuration with environment overrides
//! - [`demo`] -- Scripted demo traffic played through the public board API
//!
//! # Ordering
//!
//! Mutation and event dispatch share one lock acquisition, so every
//! subscriber sees events in the order the board applied them.
//! [`QuestionBoard::snapshot_and_subscribe`] takes the snapshot inside the
//! same critical section, which is what lets a new session start from a
//! snapshot without missing or repeating a question.

pub mod board;
pub mod config;
pub mod demo;

pub use board::{BoardError, BoardEvent, QuestionBoard, Subscription, SubscriptionId};
pub use config::{AskboardConfig, BoardConfig, ConfigError, DemoConfig, ListenConfig, LoggingConfig};
pub use demo::{DemoAction, DemoReport, DemoScript, DemoStep, spawn_demo};
