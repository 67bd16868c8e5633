//! One client's live connection to the question board.
//!
//! A [`ConnectionSession`] is created once the transport handshake has
//! completed and runs until the connection ends:
//!
//! ```text
//! Connecting -> Active -> Closing -> Closed
//! ```
//!
//! On becoming active it snapshots the board and subscribes in one atomic
//! step, sends the snapshot if there is one, then multiplexes two sources
//! on a single task: inbound frames from the client and events from the
//! board. The task exclusively owns the outbound sink, so frames for one
//! connection are never interleaved, and no lock is shared with other
//! connections.
//!
//! Any receive or send failure ends the session. Teardown always
//! unsubscribes from the board before the session reports `Closed`.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use askboard_core::{BoardConfig, QuestionBoard, Subscription};
use askboard_types::{ClientMessage, Question, ServerMessage, SessionId};
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError};

/// Per-session behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay between a `report` and the resulting removal.
    pub report_grace: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&BoardConfig::default())
    }
}

impl From<&BoardConfig> for SessionSettings {
    fn from(config: &BoardConfig) -> Self {
        Self {
            report_grace: config.report_grace(),
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet subscribed.
    Connecting,
    /// Subscribed and exchanging messages.
    Active,
    /// Tearing down.
    Closing,
    /// Unsubscribed and finished.
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a close frame or the stream ended.
    ClientClosed,
    /// Reading from the connection failed.
    ReceiveError(String),
    /// Writing to the connection failed.
    SendFailed(String),
    /// The board detached the subscription because its queue overflowed.
    Detached,
}

/// What a finished session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// The session's identifier.
    pub id: SessionId,
    /// Why it ended.
    pub reason: CloseReason,
    /// Data frames received from the client.
    pub frames_received: u64,
    /// Frames discarded because they did not decode.
    pub malformed: u64,
    /// Messages written to the client.
    pub messages_sent: u64,
}

#[derive(Debug, Default)]
struct Counters {
    frames_received: u64,
    malformed: u64,
    messages_sent: u64,
}

/// A client connection bound to the shared board.
#[derive(Debug)]
pub struct ConnectionSession {
    id: SessionId,
    board: Arc<QuestionBoard>,
    settings: SessionSettings,
    state: watch::Sender<SessionState>,
}

impl ConnectionSession {
    /// Create a session in [`SessionState::Connecting`].
    pub fn new(board: Arc<QuestionBoard>, settings: SessionSettings) -> Self {
        let (state, _) = watch::channel(SessionState::Connecting);
        Self {
            id: SessionId::new(),
            board,
            settings,
            state,
        }
    }

    /// This session's identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Watch the session's lifecycle state.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn transition(&self, next: SessionState) {
        debug!(session_id = %self.id, state = ?next, "session state change");
        self.state.send_replace(next);
    }

    /// Run the session to completion over the given connection halves.
    ///
    /// `inbound` yields frames from the client; `outbound` accepts frames
    /// for it. Returns once the connection has ended and the board
    /// subscription is released.
    pub async fn run<S, K, E>(self, mut inbound: S, mut outbound: K) -> SessionSummary
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
        K: Sink<Message> + Unpin,
        K::Error: Display,
    {
        let (snapshot, mut subscription) = self.board.snapshot_and_subscribe();
        self.transition(SessionState::Active);
        info!(
            session_id = %self.id,
            subscription = %subscription.id(),
            snapshot = snapshot.len(),
            "session active"
        );

        let mut counters = Counters::default();
        let reason = self
            .drive(&mut inbound, &mut outbound, snapshot, &mut subscription, &mut counters)
            .await;

        self.transition(SessionState::Closing);
        subscription.unsubscribe();
        if let Err(e) = outbound.close().await {
            debug!(session_id = %self.id, error = %e, "closing connection failed");
        }
        self.transition(SessionState::Closed);

        info!(
            session_id = %self.id,
            reason = ?reason,
            frames_received = counters.frames_received,
            malformed = counters.malformed,
            messages_sent = counters.messages_sent,
            "session closed"
        );

        SessionSummary {
            id: self.id,
            reason,
            frames_received: counters.frames_received,
            malformed: counters.malformed,
            messages_sent: counters.messages_sent,
        }
    }

    async fn drive<S, K, E>(
        &self,
        inbound: &mut S,
        outbound: &mut K,
        snapshot: Vec<Question>,
        subscription: &mut Subscription,
        counters: &mut Counters,
    ) -> CloseReason
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
        K: Sink<Message> + Unpin,
        K::Error: Display,
    {
        if !snapshot.is_empty() {
            if let Err(reason) =
                send(outbound, &ServerMessage::Questions(snapshot), counters).await
            {
                return reason;
            }
        }

        loop {
            tokio::select! {
                frame = inbound.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.dispatch(codec::decode(text.as_str()), counters);
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            self.dispatch(codec::decode_bytes(&bytes), counters);
                        }
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                            // Answered by the WebSocket layer.
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return CloseReason::ClientClosed;
                        }
                        Some(Err(e)) => {
                            return CloseReason::ReceiveError(e.to_string());
                        }
                    }
                }
                event = subscription.recv() => {
                    let Some(event) = event else {
                        return CloseReason::Detached;
                    };
                    for message in codec::messages_for(event) {
                        if let Err(reason) = send(outbound, &message, counters).await {
                            return reason;
                        }
                    }
                }
            }
        }
    }

    fn dispatch(&self, decoded: Result<ClientMessage, CodecError>, counters: &mut Counters) {
        counters.frames_received = counters.frames_received.saturating_add(1);
        match decoded {
            Ok(ClientMessage::Ask(text)) => {
                let question = self.board.add(text);
                debug!(session_id = %self.id, id = %question.id, "question asked");
            }
            Ok(ClientMessage::Report(id)) => {
                if self.board.contains(id) {
                    // Fire-and-forget; duplicate removals are no-ops.
                    drop(self.board.remove_after(id, self.settings.report_grace));
                    info!(
                        session_id = %self.id,
                        %id,
                        grace_ms = self.settings.report_grace.as_millis(),
                        "question reported, removal scheduled"
                    );
                } else {
                    debug!(session_id = %self.id, %id, "report for unknown question ignored");
                }
            }
            Err(e) => {
                counters.malformed = counters.malformed.saturating_add(1);
                debug!(session_id = %self.id, error = %e, "discarding malformed frame");
            }
        }
    }
}

async fn send<K>(
    outbound: &mut K,
    message: &ServerMessage,
    counters: &mut Counters,
) -> Result<(), CloseReason>
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let text = match codec::encode(message) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "dropping unencodable message");
            return Ok(());
        }
    };
    outbound
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| CloseReason::SendFailed(e.to_string()))?;
    counters.messages_sent = counters.messages_sent.saturating_add(1);
    Ok(())
}
