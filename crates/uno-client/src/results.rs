//! Result bridge: one-shot outcome reporting on terminal state.
//!
//! Terminal snapshots may be redelivered (duplicate pushes, re-subscription
//! after a brief disconnect), so reporting is guarded by a latch that only
//! resets when a new game starts. Reports are best-effort: failures are
//! logged and never retried, and game flow never blocks on them.

use serde::Serialize;
use tokio::sync::mpsc;

use uno_core::view::GameView;

/// Display name of the game in stats reports.
pub const GAME_NAME: &str = "UNO";

/// Upper bound on points a single game may award.
const MAX_POINTS: u32 = 500;

/// Whether the local player won or lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// One reported game result. `points` is zero on loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: Outcome,
    pub points: u32,
}

/// Clamp a points value to the range the stats collaborator accepts.
pub fn clamp_points(points: u32) -> u32 {
    points.min(MAX_POINTS)
}

/// A consumer of game results (embedding host, stats collaborator, ...).
pub trait ResultSink: Send {
    fn report(&self, result: &GameResult);
}

/// Fans a terminal outcome out to every sink exactly once per game.
pub struct ResultBridge {
    sinks: Vec<Box<dyn ResultSink>>,
    reported: bool,
}

impl ResultBridge {
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            reported: false,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    /// Allow the next terminal transition to report again (a new game is
    /// starting).
    pub fn reset(&mut self) {
        self.reported = false;
    }

    /// Inspect an accepted snapshot. Fires the sinks on the first terminal
    /// snapshot of a game; re-arms once a started, non-terminal snapshot
    /// arrives.
    pub fn observe(&mut self, view: &GameView) {
        match &view.over {
            Some(over) => {
                if self.reported {
                    return;
                }
                self.reported = true;
                let result = if view.won_by_me() {
                    GameResult {
                        outcome: Outcome::Win,
                        points: clamp_points(over.points),
                    }
                } else {
                    GameResult {
                        outcome: Outcome::Loss,
                        points: 0,
                    }
                };
                tracing::debug!(?result, "reporting game result");
                for sink in &self.sinks {
                    sink.report(&result);
                }
            }
            None => {
                if view.started {
                    self.reported = false;
                }
            }
        }
    }
}

impl Default for ResultBridge {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Message posted to the embedding host when a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMessage {
    /// Always `"game_end"`.
    pub event: &'static str,
    pub outcome: Outcome,
    pub points_earned: u32,
}

/// Forwards results to the embedding host over a channel, best-effort.
pub struct HostFrameSink {
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl HostFrameSink {
    /// Returns the sink and the receiver the host listens on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResultSink for HostFrameSink {
    fn report(&self, result: &GameResult) {
        let msg = HostMessage {
            event: "game_end",
            outcome: result.outcome,
            points_earned: result.points,
        };
        // The host may be gone; dropped messages are fine.
        let _ = self.tx.send(msg);
    }
}

/// Fire-and-forget POST of each result to the external stats collaborator.
///
/// The collaborator tracks cumulative totals for the authenticated actor;
/// this sink does not read its response, retry failures, or block game flow.
#[cfg(feature = "native")]
pub struct HttpStatsSink {
    endpoint: String,
    client: reqwest::Client,
}

#[cfg(feature = "native")]
impl HttpStatsSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "native")]
impl ResultSink for HttpStatsSink {
    fn report(&self, result: &GameResult) {
        let body = serde_json::json!({
            "outcome": result.outcome,
            "pointsEarned": result.points,
            "game": GAME_NAME,
        });
        let request = self.client.post(&self.endpoint).json(&body);
        let endpoint = self.endpoint.clone();
        // Reporting stays best-effort even when the caller drives the client
        // from outside an async runtime.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%endpoint, "stats report skipped: no async runtime");
            return;
        };
        handle.spawn(async move {
            if let Err(e) = request.send().await {
                tracing::warn!(error = %e, %endpoint, "stats report failed (not retried)");
            }
        });
    }
}
