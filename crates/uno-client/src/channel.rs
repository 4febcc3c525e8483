//! Channel manager: the persistent connection to the game server.
//!
//! Spawns background reader/writer tasks and exposes channels so the
//! controller can send intents and receive events without owning the socket.
//! The inbound channel closing signals disconnection. Malformed frames are
//! surfaced as [`Inbound::Malformed`] instead of being silently dropped, so
//! the reducer can treat them as protocol rejections.

use thiserror::Error;
use tokio::sync::mpsc;

use uno_core::protocol::{ClientIntent, ServerEvent};

#[cfg(feature = "native")]
use crate::transport::{Transport, TransportReader, TransportWriter};

/// Errors establishing the channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No usable origin candidate; connecting was never attempted.
    #[error("no usable socket origin")]
    NoOrigin,

    /// The transport client is unavailable in this environment; connecting
    /// was never attempted.
    #[error("socket client unavailable: {0}")]
    ClientUnavailable(String),

    /// The connection attempt failed.
    #[error("connect failed: {0}")]
    Connect(String),
}

/// One inbound item from the server.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A well-formed server event.
    Event(ServerEvent),
    /// A non-empty frame that did not parse as a server event.
    Malformed { detail: String },
}

/// Classify a raw text frame.
///
/// Returns `None` for empty/whitespace-only frames, which are skipped.
pub fn parse_server_frame(line: &str) -> Option<Inbound> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ServerEvent>(trimmed) {
        Ok(event) => Some(Inbound::Event(event)),
        Err(e) => Some(Inbound::Malformed {
            detail: e.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Warm-up probe
// ---------------------------------------------------------------------------

/// Best-effort one-shot request to the channel endpoint before connecting.
///
/// Its only purpose is to trigger lazy server-side initialization so the
/// connection attempt does not race a cold start; success and failure are
/// both ignored.
#[cfg(feature = "native")]
pub async fn warm_up(origin: &str) {
    let url = crate::origin::warmup_url(origin, warmup_nonce());
    let result = reqwest::Client::new()
        .get(&url)
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await;
    match result {
        Ok(resp) => tracing::debug!(status = %resp.status(), %url, "warm-up probe answered"),
        Err(e) => tracing::debug!(error = %e, %url, "warm-up probe failed (ignored)"),
    }
}

#[cfg(all(feature = "web", not(feature = "native")))]
pub async fn warm_up(origin: &str) {
    let url = crate::origin::warmup_url(origin, warmup_nonce());
    match gloo_net::http::Request::get(&url).send().await {
        Ok(resp) => tracing::debug!(status = resp.status(), %url, "warm-up probe answered"),
        Err(e) => tracing::debug!(error = %e, %url, "warm-up probe failed (ignored)"),
    }
}

/// Cache-busting nonce for the warm-up URL.
///
/// On WASM `std::time::SystemTime` is unavailable, so the browser clock is
/// used there instead.
#[cfg(feature = "native")]
fn warmup_nonce() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(all(feature = "web", not(feature = "native")))]
fn warmup_nonce() -> u64 {
    js_sys::Date::now() as u64
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A channel-based connection to the game server.
///
/// - [`incoming`](Channel::incoming) yields parsed [`Inbound`] items; the
///   channel closing signals disconnection.
/// - [`send`](Channel::send) enqueues a [`ClientIntent`] non-blocking; the
///   background writer task handles the actual I/O.
pub struct Channel {
    /// Receive inbound items. Channel close = disconnected.
    pub incoming: mpsc::UnboundedReceiver<Inbound>,
    outgoing: mpsc::UnboundedSender<ClientIntent>,
}

impl Channel {
    /// Create a channel over any [`Transport`] implementation.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        let (reader, writer) = transport.split();

        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<ClientIntent>();

        Self::spawn_reader_task(reader, in_tx);
        Self::spawn_writer_task(writer, out_rx);

        Self {
            incoming: in_rx,
            outgoing: out_tx,
        }
    }

    /// Warm up the resolved origin, then open the WebSocket and spawn the
    /// background I/O tasks.
    #[cfg(feature = "native")]
    pub async fn connect(origin: &str) -> Result<Self, ChannelError> {
        warm_up(origin).await;
        let url = crate::origin::socket_url(origin);
        tracing::debug!(%url, "connecting");
        let transport = crate::transport::WsTransport::connect(&url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        Ok(Self::from_transport(transport))
    }

    /// Enqueue a [`ClientIntent`] for transmission.
    pub fn send(&self, intent: ClientIntent) -> Result<(), mpsc::error::SendError<ClientIntent>> {
        self.outgoing.send(intent)
    }

    // ------------------------------------------------------------------
    // WASM WebSocket constructor
    // ------------------------------------------------------------------

    /// Connect from a WASM environment.
    ///
    /// Uses `gloo-net` for the WebSocket and `spawn_local` for the
    /// background tasks (no `Send` requirement).
    #[cfg(all(feature = "web", not(feature = "native")))]
    pub async fn connect(origin: &str) -> Result<Self, ChannelError> {
        use futures_util::{SinkExt, StreamExt};
        use gloo_net::websocket::{Message, futures::WebSocket};

        warm_up(origin).await;
        let url = crate::origin::socket_url(origin);
        let ws = WebSocket::open(&url).map_err(|e| ChannelError::ClientUnavailable(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientIntent>();

        wasm_bindgen_futures::spawn_local(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Some(item) = parse_server_frame(&text)
                            && in_tx.send(item).is_err()
                        {
                            break;
                        }
                    }
                    Ok(Message::Bytes(_)) => {} // skip binary frames
                    Err(_) => break,
                }
            }
            // Stream ended or error — channel drops, signalling disconnect.
        });

        wasm_bindgen_futures::spawn_local(async move {
            while let Some(intent) = out_rx.recv().await {
                let json = match serde_json::to_string(&intent) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            incoming: in_rx,
            outgoing: out_tx,
        })
    }

    // ------------------------------------------------------------------
    // Private: background task spawners (native only)
    // ------------------------------------------------------------------

    #[cfg(feature = "native")]
    fn spawn_reader_task<R: TransportReader>(mut reader: R, in_tx: mpsc::UnboundedSender<Inbound>) {
        tokio::spawn(async move {
            while let Ok(Some(line)) = reader.recv().await {
                if let Some(item) = parse_server_frame(&line)
                    && in_tx.send(item).is_err()
                {
                    break;
                }
            }
            // Connection closed or error — channel drops, signalling disconnect.
        });
    }

    #[cfg(feature = "native")]
    fn spawn_writer_task<W: TransportWriter>(
        mut writer: W,
        mut out_rx: mpsc::UnboundedReceiver<ClientIntent>,
    ) {
        tokio::spawn(async move {
            while let Some(intent) = out_rx.recv().await {
                let json = match serde_json::to_string(&intent) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if writer.send(&json).await.is_err() {
                    break;
                }
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

impl Channel {
    /// Build a channel wired to in-memory endpoints, for tests and embedded
    /// use. Returns the channel plus the far ends: a sender that injects
    /// inbound items and a receiver that observes emitted intents.
    pub fn in_memory() -> (
        Self,
        mpsc::UnboundedSender<Inbound>,
        mpsc::UnboundedReceiver<ClientIntent>,
    ) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        (
            Self {
                incoming: in_rx,
                outgoing: out_tx,
            },
            in_tx,
            out_rx,
        )
    }
}
