//! Wire transport to the game server.
//!
//! Everything above this layer deals in whole text frames: JSON events in,
//! JSON intents out. The [`Transport`] trait captures exactly that, so the
//! channel manager never touches WebSocket details and tests can substitute
//! in-memory pipes. The WASM path (gloo-net) lives in the channel module
//! because it cannot satisfy the `Send` bounds required here for `tokio::spawn`.

use std::future::Future;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The server closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O or protocol-level error.
    #[error("{0}")]
    Io(String),
}

/// Inbound half: a stream of text frames from the server.
pub trait TransportReader: Send + 'static {
    /// Next frame, or `Ok(None)` on a clean close. Non-text frames are the
    /// implementation's concern and never surface here.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;
}

/// Outbound half: intents serialized by the caller, one frame each.
pub trait TransportWriter: Send + 'static {
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A connected transport. Splitting yields independently owned halves so the
/// channel manager can run its reader and writer in separate tasks.
pub trait Transport: Send + 'static {
    type Reader: TransportReader;
    type Writer: TransportWriter;

    fn split(self) -> (Self::Reader, Self::Writer);
}

// ---------------------------------------------------------------------------
// WebSocket transport (native)
// ---------------------------------------------------------------------------

#[cfg(feature = "native")]
mod ws {
    use futures_util::stream::{SplitSink, SplitStream};
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

    use super::{Transport, TransportError, TransportReader, TransportWriter};

    type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

    /// WebSocket transport for native targets. `ws://` and `wss://` both
    /// work; TLS is picked from the URL scheme.
    pub struct WsTransport {
        stream: WsStream,
    }

    impl WsTransport {
        /// Dial the channel endpoint URL produced by
        /// [`socket_url`](crate::origin::socket_url).
        pub async fn connect(url: &str) -> Result<Self, TransportError> {
            let (stream, _response) = connect_async(url)
                .await
                .map_err(|e| TransportError::Io(e.to_string()))?;
            Ok(Self { stream })
        }
    }

    impl Transport for WsTransport {
        type Reader = WsReader;
        type Writer = WsWriter;

        fn split(self) -> (Self::Reader, Self::Writer) {
            let (sink, stream) = self.stream.split();
            (WsReader { stream }, WsWriter { sink })
        }
    }

    pub struct WsReader {
        stream: SplitStream<WsStream>,
    }

    impl TransportReader for WsReader {
        async fn recv(&mut self) -> Result<Option<String>, TransportError> {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                    Some(Ok(Message::Close(_))) | None => return Ok(None),
                    // Binary, ping and pong frames carry no events.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(TransportError::Io(e.to_string())),
                }
            }
        }
    }

    pub struct WsWriter {
        sink: SplitSink<WsStream, Message>,
    }

    impl TransportWriter for WsWriter {
        async fn send(&mut self, text: &str) -> Result<(), TransportError> {
            self.sink
                .send(Message::text(text))
                .await
                .map_err(|e| TransportError::Io(e.to_string()))
        }
    }
}

#[cfg(feature = "native")]
pub use ws::{WsReader, WsTransport, WsWriter};
