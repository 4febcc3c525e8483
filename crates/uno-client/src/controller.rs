//! Framework-agnostic client controller.
//!
//! Owns a [`Channel`], a [`ClientState`], and the [`ResultBridge`],
//! providing shared dispatch logic:
//!
//! - Processing inbound server events and updating the state.
//! - Validating player actions locally and forwarding the surviving intents.
//!
//! Frontends only need to:
//! 1. Call [`UnoClient::connect`] to establish a connection.
//! 2. Call [`UnoClient::try_recv`] or [`UnoClient::recv`] to process server
//!    events.
//! 3. Call the intent methods ([`play`](UnoClient::play),
//!    [`draw`](UnoClient::draw), ...) on user input.

use uno_core::card::Color;
use uno_core::protocol::ClientIntent;

use crate::channel::{Channel, ChannelError, Inbound};
use crate::origin::{OriginCandidates, resolve_origin};
use crate::results::{HostFrameSink, HostMessage, ResultBridge, ResultSink};
use crate::state::{ClientState, StateChanged};
#[cfg(feature = "native")]
use crate::transport::Transport;

/// Connection-time configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Socket-origin candidates, in priority order.
    pub origins: OriginCandidates,
    /// Local display name.
    pub player_name: String,
    /// Stats collaborator endpoint; results are posted there when set.
    pub stats_endpoint: Option<String>,
}

/// Outcome of processing a single network event.
#[derive(Debug)]
pub enum Poll {
    /// An inbound item was applied; the flags describe what changed.
    Updated(StateChanged),
    /// The server closed the connection.
    Disconnected,
    /// No event was available (channel empty).
    Empty,
}

/// Owns the channel, the client state, and the result bridge.
pub struct UnoClient {
    channel: Channel,
    pub state: ClientState,
    bridge: ResultBridge,
}

impl UnoClient {
    /// Resolve the origin, warm it up, connect, and announce the player.
    ///
    /// Fails with [`ChannelError::NoOrigin`] when no origin candidate is
    /// usable, without ever attempting to connect.
    #[cfg(any(feature = "native", feature = "web"))]
    pub async fn connect(config: ClientConfig) -> Result<Self, ChannelError> {
        let origin = resolve_origin(&config.origins).ok_or(ChannelError::NoOrigin)?;
        let channel = Channel::connect(&origin).await?;
        let mut client = Self::from_channel(channel, &config.player_name);
        #[cfg(feature = "native")]
        if let Some(endpoint) = &config.stats_endpoint {
            client.add_result_sink(Box::new(crate::results::HttpStatsSink::new(endpoint)));
        }
        #[cfg(not(feature = "native"))]
        let _ = &config.stats_endpoint;
        client.state.mark_connected();
        tracing::info!(%origin, "connected");
        // Original on-connect behavior: announce the name, fetch the lobby.
        client.emit(client.state.announce_name());
        client.emit(client.state.request_rooms());
        Ok(client)
    }

    /// Create a controller over any [`Transport`] implementation. The
    /// transport is assumed established; no warm-up or announcement is done.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T, player_name: &str) -> Self {
        let mut client = Self::from_channel(Channel::from_transport(transport), player_name);
        client.state.mark_connected();
        client
    }

    /// Wrap an existing channel. Used by the other constructors and by
    /// tests with in-memory channels.
    pub fn from_channel(channel: Channel, player_name: &str) -> Self {
        Self {
            channel,
            state: ClientState::new(player_name),
            bridge: ResultBridge::new(),
        }
    }

    /// Register an additional result sink.
    pub fn add_result_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.bridge.add_sink(sink);
    }

    /// Wire up the embedding-host bridge; the host listens on the returned
    /// receiver for game-end messages.
    pub fn attach_host_frame(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<HostMessage> {
        let (sink, rx) = HostFrameSink::new();
        self.bridge.add_sink(Box::new(sink));
        rx
    }

    // ------------------------------------------------------------------
    // Event processing
    // ------------------------------------------------------------------

    /// Try to receive and process one inbound item (non-blocking).
    pub fn try_recv(&mut self) -> Poll {
        match self.channel.incoming.try_recv() {
            Ok(item) => self.handle_inbound(item),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => Poll::Empty,
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => self.handle_disconnect(),
        }
    }

    /// Await the next inbound item. Useful in `tokio::select!` loops.
    pub async fn recv(&mut self) -> Poll {
        match self.channel.incoming.recv().await {
            Some(item) => self.handle_inbound(item),
            None => self.handle_disconnect(),
        }
    }

    fn handle_inbound(&mut self, item: Inbound) -> Poll {
        let changed = self.state.apply(&item);
        if changed.view
            && let Some(view) = self.state.view()
        {
            self.bridge.observe(view);
        }
        Poll::Updated(changed)
    }

    fn handle_disconnect(&mut self) -> Poll {
        self.state.mark_disconnected();
        tracing::info!("disconnected");
        Poll::Disconnected
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Request a directory refresh.
    pub fn request_rooms(&self) {
        self.emit(self.state.request_rooms());
    }

    /// Change the display name and announce it to the server.
    pub fn set_name(&mut self, name: &str) {
        let intent = self.state.set_name(name);
        self.emit(intent);
    }

    /// Ask to join a room by id.
    pub fn join(&mut self, room_id: &str) {
        let intent = self.state.join(room_id);
        self.emit(intent);
    }

    /// Ask the server to mint a new room.
    pub fn create(&mut self) {
        let intent = self.state.create();
        self.emit(intent);
    }

    /// Play a card from the hand. For wilds this parks the selection; call
    /// [`pick_color`](Self::pick_color) to complete the play.
    pub fn play(&mut self, card_id: &str) {
        let intent = self.state.play(card_id);
        self.emit(intent);
    }

    /// Resolve the pending wild with a color.
    pub fn pick_color(&mut self, color: Color) {
        let intent = self.state.pick_color(color);
        self.emit(intent);
    }

    /// Draw from the pile.
    pub fn draw(&self) {
        self.emit(self.state.draw());
    }

    /// Toggle the pre-game ready flag.
    pub fn toggle_ready(&self) {
        self.emit(self.state.toggle_ready());
    }

    /// Request a rematch (only meaningful from the game-over state). Re-arms
    /// the result latch so the next game reports again.
    pub fn restart(&mut self) {
        if let Some(intent) = self.state.start() {
            self.bridge.reset();
            self.emit(Some(intent));
        }
    }

    /// Leave the active room and refresh the lobby. Local state is cleared
    /// before anything hits the wire.
    pub fn leave(&mut self) {
        let intent = self.state.leave();
        self.emit(intent);
        self.emit(self.state.request_rooms());
    }

    fn emit(&self, intent: Option<ClientIntent>) {
        if let Some(intent) = intent {
            let _ = self.channel.send(intent);
        }
    }
}
