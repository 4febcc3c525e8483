//! Client state: the view reducer and the intent dispatcher.
//!
//! [`ClientState`] is the single owner of the local view model, the lobby
//! directory linkage, and the pending wild-card selection. Server events are
//! folded in through [`apply`](ClientState::apply); player actions go
//! through the intent builders, which validate against the current view and
//! return `Some(intent)` to emit or `None` for a silent local rejection.
//! The builders never surface errors for rejected actions — they exist to
//! prevent round-trips the server would certainly refuse, and the server
//! remains the sole authority.

use std::fmt;

use uno_core::card::Color;
use uno_core::protocol::{ClientIntent, ServerEvent, validate_room_id};
use uno_core::view::GameView;

use crate::channel::Inbound;
use crate::lobby::RoomDirectory;

/// Transport connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Disconnected,
    Connecting,
    Connected,
}

/// A wild card the local player has chosen to play but not yet colored.
///
/// At most one exists at a time; while present it blocks play and draw
/// intents (ready-toggle stays permitted) until a color is picked or the
/// player leaves the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWild {
    pub card_id: String,
}

/// The in-flight room request, used to correlate join/create
/// acknowledgements. A late acknowledgement for a room the player has
/// already abandoned no longer matches and is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RoomRequest {
    Join(String),
    Create,
}

/// Describes what changed after applying an inbound item, so a frontend can
/// decide what to re-render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// The lobby directory was refreshed.
    pub rooms: bool,
    /// The view snapshot was replaced.
    pub view: bool,
    /// The derived status line may differ.
    pub status: bool,
}

impl StateChanged {
    pub fn any(self) -> bool {
        self.rooms || self.view || self.status
    }
}

/// Dispatcher phase, derived from the state tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    /// Connected but not in a room.
    Connected,
    /// In a room, game not started.
    NotStarted,
    /// Game in progress.
    Playing,
    /// Game in progress, wild color selection pending.
    WildPending,
    /// Game ended; only leave and restart are meaningful.
    Over,
}

/// Displayable status, a pure function of the state tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Connecting,
    /// A displayable transport fault or protocol rejection.
    Trouble(String),
    /// Connected; pick a room or create one.
    Lobby,
    /// Joined, no opponent yet, not ready.
    WaitingForOpponent,
    /// Joined and ready, waiting for an opponent to join.
    WaitingForOpponentJoin,
    /// Opponent present, neither seat ready.
    ClickReady,
    /// Local seat ready, opponent not.
    WaitingForOpponentReady,
    /// Opponent ready, local seat not.
    OpponentReady,
    /// Both seats ready.
    Starting,
    YourTurn,
    OpponentTurn,
    Won { points: u32 },
    Lost,
    /// Joined but no snapshot received yet.
    WaitingForState,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Connecting => f.write_str("Connecting…"),
            Status::Trouble(msg) => f.write_str(msg),
            Status::Lobby => f.write_str("Pick a room or create one"),
            Status::WaitingForOpponent => f.write_str("Waiting for opponent"),
            Status::WaitingForOpponentJoin => f.write_str("Waiting for opponent to join"),
            Status::ClickReady => f.write_str("Click Get Ready"),
            Status::WaitingForOpponentReady => f.write_str("Waiting for opponent to get ready"),
            Status::OpponentReady => f.write_str("Opponent is ready"),
            Status::Starting => f.write_str("Starting…"),
            Status::YourTurn => f.write_str("Your turn"),
            Status::OpponentTurn => f.write_str("Opponent's turn"),
            Status::Won { points } => write!(f, "You won +{points} points"),
            Status::Lost => f.write_str("You lost"),
            Status::WaitingForState => f.write_str("Waiting for state…"),
        }
    }
}

/// All client-side state for one connection.
#[derive(Debug, Clone)]
pub struct ClientState {
    connection: Connection,
    joined: bool,
    player_name: String,
    view: Option<GameView>,
    directory: RoomDirectory,
    wild_pending: Option<PendingWild>,
    awaiting: Option<RoomRequest>,
    last_error: Option<String>,
}

impl ClientState {
    /// Fresh state for a connection attempt in flight.
    pub fn new(player_name: &str) -> Self {
        Self {
            connection: Connection::Connecting,
            joined: false,
            player_name: player_name.to_string(),
            view: None,
            directory: RoomDirectory::new(),
            wild_pending: None,
            awaiting: None,
            last_error: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn connection(&self) -> Connection {
        self.connection
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// The current view snapshot, if one has been accepted.
    pub fn view(&self) -> Option<&GameView> {
        self.view.as_ref()
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    pub fn active_room(&self) -> Option<&str> {
        self.directory.active_room()
    }

    /// Id of the wild card awaiting a color pick, if any.
    pub fn pending_wild(&self) -> Option<&str> {
        self.wild_pending.as_ref().map(|p| p.card_id.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ------------------------------------------------------------------
    // Derivations (pure functions of the state tuple)
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        match self.connection {
            Connection::Disconnected => Phase::Disconnected,
            Connection::Connecting => Phase::Connecting,
            Connection::Connected => {
                if !self.joined {
                    Phase::Connected
                } else if self.view.as_ref().is_some_and(GameView::is_over) {
                    Phase::Over
                } else if self.wild_pending.is_some() {
                    Phase::WildPending
                } else if self.view.as_ref().is_some_and(|v| v.started) {
                    Phase::Playing
                } else {
                    Phase::NotStarted
                }
            }
        }
    }

    pub fn status(&self) -> Status {
        match self.connection {
            Connection::Connecting => Status::Connecting,
            Connection::Disconnected => match &self.last_error {
                Some(msg) => Status::Trouble(msg.clone()),
                None => Status::Connecting,
            },
            Connection::Connected => {
                if !self.joined {
                    return match &self.last_error {
                        Some(msg) => Status::Trouble(msg.clone()),
                        None => Status::Lobby,
                    };
                }
                let Some(view) = &self.view else {
                    return Status::WaitingForState;
                };
                if let Some(over) = &view.over {
                    return if view.won_by_me() {
                        Status::Won { points: over.points }
                    } else {
                        Status::Lost
                    };
                }
                if !view.started {
                    if let Some(msg) = &self.last_error {
                        return Status::Trouble(msg.clone());
                    }
                    return ready_status(view);
                }
                if view.my_turn() {
                    Status::YourTurn
                } else {
                    Status::OpponentTurn
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Transport transitions
    // ------------------------------------------------------------------

    pub fn mark_connected(&mut self) {
        self.connection = Connection::Connected;
        self.last_error = None;
    }

    /// Full reset to the pre-join state. Reconnecting must not resurrect an
    /// abandoned room without an explicit rejoin.
    pub fn mark_disconnected(&mut self) {
        self.connection = Connection::Disconnected;
        self.joined = false;
        self.view = None;
        self.wild_pending = None;
        self.awaiting = None;
        self.directory.clear();
    }

    pub fn mark_connect_error(&mut self, message: &str) {
        self.mark_disconnected();
        self.last_error = Some(message.to_string());
    }

    // ------------------------------------------------------------------
    // Reducer
    // ------------------------------------------------------------------

    /// Fold one inbound item into the state.
    pub fn apply(&mut self, inbound: &Inbound) -> StateChanged {
        match inbound {
            Inbound::Event(event) => self.apply_event(event),
            Inbound::Malformed { detail } => {
                tracing::warn!(%detail, "malformed server event");
                self.last_error = Some(format!("Malformed server event: {detail}"));
                StateChanged {
                    status: true,
                    ..StateChanged::default()
                }
            }
        }
    }

    fn apply_event(&mut self, event: &ServerEvent) -> StateChanged {
        let mut changed = StateChanged::default();

        match event {
            ServerEvent::RoomList { rooms } | ServerEvent::RoomUpdate { rooms } => {
                self.directory.apply(rooms.clone());
                changed.rooms = true;
            }

            ServerEvent::JoinResult { ok, room_id, error } => {
                if !ok {
                    // Failure acks correlate too: an unsolicited or stale
                    // rejection must not surface an error.
                    if !matches!(self.awaiting, Some(RoomRequest::Join(_))) {
                        tracing::debug!(?room_id, "ignoring stale join rejection");
                        return changed;
                    }
                    self.awaiting = None;
                    self.last_error = Some(
                        error.clone().unwrap_or_else(|| "Failed to join".to_string()),
                    );
                    changed.status = true;
                    return changed;
                }
                // Accept only while the matching request is outstanding; a
                // late acknowledgement for an abandoned room is ignored.
                let accepted = match (&self.awaiting, room_id) {
                    (Some(RoomRequest::Join(awaited)), Some(confirmed)) => awaited == confirmed,
                    (Some(RoomRequest::Join(_)), None) => true,
                    _ => false,
                };
                if !accepted {
                    tracing::debug!(?room_id, "ignoring stale join acknowledgement");
                    return changed;
                }
                let confirmed = match (room_id, &self.awaiting) {
                    (Some(id), _) => id.clone(),
                    (None, Some(RoomRequest::Join(awaited))) => awaited.clone(),
                    _ => return changed,
                };
                self.awaiting = None;
                self.joined = true;
                self.last_error = None;
                self.directory.set_active_room(confirmed);
                changed.status = true;
            }

            ServerEvent::CreateResult { ok, room_id, error } => {
                if !ok {
                    if !matches!(self.awaiting, Some(RoomRequest::Create)) {
                        tracing::debug!(?room_id, "ignoring stale create rejection");
                        return changed;
                    }
                    self.awaiting = None;
                    self.last_error = Some(
                        error
                            .clone()
                            .unwrap_or_else(|| "Failed to create room".to_string()),
                    );
                    changed.status = true;
                    return changed;
                }
                if !matches!(self.awaiting, Some(RoomRequest::Create)) {
                    tracing::debug!(?room_id, "ignoring stale create acknowledgement");
                    return changed;
                }
                if let Some(id) = room_id {
                    self.directory.set_active_room(id.clone());
                    // The server confirms occupancy with a join result for
                    // the minted room; keep correlating until it arrives.
                    self.awaiting = Some(RoomRequest::Join(id.clone()));
                } else {
                    self.awaiting = None;
                }
                self.last_error = None;
                changed.status = true;
            }

            ServerEvent::GameError { message } => {
                self.last_error = Some(message.clone());
                changed.status = true;
            }

            ServerEvent::State { view } => {
                if !self.joined {
                    // Late snapshot for a room already abandoned.
                    tracing::debug!(room = ?view.room_id, "dropping snapshot while not joined");
                    return changed;
                }
                let mut view = view.clone();
                match (&view.room_id, self.directory.active_room()) {
                    // Snapshot lacks a room id; keep the known one for display.
                    (None, Some(known)) => view.room_id = Some(known.to_string()),
                    (Some(id), None) => self.directory.set_active_room(id.clone()),
                    _ => {}
                }
                if view.is_over() {
                    self.wild_pending = None;
                }
                self.view = Some(view);
                changed.view = true;
                changed.status = true;
            }
        }

        changed
    }

    // ------------------------------------------------------------------
    // Intent builders
    // ------------------------------------------------------------------

    /// Request a directory refresh.
    pub fn request_rooms(&self) -> Option<ClientIntent> {
        if self.connection != Connection::Connected {
            return None;
        }
        Some(ClientIntent::ListRooms)
    }

    /// Announce the display name.
    pub fn announce_name(&self) -> Option<ClientIntent> {
        if self.connection != Connection::Connected {
            return None;
        }
        Some(ClientIntent::SetName {
            name: self.player_name.clone(),
        })
    }

    /// Change the display name and announce it. Best-effort: the server
    /// acknowledges implicitly through later snapshots.
    pub fn set_name(&mut self, name: &str) -> Option<ClientIntent> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.player_name = trimmed.to_string();
        self.announce_name()
    }

    /// Ask to join `room_id`. Invalid ids never reach the wire.
    pub fn join(&mut self, room_id: &str) -> Option<ClientIntent> {
        if self.connection != Connection::Connected || self.joined {
            return None;
        }
        if let Err(msg) = validate_room_id(room_id) {
            self.last_error = Some(msg);
            return None;
        }
        self.last_error = None;
        self.awaiting = Some(RoomRequest::Join(room_id.to_string()));
        Some(ClientIntent::JoinRoom {
            room_id: room_id.to_string(),
            name: self.player_name.clone(),
        })
    }

    /// Ask the server to mint a new room.
    pub fn create(&mut self) -> Option<ClientIntent> {
        if self.connection != Connection::Connected || self.joined {
            return None;
        }
        self.last_error = None;
        self.awaiting = Some(RoomRequest::Create);
        Some(ClientIntent::CreateRoom {
            name: self.player_name.clone(),
        })
    }

    /// Play a card. Wilds do not emit yet: they park a [`PendingWild`] and
    /// wait for [`pick_color`](Self::pick_color).
    pub fn play(&mut self, card_id: &str) -> Option<ClientIntent> {
        if self.wild_pending.is_some() {
            return None;
        }
        let view = self.view.as_ref()?;
        if !view.my_turn() {
            return None;
        }
        // A card no longer in hand means the action already happened or the
        // snapshot moved on; drop silently.
        let card = view.card_in_hand(card_id)?;
        if !view.playable(card) {
            return None;
        }
        if card.is_wild() {
            self.wild_pending = Some(PendingWild {
                card_id: card_id.to_string(),
            });
            return None;
        }
        Some(ClientIntent::PlayCard {
            card_id: card_id.to_string(),
            color: None,
        })
    }

    /// Resolve the pending wild with a color. Fire-and-forget: the pending
    /// selection is cleared on emission and the next snapshot is the source
    /// of truth.
    pub fn pick_color(&mut self, color: Color) -> Option<ClientIntent> {
        self.wild_pending.as_ref()?;
        if !self.view.as_ref().is_some_and(GameView::my_turn) {
            return None;
        }
        let pending = self.wild_pending.take()?;
        Some(ClientIntent::PlayCard {
            card_id: pending.card_id,
            color: Some(color),
        })
    }

    /// Draw from the pile.
    pub fn draw(&self) -> Option<ClientIntent> {
        if self.wild_pending.is_some() {
            return None;
        }
        if !self.view.as_ref().is_some_and(GameView::my_turn) {
            return None;
        }
        Some(ClientIntent::DrawCard)
    }

    /// Toggle the pre-game ready flag. A handshake, not a turn action: any
    /// joined, non-terminal state may toggle it, wild selection included.
    pub fn toggle_ready(&self) -> Option<ClientIntent> {
        if !self.joined {
            return None;
        }
        if self.view.as_ref().is_some_and(GameView::is_over) {
            return None;
        }
        Some(ClientIntent::ToggleReady)
    }

    /// Request a rematch. Only meaningful once the game is over; the server
    /// re-confirms via the next snapshot.
    pub fn start(&self) -> Option<ClientIntent> {
        if self.phase() != Phase::Over {
            return None;
        }
        Some(ClientIntent::StartGame)
    }

    /// Leave the active room.
    ///
    /// Clears the view, the active-room linkage, and any pending wild
    /// synchronously, before the intent hits the wire — local state must
    /// never reflect a room the player has abandoned, even if the leave
    /// acknowledgement is delayed or lost.
    pub fn leave(&mut self) -> Option<ClientIntent> {
        if !self.joined && self.directory.active_room().is_none() {
            return None;
        }
        self.joined = false;
        self.view = None;
        self.wild_pending = None;
        self.awaiting = None;
        self.last_error = None;
        self.directory.clear_active_room();
        Some(ClientIntent::LeaveRoom)
    }
}

/// Pre-start status ladder, mirroring the ready handshake.
fn ready_status(view: &GameView) -> Status {
    let opponent_present = view.opponent_name.is_some();
    if !opponent_present {
        return if view.me_ready {
            Status::WaitingForOpponentJoin
        } else {
            Status::WaitingForOpponent
        };
    }
    match (view.me_ready, view.opponent_ready) {
        (true, true) => Status::Starting,
        (true, false) => Status::WaitingForOpponentReady,
        (false, true) => Status::OpponentReady,
        (false, false) => Status::ClickReady,
    }
}
