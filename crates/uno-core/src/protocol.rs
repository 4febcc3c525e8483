//! Wire protocol between the client and the authoritative game server.
//!
//! Text frames carrying internally-tagged JSON. Intents flow client → server;
//! events flow server → client. Acknowledgements for create/join are explicit
//! events rather than callbacks, correlated by the client's outstanding
//! request.

use serde::{Deserialize, Serialize};

use crate::card::Color;
use crate::view::GameView;

/// Summary of one open room, as shown in the lobby directory.
///
/// The server always pushes the complete list; summaries are never patched
/// individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    #[serde(default)]
    pub players_count: usize,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub over: bool,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientIntent {
    /// Request the full room directory.
    ListRooms,

    /// Create a new room; the server mints the identifier.
    CreateRoom { name: String },

    /// Join an existing room.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, name: String },

    /// Leave the active room. Acknowledgement is best-effort and ignorable.
    LeaveRoom,

    /// Announce the local display name.
    SetName { name: String },

    /// Toggle the pre-game ready flag.
    ToggleReady,

    /// Start a new game. Accepted by the server only between games.
    StartGame,

    /// Play a card. `color` is present exactly when the card is a wild and
    /// carries the declared active color.
    #[serde(rename_all = "camelCase")]
    PlayCard {
        card_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },

    /// Draw a card from the pile.
    DrawCard,
}

/// Messages pushed from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Reply to [`ClientIntent::ListRooms`]; the complete directory.
    RoomList { rooms: Vec<RoomSummary> },

    /// Unsolicited directory refresh; also the complete list.
    RoomUpdate { rooms: Vec<RoomSummary> },

    /// Outcome of a join request.
    #[serde(rename_all = "camelCase")]
    JoinResult {
        ok: bool,
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },

    /// Outcome of a create request.
    #[serde(rename_all = "camelCase")]
    CreateResult {
        ok: bool,
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },

    /// The server rejected an in-flight game intent.
    GameError { message: String },

    /// A complete state snapshot. Supersedes all prior snapshots.
    State { view: GameView },
}

// ---------------------------------------------------------------------------
// Room ID validation
// ---------------------------------------------------------------------------

/// Validate a room ID before emitting a join intent.
///
/// Room IDs must be non-empty, alphanumeric, and fewer than 20 characters.
pub fn validate_room_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("Room ID cannot be empty".to_string());
    }
    if id.len() >= 20 {
        return Err("Room ID must be fewer than 20 characters".to_string());
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Room ID must be alphanumeric".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardKind};

    #[test]
    fn valid_room_ids() {
        assert!(validate_room_id("abc123").is_ok());
        assert!(validate_room_id("A").is_ok());
        assert!(validate_room_id("Room42").is_ok());
        assert!(validate_room_id("1234567890123456789").is_ok()); // 19 chars
    }

    #[test]
    fn invalid_room_ids() {
        assert!(validate_room_id("").is_err());
        assert!(validate_room_id("12345678901234567890").is_err()); // 20 chars
        assert!(validate_room_id("hello world").is_err());
        assert!(validate_room_id("room-1").is_err());
        assert!(validate_room_id("room_1").is_err());
    }

    #[test]
    fn play_intent_omits_color_for_non_wilds() {
        let intent = ClientIntent::PlayCard {
            card_id: "c9".to_string(),
            color: None,
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert_eq!(json, r#"{"type":"playCard","cardId":"c9"}"#);

        let intent = ClientIntent::PlayCard {
            card_id: "w1".to_string(),
            color: Some(Color::Green),
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert_eq!(json, r#"{"type":"playCard","cardId":"w1","color":"green"}"#);
    }

    #[test]
    fn room_list_event_parses() {
        let json = r#"{"type":"roomList","rooms":[
            {"roomId":"alpha","playersCount":1,"started":false,"over":false},
            {"roomId":"beta","playersCount":2,"started":true,"over":false}
        ]}"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::RoomList { rooms } => {
                assert_eq!(rooms.len(), 2);
                assert_eq!(rooms[1].room_id, "beta");
                assert!(rooms[1].started);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn state_event_parses_full_snapshot() {
        let json = r#"{"type":"state","view":{
            "roomId":"alpha",
            "meId":"p1","turnId":"p1",
            "topCard":{"id":"t","type":"5","color":"red"},
            "activeColor":"red",
            "yourHand":[{"id":"h1","type":"change-color"}],
            "opponentCount":7,"deckCount":40,
            "meReady":true,"opponentReady":true,"started":true,
            "meName":"Alice","opponentName":"Bob"
        }}"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::State { view } => {
                assert!(view.my_turn());
                assert_eq!(view.your_hand[0].kind, CardKind::Wild);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn join_result_defaults() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"joinResult","ok":false,"error":"Room is full"}"#)
                .unwrap();
        match event {
            ServerEvent::JoinResult { ok, room_id, error } => {
                assert!(!ok);
                assert_eq!(room_id, None);
                assert_eq!(error.as_deref(), Some("Room is full"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn card_kinds_survive_intent_payloads() {
        // Sanity check that a wild card id from a snapshot can be echoed back.
        let card = Card {
            id: "w1".to_string(),
            kind: CardKind::WildDrawFour,
            color: None,
        };
        let intent = ClientIntent::PlayCard {
            card_id: card.id.clone(),
            color: Some(Color::Blue),
        };
        let json = serde_json::to_string(&intent).unwrap();
        let back: ClientIntent = serde_json::from_str(&json).unwrap();
        match back {
            ClientIntent::PlayCard { card_id, color } => {
                assert_eq!(card_id, "w1");
                assert_eq!(color, Some(Color::Blue));
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }
}
