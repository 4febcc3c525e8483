//! The per-connection view snapshot pushed by the authoritative server.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Color};
use crate::rules::is_playable;

/// Terminal outcome of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub winner_id: String,
    #[serde(default)]
    pub points: u32,
}

/// A complete, self-sufficient snapshot of one game as seen by the local
/// player. Each snapshot supersedes all prior ones; the client never merges.
///
/// While `started` is false the turn/top-card/active-color fields are not
/// meaningful and the derivations below return false accordingly. Once
/// `over` is present the view is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Room identifier. The server may omit it; the reducer then keeps the
    /// identifier it already knows for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    /// The local player's identifier.
    pub me_id: String,
    /// Identifier of the player whose turn it is.
    #[serde(default)]
    pub turn_id: String,
    /// Current top-of-discard card.
    #[serde(default)]
    pub top_card: Option<Card>,
    /// The color new plays must match (always concrete, even right after a
    /// wild — the server resolves it before pushing).
    pub active_color: Color,
    /// The local player's hand. Order is display-only.
    #[serde(default)]
    pub your_hand: Vec<Card>,
    /// Opponent's remaining-card count.
    #[serde(default)]
    pub opponent_count: usize,
    /// Draw pile size.
    #[serde(default)]
    pub deck_count: usize,
    #[serde(default)]
    pub me_ready: bool,
    #[serde(default)]
    pub opponent_ready: bool,
    #[serde(default)]
    pub started: bool,
    /// Present once the game has ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over: Option<GameOutcome>,
    #[serde(default)]
    pub me_name: Option<String>,
    #[serde(default)]
    pub opponent_name: Option<String>,
}

impl GameView {
    /// Whether the local player may act: the turn-holder is the local
    /// player, the game has started, and the game is not over.
    pub fn my_turn(&self) -> bool {
        self.started && self.over.is_none() && self.turn_id == self.me_id
    }

    /// Whether the view is terminal.
    pub fn is_over(&self) -> bool {
        self.over.is_some()
    }

    /// Whether the terminal outcome, if any, is a win for the local player.
    pub fn won_by_me(&self) -> bool {
        self.over
            .as_ref()
            .is_some_and(|o| o.winner_id == self.me_id)
    }

    /// Whether `card` is legal to play right now. Pure derivation from this
    /// snapshot; false before start, after the end, or with no discard yet.
    pub fn playable(&self, card: &Card) -> bool {
        if !self.started || self.is_over() {
            return false;
        }
        match &self.top_card {
            Some(top) => is_playable(card, top, self.active_color),
            None => false,
        }
    }

    /// Look up a card in the local hand by id.
    pub fn card_in_hand(&self, card_id: &str) -> Option<&Card> {
        self.your_hand.iter().find(|c| c.id == card_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardKind;

    fn base_view() -> GameView {
        GameView {
            room_id: Some("r1".to_string()),
            me_id: "me".to_string(),
            turn_id: "me".to_string(),
            top_card: Some(Card {
                id: "t".to_string(),
                kind: CardKind::Number(5),
                color: Some(Color::Red),
            }),
            active_color: Color::Red,
            your_hand: vec![
                Card {
                    id: "h1".to_string(),
                    kind: CardKind::Number(5),
                    color: Some(Color::Blue),
                },
                Card {
                    id: "h2".to_string(),
                    kind: CardKind::Skip,
                    color: Some(Color::Green),
                },
            ],
            opponent_count: 7,
            deck_count: 40,
            me_ready: true,
            opponent_ready: true,
            started: true,
            over: None,
            me_name: Some("Me".to_string()),
            opponent_name: Some("Opp".to_string()),
        }
    }

    #[test]
    fn only_kind_match_is_playable() {
        let view = base_view();
        let hand = &view.your_hand;
        assert!(view.playable(&hand[0])); // blue 5 matches kind
        assert!(!view.playable(&hand[1])); // green skip matches neither
    }

    #[test]
    fn nothing_playable_before_start_or_after_end() {
        let mut view = base_view();
        view.started = false;
        let card = view.your_hand[0].clone();
        assert!(!view.playable(&card));
        assert!(!view.my_turn());

        let mut view = base_view();
        view.over = Some(GameOutcome {
            winner_id: "opp".to_string(),
            points: 120,
        });
        assert!(!view.playable(&card));
        assert!(!view.my_turn());
    }

    #[test]
    fn turn_ownership_requires_matching_id() {
        let mut view = base_view();
        assert!(view.my_turn());
        view.turn_id = "opp".to_string();
        assert!(!view.my_turn());
    }

    #[test]
    fn snapshot_parses_with_missing_optionals() {
        let json = r#"{
            "meId": "me",
            "turnId": "opp",
            "activeColor": "yellow",
            "yourHand": [{"id":"c1","type":"7","color":"yellow"}],
            "topCard": {"id":"t","type":"buy-4"},
            "started": true
        }"#;
        let view: GameView = serde_json::from_str(json).unwrap();
        assert_eq!(view.room_id, None);
        assert_eq!(view.active_color, Color::Yellow);
        assert!(view.playable(&view.your_hand[0])); // yellow 7 on active yellow
        assert!(!view.my_turn());
    }
}
