//! Local mirror of the server's play-legality rule.
//!
//! This exists to drive immediate UI feedback and to avoid emitting intents
//! the server would certainly reject. It never replaces server-side
//! enforcement: the server may still reject a play this function accepted,
//! which surfaces as a game error event.

use crate::card::{Card, Color};

/// Whether `card` may be played on `top` given the active color.
///
/// Wild kinds are always playable. Otherwise the card must match the active
/// color or the top card's kind.
pub fn is_playable(card: &Card, top: &Card, active_color: Color) -> bool {
    if card.kind.is_wild() {
        return true;
    }
    if card.color == Some(active_color) {
        return true;
    }
    card.kind == top.kind
}
