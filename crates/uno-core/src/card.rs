//! Card and color types shared between the wire protocol and the client.
//!
//! The wire encoding matches the authoritative server: colors are lowercase
//! strings, card kinds are the original tag strings (`"0"`–`"9"`, `"block"`,
//! `"reverse"`, `"buy-2"`, `"change-color"`, `"buy-4"`). Unknown tags are a
//! deserialization error rather than being coerced to a default.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four playable colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    /// All four colors, in the order the color picker shows them.
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    /// Lowercase wire/display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a card: a numeral or one of the five action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    /// Numeral card, 0–9.
    Number(u8),
    /// Skip the opponent's turn.
    Skip,
    /// Reverse play direction (acts as a skip with two players).
    Reverse,
    /// Opponent draws two cards.
    DrawTwo,
    /// Wild: declare a new active color.
    Wild,
    /// Wild: declare a new active color, opponent draws four.
    WildDrawFour,
}

impl CardKind {
    /// Whether this kind is playable regardless of the active color.
    pub fn is_wild(self) -> bool {
        matches!(self, CardKind::Wild | CardKind::WildDrawFour)
    }

    /// Wire tag for non-numeral kinds; `None` for numerals (their tag is
    /// the digit itself).
    fn wire_tag(self) -> Option<&'static str> {
        match self {
            CardKind::Number(_) => None,
            CardKind::Skip => Some("block"),
            CardKind::Reverse => Some("reverse"),
            CardKind::DrawTwo => Some("buy-2"),
            CardKind::Wild => Some("change-color"),
            CardKind::WildDrawFour => Some("buy-4"),
        }
    }

    /// Parse a wire tag back into a kind.
    pub fn from_wire(tag: &str) -> Option<CardKind> {
        match tag {
            "block" => Some(CardKind::Skip),
            "reverse" => Some(CardKind::Reverse),
            "buy-2" => Some(CardKind::DrawTwo),
            "change-color" => Some(CardKind::Wild),
            "buy-4" => Some(CardKind::WildDrawFour),
            _ => {
                let digit = tag.parse::<u8>().ok()?;
                if tag.len() == 1 && digit <= 9 {
                    Some(CardKind::Number(digit))
                } else {
                    None
                }
            }
        }
    }

    /// Short label for UI display.
    pub fn label(self) -> String {
        match self {
            CardKind::Number(n) => n.to_string(),
            CardKind::Skip => "SKIP".to_string(),
            CardKind::Reverse => "REV".to_string(),
            CardKind::DrawTwo => "+2".to_string(),
            CardKind::Wild => "WILD".to_string(),
            CardKind::WildDrawFour => "+4".to_string(),
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wire_tag() {
            Some(tag) => f.write_str(tag),
            None => match self {
                CardKind::Number(n) => write!(f, "{n}"),
                _ => unreachable!(),
            },
        }
    }
}

impl Serialize for CardKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CardKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = CardKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a card kind tag (\"0\"-\"9\", \"block\", \"reverse\", \"buy-2\", \"change-color\", \"buy-4\")")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CardKind, E> {
                CardKind::from_wire(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// A single card as observed in a snapshot.
///
/// `id` is opaque and unique within a hand or table at any instant.
/// `color` is absent for the two wild kinds until the player resolves one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Card {
    pub fn is_wild(&self) -> bool {
        self.kind.is_wild()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(c) => write!(f, "{} {}", c, self.kind.label()),
            None => f.write_str(&self.kind.label()),
        }
    }
}
