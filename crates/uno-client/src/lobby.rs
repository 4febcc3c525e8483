//! Room directory: the cached lobby listing and the active-room linkage.

use uno_core::protocol::RoomSummary;

/// Cache of the server's room directory.
///
/// The server always pushes the complete list, so every refresh replaces
/// the cache wholesale; there is no per-room diffing. An empty list is a
/// valid, renderable state, not an error.
#[derive(Debug, Clone, Default)]
pub struct RoomDirectory {
    rooms: Vec<RoomSummary>,
    active_room: Option<String>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached listing, latest refresh wins.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// The room this connection has joined or created, if any.
    pub fn active_room(&self) -> Option<&str> {
        self.active_room.as_deref()
    }

    /// Replace the cached listing wholesale.
    ///
    /// A refresh never evicts the player from their active room, even when
    /// the new listing no longer mentions it — only an explicit leave or an
    /// authoritative error does that.
    pub fn apply(&mut self, rooms: Vec<RoomSummary>) {
        self.rooms = rooms;
    }

    pub fn set_active_room(&mut self, room_id: String) {
        self.active_room = Some(room_id);
    }

    pub fn clear_active_room(&mut self) {
        self.active_room = None;
    }

    /// Discard everything (disconnect or teardown).
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.active_room = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, players: usize) -> RoomSummary {
        RoomSummary {
            room_id: id.to_string(),
            players_count: players,
            started: false,
            over: false,
        }
    }

    #[test]
    fn refresh_replaces_wholesale() {
        let mut dir = RoomDirectory::new();
        dir.apply(vec![summary("a", 1), summary("b", 2)]);
        assert_eq!(dir.rooms().len(), 2);

        dir.apply(vec![summary("c", 1)]);
        assert_eq!(dir.rooms().len(), 1);
        assert_eq!(dir.rooms()[0].room_id, "c");
    }

    #[test]
    fn empty_listing_is_valid() {
        let mut dir = RoomDirectory::new();
        dir.apply(vec![summary("a", 1)]);
        dir.apply(Vec::new());
        assert!(dir.rooms().is_empty());
    }

    #[test]
    fn refresh_never_evicts_active_room() {
        let mut dir = RoomDirectory::new();
        dir.set_active_room("mine".to_string());
        dir.apply(vec![summary("other", 2)]);
        assert_eq!(dir.active_room(), Some("mine"));

        dir.clear_active_room();
        assert_eq!(dir.active_room(), None);
    }

    #[test]
    fn clear_discards_everything() {
        let mut dir = RoomDirectory::new();
        dir.set_active_room("mine".to_string());
        dir.apply(vec![summary("a", 1)]);
        dir.clear();
        assert!(dir.rooms().is_empty());
        assert_eq!(dir.active_room(), None);
    }
}
