//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Opaque per-browser token identifying a viewer. The transport layer hands
//! it to the core; the core never interprets its contents.
//!
//! ## Player numbers
//!
//! Seated players are numbered from 1. Number 0 means "nobody": an unowned
//! cell, a spectator's role, or a drawn game.
//!
//! ## PlayerMap
//!
//! Per-player storage indexed by player number, backed by a `Vec` for O(1)
//! access. Serializes as a plain array (player 1 first).

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Opaque identifier of a player or spectator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for PlayerId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// The other player in a two-player game.
#[inline]
#[must_use]
pub const fn opponent(player: u8) -> u8 {
    3 - player
}

/// Per-player data indexed by player number (1-based).
///
/// ## Example
///
/// ```
/// use hexz::core::PlayerMap;
///
/// let mut score: PlayerMap<u32> = PlayerMap::with_value(2, 0);
/// score[2] += 3;
/// assert_eq!(score[1], 0);
/// assert_eq!(score[2], 3);
/// assert_eq!(score.as_slice(), &[0, 3]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a map with values from a factory receiving each player number.
    pub fn new(player_count: usize, factory: impl Fn(u8) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count < 8, "At most 7 players fit the blocked bitmask");

        let data = (1..=player_count as u8).map(factory).collect();
        Self { data }
    }

    /// Create a map with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Reference to a player's entry. Panics for player 0 or out of range.
    #[must_use]
    pub fn get(&self, player: u8) -> &T {
        assert!(player > 0, "Player numbers start at 1");
        &self.data[player as usize - 1]
    }

    /// Mutable reference to a player's entry.
    pub fn get_mut(&mut self, player: u8) -> &mut T {
        assert!(player > 0, "Player numbers start at 1");
        &mut self.data[player as usize - 1]
    }

    /// Checked lookup; `None` for 0 or unknown players.
    #[must_use]
    pub fn try_get(&self, player: u8) -> Option<&T> {
        (player as usize).checked_sub(1).and_then(|i| self.data.get(i))
    }

    pub fn try_get_mut(&mut self, player: u8) -> Option<&mut T> {
        (player as usize).checked_sub(1).and_then(|i| self.data.get_mut(i))
    }

    /// Iterate over (player number, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (i as u8 + 1, v))
    }

    /// Entries in player order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<u8> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: u8) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<u8> for PlayerMap<T> {
    fn index_mut(&mut self, player: u8) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        let id = PlayerId::new("abc123");
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(format!("{}", id), "abc123");
        assert_eq!(PlayerId::from("abc123"), id);
    }

    #[test]
    fn test_opponent() {
        assert_eq!(opponent(1), 2);
        assert_eq!(opponent(2), 1);
    }

    #[test]
    fn test_player_map_new() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p as i32 * 10);

        assert_eq!(map[1], 10);
        assert_eq!(map[2], 20);
        assert_eq!(map.player_count(), 2);
    }

    #[test]
    fn test_player_map_try_get() {
        let map: PlayerMap<i32> = PlayerMap::with_value(1, 5);

        assert_eq!(map.try_get(0), None);
        assert_eq!(map.try_get(1), Some(&5));
        assert_eq!(map.try_get(2), None);
    }

    #[test]
    fn test_player_map_iter() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p as i32);
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(1, &1), (2, &2)]);
    }

    #[test]
    fn test_player_map_serializes_as_array() {
        let map: PlayerMap<u32> = PlayerMap::new(2, |p| p as u32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "[2,3]");

        let back: PlayerMap<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    #[should_panic(expected = "Player numbers start at 1")]
    fn test_player_map_rejects_zero() {
        let map: PlayerMap<i32> = PlayerMap::with_value(2, 0);
        let _ = map[0];
    }
}
