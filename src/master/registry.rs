//! The set of running games.
//!
//! `GameRegistry` is the entry point for the transport layer: it creates
//! games, finds them by id and forwards requests to their game masters.
//! The map behind it is the only state shared between tasks. Game masters
//! hold a `Weak` reference, so dropping the last registry clone drops every
//! stored handle and the masters stop once callers let go of theirs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::actor::{GameHandle, GameMaster};
use super::message::{MoveRequest, Registration, SuggestResponse};
use crate::core::{GameRng, HexzConfig, HexzError, PlayerId, Result};
use crate::rules::{new_engine, GameType};

/// Characters game ids are drawn from. No vowels, no look-alikes.
const ID_ALPHABET: &[u8; 32] = b"bcdfghjkmnpqrstvwxz23456789BCDFG";

/// Short random game identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn random(rng: &mut GameRng, len: usize) -> Self {
        let id = (0..len)
            .map(|_| char::from(ID_ALPHABET[rng.gen_index(ID_ALPHABET.len())]))
            .collect();
        Self(id)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Registry entry metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: GameId,
    pub game_type: GameType,
    pub created: DateTime<Utc>,
}

struct Games {
    map: FxHashMap<GameId, GameHandle>,
    rng: GameRng,
}

/// State shared between the registry and its game masters.
pub(crate) struct Shared {
    games: Mutex<Games>,
    config: HexzConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Games> {
        self.games.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn remove(&self, id: &GameId) -> Option<GameHandle> {
        let removed = self.lock().map.remove(id);
        if removed.is_some() {
            info!(game_id = %id, "Game removed from registry");
        }
        removed
    }

    /// Newest first.
    pub(crate) fn recent_games(&self, limit: usize) -> Vec<GameInfo> {
        let mut infos: Vec<GameInfo> = self
            .lock()
            .map
            .values()
            .map(|h| h.info().clone())
            .collect();
        infos.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        infos.truncate(limit);
        infos
    }
}

/// Cloneable handle to the set of running games.
///
/// Games are spawned onto the current tokio runtime, so `create_game` must be
/// called from within one.
#[derive(Clone)]
pub struct GameRegistry {
    inner: Arc<Shared>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new(HexzConfig::default())
    }
}

impl GameRegistry {
    #[must_use]
    pub fn new(config: HexzConfig) -> Self {
        // Ids must not repeat across restarts, even with a fixed search seed.
        let rng = GameRng::from_entropy();
        Self {
            inner: Arc::new(Shared {
                games: Mutex::new(Games {
                    map: FxHashMap::default(),
                    rng,
                }),
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &HexzConfig {
        &self.inner.config
    }

    /// Start a new game under a fresh random id.
    ///
    /// Gives up with `IdSpaceExhausted` after `id_attempts` collisions.
    pub fn create_game(&self, game_type: GameType) -> Result<GameHandle> {
        let registry = &self.inner.config.registry;
        let attempts = registry.id_attempts.max(1);
        let mut games = self.inner.lock();

        let Games { map, rng } = &mut *games;
        let id = (0..attempts)
            .map(|_| GameId::random(rng, registry.id_len))
            .find(|id| !map.contains_key(id))
            .ok_or(HexzError::IdSpaceExhausted { attempts })?;

        let handle = GameMaster::spawn(
            id.clone(),
            game_type,
            Utc::now(),
            self.inner.config.master.clone(),
            self.inner.config.search.clone(),
            Arc::downgrade(&self.inner),
            new_engine(game_type),
        );
        map.insert(id.clone(), handle.clone());
        info!(game_id = %id, %game_type, games = map.len(), "Game created");
        Ok(handle)
    }

    /// The running game with id `id`.
    pub fn lookup(&self, id: &str) -> Result<GameHandle> {
        self.inner
            .lock()
            .map
            .get(&GameId::from(id))
            .cloned()
            .ok_or_else(|| HexzError::GameNotFound(id.to_owned()))
    }

    /// Forget a game. Its master stops once no other handle is left.
    pub fn remove(&self, id: &str) -> Option<GameHandle> {
        self.inner.remove(&GameId::from(id))
    }

    /// The `limit` most recently created games, newest first.
    #[must_use]
    pub fn recent_games(&self, limit: usize) -> Vec<GameInfo> {
        self.inner.recent_games(limit)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn apply_move(
        &self,
        game_id: &str,
        player_id: PlayerId,
        request: MoveRequest,
    ) -> Result<()> {
        self.lookup(game_id)?.apply_move(player_id, request).await
    }

    pub async fn reset(&self, game_id: &str, player_id: PlayerId) -> Result<()> {
        self.lookup(game_id)?.reset(player_id).await
    }

    pub async fn register_viewer(&self, game_id: &str, player_id: PlayerId) -> Result<Registration> {
        let handle = self.lookup(game_id)?;
        debug!(%game_id, %player_id, "Registering viewer");
        handle.register(player_id).await
    }

    pub async fn unregister_viewer(&self, game_id: &str, player_id: PlayerId) -> Result<()> {
        self.lookup(game_id)?.unregister(player_id).await
    }

    /// Leave on behalf of one registration. Ignored when the player has
    /// registered again since.
    pub async fn unregister_viewer_if_current(
        &self,
        game_id: &str,
        player_id: PlayerId,
        generation: u64,
    ) -> Result<()> {
        self.lookup(game_id)?
            .unregister_if_current(player_id, generation)
            .await
    }

    /// Ask for a move suggestion. `None` uses the configured budget.
    pub async fn suggest_move(
        &self,
        game_id: &str,
        player_id: PlayerId,
        budget: Option<Duration>,
    ) -> Result<SuggestResponse> {
        self.lookup(game_id)?.suggest_move(player_id, budget).await
    }
}

impl std::fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRegistry")
            .field("games", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::RegistryConfig;

    fn registry(id_len: usize, id_attempts: usize) -> GameRegistry {
        GameRegistry::new(
            HexzConfig::default()
                .with_registry(RegistryConfig::default().with_id_len(id_len).with_id_attempts(id_attempts)),
        )
    }

    #[test]
    fn test_id_alphabet_is_unique() {
        let mut chars = ID_ALPHABET.to_vec();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), 32);
    }

    #[test]
    fn test_random_id_shape() {
        let mut rng = GameRng::new(3);
        let id = GameId::random(&mut rng, 6);
        assert_eq!(id.as_str().len(), 6);
        assert!(id.as_str().bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let reg = registry(6, 10);
        let handle = reg.create_game(GameType::Classic).unwrap();

        assert_eq!(reg.len(), 1);
        let found = reg.lookup(handle.id().as_str()).unwrap();
        assert_eq!(found.info(), handle.info());
        assert_eq!(found.info().game_type, GameType::Classic);
    }

    #[tokio::test]
    async fn test_lookup_unknown() {
        let reg = registry(6, 10);
        assert!(matches!(reg.lookup("nope"), Err(HexzError::GameNotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_recent_games_newest_first() {
        let reg = registry(6, 10);
        let first = reg.create_game(GameType::Classic).unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = reg.create_game(GameType::Freeform).unwrap();

        let recent = reg.recent_games(5);
        assert_eq!(recent.len(), 2);
        assert_eq!(&recent[0].id, second.id());
        assert_eq!(&recent[1].id, first.id());
        assert_eq!(reg.recent_games(1).len(), 1);
    }

    #[tokio::test]
    async fn test_id_space_exhausted() {
        let reg = registry(1, 1000);
        for _ in 0..32 {
            reg.create_game(GameType::Freeform).unwrap();
        }
        assert!(matches!(
            reg.create_game(GameType::Freeform),
            Err(HexzError::IdSpaceExhausted { attempts: 1000 })
        ));
    }

    #[tokio::test]
    async fn test_ids_ignore_search_seed() {
        let seeded = || {
            GameRegistry::new(
                HexzConfig::default().with_search(crate::mcts::MCTSConfig::default().with_seed(7)),
            )
        };
        let first = seeded().create_game(GameType::Freeform).unwrap();
        let second = seeded().create_game(GameType::Freeform).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_remove() {
        let reg = registry(6, 10);
        let handle = reg.create_game(GameType::Classic).unwrap();
        let id = handle.id().to_string();

        assert!(reg.remove(&id).is_some());
        assert!(reg.remove(&id).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_game_info_json() {
        let info = GameInfo {
            id: GameId::from("bcd"),
            game_type: GameType::Freeform,
            created: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], "bcd");
        assert_eq!(json["gameType"], "freeform");
        assert_eq!(json["created"], "2024-01-02T03:04:05Z");
    }
}
