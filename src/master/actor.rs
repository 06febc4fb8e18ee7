//! The per-game actor and its handle.
//!
//! A `GameMaster` task owns one engine and is its only writer. Everything
//! else talks to it through a `GameHandle`, which wraps the control channel.

use std::ops::ControlFlow;
use std::sync::Weak;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::config::MasterConfig;
use super::event::ServerEvent;
use super::message::{ControlMessage, MoveRequest, Registration, SuggestResponse};
use super::registry::{GameId, GameInfo, Shared};
use crate::board::{GameState, Pos};
use crate::core::{GameRng, HexzError, PlayerId, Result};
use crate::games::ClassicGame;
use crate::mcts::{MCTSConfig, MCTSSearch};
use crate::rules::{GameEngine, GameType, Move};

// =============================================================================
// Handle
// =============================================================================

/// Cheap, cloneable access to a running game.
#[derive(Clone, Debug)]
pub struct GameHandle {
    info: GameInfo,
    control: mpsc::Sender<ControlMessage>,
}

impl GameHandle {
    #[must_use]
    pub fn id(&self) -> &GameId {
        &self.info.id
    }

    #[must_use]
    pub fn info(&self) -> &GameInfo {
        &self.info
    }

    /// The game master has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.control.is_closed()
    }

    async fn send(&self, msg: ControlMessage) -> Result<()> {
        self.control
            .send(msg)
            .await
            .map_err(|_| HexzError::GameClosed(self.info.id.to_string()))
    }

    async fn recv<T>(&self, rx: oneshot::Receiver<T>) -> Result<T> {
        rx.await
            .map_err(|_| HexzError::GameClosed(self.info.id.to_string()))
    }

    /// Join the game. Takes the lowest free seat, or the previous seat when
    /// reconnecting; spectator otherwise.
    pub async fn register(&self, player_id: PlayerId) -> Result<Registration> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::Register { player_id, reply })
            .await?;
        self.recv(rx).await
    }

    /// Leave the game.
    pub async fn unregister(&self, player_id: PlayerId) -> Result<()> {
        self.send(ControlMessage::Unregister {
            player_id,
            generation: None,
        })
        .await
    }

    /// Leave the game, unless `player_id` has registered again since the
    /// registration numbered `generation`.
    pub async fn unregister_if_current(&self, player_id: PlayerId, generation: u64) -> Result<()> {
        self.send(ControlMessage::Unregister {
            player_id,
            generation: Some(generation),
        })
        .await
    }

    /// Submit a move. Illegal moves are dropped by the game master.
    pub async fn apply_move(&self, player_id: PlayerId, request: MoveRequest) -> Result<()> {
        self.send(ControlMessage::Move { player_id, request })
            .await
    }

    pub async fn reset(&self, player_id: PlayerId) -> Result<()> {
        self.send(ControlMessage::Reset { player_id }).await
    }

    /// Ask for a move suggestion for `player_id`'s seat.
    ///
    /// `budget` defaults to the configured suggestion budget and is capped at
    /// the configured maximum. Only the player to move may ask.
    pub async fn suggest_move(
        &self,
        player_id: PlayerId,
        budget: Option<Duration>,
    ) -> Result<SuggestResponse> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::Suggest {
            player_id,
            budget,
            reply,
        })
        .await?;
        self.recv(rx).await?
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Sent by a GC timer when a disconnected player's grace period is over.
#[derive(Debug)]
struct GcSignal {
    player_id: PlayerId,
    seq: u64,
}

#[derive(Debug)]
struct PendingGc {
    seq: u64,
    timer: JoinHandle<()>,
}

#[derive(Debug)]
struct Viewer {
    events: mpsc::Sender<ServerEvent>,
    generation: u64,
}

pub(crate) struct GameMaster {
    id: GameId,
    engine: Box<dyn GameEngine>,
    config: MasterConfig,
    search: MCTSConfig,
    control: mpsc::Receiver<ControlMessage>,
    viewers: FxHashMap<PlayerId, Viewer>,
    seats: FxHashMap<PlayerId, u8>,
    generation: u64,
    pending_gc: FxHashMap<PlayerId, PendingGc>,
    gc_seq: u64,
    gc_tx: mpsc::UnboundedSender<GcSignal>,
    gc_rx: mpsc::UnboundedReceiver<GcSignal>,
    registry: Weak<Shared>,
}

impl GameMaster {
    /// Spawn the actor for a new game and return its handle.
    pub(crate) fn spawn(
        id: GameId,
        game_type: GameType,
        created: DateTime<Utc>,
        config: MasterConfig,
        search: MCTSConfig,
        registry: Weak<Shared>,
        engine: Box<dyn GameEngine>,
    ) -> GameHandle {
        let (master, handle) = Self::new(id, game_type, created, config, search, registry, engine);
        tokio::spawn(master.run());
        handle
    }

    fn new(
        id: GameId,
        game_type: GameType,
        created: DateTime<Utc>,
        config: MasterConfig,
        search: MCTSConfig,
        registry: Weak<Shared>,
        engine: Box<dyn GameEngine>,
    ) -> (Self, GameHandle) {
        let (tx, control) = mpsc::channel(config.control_buffer.max(1));
        let (gc_tx, gc_rx) = mpsc::unbounded_channel();
        let master = Self {
            id: id.clone(),
            engine,
            config,
            search,
            control,
            viewers: FxHashMap::default(),
            seats: FxHashMap::default(),
            generation: 0,
            pending_gc: FxHashMap::default(),
            gc_seq: 0,
            gc_tx,
            gc_rx,
            registry,
        };
        let handle = GameHandle {
            info: GameInfo {
                id,
                game_type,
                created,
            },
            control: tx,
        };
        (master, handle)
    }

    async fn run(mut self) {
        info!(game_id = %self.id, game_type = %self.engine.game_type(), "Game master started");
        let period = self.config.heartbeat_interval();
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Seats only empty out again through `collect`, which closes the
        // game itself, so this only catches games nobody ever sat down in.
        let idle = tokio::time::sleep(self.config.idle_timeout());
        tokio::pin!(idle);

        loop {
            let flow = tokio::select! {
                msg = self.control.recv() => match msg {
                    Some(msg) => self.handle(msg).await,
                    None => {
                        debug!(game_id = %self.id, "Control channel closed");
                        ControlFlow::Break(())
                    }
                },
                Some(signal) = self.gc_rx.recv() => self.collect(signal).await,
                _ = heartbeat.tick() => {
                    self.heartbeat().await;
                    ControlFlow::Continue(())
                }
                () = &mut idle, if self.seats.is_empty() => {
                    info!(game_id = %self.id, timeout = ?self.config.idle_timeout(), "No player joined in time");
                    self.close().await
                }
            };
            if flow.is_break() {
                break;
            }
        }

        for (_, pending) in self.pending_gc.drain() {
            pending.timer.abort();
        }
        info!(game_id = %self.id, "Game master stopped");
    }

    async fn handle(&mut self, msg: ControlMessage) -> ControlFlow<()> {
        match msg {
            ControlMessage::Register { player_id, reply } => {
                self.register(player_id, reply).await;
            }
            ControlMessage::Unregister {
                player_id,
                generation,
            } => self.unregister(player_id, generation),
            ControlMessage::Move { player_id, request } => {
                self.apply_move(&player_id, request).await;
            }
            ControlMessage::Reset { player_id } => self.reset(&player_id).await,
            ControlMessage::Suggest {
                player_id,
                budget,
                reply,
            } => self.suggest(&player_id, budget, reply),
        }
        ControlFlow::Continue(())
    }

    fn role_of(&self, player_id: &PlayerId) -> u8 {
        self.seats.get(player_id).copied().unwrap_or(0)
    }

    fn all_seated(&self) -> bool {
        self.seats.len() >= self.engine.num_players()
    }

    async fn register(&mut self, player_id: PlayerId, reply: oneshot::Sender<Registration>) {
        if let Some(pending) = self.pending_gc.remove(&player_id) {
            pending.timer.abort();
            debug!(game_id = %self.id, %player_id, "Reconnected within grace period");
        }

        let role = match self.seats.get(&player_id) {
            Some(&seat) => seat,
            None if !self.all_seated() => {
                let num_players = self.engine.num_players() as u8;
                let seat = (1..=num_players)
                    .find(|n| !self.seats.values().any(|s| s == n))
                    .unwrap_or(0);
                if seat > 0 {
                    self.seats.insert(player_id.clone(), seat);
                }
                seat
            }
            None => 0,
        };

        let started = role > 0 && self.all_seated() && self.engine.state() == GameState::Initial;
        if started {
            self.engine.start();
        }

        let (tx, rx) = mpsc::channel(self.config.event_buffer.max(1));
        // The receiver is still ours, so a fresh channel always has room.
        let _ = tx.try_send(ServerEvent::snapshot(self.engine.board(), role));
        self.generation += 1;
        let generation = self.generation;
        let viewer = Viewer {
            events: tx,
            generation,
        };
        if self.viewers.insert(player_id.clone(), viewer).is_some() {
            debug!(game_id = %self.id, %player_id, "Replaced event channel");
        }
        info!(game_id = %self.id, %player_id, role, generation, "Viewer registered");
        let registration = Registration {
            role,
            generation,
            events: rx,
        };
        if reply.send(registration).is_err() {
            // The caller went away before the reply arrived.
            self.unregister(player_id.clone(), Some(generation));
        }

        if started {
            info!(game_id = %self.id, "All seats taken, game started");
            self.broadcast(Some(&player_id), |e| e).await;
        }
    }

    fn unregister(&mut self, player_id: PlayerId, generation: Option<u64>) {
        if let (Some(generation), Some(viewer)) = (generation, self.viewers.get(&player_id)) {
            if viewer.generation != generation {
                debug!(game_id = %self.id, %player_id, generation, current = viewer.generation, "Ignoring unregister for a replaced registration");
                return;
            }
        }
        self.viewers.remove(&player_id);
        if !self.seats.contains_key(&player_id) {
            debug!(game_id = %self.id, %player_id, "Spectator left");
            return;
        }
        if self.pending_gc.contains_key(&player_id) {
            return;
        }

        self.gc_seq += 1;
        let seq = self.gc_seq;
        let grace = self.config.gc_grace();
        let tx = self.gc_tx.clone();
        let signal_id = player_id.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(GcSignal {
                player_id: signal_id,
                seq,
            });
        });
        debug!(game_id = %self.id, %player_id, seq, ?grace, "Player left, seat kept for grace period");
        self.pending_gc.insert(player_id, PendingGc { seq, timer });
    }

    async fn collect(&mut self, signal: GcSignal) -> ControlFlow<()> {
        match self.pending_gc.get(&signal.player_id) {
            Some(pending) if pending.seq == signal.seq => {}
            _ => {
                debug!(game_id = %self.id, player_id = %signal.player_id, seq = signal.seq, "Ignoring stale GC signal");
                return ControlFlow::Continue(());
            }
        }
        self.pending_gc.remove(&signal.player_id);
        self.seats.remove(&signal.player_id);
        self.viewers.remove(&signal.player_id);
        info!(game_id = %self.id, player_id = %signal.player_id, "Seat reclaimed");

        if !self.seats.is_empty() {
            return ControlFlow::Continue(());
        }
        info!(game_id = %self.id, "No players left");
        self.close().await
    }

    /// Tell the remaining viewers, leave the registry and stop.
    async fn close(&mut self) -> ControlFlow<()> {
        info!(game_id = %self.id, viewers = self.viewers.len(), "Closing game");
        self.broadcast(None, |e| e.with_announcement("Game closed").last())
            .await;
        self.viewers.clear();
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }
        ControlFlow::Break(())
    }

    async fn apply_move(&mut self, player_id: &PlayerId, request: MoveRequest) {
        let player = self.role_of(player_id);
        if player == 0 {
            debug!(game_id = %self.id, %player_id, "Move from unseated viewer ignored");
            return;
        }
        let board = self.engine.board();
        if board.state != GameState::Running {
            debug!(game_id = %self.id, %player_id, state = ?board.state, "Move outside running game ignored");
            return;
        }
        if let Some(expected) = request.move_num {
            if expected != board.move_num {
                debug!(game_id = %self.id, %player_id, expected, actual = board.move_num, "Stale move ignored");
                return;
            }
        }

        let mv = Move::new(player, Pos::new(request.row, request.col), request.cell_type);
        if let Err(e) = self.engine.make_move(mv) {
            debug!(game_id = %self.id, %player_id, %mv, error = %e, "Move rejected");
            return;
        }

        if self.engine.is_done() {
            let winner = self.engine.winner();
            info!(game_id = %self.id, winner, "Game finished");
            let text = if winner > 0 {
                format!("Player {winner} won the game")
            } else {
                String::from("The game ended in a draw")
            };
            self.broadcast(None, |e| e.with_announcement(text.clone()))
                .await;
        } else {
            self.broadcast(None, |e| e).await;
        }
    }

    async fn reset(&mut self, player_id: &PlayerId) {
        if self.role_of(player_id) == 0 {
            debug!(game_id = %self.id, %player_id, "Reset from unseated viewer ignored");
            return;
        }
        self.engine.reset();
        if self.all_seated() {
            self.engine.start();
        }
        info!(game_id = %self.id, %player_id, "Game reset");
        self.broadcast(None, |e| e).await;
    }

    fn suggest(
        &self,
        player_id: &PlayerId,
        budget: Option<Duration>,
        reply: oneshot::Sender<Result<SuggestResponse>>,
    ) {
        let role = self.role_of(player_id);
        if role == 0 {
            let _ = reply.send(Err(HexzError::NotSeated(player_id.to_string())));
            return;
        }
        if self.engine.game_type() != GameType::Classic {
            let _ = reply.send(Err(HexzError::SuggestUnsupported));
            return;
        }
        let turn = self.engine.board().turn;
        if turn != role && !self.engine.is_done() {
            let _ = reply.send(Err(HexzError::NotYourTurn { player: role, turn }));
            return;
        }

        let budget = self.config.suggest_budget_for(budget);
        let config = self.search.clone();
        let game = ClassicGame::from_board(
            self.engine.board().masked_for(role),
            GameRng::from_seed_or_entropy(config.seed),
        );
        debug!(game_id = %self.id, %player_id, ?budget, "Starting move search");

        let worker = tokio::task::spawn_blocking(move || {
            MCTSSearch::new(config).suggest_move(&game, budget)
        });
        let game_id = self.id.clone();
        tokio::spawn(async move {
            let result = match worker.await {
                Ok(Ok((mv, stats))) => Ok(SuggestResponse { mv, stats }),
                Ok(Err(e)) => {
                    warn!(%game_id, error = %e, "Move search failed");
                    Err(HexzError::from(e))
                }
                Err(e) => Err(HexzError::SearchWorker(e.to_string())),
            };
            let _ = reply.send(result);
        });
    }

    async fn heartbeat(&mut self) {
        let active: Vec<String> = self
            .registry
            .upgrade()
            .map(|r| {
                r.recent_games(self.config.recent_games_limit)
                    .into_iter()
                    .map(|info| info.id.to_string())
                    .collect()
            })
            .unwrap_or_default();
        let mut closed = Vec::new();
        for (player_id, viewer) in &self.viewers {
            let event = ServerEvent::new(self.role_of(player_id)).with_active_games(active.clone());
            if viewer.events.send(event).await.is_err() {
                closed.push(player_id.clone());
            }
        }
        self.drop_viewers(closed);
    }

    /// Send every viewer except `skip` their view of the board, passed
    /// through `decorate`.
    async fn broadcast(
        &mut self,
        skip: Option<&PlayerId>,
        decorate: impl Fn(ServerEvent) -> ServerEvent,
    ) {
        let winner = if self.engine.is_done() {
            self.engine.winner()
        } else {
            0
        };
        let board = self.engine.board();
        let mut closed = Vec::new();
        for (player_id, viewer) in &self.viewers {
            if Some(player_id) == skip {
                continue;
            }
            let event = ServerEvent::snapshot(board, self.role_of(player_id)).with_winner(winner);
            if viewer.events.send(decorate(event)).await.is_err() {
                closed.push(player_id.clone());
            }
        }
        self.drop_viewers(closed);
    }

    fn drop_viewers(&mut self, closed: Vec<PlayerId>) {
        for player_id in closed {
            debug!(game_id = %self.id, %player_id, "Viewer channel closed");
            self.viewers.remove(&player_id);
        }
    }
}
