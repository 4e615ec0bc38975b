//! Room simulator.
//!
//! One simulator owns one room's players, cells and food behind a tokio
//! mutex, so every mutation and snapshot of a room is serialized while
//! different rooms run in parallel.
//!
//! Structural operations (join, split, merge, consume, respawn, food) are
//! write-through: they run on a copy of the room state, the resulting delta
//! is persisted, and the copy replaces the live state only once storage has
//! accepted it. Moves are write-behind: applied in place and persisted from a
//! background task. Storage writes of one room are ordered, so a late position
//! update never lands on top of a newer commit.

use super::snapshot;
use crate::clock::Clock;
use crate::config::Config;
use crate::entity::Player;
use crate::error::GameError;
use crate::mechanics::{consume_food, consume_player, generate_food, merge, move_toward, spawn_cell, split};
use crate::storage::{persist_with_timeout, Change, Storage, StorageError};
use crate::world::World;
use glam::Vec2;
use protocol::{Color, GameState, PlayerId, PlayerRecord, RoomId, RoomRecord, TargetType, Timestamp};
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Lifecycle of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoomPhase {
    /// Accepting requests.
    Active = 0,
    /// Rejecting new requests while admitted ones drain.
    Closing = 1,
    /// Terminal.
    Closed = 2,
}

impl RoomPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RoomPhase::Active,
            1 => RoomPhase::Closing,
            _ => RoomPhase::Closed,
        }
    }
}

/// Everything one room owns.
#[derive(Debug, Clone)]
pub(crate) struct RoomState {
    pub room: RoomRecord,
    pub players: BTreeMap<PlayerId, Player>,
    pub next_join_seq: u64,
    pub world: World,
    pub rng: StdRng,
}

/// Serialized access to one room.
pub struct RoomSimulator {
    id: RoomId,
    phase: AtomicU8,
    state: Mutex<RoomState>,
    /// Held for the duration of every storage write of this room. Taken while
    /// `state` is locked, so writes land in the order their changes were made.
    writes: Arc<Mutex<()>>,
    config: Arc<Config>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl RoomSimulator {
    /// Create a room seeded with the configured initial food and persist it.
    pub(crate) async fn create(
        room: RoomRecord,
        config: Arc<Config>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        mut rng: StdRng,
    ) -> Result<Self, GameError> {
        let mut world = World::new(config.border.width as f32, config.border.height as f32);
        generate_food(&mut world, config.food.initial_amount, &config.food, &mut rng, room.created_at);

        let mut changes = vec![Change::PutRoom(room.clone())];
        changes.extend(world.iter_food().map(|f| Change::PutFood(f.to_record(room.id))));
        persist_with_timeout(storage.as_ref(), &changes, config.storage.timeout()).await?;

        info!(
            "Room {} '{}' created with {} food",
            room.id,
            room.name,
            world.counts().food
        );

        Ok(Self {
            id: room.id,
            phase: AtomicU8::new(RoomPhase::Active as u8),
            state: Mutex::new(RoomState {
                room,
                players: BTreeMap::new(),
                next_join_seq: 0,
                world,
                rng,
            }),
            writes: Arc::new(Mutex::new(())),
            config,
            storage,
            clock,
        })
    }

    #[inline]
    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn phase(&self) -> RoomPhase {
        RoomPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        match self.phase() {
            RoomPhase::Active => Ok(()),
            RoomPhase::Closing | RoomPhase::Closed => Err(GameError::RoomClosed),
        }
    }

    /// Checked once the room lock is held. A request admitted before a close
    /// began still runs while the room is closing.
    fn ensure_open(&self) -> Result<(), GameError> {
        match self.phase() {
            RoomPhase::Active | RoomPhase::Closing => Ok(()),
            RoomPhase::Closed => Err(GameError::RoomClosed),
        }
    }

    async fn persist(&self, changes: &[Change]) -> Result<(), StorageError> {
        let _writes = self.writes.lock().await;
        persist_with_timeout(self.storage.as_ref(), changes, self.config.storage.timeout()).await
    }

    /// Current room record.
    pub async fn record(&self) -> RoomRecord {
        self.state.lock().await.room.clone()
    }

    /// Point-in-time state of the room, after every committed mutation.
    pub async fn snapshot(&self) -> GameState {
        let state = self.state.lock().await;
        snapshot::build(&state)
    }

    /// Run `op` on a copy of the room state and commit it once storage accepts
    /// the delta. On any failure the live state is left untouched.
    async fn commit<T>(
        &self,
        op: impl FnOnce(&mut RoomState, Timestamp) -> Result<T, GameError>,
    ) -> Result<(T, GameState), GameError> {
        self.ensure_active()?;
        let mut state = self.state.lock().await;
        // The room may have closed while this request waited for the lock.
        self.ensure_open()?;

        let now = self.clock.now();
        let mut next = state.clone();
        let value = op(&mut next, now)?;

        let changes = changes_between(&state, &next);
        if let Err(e) = self.persist(&changes).await {
            warn!("Room {}: discarding update, storage rejected it: {}", self.id, e);
            return Err(e.into());
        }

        *state = next;
        Ok((value, snapshot::build(&state)))
    }

    /// Add a player with one spawn-size cell.
    pub async fn join(&self, name: String, color: Color) -> Result<PlayerRecord, GameError> {
        let config = Arc::clone(&self.config);
        let (player, _) = self
            .commit(|state, now| {
                if state.players.len() >= state.room.max_players as usize {
                    return Err(GameError::RoomFull(state.room.max_players));
                }

                let join_seq = state.next_join_seq;
                state.next_join_seq += 1;
                let player = Player::new(name, color, now, join_seq);
                spawn_cell(&mut state.world, player.id, &config.player, &mut state.rng, now);

                let record = player.to_record(state.room.id);
                state.players.insert(player.id, player);
                Ok(record)
            })
            .await?;

        info!("Player {} '{}' joined room {}", player.id, player.name, self.id);
        Ok(player)
    }

    /// Step the player's cells toward `target`.
    ///
    /// The new positions are visible immediately; persisting them happens in
    /// the background and a failure there is only logged.
    pub async fn move_player(&self, player_id: PlayerId, target: Vec2) -> Result<GameState, GameError> {
        self.ensure_active()?;
        let mut guard = self.state.lock().await;
        self.ensure_open()?;

        let now = self.clock.now();
        let state = &mut *guard;
        let last_active = acting(&mut state.players, player_id, now)?.last_active;
        let moved = move_toward(&mut state.world, player_id, target, self.config.player.speed as f32);

        let mut changes: Vec<Change> = moved
            .iter()
            .filter_map(|id| state.world.get_cell(*id))
            .map(|c| Change::MoveCell {
                id: c.id,
                x: c.position.x,
                y: c.position.y,
            })
            .collect();
        changes.push(Change::TouchPlayer {
            id: player_id,
            last_active,
        });
        let writes = Arc::clone(&self.writes).lock_owned().await;
        self.persist_behind(changes, writes);

        Ok(snapshot::build(state))
    }

    /// Persist `changes` from a background task that holds `writes` until the
    /// batch has landed or failed.
    fn persist_behind(&self, changes: Vec<Change>, writes: OwnedMutexGuard<()>) {
        let storage = Arc::clone(&self.storage);
        let timeout = self.config.storage.timeout();
        let room_id = self.id;
        tokio::spawn(async move {
            let _writes = writes;
            if let Err(e) = persist_with_timeout(storage.as_ref(), &changes, timeout).await {
                warn!("Room {}: failed to persist {} position updates: {}", room_id, changes.len(), e);
            }
        });
    }

    /// Split every eligible cell of the player along `direction`.
    pub async fn split(&self, player_id: PlayerId, direction: Vec2) -> Result<GameState, GameError> {
        let config = Arc::clone(&self.config);
        let (outcome, state) = self
            .commit(|state, now| {
                acting(&mut state.players, player_id, now)?;
                split(&mut state.world, player_id, direction, &config.player, now)
            })
            .await?;

        debug!("Player {} split {} cells", player_id, outcome.created.len());
        Ok(state)
    }

    /// Merge the player's cooled-down overlapping cells. A pass that finds
    /// nothing to merge still succeeds.
    pub async fn merge(&self, player_id: PlayerId) -> Result<GameState, GameError> {
        let (outcome, state) = self
            .commit(|state, now| {
                acting(&mut state.players, player_id, now)?;
                Ok(merge(&mut state.world, player_id, now))
            })
            .await?;

        if !outcome.is_noop() {
            debug!("Player {} merged {} cell pairs", player_id, outcome.merged.len());
        }
        Ok(state)
    }

    /// Eat a food pellet or another player's cell.
    pub async fn consume(
        &self,
        player_id: PlayerId,
        target_type: TargetType,
        target_id: uuid::Uuid,
    ) -> Result<GameState, GameError> {
        let config = Arc::clone(&self.config);
        let (_, state) = self
            .commit(|state, now| match target_type {
                TargetType::Food => {
                    let predator = acting(&mut state.players, player_id, now)?;
                    let meal = consume_food(&mut state.world, player_id, target_id)?;
                    predator.award(config.food.score_value);
                    let replacement = generate_food(&mut state.world, 1, &config.food, &mut state.rng, now);
                    debug!(
                        "Player {} ate food {} with cell {} (+{}), replaced by {:?}",
                        player_id, meal.food_id, meal.cell_id, meal.gained, replacement
                    );
                    Ok(())
                }
                TargetType::Player => {
                    acting(&mut state.players, player_id, now)?;
                    if target_id == player_id {
                        return Err(GameError::SelfTarget);
                    }
                    if !state.players.contains_key(&target_id) {
                        return Err(GameError::TargetNotFound);
                    }

                    let meal = consume_player(&mut state.world, player_id, target_id, config.player.eat_ratio as f32)?;
                    if let Some(predator) = state.players.get_mut(&player_id) {
                        predator.award(meal.gained.round() as u64);
                    }
                    if meal.prey_cells_left == 0 {
                        if let Some(prey) = state.players.get_mut(&target_id) {
                            prey.is_alive = false;
                        }
                    }
                    debug!(
                        "Player {} ate cell {} of player {} (+{}), {} left",
                        player_id, meal.prey_cell, target_id, meal.gained, meal.prey_cells_left
                    );
                    Ok(())
                }
            })
            .await?;

        Ok(state)
    }

    /// Bring a dead player back with one spawn-size cell. Score is kept.
    pub async fn respawn(&self, player_id: PlayerId) -> Result<GameState, GameError> {
        let config = Arc::clone(&self.config);
        let (_, state) = self
            .commit(|state, now| {
                let player = state
                    .players
                    .get_mut(&player_id)
                    .ok_or(GameError::PlayerNotFound(player_id))?;
                if player.is_alive {
                    return Err(GameError::AlreadyAlive);
                }
                player.is_alive = true;
                player.touch(now);

                // A dead player owns no cells; drop strays so exactly one remains.
                state.world.remove_cells_of(player_id);
                spawn_cell(&mut state.world, player_id, &config.player, &mut state.rng, now);
                Ok(())
            })
            .await?;

        info!("Player {} respawned in room {}", player_id, self.id);
        Ok(state)
    }

    /// Add `count` pellets to the room.
    pub async fn generate_food(&self, count: usize) -> Result<GameState, GameError> {
        let config = Arc::clone(&self.config);
        let (spawned, state) = self
            .commit(|state, now| Ok(generate_food(&mut state.world, count, &config.food, &mut state.rng, now)))
            .await?;

        debug!("Room {}: generated {} food", self.id, spawned.len());
        Ok(state)
    }

    /// Stop accepting requests, drain the ones already admitted, then mark the
    /// room inactive.
    ///
    /// If storage rejects the update the room goes back to `Active`.
    pub async fn close(&self) -> Result<GameState, GameError> {
        if self
            .phase
            .compare_exchange(
                RoomPhase::Active as u8,
                RoomPhase::Closing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(GameError::RoomClosed);
        }

        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.room.is_active = false;

        let changes = changes_between(&state, &next);
        if let Err(e) = self.persist(&changes).await {
            warn!("Room {}: close rejected by storage: {}", self.id, e);
            self.phase.store(RoomPhase::Active as u8, Ordering::SeqCst);
            return Err(e.into());
        }

        *state = next;
        self.phase.store(RoomPhase::Closed as u8, Ordering::SeqCst);
        info!("Room {} closed", self.id);
        Ok(snapshot::build(&state))
    }

    /// Remove the room and everything it owns from storage. Returns the ids
    /// of the players it held.
    pub(crate) async fn delete(&self) -> Result<Vec<PlayerId>, GameError> {
        let state = self.state.lock().await;
        self.persist(&[Change::DeleteRoom(self.id)]).await?;

        self.phase.store(RoomPhase::Closed as u8, Ordering::SeqCst);
        info!("Room {} deleted", self.id);
        Ok(state.players.keys().copied().collect())
    }
}

/// The acting player, if it exists in this room and is alive. Refreshes its
/// activity stamp.
fn acting(players: &mut BTreeMap<PlayerId, Player>, id: PlayerId, now: Timestamp) -> Result<&mut Player, GameError> {
    let player = players.get_mut(&id).ok_or(GameError::PlayerNotFound(id))?;
    if !player.is_alive {
        return Err(GameError::PlayerDead);
    }
    player.touch(now);
    Ok(player)
}

/// Row-level delta from `before` to `after`, parents before children.
fn changes_between(before: &RoomState, after: &RoomState) -> Vec<Change> {
    let room_id = after.room.id;
    let mut changes = Vec::new();

    if before.room != after.room {
        changes.push(Change::PutRoom(after.room.clone()));
    }

    for player in after.players.values() {
        if before.players.get(&player.id) != Some(player) {
            changes.push(Change::PutPlayer(player.to_record(room_id)));
        }
    }

    for cell in after.world.iter_cells() {
        if before.world.get_cell(cell.id) != Some(cell) {
            changes.push(Change::PutCell(cell.to_record()));
        }
    }
    for cell in before.world.iter_cells() {
        if after.world.get_cell(cell.id).is_none() {
            changes.push(Change::DeleteCell(cell.id));
        }
    }

    for food in after.world.iter_food() {
        if before.world.get_food(food.id) != Some(food) {
            changes.push(Change::PutFood(food.to_record(room_id)));
        }
    }
    for food in before.world.iter_food() {
        if after.world.get_food(food.id).is_none() {
            changes.push(Change::DeleteFood(food.id));
        }
    }

    changes
}
