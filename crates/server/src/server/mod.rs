//! Room registry.
//!
//! The lobby maps room ids to their simulators and player ids to the room
//! they joined. It holds no game state of its own: every read and write of a
//! room goes through that room's [`RoomSimulator`].

mod room;
mod snapshot;

pub use room::{RoomPhase, RoomSimulator};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::GameError;
use crate::storage::Storage;
use glam::Vec2;
use protocol::{
    ConsumeInput, CreateRoomInput, GameState, GenerateFoodInput, JoinRoomInput, MovePlayerInput, PlayerId,
    PlayerRecord, RespawnPlayerInput, RoomId, RoomRecord, SplitPlayerInput,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::info;

/// All rooms hosted by this process.
pub struct Lobby {
    rooms: RwLock<HashMap<RoomId, Arc<RoomSimulator>>>,
    /// Which room each player joined.
    players: RwLock<HashMap<PlayerId, RoomId>>,
    config: Arc<Config>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    /// Seeds each room's generator, so a fixed `server.seed` reproduces runs.
    seeder: Mutex<StdRng>,
}

impl Lobby {
    pub fn new(config: Config, storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let seeder = match config.server.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rooms: RwLock::new(HashMap::new()),
            players: RwLock::new(HashMap::new()),
            config: Arc::new(config),
            storage,
            clock,
            seeder: Mutex::new(seeder),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn room_rng(&self) -> StdRng {
        let mut seeder = self.seeder.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        StdRng::from_rng(&mut *seeder)
    }

    async fn room(&self, room_id: RoomId) -> Result<Arc<RoomSimulator>, GameError> {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .cloned()
            .ok_or(GameError::RoomNotFound(room_id))
    }

    async fn room_of(&self, player_id: PlayerId) -> Result<Arc<RoomSimulator>, GameError> {
        let room_id = self
            .players
            .read()
            .await
            .get(&player_id)
            .copied()
            .ok_or(GameError::PlayerNotFound(player_id))?;
        self.room(room_id)
            .await
            .map_err(|_| GameError::PlayerNotFound(player_id))
    }

    pub async fn create_room(&self, input: CreateRoomInput) -> Result<RoomRecord, GameError> {
        input.validate()?;

        let room = RoomRecord {
            id: RoomId::new_v4(),
            name: input.name,
            max_players: input.max_players,
            is_active: true,
            created_at: self.clock.now(),
        };
        let simulator = RoomSimulator::create(
            room.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.storage),
            Arc::clone(&self.clock),
            self.room_rng(),
        )
        .await?;

        self.rooms.write().await.insert(room.id, Arc::new(simulator));
        Ok(room)
    }

    /// Active rooms, oldest first.
    pub async fn get_rooms(&self) -> Vec<RoomRecord> {
        let simulators: Vec<Arc<RoomSimulator>> = self.rooms.read().await.values().cloned().collect();

        let mut rooms = Vec::with_capacity(simulators.len());
        for simulator in simulators {
            let room = simulator.record().await;
            if room.is_active {
                rooms.push(room);
            }
        }
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        rooms
    }

    pub async fn join_room(&self, input: JoinRoomInput) -> Result<PlayerRecord, GameError> {
        input.validate()?;
        let room = self.room(input.room_id).await?;
        let player = room.join(input.player_name, input.color).await?;
        self.register_player(player.id, room.id()).await?;
        Ok(player)
    }

    /// Index `player_id` under `room_id`, unless the room was deleted since
    /// the player joined. Holding the registry lock keeps a concurrent delete
    /// from slipping in between the check and the insert.
    async fn register_player(&self, player_id: PlayerId, room_id: RoomId) -> Result<(), GameError> {
        let rooms = self.rooms.read().await;
        if !rooms.contains_key(&room_id) {
            return Err(GameError::RoomNotFound(room_id));
        }
        self.players.write().await.insert(player_id, room_id);
        Ok(())
    }

    pub async fn get_game_state(&self, room_id: RoomId) -> Result<GameState, GameError> {
        Ok(self.room(room_id).await?.snapshot().await)
    }

    pub async fn move_player(&self, input: MovePlayerInput) -> Result<GameState, GameError> {
        input.validate()?;
        self.room_of(input.player_id)
            .await?
            .move_player(input.player_id, Vec2::new(input.x, input.y))
            .await
    }

    pub async fn split_player(&self, input: SplitPlayerInput) -> Result<GameState, GameError> {
        input.validate()?;
        self.room_of(input.player_id)
            .await?
            .split(input.player_id, Vec2::new(input.direction_x, input.direction_y))
            .await
    }

    pub async fn consume(&self, input: ConsumeInput) -> Result<GameState, GameError> {
        self.room_of(input.player_id)
            .await?
            .consume(input.player_id, input.target_type, input.target_id)
            .await
    }

    pub async fn respawn_player(&self, input: RespawnPlayerInput) -> Result<GameState, GameError> {
        self.room_of(input.player_id).await?.respawn(input.player_id).await
    }

    pub async fn merge_cells(&self, player_id: PlayerId) -> Result<GameState, GameError> {
        self.room_of(player_id).await?.merge(player_id).await
    }

    pub async fn generate_food(&self, input: GenerateFoodInput) -> Result<GameState, GameError> {
        input.validate()?;
        self.room(input.room_id)
            .await?
            .generate_food(input.count as usize)
            .await
    }

    /// Stop a room. It stays readable but no longer accepts requests and
    /// drops out of [`Lobby::get_rooms`].
    pub async fn close_room(&self, room_id: RoomId) -> Result<GameState, GameError> {
        self.room(room_id).await?.close().await
    }

    /// Delete a room together with its players, cells and food.
    pub async fn delete_room(&self, room_id: RoomId) -> Result<(), GameError> {
        let room = self.room(room_id).await?;
        let players = room.delete().await?;

        self.rooms.write().await.remove(&room_id);
        let mut index = self.players.write().await;
        for player in &players {
            index.remove(player);
        }

        info!("Room {} removed from lobby with {} players", room_id, players.len());
        Ok(())
    }
}
