//! Game procedures as JSON over HTTP.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use protocol::{
    ConsumeInput, CreateRoomInput, GameState, GenerateFoodInput, JoinRoomInput, MovePlayerInput, PlayerId,
    PlayerRecord, RespawnPlayerInput, RoomId, RoomRecord, SplitPlayerInput,
};
use serde::Serialize;
use server::{ErrorKind, GameError, Lobby};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

type AppState = Arc<Lobby>;

/// Build the router for every game procedure.
pub fn router(lobby: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/createRoom", post(create_room))
        .route("/getRooms", get(get_rooms))
        .route("/joinRoom", post(join_room))
        .route("/getGameState/{room_id}", get(get_game_state))
        .route("/movePlayer", post(move_player))
        .route("/splitPlayer", post(split_player))
        .route("/consume", post(consume))
        .route("/respawnPlayer", post(respawn_player))
        .route("/mergeCells/{player_id}", post(merge_cells))
        .route("/generateFood", post(generate_food))
        .route("/closeRoom/{room_id}", post(close_room))
        .route("/rooms/{room_id}", delete(delete_room))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(lobby)
}

/// A failed procedure, rendered as `{"error": ..., "code": ...}`.
#[derive(Debug)]
pub struct RpcError(GameError);

impl From<GameError> for RpcError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PreconditionFailed => StatusCode::CONFLICT,
            ErrorKind::NotEligible => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::RoomClosed => StatusCode::GONE,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        if kind == ErrorKind::Unavailable {
            warn!("Request failed: {}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string(), "code": kind.code() });
        (status, Json(body)).into_response()
    }
}

type RpcResult<T> = Result<Json<T>, RpcError>;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    name: String,
    version: &'static str,
    rooms: usize,
}

async fn healthcheck(State(lobby): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        name: lobby.config().server.name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        rooms: lobby.get_rooms().await.len(),
    })
}

async fn create_room(State(lobby): State<AppState>, Json(input): Json<CreateRoomInput>) -> RpcResult<RoomRecord> {
    Ok(Json(lobby.create_room(input).await?))
}

async fn get_rooms(State(lobby): State<AppState>) -> Json<Vec<RoomRecord>> {
    Json(lobby.get_rooms().await)
}

async fn join_room(State(lobby): State<AppState>, Json(input): Json<JoinRoomInput>) -> RpcResult<PlayerRecord> {
    Ok(Json(lobby.join_room(input).await?))
}

async fn get_game_state(State(lobby): State<AppState>, Path(room_id): Path<RoomId>) -> RpcResult<GameState> {
    Ok(Json(lobby.get_game_state(room_id).await?))
}

async fn move_player(State(lobby): State<AppState>, Json(input): Json<MovePlayerInput>) -> RpcResult<GameState> {
    Ok(Json(lobby.move_player(input).await?))
}

async fn split_player(State(lobby): State<AppState>, Json(input): Json<SplitPlayerInput>) -> RpcResult<GameState> {
    Ok(Json(lobby.split_player(input).await?))
}

async fn consume(State(lobby): State<AppState>, Json(input): Json<ConsumeInput>) -> RpcResult<GameState> {
    Ok(Json(lobby.consume(input).await?))
}

async fn respawn_player(
    State(lobby): State<AppState>,
    Json(input): Json<RespawnPlayerInput>,
) -> RpcResult<GameState> {
    Ok(Json(lobby.respawn_player(input).await?))
}

async fn merge_cells(State(lobby): State<AppState>, Path(player_id): Path<PlayerId>) -> RpcResult<GameState> {
    Ok(Json(lobby.merge_cells(player_id).await?))
}

async fn generate_food(State(lobby): State<AppState>, Json(input): Json<GenerateFoodInput>) -> RpcResult<GameState> {
    Ok(Json(lobby.generate_food(input).await?))
}

async fn close_room(State(lobby): State<AppState>, Path(room_id): Path<RoomId>) -> RpcResult<GameState> {
    Ok(Json(lobby.close_room(room_id).await?))
}

async fn delete_room(State(lobby): State<AppState>, Path(room_id): Path<RoomId>) -> Result<StatusCode, RpcError> {
    lobby.delete_room(room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
