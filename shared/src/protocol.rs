//! Socket events exchanged with the game and room servers.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": <payload>}`.
//! Event names and payload fields are camelCase. Events without a payload
//! omit `data`. Positions are in board units (1.0 = one tile).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMember {
    pub room: String,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRef {
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterChoice {
    pub room: String,
    pub character: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombPlacement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub tile_x: i32,
    pub tile_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombDetonation {
    pub id: String,
    pub tile_x: i32,
    pub tile_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub id: String,
    pub health: i32,
}

/// Events the client emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom(JoinRoom),
    LeaveRoom(RoomMember),
    SelectCharacter(CharacterChoice),
    SetReady(RoomRef),
    NewPlayer(Position),
    Move(Position),
    AddBomb(BombPlacement),
    BombExploded(BombDetonation),
    UpdateHealth(HealthReport),
    PlayerDied(PlayerRef),
}

/// Lobby state pushed wholesale, keyed by player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    #[serde(default)]
    pub players: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub characters: BTreeMap<String, String>,
    #[serde(default)]
    pub ready: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombSpawn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detonation {
    pub tile_x: i32,
    pub tile_y: i32,
    #[serde(default)]
    pub players_hit: Vec<String>,
}

/// Events the servers push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Identity assigned to this socket.
    Connected(PlayerRef),
    RoomsList(Vec<String>),
    /// Names of the players in the joined room.
    RoomUpdate(Vec<String>),
    UpdateLobby(LobbySnapshot),
    GameStart,
    Players(BTreeMap<String, PlayerSnapshot>),
    PlayerMoved(Position),
    AddBomb(BombSpawn),
    BombExploded(Detonation),
    PlayerHealthUpdate(HealthReport),
    PlayerDied(PlayerRef),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => "joinRoom",
            ClientEvent::LeaveRoom(_) => "leaveRoom",
            ClientEvent::SelectCharacter(_) => "selectCharacter",
            ClientEvent::SetReady(_) => "setReady",
            ClientEvent::NewPlayer(_) => "newPlayer",
            ClientEvent::Move(_) => "move",
            ClientEvent::AddBomb(_) => "addBomb",
            ClientEvent::BombExploded(_) => "bombExploded",
            ClientEvent::UpdateHealth(_) => "updateHealth",
            ClientEvent::PlayerDied(_) => "playerDied",
        }
    }
}

pub fn encode<T: Serialize>(event: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}

pub fn decode<'a, T: Deserialize<'a>>(text: &'a str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}
