//! Pre-game lobby of a single room: character picks and ready flags.

use log::{debug, info};
use shared::characters;
use shared::protocol::{CharacterChoice, ClientEvent, JoinRoom, LobbySnapshot, RoomRef, ServerEvent};

pub const NO_CHARACTER: &str = "Sin personaje";

#[derive(Debug, Clone, PartialEq)]
pub struct LobbyRow {
    pub player: String,
    pub character: Option<String>,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LobbyTransition {
    StartGame { room: String },
}

#[derive(Debug, Clone)]
pub struct Lobby {
    room: String,
    snapshot: LobbySnapshot,
}

impl Lobby {
    /// Enters the lobby. The returned event must be emitted to register with
    /// the room.
    pub fn enter(room: impl Into<String>) -> (Self, ClientEvent) {
        let room = room.into();
        info!("Entering lobby of room {}", room);

        let join = ClientEvent::JoinRoom(JoinRoom {
            room: room.clone(),
            player_name: None,
        });

        (
            Self {
                room,
                snapshot: LobbySnapshot::default(),
            },
            join,
        )
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn handle(&mut self, event: &ServerEvent) -> Option<LobbyTransition> {
        match event {
            ServerEvent::UpdateLobby(snapshot) => {
                debug!(
                    "Lobby {}: {} players, {} ready",
                    self.room,
                    snapshot.players.len(),
                    snapshot.ready.values().filter(|r| **r).count()
                );
                self.snapshot = snapshot.clone();
                None
            }
            ServerEvent::GameStart => {
                info!("Game starting in room {}", self.room);
                Some(LobbyTransition::StartGame {
                    room: self.room.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn is_taken(&self, character: &str) -> bool {
        self.snapshot.characters.values().any(|c| c == character)
    }

    pub fn select_character(&self, character: &str) -> Option<ClientEvent> {
        if characters::find(character).is_none() || self.is_taken(character) {
            debug!("Character {} unavailable", character);
            return None;
        }

        Some(ClientEvent::SelectCharacter(CharacterChoice {
            room: self.room.clone(),
            character: character.to_string(),
        }))
    }

    pub fn set_ready(&self) -> ClientEvent {
        ClientEvent::SetReady(RoomRef {
            room: self.room.clone(),
        })
    }

    /// Players in name order, merging all three lobby maps.
    pub fn rows(&self) -> Vec<LobbyRow> {
        self.snapshot
            .players
            .keys()
            .map(|player| LobbyRow {
                player: player.clone(),
                character: self.snapshot.characters.get(player).cloned(),
                ready: self.snapshot.ready.get(player).copied().unwrap_or(false),
            })
            .collect()
    }
}

impl LobbyRow {
    pub fn character_label(&self) -> &str {
        self.character.as_deref().unwrap_or(NO_CHARACTER)
    }
}
