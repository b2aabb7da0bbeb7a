//! Room browser: lists the rooms the room server advertises and joins one.

use log::{debug, info};
use shared::protocol::{ClientEvent, JoinRoom, RoomMember, ServerEvent};

#[derive(Debug, Clone, Default)]
pub struct RoomBrowser {
    player_name: String,
    rooms: Vec<String>,
    selected: Option<String>,
    players: Vec<String>,
    in_room: bool,
}

impl RoomBrowser {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            ..Self::default()
        }
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn in_room(&self) -> bool {
        self.in_room
    }

    pub fn can_join(&self) -> bool {
        !self.in_room && self.selected.is_some() && !self.player_name.is_empty()
    }

    /// Applies room server pushes. Returns true if the event was consumed.
    pub fn handle(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::RoomsList(rooms) => {
                debug!("{} rooms available", rooms.len());
                self.rooms = rooms.clone();
                true
            }
            ServerEvent::RoomUpdate(players) => {
                self.players = players.clone();
                true
            }
            _ => false,
        }
    }

    pub fn select(&mut self, room: &str) {
        self.selected = Some(room.to_string());
    }

    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.step_selection(-1);
    }

    fn step_selection(&mut self, step: isize) {
        if self.rooms.is_empty() {
            return;
        }

        let len = self.rooms.len() as isize;
        let next = match self
            .selected
            .as_ref()
            .and_then(|room| self.rooms.iter().position(|r| r == room))
        {
            Some(current) => (current as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };

        self.selected = Some(self.rooms[next as usize].clone());
    }

    pub fn join(&mut self) -> Option<ClientEvent> {
        if !self.can_join() {
            return None;
        }

        let room = self.selected.clone()?;
        info!("Joining room {} as {}", room, self.player_name);
        self.in_room = true;

        Some(ClientEvent::JoinRoom(JoinRoom {
            room,
            player_name: Some(self.player_name.clone()),
        }))
    }

    pub fn leave(&mut self) -> Option<ClientEvent> {
        let room = self.selected.clone()?;
        info!("Leaving room {}", room);
        self.players.clear();
        self.in_room = false;

        Some(ClientEvent::LeaveRoom(RoomMember {
            room,
            player_name: self.player_name.clone(),
        }))
    }
}
