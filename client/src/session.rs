//! Screen flow: room browser -> lobby -> game.
//!
//! [`Session`] owns every screen's state and decides what to send where. It
//! never touches a socket or the window: each call returns an [`Outbox`] that
//! the frame loop hands to the two connections.

use crate::game::GameScene;
use crate::input::{FrameInput, MenuInput};
use crate::lobby::{Lobby, LobbyTransition};
use crate::network::NetworkEvent;
use crate::rooms::RoomBrowser;
use log::{debug, info, warn};
use shared::protocol::{ClientEvent, RoomMember, ServerEvent};
use shared::{Board, CHARACTERS};

pub enum Screen {
    Rooms,
    Lobby(Lobby),
    /// The scene is created once the server has told us our id.
    Game {
        room: String,
        scene: Option<GameScene>,
    },
}

/// Events to send, split by the server they are meant for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outbox {
    pub rooms: Vec<ClientEvent>,
    pub game: Vec<ClientEvent>,
}

impl Outbox {
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty() && self.game.is_empty()
    }
}

/// Outcome of a menu frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue(Outbox),
    Quit(Outbox),
}

pub struct Session {
    local_id: Option<String>,
    browser: RoomBrowser,
    screen: Screen,
    rooms_banner: Option<String>,
    game_banner: Option<String>,
}

impl Session {
    /// Starts in the lobby of `room` when given, otherwise in the browser.
    pub fn new(player_name: impl Into<String>, room: Option<String>) -> (Self, Outbox) {
        let mut session = Self {
            local_id: None,
            browser: RoomBrowser::new(player_name),
            screen: Screen::Rooms,
            rooms_banner: None,
            game_banner: None,
        };

        let mut outbox = Outbox::default();
        if let Some(room) = room {
            session.enter_lobby(room, &mut outbox);
        }

        (session, outbox)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn browser(&self) -> &RoomBrowser {
        &self.browser
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    pub fn is_browsing(&self) -> bool {
        matches!(self.screen, Screen::Rooms)
    }

    pub fn in_game(&self) -> bool {
        matches!(self.screen, Screen::Game { .. })
    }

    /// Connection warning for the current screen.
    pub fn banner(&self) -> Option<&str> {
        match self.screen {
            Screen::Rooms => self.rooms_banner.as_deref().or(self.game_banner.as_deref()),
            _ => self.game_banner.as_deref(),
        }
    }

    /// Room of the lobby or game, if any.
    pub fn room(&self) -> Option<&str> {
        match &self.screen {
            Screen::Rooms => None,
            Screen::Lobby(lobby) => Some(lobby.room()),
            Screen::Game { room, .. } => Some(room),
        }
    }

    fn enter_lobby(&mut self, room: String, outbox: &mut Outbox) {
        let (lobby, join) = Lobby::enter(room);
        outbox.game.push(join);
        self.screen = Screen::Lobby(lobby);
    }

    fn enter_game(&mut self, room: String, outbox: &mut Outbox) {
        info!("Entering game in room {}", room);
        self.screen = Screen::Game { room, scene: None };
        self.spawn_pending_scene(outbox);
    }

    fn spawn_pending_scene(&mut self, outbox: &mut Outbox) {
        let Some(id) = self.local_id.clone() else {
            return;
        };

        if let Screen::Game { scene, .. } = &mut self.screen {
            if scene.is_none() {
                let (new_scene, announce) = GameScene::new(id, Board::default());
                *scene = Some(new_scene);
                outbox.game.push(announce);
            }
        }
    }

    /// Applies an event from the room server.
    pub fn handle_rooms(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected => self.rooms_banner = None,
            NetworkEvent::Message(message) => {
                if !self.browser.handle(&message) {
                    debug!("Room server event ignored: {:?}", message);
                }
            }
            NetworkEvent::Disconnected { reason } => {
                warn!("Room server connection lost: {}", reason);
                self.rooms_banner = Some(format!("Servidor de salas desconectado: {}", reason));
            }
        }
    }

    /// Applies an event from the game server.
    pub fn handle_game(&mut self, event: NetworkEvent, now: f64) -> Outbox {
        let mut outbox = Outbox::default();

        match event {
            NetworkEvent::Connected => self.game_banner = None,
            NetworkEvent::Disconnected { reason } => {
                self.game_banner = Some(format!("Desconectado: {}", reason));
            }
            NetworkEvent::Message(ServerEvent::Connected(player)) => {
                info!("Server assigned id {}", player.id);
                self.local_id = Some(player.id);
                self.spawn_pending_scene(&mut outbox);
            }
            NetworkEvent::Message(message) => self.dispatch(&message, now, &mut outbox),
        }

        outbox
    }

    fn dispatch(&mut self, message: &ServerEvent, now: f64, outbox: &mut Outbox) {
        match &mut self.screen {
            Screen::Rooms => debug!("Not in a room, dropping {:?}", message),
            Screen::Lobby(lobby) => {
                if let Some(LobbyTransition::StartGame { room }) = lobby.handle(message) {
                    self.enter_game(room, outbox);
                }
            }
            Screen::Game {
                scene: Some(scene), ..
            } => outbox.game.extend(scene.handle(message, now)),
            Screen::Game { scene: None, .. } => {
                debug!("Scene not ready, dropping {:?}", message);
            }
        }
    }

    /// Applies the menu keys for the current screen.
    pub fn menu(&mut self, menu: &MenuInput) -> Step {
        let mut outbox = Outbox::default();

        if menu.back {
            if self.is_browsing() {
                if self.browser.in_room() {
                    outbox.rooms.extend(self.browser.leave());
                }
                return Step::Quit(outbox);
            }
            self.back_to_rooms(&mut outbox);
            return Step::Continue(outbox);
        }

        match &mut self.screen {
            Screen::Rooms => {
                if menu.up {
                    self.browser.select_prev();
                }
                if menu.down {
                    self.browser.select_next();
                }
                if menu.leave {
                    outbox.rooms.extend(self.browser.leave());
                }
                if menu.confirm {
                    if self.browser.in_room() {
                        if let Some(room) = self.browser.selected().map(str::to_string) {
                            self.enter_lobby(room, &mut outbox);
                        }
                    } else {
                        outbox.rooms.extend(self.browser.join());
                    }
                }
            }

            Screen::Lobby(lobby) => {
                if let Some(index) = menu.character {
                    match CHARACTERS.get(index).and_then(|c| lobby.select_character(c.id)) {
                        Some(choice) => outbox.game.push(choice),
                        None => debug!("Character {} not selectable", index + 1),
                    }
                }
                if menu.ready {
                    outbox.game.push(lobby.set_ready());
                }
            }

            Screen::Game { .. } => {}
        }

        Step::Continue(outbox)
    }

    /// Advances the game scene by one frame.
    pub fn frame(&mut self, input: &FrameInput, now: f64, dt: f32) -> Outbox {
        let mut outbox = Outbox::default();
        if let Screen::Game {
            scene: Some(scene), ..
        } = &mut self.screen
        {
            outbox.game = scene.update(input, now, dt);
        }
        outbox
    }

    /// Leaves the lobby or game room on the game server, and the browser's
    /// room on the room server, then shows the browser.
    fn back_to_rooms(&mut self, outbox: &mut Outbox) {
        if let Some(room) = self.room().map(str::to_string) {
            info!("Leaving room {}", room);
            outbox.game.push(ClientEvent::LeaveRoom(RoomMember {
                room,
                player_name: self.browser.player_name().to_string(),
            }));
        }

        if self.browser.in_room() {
            outbox.rooms.extend(self.browser.leave());
        }

        self.screen = Screen::Rooms;
    }
}
