//! Frame loop: feeds sockets and keys into the [`Session`] and draws it.

use crate::error::Result;
use crate::input::InputManager;
use crate::network::Connection;
use crate::rendering::{Hud, Renderer};
use crate::session::{Outbox, Screen, Session, Step};
use log::{info, warn};
use macroquad::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub rooms_url: String,
    pub player_name: String,
    /// Skip the room browser and go straight to this room's lobby.
    pub room: Option<String>,
    pub assets: PathBuf,
}

pub struct App {
    config: AppConfig,
    game_conn: Connection,
    rooms_conn: Option<Connection>,
    session: Session,
    input: InputManager,
    renderer: Renderer,
    debug: bool,
}

impl App {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let game_conn = Connection::open(&config.server_url)?;
        let renderer = Renderer::new(&config.assets).await;
        let (session, outbox) = Session::new(config.player_name.clone(), config.room.clone());

        let mut app = Self {
            config,
            game_conn,
            rooms_conn: None,
            session,
            input: InputManager::new(),
            renderer,
            debug: false,
        };

        if app.session.is_browsing() {
            app.open_rooms()?;
        }
        app.send(outbox);

        Ok(app)
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let now = get_time();
            let dt = get_frame_time();
            let was_browsing = self.session.is_browsing();

            self.renderer.sync_viewport();
            self.pump_network(now);

            let menu = self.input.menu();
            if menu.toggle_debug {
                self.debug = !self.debug;
            }
            match self.session.menu(&menu) {
                Step::Continue(outbox) => self.send(outbox),
                Step::Quit(outbox) => {
                    self.send(outbox);
                    break;
                }
            }

            if self.session.in_game() {
                let frame = self.input.game();
                let outbox = self.session.frame(&frame, now, dt);
                self.send(outbox);
            }

            if !was_browsing && self.session.is_browsing() {
                self.open_rooms()?;
            }

            self.draw(now);
            next_frame().await;
        }

        info!("Shutting down");
        Ok(())
    }

    /// Connects to the room server unless a live connection exists.
    fn open_rooms(&mut self) -> Result<()> {
        if self.rooms_conn.as_ref().map_or(true, Connection::is_closed) {
            self.rooms_conn = Some(Connection::open(&self.config.rooms_url)?);
        }
        Ok(())
    }

    fn pump_network(&mut self, now: f64) {
        let rooms_events = self
            .rooms_conn
            .as_mut()
            .map(Connection::poll)
            .unwrap_or_default();
        for event in rooms_events {
            self.session.handle_rooms(event);
        }

        for event in self.game_conn.poll() {
            let outbox = self.session.handle_game(event, now);
            self.send(outbox);
        }
    }

    fn send(&self, outbox: Outbox) {
        if !outbox.rooms.is_empty() {
            match &self.rooms_conn {
                Some(conn) => conn.emit_all(outbox.rooms),
                None => warn!(
                    "No room server connection, dropping {} events",
                    outbox.rooms.len()
                ),
            }
        }
        self.game_conn.emit_all(outbox.game);
    }

    fn hud(&self) -> Hud {
        let connected = match self.session.screen() {
            Screen::Rooms => self
                .rooms_conn
                .as_ref()
                .is_some_and(Connection::is_connected),
            _ => self.game_conn.is_connected(),
        };
        let room = match self.session.screen() {
            Screen::Rooms => self.session.browser().selected(),
            _ => self.session.room(),
        };

        Hud {
            connected,
            room: room.map(str::to_string),
            banner: self.session.banner().map(str::to_string),
            debug: self.debug,
        }
    }

    fn draw(&self, now: f64) {
        let hud = self.hud();
        match self.session.screen() {
            Screen::Rooms => self.renderer.render_rooms(self.session.browser(), &hud),
            Screen::Lobby(lobby) => self.renderer.render_lobby(lobby, &hud),
            Screen::Game {
                scene: Some(scene), ..
            } => self.renderer.render_game(scene, now, &hud),
            Screen::Game { scene: None, .. } => {
                self.renderer.render_loading("Cargando juego...", &hud)
            }
        }
    }
}
