//! Client-side mirror of the game scene.
//!
//! The server owns the rules; this scene predicts the local player's movement
//! and bombs so input feels immediate, and reconciles whenever the server
//! pushes players, explosions, health or deaths. Everything is driven by an
//! explicit clock (`now`, seconds) so the scene runs without a window.

use crate::input::FrameInput;
use log::{debug, info};
use shared::protocol::{
    BombDetonation, BombPlacement, ClientEvent, Detonation, HealthReport, PlayerRef, Position,
    ServerEvent,
};
use shared::{
    tile_center, tile_of, Board, Tile, BOMB_DAMAGE, BOMB_FUSE, CAMERA_SHAKE,
    CAMERA_SHAKE_INTENSITY, DAMAGE_FLASH, DEATH_FADE, FLAME_ALPHA, FLAME_FADE, HIT_BLINK,
    HIT_BLINK_REPEATS, MAX_HEALTH, MOVE_TWEEN, PLAYER_HITBOX, PLAYER_SPEED, RECONCILE_DISTANCE,
    SPAWN_TILE,
};
use std::collections::HashMap;

/// Longest movement sub-step. Longer frames are split so fast travel cannot
/// skip over a tile.
const MAX_STEP: f32 = 0.05;

/// Linear interpolation between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: (f32, f32),
    to: (f32, f32),
    start: f64,
    duration: f64,
}

impl Tween {
    pub fn fixed(at: (f32, f32)) -> Self {
        Self {
            from: at,
            to: at,
            start: 0.0,
            duration: 0.0,
        }
    }

    pub fn new(from: (f32, f32), to: (f32, f32), start: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (((now - self.start) / self.duration) as f32).clamp(0.0, 1.0)
    }

    pub fn position(&self, now: f64) -> (f32, f32) {
        let t = self.progress(now);
        (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        )
    }

    pub fn target(&self) -> (f32, f32) {
        self.to
    }
}

#[derive(Debug, Clone)]
pub struct LocalPlayer {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub dead: bool,
    damaged_until: f64,
    last_reported: (f32, f32),
}

impl LocalPlayer {
    pub fn is_damaged(&self, now: f64) -> bool {
        now < self.damaged_until
    }
}

#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub id: String,
    pub health: i32,
    tween: Tween,
    blink_since: Option<f64>,
    dying_since: Option<f64>,
}

impl RemotePlayer {
    fn new(id: &str, at: (f32, f32), health: i32) -> Self {
        Self {
            id: id.to_string(),
            health,
            tween: Tween::fixed(at),
            blink_since: None,
            dying_since: None,
        }
    }

    pub fn position(&self, now: f64) -> (f32, f32) {
        self.tween.position(now)
    }

    pub fn is_dying(&self) -> bool {
        self.dying_since.is_some()
    }

    fn death_progress(&self, now: f64) -> Option<f32> {
        self.dying_since
            .map(|since| (((now - since) / DEATH_FADE) as f32).clamp(0.0, 1.0))
    }

    /// Yoyo between full and half opacity, one cycle per two blink periods.
    fn blink_alpha(&self, now: f64) -> f32 {
        let Some(since) = self.blink_since else {
            return 1.0;
        };

        let elapsed = now - since;
        let cycle = HIT_BLINK * 2.0;
        if elapsed < 0.0 || elapsed >= cycle * HIT_BLINK_REPEATS as f64 {
            return 1.0;
        }

        let phase = (elapsed % cycle) / HIT_BLINK;
        let depth = if phase <= 1.0 { phase } else { 2.0 - phase };
        1.0 - 0.5 * depth as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bomb {
    pub x: f32,
    pub y: f32,
    pub tile: (i32, i32),
    pub placed_at: f64,
    /// Placed by this client, which reports the detonation.
    pub own: bool,
}

impl Bomb {
    pub fn fuse_remaining(&self, now: f64) -> f64 {
        (self.placed_at + BOMB_FUSE - now).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flame {
    pub tile: (i32, i32),
    pub started: f64,
}

impl Flame {
    pub fn alpha(&self, now: f64) -> f32 {
        let t = ((now - self.started) / FLAME_FADE).clamp(0.0, 1.0) as f32;
        FLAME_ALPHA * (1.0 - t)
    }

    pub fn center(&self) -> (f32, f32) {
        tile_center(self.tile.0, self.tile.1)
    }
}

/// Everything the renderer needs to draw one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSprite {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
    pub scale: f32,
    pub tinted: bool,
    pub local: bool,
}

pub struct GameScene {
    board: Board,
    local: LocalPlayer,
    remotes: HashMap<String, RemotePlayer>,
    bombs: Vec<Bomb>,
    flames: Vec<Flame>,
    shake_until: f64,
}

impl GameScene {
    /// Spawns the local player. The returned event announces it to the server.
    pub fn new(local_id: impl Into<String>, board: Board) -> (Self, ClientEvent) {
        let local_id = local_id.into();
        let (x, y) = tile_center(SPAWN_TILE.0, SPAWN_TILE.1);
        info!("Spawning {} at ({:.2}, {:.2})", local_id, x, y);

        let scene = Self {
            board,
            local: LocalPlayer {
                id: local_id.clone(),
                x,
                y,
                health: MAX_HEALTH,
                dead: false,
                damaged_until: f64::NEG_INFINITY,
                last_reported: (x, y),
            },
            remotes: HashMap::new(),
            bombs: Vec::new(),
            flames: Vec::new(),
            shake_until: f64::NEG_INFINITY,
        };

        let announce = ClientEvent::NewPlayer(Position { id: local_id, x, y });
        (scene, announce)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn local(&self) -> &LocalPlayer {
        &self.local
    }

    pub fn remote(&self, id: &str) -> Option<&RemotePlayer> {
        self.remotes.get(id)
    }

    pub fn remote_count(&self) -> usize {
        self.remotes.len()
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn flames(&self) -> &[Flame] {
        &self.flames
    }

    pub fn health(&self) -> i32 {
        self.local.health
    }

    pub fn is_game_over(&self) -> bool {
        self.local.dead
    }

    /// Fraction of the viewport to shake the camera by.
    pub fn shake_intensity(&self, now: f64) -> f32 {
        if now < self.shake_until {
            CAMERA_SHAKE_INTENSITY
        } else {
            0.0
        }
    }

    /// Advances one frame: predicts local movement and bombs, runs fuses and
    /// fades. Returns the events to emit.
    pub fn update(&mut self, input: &FrameInput, now: f64, dt: f32) -> Vec<ClientEvent> {
        let mut outgoing = Vec::new();

        self.detonate_expired(now, &mut outgoing);

        if !self.local.dead {
            if let Some(direction) = input.direction() {
                let (dx, dy) = direction.delta();
                let mut remaining = dt.max(0.0);
                while remaining > 0.0 {
                    let step = remaining.min(MAX_STEP);
                    remaining -= step;

                    let distance = PLAYER_SPEED * step;
                    let (x, y) =
                        slide(&self.board, self.local.x, self.local.y, dx * distance, dy * distance);
                    self.local.x = x;
                    self.local.y = y;
                }
            }

            let position = (self.local.x, self.local.y);
            if position != self.local.last_reported && !self.local.is_damaged(now) {
                self.local.last_reported = position;
                outgoing.push(ClientEvent::Move(Position {
                    id: self.local.id.clone(),
                    x: position.0,
                    y: position.1,
                }));
            }

            if input.place_bomb {
                outgoing.push(self.place_bomb(now));
            }
        }

        self.flames.retain(|flame| now - flame.started < FLAME_FADE);
        self.remotes.retain(|_, remote| {
            remote
                .dying_since
                .map_or(true, |since| now - since < DEATH_FADE)
        });
        for remote in self.remotes.values_mut() {
            if remote
                .blink_since
                .is_some_and(|since| now - since >= HIT_BLINK * 2.0 * HIT_BLINK_REPEATS as f64)
            {
                remote.blink_since = None;
            }
        }

        outgoing
    }

    /// Drops a bomb where the player stands. Only the tile is snapped.
    fn place_bomb(&mut self, now: f64) -> ClientEvent {
        let (x, y) = (self.local.x, self.local.y);
        let tile = tile_of(x, y);
        debug!("Bomb placed at ({:.2}, {:.2}), tile {:?}", x, y, tile);

        self.bombs.push(Bomb {
            x,
            y,
            tile,
            placed_at: now,
            own: true,
        });

        ClientEvent::AddBomb(BombPlacement {
            id: self.local.id.clone(),
            x,
            y,
            tile_x: tile.0,
            tile_y: tile.1,
        })
    }

    fn detonate_expired(&mut self, now: f64, outgoing: &mut Vec<ClientEvent>) {
        let (expired, live): (Vec<Bomb>, Vec<Bomb>) = self
            .bombs
            .drain(..)
            .partition(|bomb| now - bomb.placed_at >= BOMB_FUSE);
        self.bombs = live;

        for bomb in expired {
            self.spawn_flames(bomb.tile, now);

            if bomb.own {
                outgoing.push(ClientEvent::BombExploded(BombDetonation {
                    id: self.local.id.clone(),
                    tile_x: bomb.tile.0,
                    tile_y: bomb.tile.1,
                }));
            }
        }
    }

    /// Flames cover the blast cross except solid walls and cells off the board.
    fn spawn_flames(&mut self, tile: (i32, i32), now: f64) {
        for cell in self.board.blast_cells(tile.0, tile.1) {
            match cell.tile {
                Some(Tile::Empty) | Some(Tile::Block) => self.flames.push(Flame {
                    tile: (cell.x, cell.y),
                    started: now,
                }),
                Some(Tile::Wall) | None => {}
            }
        }
    }

    /// Reconciles a server push. Returns the events to emit in response.
    pub fn handle(&mut self, event: &ServerEvent, now: f64) -> Vec<ClientEvent> {
        match event {
            ServerEvent::Players(players) => {
                self.remotes
                    .retain(|id, _| players.contains_key(id.as_str()));

                for (id, snapshot) in players {
                    let at = (snapshot.x, snapshot.y);

                    if *id == self.local.id {
                        self.reconcile_local(at);
                        continue;
                    }

                    match self.remotes.get_mut(id) {
                        Some(remote) => {
                            remote.tween = Tween::fixed(at);
                            if let Some(health) = snapshot.health {
                                remote.health = health;
                            }
                        }
                        None => {
                            debug!("Player {} joined the scene", id);
                            let health = snapshot.health.unwrap_or(MAX_HEALTH);
                            self.remotes
                                .insert(id.clone(), RemotePlayer::new(id, at, health));
                        }
                    }
                }
                Vec::new()
            }

            ServerEvent::PlayerMoved(moved) => {
                if let Some(remote) = self.remotes.get_mut(&moved.id) {
                    let from = remote.tween.position(now);
                    remote.tween = Tween::new(from, (moved.x, moved.y), now, MOVE_TWEEN);
                }
                Vec::new()
            }

            ServerEvent::AddBomb(spawn) => {
                if spawn.id.as_deref() != Some(self.local.id.as_str()) {
                    self.bombs.push(Bomb {
                        x: spawn.x,
                        y: spawn.y,
                        tile: tile_of(spawn.x, spawn.y),
                        placed_at: now,
                        own: false,
                    });
                }
                Vec::new()
            }

            ServerEvent::BombExploded(detonation) => self.apply_detonation(detonation, now),

            ServerEvent::PlayerHealthUpdate(report) => {
                if report.id == self.local.id {
                    self.local.health = report.health;
                    if report.health <= 0 && !self.local.dead {
                        info!("Server reports {} out of health", self.local.id);
                        self.local.health = 0;
                        self.local.dead = true;
                    }
                } else if let Some(remote) = self.remotes.get_mut(&report.id) {
                    remote.health = report.health;
                    remote.blink_since = Some(now);
                }
                Vec::new()
            }

            ServerEvent::PlayerDied(player) => {
                if player.id == self.local.id {
                    self.local.health = 0;
                    self.local.dead = true;
                } else if let Some(remote) = self.remotes.get_mut(&player.id) {
                    if remote.dying_since.is_none() {
                        info!("Player {} died", player.id);
                        remote.dying_since = Some(now);
                    }
                }
                Vec::new()
            }

            _ => Vec::new(),
        }
    }

    fn reconcile_local(&mut self, server: (f32, f32)) {
        let dx = server.0 - self.local.x;
        let dy = server.1 - self.local.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance > RECONCILE_DISTANCE {
            debug!("Correction needed! Distance: {:.2}", distance);
            self.local.x = server.0;
            self.local.y = server.1;
            self.local.last_reported = server;
        }
    }

    fn apply_detonation(&mut self, detonation: &Detonation, now: f64) -> Vec<ClientEvent> {
        let tile = (detonation.tile_x, detonation.tile_y);
        self.spawn_flames(tile, now);

        for cell in self.board.blast_cells(tile.0, tile.1) {
            if self.board.destroy_block(cell.x, cell.y) {
                debug!("Block destroyed at ({}, {})", cell.x, cell.y);
            }
        }

        let hit = detonation
            .players_hit
            .iter()
            .any(|id| *id == self.local.id);
        if !hit || self.local.dead {
            return Vec::new();
        }

        let mut outgoing = Vec::new();

        self.local.health -= BOMB_DAMAGE;
        self.local.damaged_until = now + DAMAGE_FLASH;
        self.shake_until = now + CAMERA_SHAKE;
        info!("Hit by explosion, health {}", self.local.health);

        if self.local.health <= 0 {
            self.local.health = 0;
            self.local.dead = true;
            info!("GAME OVER for {}", self.local.id);
            outgoing.push(ClientEvent::PlayerDied(PlayerRef {
                id: self.local.id.clone(),
            }));
        }

        outgoing.push(ClientEvent::UpdateHealth(HealthReport {
            id: self.local.id.clone(),
            health: self.local.health,
        }));

        outgoing
    }

    /// Local player first, then remotes sorted by id.
    pub fn render_players(&self, now: f64) -> Vec<PlayerSprite> {
        let mut sprites = vec![PlayerSprite {
            id: self.local.id.clone(),
            x: self.local.x,
            y: self.local.y,
            alpha: 1.0,
            scale: 1.0,
            tinted: self.local.is_damaged(now),
            local: true,
        }];

        let mut remotes: Vec<&RemotePlayer> = self.remotes.values().collect();
        remotes.sort_by(|a, b| a.id.cmp(&b.id));

        for remote in remotes {
            let (x, y) = remote.position(now);
            let (alpha, scale) = match remote.death_progress(now) {
                Some(t) => (1.0 - t, 1.0 - t),
                None => (remote.blink_alpha(now), 1.0),
            };
            sprites.push(PlayerSprite {
                id: remote.id.clone(),
                x,
                y,
                alpha,
                scale,
                tinted: false,
                local: false,
            });
        }

        sprites
    }
}

fn overlaps_solid(board: &Board, x: f32, y: f32) -> bool {
    const EPSILON: f32 = 1e-4;
    let half = PLAYER_HITBOX / 2.0;

    let x0 = (x - half).floor() as i32;
    let x1 = (x + half - EPSILON).floor() as i32;
    let y0 = (y - half).floor() as i32;
    let y1 = (y + half - EPSILON).floor() as i32;

    (y0..=y1).any(|ty| (x0..=x1).any(|tx| board.is_solid(tx, ty)))
}

/// Moves along one axis, stopping flush against the first solid tile.
fn slide(board: &Board, x: f32, y: f32, dx: f32, dy: f32) -> (f32, f32) {
    let half = PLAYER_HITBOX / 2.0;
    let (nx, ny) = (x + dx, y + dy);

    if !overlaps_solid(board, nx, ny) {
        return (nx, ny);
    }

    if dx > 0.0 {
        (((nx + half).floor() - half).max(x), y)
    } else if dx < 0.0 {
        (((nx - half).floor() + 1.0 + half).min(x), y)
    } else if dy > 0.0 {
        (x, ((ny + half).floor() - half).max(y))
    } else if dy < 0.0 {
        (x, ((ny - half).floor() + 1.0 + half).min(y))
    } else {
        (x, y)
    }
}
