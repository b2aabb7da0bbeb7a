use crate::game::{GameScene, PlayerSprite};
use crate::lobby::Lobby;
use crate::rooms::RoomBrowser;
use log::{debug, warn};
use macroquad::prelude::*;
use shared::{
    BoardLayout, Tile, BOMB_SPRITE_SCALE, CHARACTERS, FLAME_SPRITE_SCALE, MAX_HEALTH,
    PLAYER_SPRITE_SCALE,
};
use std::path::Path;

const BACKGROUND: Color = Color::new(0.1, 0.1, 0.1, 1.0);
const FLOOR: Color = Color::new(0.16, 0.2, 0.16, 1.0);
const WALL: Color = Color::new(0.4, 0.4, 0.4, 1.0);
const BLOCK: Color = Color::new(0.6, 0.38, 0.2, 1.0);
const BOMB: Color = Color::new(0.05, 0.05, 0.05, 1.0);
const FLAME: Color = Color::new(1.0, 0.55, 0.1, 1.0);
const REMOTE_PLAYER: Color = Color::new(1.0, 0.27, 0.27, 1.0);
const HIGHLIGHT: Color = Color::new(0.0, 0.67, 1.0, 1.0);
const DIMMED: Color = Color::new(0.35, 0.35, 0.35, 1.0);

/// Entity layers of the game screen, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Players,
    Bombs,
    Flames,
}

const GAME_LAYERS: [Layer; 3] = [Layer::Players, Layer::Bombs, Layer::Flames];

/// Connection and screen context shown around every screen
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub connected: bool,
    pub room: Option<String>,
    pub banner: Option<String>,
    pub debug: bool,
}

/// Sprites loaded from the asset directory. A missing file leaves `None` and
/// the renderer draws a plain rectangle instead.
pub struct Textures {
    wall: Option<Texture2D>,
    block: Option<Texture2D>,
    bomb: Option<Texture2D>,
    player: Option<Texture2D>,
    flame: Option<Texture2D>,
    portraits: Vec<Option<Texture2D>>,
}

impl Textures {
    pub async fn load(dir: &Path) -> Self {
        let mut portraits = Vec::with_capacity(CHARACTERS.len());
        for character in CHARACTERS.iter() {
            portraits.push(load_optional(dir, character.portrait).await);
        }

        Self {
            wall: load_optional(dir, "wall.png").await,
            block: load_optional(dir, "destructiveWall.png").await,
            bomb: load_optional(dir, "bomba.png").await,
            player: load_optional(dir, "player.png").await,
            flame: load_optional(dir, "explosion.png").await,
            portraits,
        }
    }
}

async fn load_optional(dir: &Path, file: &str) -> Option<Texture2D> {
    let path = dir.join(file);
    let path = path.to_string_lossy();

    match load_texture(&path).await {
        Ok(texture) => {
            texture.set_filter(FilterMode::Nearest);
            Some(texture)
        }
        Err(e) => {
            warn!("Missing texture {}: {}", path, e);
            None
        }
    }
}

pub struct Renderer {
    layout: BoardLayout,
    textures: Textures,
}

impl Renderer {
    pub async fn new(assets: &Path) -> Self {
        Self {
            layout: BoardLayout::fit(screen_width(), screen_height()),
            textures: Textures::load(assets).await,
        }
    }

    /// Re-fits the board when the window was resized.
    pub fn sync_viewport(&mut self) {
        if self.layout.resize(screen_width(), screen_height()) {
            debug!(
                "Viewport {}x{}, tile size {:.1}",
                self.layout.viewport_width, self.layout.viewport_height, self.layout.tile_size
            );
        }
    }

    pub fn render_game(&self, scene: &GameScene, now: f64, hud: &Hud) {
        clear_background(BACKGROUND);

        let mut layout = self.layout;
        let shake = scene.shake_intensity(now);
        if shake > 0.0 {
            layout.offset_x += macroquad::rand::gen_range(-1.0, 1.0) * shake * layout.viewport_width;
            layout.offset_y += macroquad::rand::gen_range(-1.0, 1.0) * shake * layout.viewport_height;
        }

        self.draw_board(scene, &layout);

        for layer in GAME_LAYERS {
            match layer {
                Layer::Players => {
                    for sprite in scene.render_players(now) {
                        self.draw_player(&sprite, &layout);
                    }
                }
                Layer::Bombs => self.draw_bombs(scene, &layout),
                Layer::Flames => self.draw_flames(scene, now, &layout),
            }
        }

        self.draw_health(scene.health());
        self.draw_hud(hud);

        if hud.debug {
            let lines = [
                format!("fps {}", get_fps()),
                format!("players {}", scene.remote_count() + 1),
                format!("bombs {}", scene.bombs().len()),
                format!("flames {}", scene.flames().len()),
                format!(
                    "pos {:.2}, {:.2}",
                    scene.local().x,
                    scene.local().y
                ),
            ];
            for (i, line) in lines.iter().enumerate() {
                draw_text(line, screen_width() - 160.0, 20.0 + i as f32 * 16.0, 16.0, WHITE);
            }
        }

        if scene.is_game_over() {
            draw_centered("GAME OVER", screen_height() / 2.0, 64.0, RED);
        }
    }

    fn draw_bombs(&self, scene: &GameScene, layout: &BoardLayout) {
        for bomb in scene.bombs() {
            let (cx, cy) = layout.to_screen(bomb.x, bomb.y);
            draw_sprite(
                self.textures.bomb.as_ref(),
                cx,
                cy,
                layout.sprite_size(BOMB_SPRITE_SCALE),
                WHITE,
                BOMB,
            );
        }
    }

    fn draw_flames(&self, scene: &GameScene, now: f64, layout: &BoardLayout) {
        for flame in scene.flames() {
            let (x, y) = flame.center();
            let (cx, cy) = layout.to_screen(x, y);
            let tint = Color::new(1.0, 1.0, 1.0, flame.alpha(now));
            draw_sprite(
                self.textures.flame.as_ref(),
                cx,
                cy,
                layout.sprite_size(FLAME_SPRITE_SCALE),
                tint,
                Color::new(FLAME.r, FLAME.g, FLAME.b, tint.a),
            );
        }
    }

    fn draw_board(&self, scene: &GameScene, layout: &BoardLayout) {
        let board = scene.board();
        draw_rectangle(
            layout.offset_x,
            layout.offset_y,
            board.width() as f32 * layout.tile_size,
            board.height() as f32 * layout.tile_size,
            FLOOR,
        );

        for (x, y, tile) in board.cells() {
            let (texture, fallback) = match tile {
                Tile::Empty => continue,
                Tile::Wall => (self.textures.wall.as_ref(), WALL),
                Tile::Block => (self.textures.block.as_ref(), BLOCK),
            };
            let (cx, cy) = layout.tile_center(x, y);
            draw_sprite(texture, cx, cy, layout.tile_size, WHITE, fallback);
        }
    }

    fn draw_player(&self, sprite: &PlayerSprite, layout: &BoardLayout) {
        let (cx, cy) = layout.to_screen(sprite.x, sprite.y);
        let size = layout.sprite_size(PLAYER_SPRITE_SCALE) * sprite.scale;
        if size <= 0.0 {
            return;
        }

        let tint = if sprite.tinted {
            Color::new(1.0, 0.0, 0.0, sprite.alpha)
        } else {
            Color::new(1.0, 1.0, 1.0, sprite.alpha)
        };
        let base = if sprite.tinted {
            RED
        } else if sprite.local {
            GREEN
        } else {
            REMOTE_PLAYER
        };

        draw_sprite(
            self.textures.player.as_ref(),
            cx,
            cy,
            size,
            tint,
            Color::new(base.r, base.g, base.b, sprite.alpha),
        );

        if !sprite.local {
            let label = short_id(&sprite.id);
            let dims = measure_text(label, None, 14, 1.0);
            draw_text(
                label,
                cx - dims.width / 2.0,
                cy - size / 2.0 - 4.0,
                14.0,
                Color::new(1.0, 1.0, 1.0, sprite.alpha),
            );
        }
    }

    fn draw_health(&self, health: i32) {
        let width = 160.0;
        let fraction = (health.max(0) as f32 / MAX_HEALTH as f32).min(1.0);
        let color = if fraction > 0.5 {
            GREEN
        } else if fraction > 0.25 {
            YELLOW
        } else {
            RED
        };

        draw_rectangle(10.0, 10.0, width, 12.0, Color::from_rgba(51, 51, 51, 255));
        draw_rectangle(10.0, 10.0, width * fraction, 12.0, color);
        draw_rectangle_lines(10.0, 10.0, width, 12.0, 1.0, WHITE);
        draw_text(&format!("{} HP", health), 176.0, 21.0, 16.0, WHITE);
    }

    fn draw_hud(&self, hud: &Hud) {
        let bottom = screen_height() - 10.0;

        let connection_color = if hud.connected { GREEN } else { RED };
        draw_rectangle(10.0, bottom - 8.0, 8.0, 8.0, connection_color);
        draw_text("CON", 22.0, bottom, 14.0, WHITE);

        if let Some(room) = &hud.room {
            draw_text(&format!("Sala {}", room), 60.0, bottom, 14.0, WHITE);
        }

        if let Some(banner) = &hud.banner {
            draw_centered(banner, 40.0, 20.0, ORANGE);
        }
    }

    pub fn render_rooms(&self, browser: &RoomBrowser, hud: &Hud) {
        clear_background(BACKGROUND);

        draw_text(
            &format!("Jugador: {}", browser.player_name()),
            40.0,
            50.0,
            22.0,
            WHITE,
        );
        draw_text("Salas disponibles", 40.0, 90.0, 28.0, WHITE);

        if browser.rooms().is_empty() {
            draw_text("Esperando salas...", 40.0, 125.0, 20.0, DIMMED);
        }

        for (i, room) in browser.rooms().iter().enumerate() {
            let y = 125.0 + i as f32 * 26.0;
            let selected = browser.selected() == Some(room.as_str());
            if selected {
                draw_rectangle(34.0, y - 18.0, 240.0, 24.0, Color::new(0.0, 0.67, 1.0, 0.25));
            }
            draw_text(room, 40.0, y, 22.0, if selected { HIGHLIGHT } else { WHITE });
        }

        let list_x = 340.0;
        draw_text("Jugadores en la sala:", list_x, 90.0, 22.0, WHITE);
        for (i, player) in browser.players().iter().enumerate() {
            draw_text(player, list_x, 125.0 + i as f32 * 24.0, 20.0, WHITE);
        }

        let help = if browser.in_room() {
            "Enter: ir al lobby   L: salir   Esc: cerrar"
        } else if browser.can_join() {
            "Arriba/Abajo: elegir   Enter: unirse   Esc: cerrar"
        } else {
            "Arriba/Abajo: elegir sala   Esc: cerrar"
        };
        draw_text(help, 40.0, screen_height() - 40.0, 18.0, DIMMED);

        self.draw_hud(hud);
    }

    pub fn render_lobby(&self, lobby: &Lobby, hud: &Hud) {
        clear_background(BACKGROUND);

        draw_text(&format!("Sala {}", lobby.room()), 40.0, 50.0, 32.0, WHITE);
        draw_text("Selecciona tu personaje:", 40.0, 95.0, 22.0, WHITE);

        let card = 96.0;
        for (i, character) in CHARACTERS.iter().enumerate() {
            let x = 40.0 + i as f32 * (card + 20.0);
            let y = 110.0;
            let taken = lobby.is_taken(character.id);
            let tint = if taken { DIMMED } else { WHITE };

            let portrait = self.textures.portraits.get(i).and_then(Option::as_ref);
            draw_sprite(
                portrait,
                x + card / 2.0,
                y + card / 2.0,
                card,
                tint,
                if taken { DIMMED } else { HIGHLIGHT },
            );
            draw_rectangle_lines(x, y, card, card, 2.0, tint);
            draw_text(&format!("{}", i + 1), x + 4.0, y + 18.0, 20.0, tint);
            draw_text(character.name, x, y + card + 18.0, 16.0, tint);
        }

        draw_text("Jugadores en la sala:", 40.0, 280.0, 22.0, WHITE);
        for (i, row) in lobby.rows().iter().enumerate() {
            let y = 312.0 + i as f32 * 26.0;
            let (status, color) = if row.ready {
                ("Listo", GREEN)
            } else {
                ("No listo", RED)
            };
            draw_text(&row.player, 40.0, y, 20.0, WHITE);
            draw_text(row.character_label(), 240.0, y, 20.0, WHITE);
            draw_text(status, 420.0, y, 20.0, color);
        }

        draw_text(
            "1-4: personaje   R: listo   Esc: volver",
            40.0,
            screen_height() - 40.0,
            18.0,
            DIMMED,
        );

        self.draw_hud(hud);
    }

    pub fn render_loading(&self, message: &str, hud: &Hud) {
        clear_background(BACKGROUND);
        draw_centered(message, screen_height() / 2.0, 28.0, WHITE);
        self.draw_hud(hud);
    }
}

/// Draws a square sprite centred on `(cx, cy)`, or a rectangle when the
/// texture is missing.
fn draw_sprite(texture: Option<&Texture2D>, cx: f32, cy: f32, size: f32, tint: Color, fallback: Color) {
    let (x, y) = (cx - size / 2.0, cy - size / 2.0);

    match texture {
        Some(texture) => draw_texture_ex(
            texture,
            x,
            y,
            tint,
            DrawTextureParams {
                dest_size: Some(vec2(size, size)),
                ..Default::default()
            },
        ),
        None => draw_rectangle(x, y, size, size, fallback),
    }
}

fn draw_centered(text: &str, y: f32, font_size: f32, color: Color) {
    let dims = measure_text(text, None, font_size as u16, 1.0);
    draw_text(text, (screen_width() - dims.width) / 2.0, y, font_size, color);
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(6) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
