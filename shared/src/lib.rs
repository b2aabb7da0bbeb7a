pub mod board;
pub mod characters;
pub mod layout;
pub mod protocol;

pub use board::{BlastCell, Board, BoardError, Tile};
pub use characters::{Character, CHARACTERS};
pub use layout::BoardLayout;
pub use protocol::{ClientEvent, ProtocolError, ServerEvent};

pub const BOARD_WIDTH: usize = 13;
pub const BOARD_HEIGHT: usize = 11;

/// Tiles per second.
pub const PLAYER_SPEED: f32 = 4.0;
pub const PLAYER_HITBOX: f32 = 0.64;
/// Server position drift, in tiles, past which the local player is snapped back.
pub const RECONCILE_DISTANCE: f32 = 1.0;
pub const PLAYER_SPRITE_SCALE: f32 = 0.8;
pub const BOMB_SPRITE_SCALE: f32 = 0.8;
pub const FLAME_SPRITE_SCALE: f32 = 0.9;

pub const MAX_HEALTH: i32 = 100;
pub const BOMB_DAMAGE: i32 = 25;

// Timings in seconds.
pub const BOMB_FUSE: f64 = 3.0;
pub const FLAME_FADE: f64 = 0.5;
pub const FLAME_ALPHA: f32 = 0.8;
pub const DAMAGE_FLASH: f64 = 0.2;
pub const CAMERA_SHAKE: f64 = 0.2;
pub const CAMERA_SHAKE_INTENSITY: f32 = 0.01;
pub const MOVE_TWEEN: f64 = 0.1;
pub const HIT_BLINK: f64 = 0.1;
pub const HIT_BLINK_REPEATS: u32 = 3;
pub const DEATH_FADE: f64 = 1.0;

/// Spawn tile of the local player.
pub const SPAWN_TILE: (i32, i32) = (1, 1);

/// Centre of a tile in board units.
pub fn tile_center(tile_x: i32, tile_y: i32) -> (f32, f32) {
    (tile_x as f32 + 0.5, tile_y as f32 + 0.5)
}

/// Tile containing a point given in board units.
pub fn tile_of(x: f32, y: f32) -> (i32, i32) {
    (x.floor() as i32, y.floor() as i32)
}
