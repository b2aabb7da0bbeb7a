//! Mapping between board units and screen pixels

use crate::{BOARD_HEIGHT, BOARD_WIDTH};

/// Tiles of margin kept around the board on each axis (one per side).
const MARGIN_TILES: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub tile_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl BoardLayout {
    /// Largest square tile that fits the board plus margin, with the board
    /// centred in the viewport.
    pub fn fit(viewport_width: f32, viewport_height: f32) -> Self {
        let board_w = BOARD_WIDTH as f32;
        let board_h = BOARD_HEIGHT as f32;

        let tile_x = viewport_width / (board_w + MARGIN_TILES);
        let tile_y = viewport_height / (board_h + MARGIN_TILES);
        let tile_size = tile_x.min(tile_y).max(0.0);

        Self {
            viewport_width,
            viewport_height,
            tile_size,
            offset_x: (viewport_width - board_w * tile_size) / 2.0,
            offset_y: (viewport_height - board_h * tile_size) / 2.0,
        }
    }

    /// Returns true if the viewport changed and the layout was recomputed.
    pub fn resize(&mut self, viewport_width: f32, viewport_height: f32) -> bool {
        if self.viewport_width == viewport_width && self.viewport_height == viewport_height {
            return false;
        }
        *self = Self::fit(viewport_width, viewport_height);
        true
    }

    /// Board units to pixels.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.offset_x + x * self.tile_size,
            self.offset_y + y * self.tile_size,
        )
    }

    /// Pixel centre of a tile.
    pub fn tile_center(&self, tile_x: i32, tile_y: i32) -> (f32, f32) {
        self.to_screen(tile_x as f32 + 0.5, tile_y as f32 + 0.5)
    }

    /// Pixels to the tile underneath, which may lie outside the board.
    pub fn to_tile(&self, px: f32, py: f32) -> (i32, i32) {
        if self.tile_size <= 0.0 {
            return (0, 0);
        }
        (
            ((px - self.offset_x) / self.tile_size).floor() as i32,
            ((py - self.offset_y) / self.tile_size).floor() as i32,
        )
    }

    /// Side length in pixels of a sprite scaled to a fraction of a tile.
    pub fn sprite_size(&self, scale: f32) -> f32 {
        self.tile_size * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_fit_limited_by_height() {
        let layout = BoardLayout::fit(800.0, 600.0);
        // 800 / 15 = 53.3, 600 / 13 = 46.15
        assert_approx_eq!(layout.tile_size, 600.0 / 13.0, 0.001);
        assert_approx_eq!(layout.offset_y, (600.0 - 11.0 * layout.tile_size) / 2.0, 0.001);
        assert_approx_eq!(layout.offset_x, (800.0 - 13.0 * layout.tile_size) / 2.0, 0.001);
    }

    #[test]
    fn test_fit_limited_by_width() {
        let layout = BoardLayout::fit(300.0, 1000.0);
        assert_approx_eq!(layout.tile_size, 20.0, 0.001);
        assert_approx_eq!(layout.offset_x, 20.0, 0.001);
        assert_approx_eq!(layout.offset_y, (1000.0 - 220.0) / 2.0, 0.001);
    }

    #[test]
    fn test_tile_center_and_back() {
        let layout = BoardLayout::fit(750.0, 650.0);
        assert_approx_eq!(layout.tile_size, 50.0, 0.001);

        let (px, py) = layout.tile_center(3, 4);
        assert_approx_eq!(px, layout.offset_x + 175.0, 0.001);
        assert_approx_eq!(py, layout.offset_y + 225.0, 0.001);
        assert_eq!(layout.to_tile(px, py), (3, 4));
    }

    #[test]
    fn test_to_tile_outside_board() {
        let layout = BoardLayout::fit(750.0, 650.0);
        assert_eq!(layout.to_tile(0.0, 0.0), (-1, -1));
    }

    #[test]
    fn test_resize_only_when_changed() {
        let mut layout = BoardLayout::fit(800.0, 600.0);
        assert!(!layout.resize(800.0, 600.0));
        assert!(layout.resize(1024.0, 768.0));
        assert_eq!(layout, BoardLayout::fit(1024.0, 768.0));
    }

    #[test]
    fn test_zero_viewport_is_degenerate_not_nan() {
        let layout = BoardLayout::fit(0.0, 0.0);
        assert_eq!(layout.tile_size, 0.0);
        assert_eq!(layout.to_tile(10.0, 10.0), (0, 0));
    }
}
