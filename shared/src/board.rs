//! Tile grid mirrored from the server

use crate::{BOARD_HEIGHT, BOARD_WIDTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must be {expected_width}x{expected_height}, got {width}x{height}")]
    Dimensions {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    #[error("unknown tile code {code} at ({x}, {y})")]
    UnknownTile { code: u8, x: usize, y: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    /// Indestructible.
    Wall,
    /// Destroyed by explosions.
    Block,
}

impl Tile {
    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Wall => 1,
            Tile::Block => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Wall),
            2 => Some(Tile::Block),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        !matches!(self, Tile::Empty)
    }
}

/// A cell reached by a blast, with what occupied it before the blast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlastCell {
    pub x: i32,
    pub y: i32,
    pub tile: Option<Tile>,
}

const BLAST_OFFSETS: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Board of the given matrix rows, validated against the fixed dimensions.
    pub fn from_matrix(rows: &[Vec<u8>]) -> Result<Self, BoardError> {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        let ragged = rows.iter().any(|row| row.len() != width);

        if rows.len() != BOARD_HEIGHT || width != BOARD_WIDTH || ragged {
            return Err(BoardError::Dimensions {
                expected_width: BOARD_WIDTH,
                expected_height: BOARD_HEIGHT,
                width,
                height: rows.len(),
            });
        }

        let mut tiles = Vec::with_capacity(BOARD_WIDTH * BOARD_HEIGHT);
        for (y, row) in rows.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let tile = Tile::from_code(code).ok_or(BoardError::UnknownTile { code, x, y })?;
                tiles.push(tile);
            }
        }

        Ok(Self { tiles })
    }

    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.tiles
            .chunks(BOARD_WIDTH)
            .map(|row| row.iter().map(|tile| tile.code()).collect())
            .collect()
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= BOARD_WIDTH || y as usize >= BOARD_HEIGHT {
            return None;
        }
        Some(y as usize * BOARD_WIDTH + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        Self::index(x, y).map(|i| self.tiles[i])
    }

    /// Off-board cells count as solid.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(true, Tile::is_solid)
    }

    /// Clears a destructible block. Returns false for anything else.
    pub fn destroy_block(&mut self, x: i32, y: i32) -> bool {
        match Self::index(x, y) {
            Some(i) if self.tiles[i] == Tile::Block => {
                self.tiles[i] = Tile::Empty;
                true
            }
            _ => false,
        }
    }

    /// Cells covered by a blast centred on `(x, y)`: the centre and its four
    /// orthogonal neighbours.
    pub fn blast_cells(&self, x: i32, y: i32) -> Vec<BlastCell> {
        BLAST_OFFSETS
            .iter()
            .map(|(dx, dy)| BlastCell {
                x: x + dx,
                y: y + dy,
                tile: self.get(x + dx, y + dy),
            })
            .collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(i, tile)| {
            (
                (i % BOARD_WIDTH) as i32,
                (i / BOARD_WIDTH) as i32,
                *tile,
            )
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        let mut tiles = Vec::with_capacity(BOARD_WIDTH * BOARD_HEIGHT);
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                let ring = x == 0 || y == 0 || x == BOARD_WIDTH - 1 || y == BOARD_HEIGHT - 1;
                let pillar = x % 2 == 0 && y % 2 == 0;
                let tile = if ring {
                    Tile::Wall
                } else if y == 2 && (x == 2 || x == 4) {
                    Tile::Block
                } else if pillar {
                    Tile::Wall
                } else {
                    Tile::Empty
                };
                tiles.push(tile);
            }
        }
        Self { tiles }
    }
}

impl TryFrom<Vec<Vec<u8>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Board::from_matrix(&rows)
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board.to_matrix()
    }
}
