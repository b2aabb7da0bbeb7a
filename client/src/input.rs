//! Keyboard sampling with edge detection for one-shot keys

use macroquad::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit step in board units.
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }
}

/// Gameplay input sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// True only on the frame Space went down.
    pub place_bomb: bool,
}

impl FrameInput {
    /// One axis at a time, left > right > up > down.
    pub fn direction(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// Menu and control keys, all edge-triggered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuInput {
    pub up: bool,
    pub down: bool,
    pub confirm: bool,
    pub leave: bool,
    pub ready: bool,
    pub back: bool,
    /// Index into the character catalog for keys 1-4.
    pub character: Option<usize>,
    pub toggle_debug: bool,
}

/// Reports a key once per press
#[derive(Debug)]
pub struct EdgeDetector<K> {
    held: HashSet<K>,
}

impl<K: Copy + Eq + std::hash::Hash> EdgeDetector<K> {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
        }
    }

    /// Returns true on the transition from up to down.
    pub fn pressed(&mut self, key: K, down: bool) -> bool {
        if down {
            self.held.insert(key)
        } else {
            self.held.remove(&key);
            false
        }
    }
}

pub struct InputManager {
    edges: EdgeDetector<KeyCode>,
}

const CHARACTER_KEYS: [KeyCode; 4] = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4];

impl InputManager {
    pub fn new() -> Self {
        Self {
            edges: EdgeDetector::new(),
        }
    }

    fn pressed(&mut self, key: KeyCode) -> bool {
        self.edges.pressed(key, is_key_down(key))
    }

    /// Samples movement (arrows or WASD) and the bomb key.
    pub fn game(&mut self) -> FrameInput {
        FrameInput {
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            place_bomb: self.pressed(KeyCode::Space),
        }
    }

    pub fn menu(&mut self) -> MenuInput {
        let mut character = None;
        for (i, key) in CHARACTER_KEYS.iter().enumerate() {
            if self.pressed(*key) {
                character = Some(i);
            }
        }

        MenuInput {
            up: self.pressed(KeyCode::Up),
            down: self.pressed(KeyCode::Down),
            confirm: self.pressed(KeyCode::Enter),
            leave: self.pressed(KeyCode::L),
            ready: self.pressed(KeyCode::R),
            back: self.pressed(KeyCode::Escape),
            character,
            toggle_debug: self.pressed(KeyCode::F3),
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_priority() {
        let all = FrameInput {
            left: true,
            right: true,
            up: true,
            down: true,
            place_bomb: false,
        };
        assert_eq!(all.direction(), Some(Direction::Left));

        let right_up = FrameInput {
            right: true,
            up: true,
            ..FrameInput::default()
        };
        assert_eq!(right_up.direction(), Some(Direction::Right));

        let up_down = FrameInput {
            up: true,
            down: true,
            ..FrameInput::default()
        };
        assert_eq!(up_down.direction(), Some(Direction::Up));
        assert_eq!(FrameInput::default().direction(), None);
    }

    #[test]
    fn test_edge_detector_fires_once_per_press() {
        let mut edges = EdgeDetector::new();
        assert!(edges.pressed('x', true));
        assert!(!edges.pressed('x', true));
        assert!(!edges.pressed('x', false));
        assert!(edges.pressed('x', true));
    }

    #[test]
    fn test_edge_detector_keys_independent() {
        let mut edges = EdgeDetector::new();
        assert!(edges.pressed(1, true));
        assert!(edges.pressed(2, true));
        assert!(!edges.pressed(1, true));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0.0, -1.0));
        assert_eq!(Direction::Right.delta(), (1.0, 0.0));
    }
}
