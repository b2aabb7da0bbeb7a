//! # Bomber Client Library
//!
//! Client for a real-time multiplayer Bomberman-style game. The game server
//! owns every rule: movement validation, bomb timers, explosion propagation,
//! damage and win conditions. This crate renders the room browser, the lobby
//! and the board, forwards player input, and mirrors the state the server
//! pushes back.
//!
//! ## Architecture Overview
//!
//! ### Optimistic Mirroring
//! The local player moves and places bombs immediately. Movement is reported
//! to the server as it happens and the local bomb fuse reports its own
//! detonation. Authoritative events (player snapshots, explosions, health,
//! deaths) are applied on arrival and win over local guesses: a snapshot that
//! puts the local player far from its predicted position snaps it back.
//!
//! ### Engine-Independent Scene
//! [`game::GameScene`] takes frame input and a clock and returns the events to
//! emit. Rendering only reads it, so the whole mirror is testable without a
//! window.
//!
//! ### Threaded Transport
//! Each [`network::Connection`] owns a socket thread running a tokio runtime.
//! The render loop drains it once per frame and never blocks on the network.
//!
//! ## Module Organization
//!
//! - `app`: frame loop tying sockets, keys and drawing to the session
//! - `game`: board mirror, local prediction, remote tweens, bombs and flames
//! - `input`: keyboard sampling and edge detection
//! - `lobby`: character selection and ready flags for one room
//! - `network`: WebSocket transport and connection lifecycle
//! - `rendering`: macroquad drawing of every screen
//! - `rooms`: room browser backed by the room server
//! - `session`: screen state machine (rooms, lobby, game) and event routing

pub mod app;
pub mod error;
pub mod game;
pub mod input;
pub mod lobby;
pub mod network;
pub mod rendering;
pub mod rooms;
pub mod session;

pub use error::{ClientError, Result};
