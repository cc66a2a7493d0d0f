//! Replay engine for recorded sessions.
//!
//! This module provides:
//! - `VirtualClock` - Deterministic time control for replay
//! - `Replayer` - Play back recorded sessions with time control
//! - `ReplayEngine` - The engine interface playback controls drive
//!
//! # Example
//!
//! ```ignore
//! use reel_recorder::replay::{Replayer, ReplayerConfig, ReplayEngine};
//! use std::time::Duration;
//!
//! let mut replayer = Replayer::new(recording, ReplayerConfig::default())?;
//! let notifications = replayer.subscribe();
//!
//! replayer.play(None);
//! while replayer.player_state() == PlayerState::Playing {
//!     let frame = replayer.advance(Duration::from_millis(16));
//!     for event in frame.events {
//!         // Apply event...
//!     }
//! }
//! ```

mod clock;
mod engine;
mod player;

pub use clock::{VirtualClock, MAX_SPEED, MIN_SPEED};
pub use engine::{
    ConfigUpdate, PlayerState, ReplayEngine, ReplayerEvent, SharedEngine, SpeedState, StateChange,
};
pub use player::{FrameUpdate, Replayer, ReplayerConfig};
