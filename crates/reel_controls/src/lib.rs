//! Reel Controls
//!
//! Playback controls for a session replay: play/pause, speed options, a
//! timeline scrubber with custom-event markers and a skip-inactive switch,
//! kept in sync with a [`ReplayEngine`](reel_recorder::replay::ReplayEngine).
//!
//! # Example
//!
//! ```ignore
//! use reel_controls::{Controller, ControllerConfig};
//! use reel_recorder::replay::{Replayer, ReplayerConfig};
//!
//! let engine = Replayer::new(recording, ReplayerConfig::default())?.into_shared();
//! let mut controls = Controller::mount(engine.clone(), ControllerConfig::default());
//!
//! // Once per display frame:
//! engine.lock().update();
//! controls.tick();
//! println!("{}", controls.view());
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod markers;
pub mod switch;
pub mod time_format;
pub mod view;

pub use config::ControllerConfig;
pub use controller::{Controller, ControllerEvent};
pub use error::ControlsError;
pub use markers::{compute_markers, CustomMarker, DEFAULT_MARKER_COLOR};
pub use switch::{Switch, SwitchView};
pub use time_format::format_time;
pub use view::{ControlTarget, ControllerView, SpeedOptionView};
