//! Reel Recorder
//!
//! Recorded sessions and the engine that replays them.
//!
//! - [`Recording`] - an ordered log of timestamped [`RecordedEvent`]s, loaded from JSON
//! - [`replay::Replayer`] - plays a recording back against a virtual clock
//! - [`replay::ReplayEngine`] - the engine surface playback controls talk to

pub mod error;
pub mod recording;
pub mod replay;

pub use error::RecordingError;
pub use recording::{EventKind, IncrementalSource, RecordedEvent, Recording, ReplayMetadata};
