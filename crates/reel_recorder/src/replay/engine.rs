//! The engine surface consumed by playback controls.

use super::ReplayerConfig;
use crate::{RecordedEvent, ReplayMetadata};
use parking_lot::Mutex;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Engine handle shared between the host and the controls.
pub type SharedEngine<E> = Arc<Mutex<E>>;

/// Playback state of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Playing,
    Paused,
    /// Following a session that is still being recorded.
    Live,
}

impl PlayerState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Live => "live",
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the engine is fast-forwarding through inactivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeedState {
    Normal,
    Skipping,
}

impl SpeedState {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeedState::Normal => "normal",
            SpeedState::Skipping => "skipping",
        }
    }
}

impl fmt::Display for SpeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which engine states changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChange {
    Player(PlayerState),
    Speed(SpeedState),
    Both {
        player: PlayerState,
        speed: SpeedState,
    },
}

impl StateChange {
    pub fn player(&self) -> Option<PlayerState> {
        match *self {
            StateChange::Player(player) | StateChange::Both { player, .. } => Some(player),
            StateChange::Speed(_) => None,
        }
    }

    pub fn speed(&self) -> Option<SpeedState> {
        match *self {
            StateChange::Speed(speed) | StateChange::Both { speed, .. } => Some(speed),
            StateChange::Player(_) => None,
        }
    }
}

/// Notifications emitted by an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplayerEvent {
    StateChange(StateChange),
    /// Playback reached the end of the recording.
    Finish,
    /// Fast-forwarding through inactivity started at `speed`.
    SkipStart { speed: f64 },
    SkipEnd,
    /// A custom event was applied.
    CustomEvent { tag: String, offset: u64 },
}

/// Partial configuration update; `None` fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConfigUpdate {
    pub speed: Option<f64>,
    pub skip_inactive: Option<bool>,
}

impl ConfigUpdate {
    pub fn speed(speed: f64) -> Self {
        Self {
            speed: Some(speed),
            ..Self::default()
        }
    }

    pub fn skip_inactive(skip_inactive: bool) -> Self {
        Self {
            skip_inactive: Some(skip_inactive),
            ..Self::default()
        }
    }
}

/// Playback control and inspection of a replay engine.
///
/// Notifications are delivered through channels handed out by
/// [`subscribe`](Self::subscribe) and are sent from inside the call that
/// caused them, so draining a receiver right after a call observes them in
/// order.
pub trait ReplayEngine {
    /// Current playback offset in milliseconds.
    fn current_time(&self) -> u64;

    fn metadata(&self) -> ReplayMetadata;

    fn player_state(&self) -> PlayerState;

    fn speed_state(&self) -> SpeedState;

    fn config(&self) -> &ReplayerConfig;

    /// Start playing from `from` milliseconds, or from the beginning.
    fn play(&mut self, from: Option<u64>);

    fn pause(&mut self);

    fn set_config(&mut self, update: ConfigUpdate);

    /// The event log, ordered by timestamp.
    fn events(&self) -> &[RecordedEvent];

    /// Changes whenever the event log is replaced or appended to.
    fn log_version(&self) -> u64;

    fn subscribe(&mut self) -> Receiver<ReplayerEvent>;
}
