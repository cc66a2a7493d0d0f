//! Replay player for playing back recorded sessions.
//!
//! The replayer walks a recording against a [`VirtualClock`], applying
//! events as their offsets are reached, and tracks its playback and speed
//! states with state machines. Hosts drive it once per frame with
//! [`Replayer::advance`] or [`Replayer::update`].

use super::engine::{
    ConfigUpdate, PlayerState, ReplayEngine, ReplayerEvent, SharedEngine, SpeedState, StateChange,
};
use super::{VirtualClock, MAX_SPEED};
use crate::{RecordedEvent, Recording, RecordingError, ReplayMetadata};
use parking_lot::Mutex;
use reel_core::fsm::StateMachine;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Configuration for the replayer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayerConfig {
    /// Playback speed (1.0 = normal).
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Fast-forward through spans without user interaction.
    #[serde(default)]
    pub skip_inactive: bool,
    /// Upper bound for the fast-forward speed.
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// Gaps longer than this (scaled by speed) count as inactivity.
    #[serde(default = "default_inactive_threshold_ms")]
    pub inactive_threshold_ms: u64,
    /// Each interval of an inactive gap adds 1x to the skip speed.
    #[serde(default = "default_skip_interval_ms")]
    pub skip_interval_ms: u64,
}

fn default_speed() -> f64 {
    1.0
}

fn default_max_speed() -> f64 {
    MAX_SPEED
}

fn default_inactive_threshold_ms() -> u64 {
    10_000
}

fn default_skip_interval_ms() -> u64 {
    5_000
}

impl Default for ReplayerConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            skip_inactive: false,
            max_speed: default_max_speed(),
            inactive_threshold_ms: default_inactive_threshold_ms(),
            skip_interval_ms: default_skip_interval_ms(),
        }
    }
}

impl ReplayerConfig {
    /// Set the initial playback speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Enable or disable skipping inactivity.
    pub fn with_skip_inactive(mut self, skip_inactive: bool) -> Self {
        self.skip_inactive = skip_inactive;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PlayerCommand {
    Play,
    Pause,
    ToLive,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum SpeedCommand {
    FastForward,
    BackToNormal,
}

fn player_machine() -> StateMachine<PlayerState, PlayerCommand> {
    use PlayerCommand::*;
    use PlayerState::*;

    StateMachine::builder(Paused)
        .on(Paused, Play, Playing)
        .on(Playing, Play, Playing)
        .on(Playing, Pause, Paused)
        .on(Playing, End, Paused)
        .on(Paused, ToLive, Live)
        .on(Playing, ToLive, Live)
        .on(Live, Pause, Paused)
        .on(Live, Play, Playing)
        .build()
}

fn speed_machine() -> StateMachine<SpeedState, SpeedCommand> {
    use SpeedCommand::*;
    use SpeedState::*;

    StateMachine::builder(Normal)
        .on(Normal, FastForward, Skipping)
        .on(Skipping, BackToNormal, Normal)
        .build()
}

/// Replay engine for recorded sessions.
pub struct Replayer {
    /// The recording to replay.
    recording: Recording,
    /// Virtual clock for timing.
    clock: VirtualClock,
    /// Configuration.
    config: ReplayerConfig,
    player: StateMachine<PlayerState, PlayerCommand>,
    speed: StateMachine<SpeedState, SpeedCommand>,
    /// Index of next event to apply.
    next_event_index: usize,
    /// Offset of the user interaction that ends the current skip.
    skip_until: Option<u64>,
    subscribers: Vec<Sender<ReplayerEvent>>,
    log_version: u64,
}

impl Replayer {
    /// Create a paused replayer at the start of `recording`.
    pub fn new(recording: Recording, config: ReplayerConfig) -> Result<Self, RecordingError> {
        if recording.len() < 2 {
            return Err(RecordingError::TooFewEvents {
                found: recording.len(),
            });
        }

        let mut clock = VirtualClock::new(recording.metadata().total_time);
        clock.set_speed(config.speed);

        Ok(Self {
            recording,
            clock,
            config,
            player: player_machine(),
            speed: speed_machine(),
            next_event_index: 0,
            skip_until: None,
            subscribers: Vec::new(),
            log_version: 0,
        })
    }

    pub fn from_events(
        events: Vec<RecordedEvent>,
        config: ReplayerConfig,
    ) -> Result<Self, RecordingError> {
        Self::new(Recording::new(events), config)
    }

    /// Wrap the replayer in a handle shareable with controls.
    pub fn into_shared(self) -> SharedEngine<Self> {
        Arc::new(Mutex::new(self))
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    fn start_time(&self) -> u64 {
        self.recording.metadata().start_time
    }

    fn offset_of(&self, event: &RecordedEvent) -> u64 {
        event.timestamp.saturating_sub(self.start_time())
    }

    /// Index of the first event at or after `offset`.
    fn index_at(&self, offset: u64) -> usize {
        let start = self.start_time();
        self.recording
            .events()
            .partition_point(|e| e.timestamp.saturating_sub(start) < offset)
    }

    fn emit(&mut self, event: ReplayerEvent) {
        trace!(?event, subscribers = self.subscribers.len(), "replayer event");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn send_player(&mut self, command: PlayerCommand) {
        let before = self.player.current_state();
        if let Some(after) = self.player.send(command) {
            if after != before {
                debug!(from = %before, to = %after, "player state");
                self.emit(ReplayerEvent::StateChange(StateChange::Player(after)));
            }
        }
    }

    /// Follow the end of a session that is still being recorded.
    pub fn start_live(&mut self) {
        self.back_to_normal();
        self.clock.seek_to_end();
        self.next_event_index = self.recording.len();
        self.clock.play();
        self.send_player(PlayerCommand::ToLive);
    }

    /// Append an event to the log, keeping timestamp order.
    pub fn add_event(&mut self, event: RecordedEvent) {
        let index = self.recording.push(event);
        if index < self.next_event_index {
            self.next_event_index += 1;
        }
        self.clock.set_duration(self.recording.metadata().total_time);
        self.log_version += 1;
        trace!(index, version = self.log_version, "event added");
    }

    /// Advance playback by `elapsed` real time.
    ///
    /// Returns the events applied during this frame.
    pub fn advance(&mut self, elapsed: Duration) -> FrameUpdate {
        if !self.is_running() {
            return FrameUpdate::at(self.clock.position());
        }
        let reached_end = self.clock.tick(elapsed);
        self.after_clock(reached_end)
    }

    /// Advance playback by the wall time since the last frame.
    pub fn update(&mut self) -> FrameUpdate {
        if !self.is_running() {
            return FrameUpdate::at(self.clock.position());
        }
        let reached_end = self.clock.update();
        self.after_clock(reached_end)
    }

    fn is_running(&self) -> bool {
        self.player.is_in(PlayerState::Playing) || self.player.is_in(PlayerState::Live)
    }

    fn after_clock(&mut self, reached_end: bool) -> FrameUpdate {
        let position = self.clock.position();
        let events = self.apply_events_until(position);

        if self.player.is_in(PlayerState::Live) {
            // Live playback waits at the end for new events.
            if reached_end {
                self.clock.play();
            }
        } else if reached_end {
            self.finish();
        } else {
            self.check_inactivity(position);
        }

        FrameUpdate { position, events }
    }

    fn apply_events_until(&mut self, position: u64) -> Vec<RecordedEvent> {
        let mut applied = Vec::new();

        while let Some(event) = self.recording.events().get(self.next_event_index) {
            let offset = self.offset_of(event);
            if offset > position {
                break;
            }
            let event = event.clone();
            self.next_event_index += 1;

            if let Some(tag) = event.custom_tag() {
                self.emit(ReplayerEvent::CustomEvent {
                    tag: tag.to_string(),
                    offset,
                });
            }
            applied.push(event);
        }

        applied
    }

    fn check_inactivity(&mut self, position: u64) {
        if let Some(until) = self.skip_until {
            if position < until {
                return;
            }
            self.back_to_normal();
        }

        if !self.config.skip_inactive || !self.speed.is_in(SpeedState::Normal) {
            return;
        }

        let Some(next_interaction) = self.recording.events()[self.next_event_index..]
            .iter()
            .find(|e| e.is_user_interaction())
            .map(|e| self.offset_of(e))
        else {
            return;
        };

        let gap = next_interaction.saturating_sub(position) as f64;
        if gap <= self.config.inactive_threshold_ms as f64 * self.config.speed {
            return;
        }

        let interval = self.config.skip_interval_ms.max(1) as f64;
        let speed = (gap / interval).round().min(self.config.max_speed);
        debug!(position, until = next_interaction, speed, "skipping inactivity");

        self.skip_until = Some(next_interaction);
        self.clock.set_speed(speed);
        if self.speed.send(SpeedCommand::FastForward).is_some() {
            self.emit(ReplayerEvent::StateChange(StateChange::Speed(
                SpeedState::Skipping,
            )));
        }
        self.emit(ReplayerEvent::SkipStart { speed });
    }

    fn back_to_normal(&mut self) {
        self.skip_until = None;
        if self.speed.send(SpeedCommand::BackToNormal).is_some() {
            self.clock.set_speed(self.config.speed);
            debug!(speed = self.config.speed, "back to normal speed");
            self.emit(ReplayerEvent::StateChange(StateChange::Speed(
                SpeedState::Normal,
            )));
            self.emit(ReplayerEvent::SkipEnd);
        }
    }

    fn finish(&mut self) {
        self.back_to_normal();
        self.send_player(PlayerCommand::End);
        debug!(total = self.clock.duration(), "replay finished");
        self.emit(ReplayerEvent::Finish);
    }
}

impl ReplayEngine for Replayer {
    fn current_time(&self) -> u64 {
        self.clock.position()
    }

    fn metadata(&self) -> ReplayMetadata {
        self.recording.metadata()
    }

    fn player_state(&self) -> PlayerState {
        self.player.current_state()
    }

    fn speed_state(&self) -> SpeedState {
        self.speed.current_state()
    }

    fn config(&self) -> &ReplayerConfig {
        &self.config
    }

    fn play(&mut self, from: Option<u64>) {
        let offset = from.unwrap_or(0).min(self.clock.duration());
        debug!(offset, "play");

        self.back_to_normal();
        // Resuming at the clock position keeps the cursor; a restart always
        // rewinds, even when the clock already sits at 0.
        if from.is_none() || offset != self.clock.position() {
            self.next_event_index = self.index_at(offset);
        }
        self.clock.seek(offset);
        self.clock.play();
        self.send_player(PlayerCommand::Play);
    }

    fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        debug!(position = self.clock.position(), "pause");
        self.back_to_normal();
        self.clock.pause();
        self.send_player(PlayerCommand::Pause);
    }

    fn set_config(&mut self, update: ConfigUpdate) {
        if let Some(speed) = update.speed {
            debug!(speed, "speed changed");
            self.config.speed = speed;
            if self.speed.is_in(SpeedState::Normal) {
                self.clock.set_speed(speed);
            }
        }
        if let Some(skip_inactive) = update.skip_inactive {
            debug!(skip_inactive, "skip inactive changed");
            self.config.skip_inactive = skip_inactive;
            if !skip_inactive {
                self.back_to_normal();
            }
        }
    }

    fn events(&self) -> &[RecordedEvent] {
        self.recording.events()
    }

    fn log_version(&self) -> u64 {
        self.log_version
    }

    fn subscribe(&mut self) -> Receiver<ReplayerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }
}

/// Update returned by the replayer each frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    /// Playback offset after this frame.
    pub position: u64,
    /// Events applied in this frame.
    pub events: Vec<RecordedEvent>,
}

impl FrameUpdate {
    fn at(position: u64) -> Self {
        Self {
            position,
            events: Vec::new(),
        }
    }

    /// Check if this update has any events.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IncrementalSource;

    fn create_test_recording() -> Recording {
        Recording::new(vec![
            RecordedEvent::custom(1_000, "start"),
            RecordedEvent::incremental(1_100, IncrementalSource::MouseMove),
            RecordedEvent::custom(1_200, "middle"),
            RecordedEvent::incremental(2_000, IncrementalSource::Input),
        ])
    }

    fn drain(rx: &Receiver<ReplayerEvent>) -> Vec<ReplayerEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_replayer_creation() {
        let replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();

        assert_eq!(replayer.player_state(), PlayerState::Paused);
        assert_eq!(replayer.speed_state(), SpeedState::Normal);
        assert_eq!(replayer.current_time(), 0);
        assert_eq!(replayer.metadata().total_time, 1_000);
    }

    #[test]
    fn test_needs_two_events() {
        let err = Replayer::from_events(
            vec![RecordedEvent::custom(0, "only")],
            ReplayerConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, RecordingError::TooFewEvents { found: 1 }));
    }

    #[test]
    fn test_play_pause_notifications() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        let rx = replayer.subscribe();

        replayer.play(None);
        replayer.play(Some(0));
        replayer.pause();
        replayer.pause();

        assert_eq!(
            drain(&rx),
            vec![
                ReplayerEvent::StateChange(StateChange::Player(PlayerState::Playing)),
                ReplayerEvent::StateChange(StateChange::Player(PlayerState::Paused)),
            ]
        );
    }

    #[test]
    fn test_advance_applies_events_in_order() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        let rx = replayer.subscribe();
        replayer.play(None);
        drain(&rx);

        let frame = replayer.advance(Duration::from_millis(150));
        assert_eq!(frame.position, 150);
        assert_eq!(frame.events.len(), 2);
        assert_eq!(
            drain(&rx),
            vec![ReplayerEvent::CustomEvent {
                tag: "start".into(),
                offset: 0,
            }]
        );

        let frame = replayer.advance(Duration::from_millis(100));
        assert_eq!(frame.events[0].custom_tag(), Some("middle"));
    }

    #[test]
    fn test_paused_replayer_does_not_advance() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        let frame = replayer.advance(Duration::from_millis(500));
        assert!(!frame.has_events());
        assert_eq!(replayer.current_time(), 0);
    }

    #[test]
    fn test_finish() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        let rx = replayer.subscribe();
        replayer.play(Some(900));
        drain(&rx);

        let frame = replayer.advance(Duration::from_millis(500));
        assert_eq!(frame.position, 1_000);
        assert_eq!(frame.events.len(), 1);
        assert_eq!(replayer.player_state(), PlayerState::Paused);
        assert_eq!(
            drain(&rx),
            vec![
                ReplayerEvent::StateChange(StateChange::Player(PlayerState::Paused)),
                ReplayerEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_restart_of_zero_length_session_reapplies_events() {
        let mut replayer = Replayer::from_events(
            vec![RecordedEvent::custom(5, "a"), RecordedEvent::custom(5, "b")],
            ReplayerConfig::default(),
        )
        .unwrap();

        replayer.play(None);
        assert_eq!(replayer.advance(Duration::from_millis(16)).events.len(), 2);
        assert_eq!(replayer.player_state(), PlayerState::Paused);

        replayer.play(None);
        assert_eq!(replayer.advance(Duration::from_millis(16)).events.len(), 2);
    }

    #[test]
    fn test_seek_skips_earlier_events() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        replayer.play(Some(150));

        let frame = replayer.advance(Duration::from_millis(100));
        let tags: Vec<_> = frame.events.iter().filter_map(|e| e.custom_tag()).collect();
        assert_eq!(tags, vec!["middle"]);
    }

    #[test]
    fn test_resume_does_not_repeat_events() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        replayer.play(None);
        replayer.advance(Duration::from_millis(200));
        replayer.pause();

        let position = replayer.current_time();
        replayer.play(Some(position));
        let frame = replayer.advance(Duration::from_millis(10));
        assert!(!frame.has_events());
    }

    #[test]
    fn test_speed_config() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        replayer.set_config(ConfigUpdate::speed(4.0));
        replayer.play(None);

        replayer.advance(Duration::from_millis(100));
        assert_eq!(replayer.current_time(), 400);
        assert_eq!(replayer.config().speed, 4.0);
    }

    fn idle_recording() -> Recording {
        Recording::new(vec![
            RecordedEvent::incremental(0, IncrementalSource::MouseMove),
            RecordedEvent::incremental(60_000, IncrementalSource::MouseMove),
            RecordedEvent::custom(61_000, "done"),
        ])
    }

    #[test]
    fn test_skip_inactive() {
        let config = ReplayerConfig::default().with_skip_inactive(true);
        let mut replayer = Replayer::new(idle_recording(), config).unwrap();
        let rx = replayer.subscribe();
        replayer.play(None);
        drain(&rx);

        replayer.advance(Duration::from_millis(10));
        assert_eq!(replayer.speed_state(), SpeedState::Skipping);
        // 59_990ms gap / 5_000ms interval
        assert_eq!(replayer.clock().speed(), 12.0);
        assert_eq!(
            drain(&rx),
            vec![
                ReplayerEvent::StateChange(StateChange::Speed(SpeedState::Skipping)),
                ReplayerEvent::SkipStart { speed: 12.0 },
            ]
        );

        // 10 + 5_000 * 12 passes the next interaction at 60_000
        replayer.advance(Duration::from_millis(5_000));
        assert_eq!(replayer.speed_state(), SpeedState::Normal);
        assert_eq!(replayer.clock().speed(), 1.0);
        assert_eq!(
            drain(&rx),
            vec![
                ReplayerEvent::StateChange(StateChange::Speed(SpeedState::Normal)),
                ReplayerEvent::SkipEnd,
            ]
        );
    }

    #[test]
    fn test_disabling_skip_returns_to_normal() {
        let config = ReplayerConfig::default().with_skip_inactive(true);
        let mut replayer = Replayer::new(idle_recording(), config).unwrap();
        replayer.play(None);
        replayer.advance(Duration::from_millis(10));
        assert_eq!(replayer.speed_state(), SpeedState::Skipping);

        replayer.set_config(ConfigUpdate::skip_inactive(false));
        assert_eq!(replayer.speed_state(), SpeedState::Normal);
        assert_eq!(replayer.clock().speed(), 1.0);
    }

    #[test]
    fn test_short_gaps_are_not_skipped() {
        let config = ReplayerConfig::default().with_skip_inactive(true);
        let mut replayer = Replayer::new(create_test_recording(), config).unwrap();
        replayer.play(None);
        replayer.advance(Duration::from_millis(10));
        assert_eq!(replayer.speed_state(), SpeedState::Normal);
    }

    #[test]
    fn test_live_mode_follows_new_events() {
        let mut replayer = Replayer::new(create_test_recording(), ReplayerConfig::default()).unwrap();
        let rx = replayer.subscribe();

        replayer.start_live();
        assert_eq!(replayer.player_state(), PlayerState::Live);
        assert_eq!(replayer.current_time(), 1_000);
        assert_eq!(
            drain(&rx),
            vec![ReplayerEvent::StateChange(StateChange::Player(PlayerState::Live))]
        );

        let version = replayer.log_version();
        replayer.add_event(RecordedEvent::custom(2_500, "late"));
        assert_eq!(replayer.log_version(), version + 1);
        assert_eq!(replayer.metadata().total_time, 1_500);

        let frame = replayer.advance(Duration::from_millis(1_000));
        assert_eq!(frame.position, 1_500);
        assert_eq!(frame.events.len(), 1);
        assert_eq!(replayer.player_state(), PlayerState::Live);
        assert!(!drain(&rx).contains(&ReplayerEvent::Finish));
    }
}
