//! Playback controller
//!
//! Mirrors the engine's playback state, current time and event log into
//! local UI state and turns control input into engine calls. The engine
//! stays authoritative: player and speed states only change here when the
//! engine reports a change.
//!
//! The controller is frame-driven. Hosts advance the engine and then call
//! [`Controller::tick`] once per display frame; while playing, a frame
//! request polls the engine's current time on every tick.

use crate::markers::compute_markers;
use crate::time_format::{format_speed, format_time};
use crate::view::{ControlTarget, ControllerView, SpeedOptionView};
use crate::{ControllerConfig, CustomMarker, Switch};
use reel_animation::{FrameRequestId, FrameScheduler};
use reel_core::{Emitter, InputEvent, KeyCode, ListenerId, Rect};
use reel_recorder::replay::{
    ConfigUpdate, PlayerState, ReplayEngine, ReplayerEvent, SharedEngine, SpeedState,
};
use reel_recorder::ReplayMetadata;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Notifications sent to the host embedding the controls
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    CurrentTime(u64),
    PlayerState(PlayerState),
    /// Played fraction in `[0, 1]`
    Progress(f64),
    MakeNotes,
    Fullscreen,
}

/// Played fraction of a session; zero-length sessions report 0.
fn progress_fraction(current_time: u64, total_time: u64) -> f64 {
    if total_time == 0 {
        return 0.0;
    }
    (current_time as f64 / total_time as f64).min(1.0)
}

pub struct Controller<E: ReplayEngine> {
    engine: SharedEngine<E>,
    notifications: Receiver<ReplayerEvent>,
    frames: FrameScheduler,
    timer: Option<FrameRequestId>,
    config: ControllerConfig,
    meta: ReplayMetadata,
    log_version: u64,
    markers: Vec<CustomMarker>,

    current_time: u64,
    player_state: PlayerState,
    speed_state: SpeedState,
    finished: bool,
    percentage: String,
    progress: f64,
    speed: f64,
    skip_inactive: bool,
    skip_switch: Switch,
    track: Rect,

    listeners: Emitter<ControllerEvent>,
    destroyed: bool,
}

impl<E: ReplayEngine> Controller<E> {
    /// Attach controls to an engine.
    ///
    /// Reads the engine's current states and event log, subscribes to its
    /// notifications and starts playback when `auto_play` is set.
    pub fn mount(engine: SharedEngine<E>, config: ControllerConfig) -> Self {
        let (
            notifications,
            meta,
            log_version,
            markers,
            player_state,
            speed_state,
            engine_speed,
            current_time,
        ) = {
            let mut guard = engine.lock();
            (
                guard.subscribe(),
                guard.metadata(),
                guard.log_version(),
                compute_markers(guard.events(), &config.tags),
                guard.player_state(),
                guard.speed_state(),
                guard.config().speed,
                guard.current_time(),
            )
        };
        let progress = progress_fraction(current_time, meta.total_time);

        let speed = config.initial_speed();
        let skip_inactive = config.skip_inactive;
        let skip_switch = Switch::new("skip", "skip inactive")
            .checked(skip_inactive)
            .disabled(speed_state == SpeedState::Skipping);
        let auto_play = config.auto_play;

        let mut controller = Self {
            engine,
            notifications,
            frames: FrameScheduler::new(),
            timer: None,
            config,
            meta,
            log_version,
            markers,
            current_time,
            player_state,
            speed_state,
            finished: false,
            percentage: format!("{}%", progress * 100.0),
            progress,
            speed,
            skip_inactive,
            skip_switch,
            track: Rect::default(),
            listeners: Emitter::new(),
            destroyed: false,
        };
        debug!(
            total = meta.total_time,
            state = %player_state,
            markers = controller.markers.len(),
            "controller mounted"
        );

        if engine_speed != speed {
            controller.with_engine(|engine| engine.set_config(ConfigUpdate::speed(speed)));
        }
        if controller.player_state == PlayerState::Playing {
            controller.loop_timer();
        }
        if auto_play {
            controller.with_engine(|engine| engine.play(None));
        }

        controller
    }

    /// Run an engine call, then deliver the notifications it produced.
    fn with_engine<R>(&mut self, f: impl FnOnce(&mut E) -> R) -> R {
        let result = f(&mut *self.engine.lock());
        self.sync();
        result
    }

    /// Apply every pending engine notification.
    pub fn sync(&mut self) {
        while let Ok(event) = self.notifications.try_recv() {
            self.handle_engine_event(event);
        }
    }

    fn handle_engine_event(&mut self, event: ReplayerEvent) {
        match event {
            ReplayerEvent::StateChange(change) => {
                if let Some(player) = change.player() {
                    if player != self.player_state {
                        debug!(from = %self.player_state, to = %player, "player state changed");
                        self.player_state = player;
                        self.notify(ControllerEvent::PlayerState(player));
                        match player {
                            PlayerState::Playing => self.loop_timer(),
                            PlayerState::Paused => self.stop_timer(),
                            PlayerState::Live => {}
                        }
                    }
                }
                if let Some(speed) = change.speed() {
                    if speed != self.speed_state {
                        debug!(from = %self.speed_state, to = %speed, "speed state changed");
                        self.speed_state = speed;
                        self.skip_switch
                            .set_disabled(speed == SpeedState::Skipping);
                    }
                }
            }
            ReplayerEvent::Finish => {
                debug!("playback finished");
                self.finished = true;
            }
            other => trace!(event = ?other, "engine event"),
        }
    }

    fn notify(&mut self, event: ControllerEvent) {
        self.listeners.emit(&event);
    }

    /// Register a listener for controller notifications.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ControllerEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn loop_timer(&mut self) {
        self.stop_timer();
        self.timer = Some(self.frames.request_frame());
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.frames.cancel_frame(timer);
        }
    }

    /// Frame rate the host is expected to call [`tick`](Self::tick) at.
    pub fn set_target_fps(&mut self, fps: u32) {
        self.frames.set_target_fps(fps);
    }

    pub fn frame_interval(&self) -> Duration {
        self.frames.frame_interval()
    }

    /// Whether a frame request is polling the engine.
    pub fn is_timer_active(&self) -> bool {
        self.timer.is_some_and(|timer| self.frames.is_pending(timer))
    }

    /// Advance the controls by one display frame.
    pub fn tick(&mut self) {
        if self.destroyed {
            return;
        }

        let frame = self.frames.begin_frame();
        if let Some(timer) = self.timer {
            if frame.fired(timer) {
                self.timer = None;
                self.poll_current_time();
            }
        }

        self.sync();
        self.after_update();
    }

    fn poll_current_time(&mut self) {
        let now = self.engine.lock().current_time();
        self.set_current_time(now);
        if self.current_time < self.meta.total_time {
            self.timer = Some(self.frames.request_frame());
        } else {
            trace!(now, "timer reached the end");
        }
    }

    /// Push pending UI configuration to the engine and pick up log changes.
    ///
    /// Runs at the end of every [`tick`](Self::tick).
    pub fn after_update(&mut self) {
        let (engine_skip_inactive, log_version) = {
            let engine = self.engine.lock();
            (engine.config().skip_inactive, engine.log_version())
        };

        if self.skip_inactive != engine_skip_inactive {
            let skip_inactive = self.skip_inactive;
            debug!(skip_inactive, "applying skip inactive");
            self.with_engine(|engine| engine.set_config(ConfigUpdate::skip_inactive(skip_inactive)));
        }

        if log_version != self.log_version {
            self.refresh_log();
        }
    }

    fn refresh_log(&mut self) {
        let (meta, log_version, markers) = {
            let engine = self.engine.lock();
            (
                engine.metadata(),
                engine.log_version(),
                compute_markers(engine.events(), &self.config.tags),
            )
        };
        trace!(log_version, markers = markers.len(), "event log changed");

        self.log_version = log_version;
        self.markers = markers;
        if meta != self.meta {
            self.meta = meta;
            self.recompute_progress();
        }
    }

    fn set_current_time(&mut self, current_time: u64) {
        if current_time == self.current_time {
            return;
        }
        self.current_time = current_time;
        self.notify(ControllerEvent::CurrentTime(current_time));
        self.recompute_progress();
    }

    fn recompute_progress(&mut self) {
        self.progress = progress_fraction(self.current_time, self.meta.total_time);
        self.percentage = format!("{}%", self.progress * 100.0);
        self.notify(ControllerEvent::Progress(self.progress));
    }

    /// Pause when playing, play when paused; ignored in any other state.
    pub fn toggle(&mut self) {
        match self.player_state {
            PlayerState::Playing => self.pause(),
            PlayerState::Paused => self.play(),
            PlayerState::Live => debug!("toggle ignored while live"),
        }
    }

    /// Resume playback. Only effective while paused; a finished replay
    /// starts over from the beginning.
    pub fn play(&mut self) {
        if self.player_state != PlayerState::Paused {
            return;
        }
        if self.finished {
            debug!("restarting finished replay");
            self.with_engine(|engine| engine.play(None));
            self.finished = false;
        } else {
            let from = self.current_time;
            self.with_engine(|engine| engine.play(Some(from)));
        }
    }

    /// Pause playback. Only effective while playing.
    pub fn pause(&mut self) {
        if self.player_state != PlayerState::Playing {
            return;
        }
        self.with_engine(|engine| engine.pause());
    }

    /// Jump to `offset` milliseconds, keeping the play/pause status.
    ///
    /// The offset is not clamped. The engine is briefly played at the
    /// offset so its frame state matches, then paused again if it was not
    /// playing before. Ignored while live.
    pub fn goto(&mut self, offset: u64) {
        if self.player_state == PlayerState::Live {
            debug!(offset, "goto ignored while live");
            return;
        }
        debug!(offset, "goto");
        self.set_current_time(offset);
        self.finished = false;

        let was_playing = self.player_state == PlayerState::Playing;
        self.with_engine(|engine| engine.pause());
        self.with_engine(|engine| engine.play(Some(offset)));
        if !was_playing {
            self.with_engine(|engine| engine.pause());
        }
    }

    /// Change the playback speed, resuming from the same offset if playing.
    pub fn set_speed(&mut self, speed: f64) {
        let need_freeze = self.player_state == PlayerState::Playing;
        debug!(speed, need_freeze, "set speed");
        self.speed = speed;

        if need_freeze {
            self.with_engine(|engine| engine.pause());
        }
        self.with_engine(|engine| engine.set_config(ConfigUpdate::speed(speed)));
        if need_freeze {
            let from = self.current_time;
            self.with_engine(|engine| engine.play(Some(from)));
        }
    }

    /// Flip skip-inactive; the engine picks it up on the next update pass.
    pub fn toggle_skip_inactive(&mut self) {
        self.skip_inactive = !self.skip_inactive;
        self.skip_switch.set_checked(self.skip_inactive);
        debug!(skip_inactive = self.skip_inactive, "skip inactive toggled");
    }

    pub fn request_notes(&mut self) {
        self.notify(ControllerEvent::MakeNotes);
    }

    pub fn request_fullscreen(&mut self) {
        self.notify(ControllerEvent::Fullscreen);
    }

    /// Bounds of the timeline track, used to map clicks to offsets.
    pub fn set_track_bounds(&mut self, bounds: Rect) {
        self.track = bounds;
    }

    pub fn track_bounds(&self) -> Rect {
        self.track
    }

    /// Seek to the offset under a click at `x` on the track.
    ///
    /// Returns whether a seek happened. Clicks are ignored while live or
    /// skipping inactivity, on a zero-width track and on a zero-length
    /// session.
    pub fn handle_progress_click(&mut self, x: f32) -> bool {
        if self.player_state == PlayerState::Live {
            debug!("track click ignored while live");
            return false;
        }
        if self.speed_state == SpeedState::Skipping {
            debug!("track click ignored while skipping");
            return false;
        }
        if self.meta.total_time == 0 {
            debug!("track click ignored on a zero-length session");
            return false;
        }
        let Some(fraction) = self.track.fraction_x(x) else {
            warn!(bounds = ?self.track, x, "track click outside usable bounds");
            return false;
        };

        let offset = (self.meta.total_time as f64 * f64::from(fraction)).round() as u64;
        self.goto(offset);
        true
    }

    /// Route an input event to a control.
    pub fn handle_event(&mut self, target: ControlTarget, event: &InputEvent) {
        match (target, event) {
            (_, InputEvent::KeyDown(key)) if key.key == KeyCode::SPACE && !key.repeat => {
                self.toggle();
            }
            (ControlTarget::Track, InputEvent::Click(pointer)) => {
                self.handle_progress_click(pointer.x);
            }
            (ControlTarget::PlayButton, InputEvent::Click(_)) => self.toggle(),
            (ControlTarget::SpeedOption(index), InputEvent::Click(_)) => {
                if self.speed_state == SpeedState::Skipping {
                    return;
                }
                if let Some(&speed) = self.config.speed_options.get(index) {
                    self.set_speed(speed);
                }
            }
            (ControlTarget::SkipSwitch, InputEvent::Click(_)) => {
                if !self.skip_switch.is_disabled() {
                    self.toggle_skip_inactive();
                }
            }
            (ControlTarget::Notes, InputEvent::Click(_)) => self.request_notes(),
            (ControlTarget::Fullscreen, InputEvent::Click(_)) => self.request_fullscreen(),
            _ => {}
        }
    }

    /// Pause the engine and stop polling. Safe to call more than once;
    /// also runs on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.stop_timer();
        self.engine.lock().pause();
        debug!("controller destroyed");
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub fn speed_state(&self) -> SpeedState {
        self.speed_state
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn skip_inactive(&self) -> bool {
        self.skip_inactive
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Played share of the session as a CSS percentage
    pub fn percentage(&self) -> &str {
        &self.percentage
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn custom_markers(&self) -> &[CustomMarker] {
        &self.markers
    }

    pub fn metadata(&self) -> ReplayMetadata {
        self.meta
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn skip_switch(&self) -> &Switch {
        &self.skip_switch
    }

    pub fn view(&self) -> ControllerView {
        let skipping = self.speed_state == SpeedState::Skipping;
        ControllerView {
            visible: self.config.show_controller,
            current_time: format_time(self.current_time),
            total_time: format_time(self.meta.total_time),
            percentage: self.percentage.clone(),
            progress: self.progress,
            player_state: self.player_state,
            markers: self.markers.clone(),
            speed_options: self
                .config
                .speed_options
                .iter()
                .map(|&speed| SpeedOptionView {
                    speed,
                    label: format_speed(speed),
                    active: speed == self.speed,
                    disabled: skipping,
                })
                .collect(),
            skip_switch: self.skip_switch.view(),
        }
    }
}

impl<E: ReplayEngine> Drop for Controller<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}
