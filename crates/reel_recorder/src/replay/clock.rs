//! Virtual clock for replay timing.
//!
//! Provides a controllable time source that can be paused, seeked,
//! and played at different speeds. Positions are milliseconds from the
//! start of the recording.

use std::time::{Duration, Instant};

/// Slowest supported playback speed.
pub const MIN_SPEED: f64 = 0.1;
/// Fastest supported playback speed, reached while skipping inactivity.
pub const MAX_SPEED: f64 = 360.0;

/// A virtual clock for controlling replay timing.
///
/// The clock advances either by explicit [`tick`](Self::tick) durations or
/// by wall time through [`update`](Self::update). It stops by itself once it
/// reaches the end of the recording.
#[derive(Debug)]
pub struct VirtualClock {
    /// Current position in milliseconds, kept fractional so fast speeds
    /// and short frames accumulate exactly.
    position: f64,
    /// Whether the clock is running.
    running: bool,
    /// Playback speed multiplier (1.0 = normal, 2.0 = 2x speed).
    speed: f64,
    /// Real-time instant when the clock was last advanced.
    last_update: Option<Instant>,
    /// Duration of the recording in milliseconds.
    duration: u64,
}

impl VirtualClock {
    /// Create a new clock for a recording of `duration` milliseconds.
    pub fn new(duration: u64) -> Self {
        Self {
            position: 0.0,
            running: false,
            speed: 1.0,
            last_update: None,
            duration,
        }
    }

    /// Current position in whole milliseconds.
    pub fn position(&self) -> u64 {
        self.position.floor() as u64
    }

    /// Total duration in milliseconds.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Change the duration, pulling the position back inside it.
    pub fn set_duration(&mut self, duration: u64) {
        self.duration = duration;
        self.position = self.position.min(duration as f64);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the playback speed, clamped to `[MIN_SPEED, MAX_SPEED]`.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        };
    }

    /// Start or resume the clock.
    pub fn play(&mut self) {
        if !self.running {
            self.running = true;
            self.last_update = Some(Instant::now());
        }
    }

    /// Pause the clock at its current position.
    pub fn pause(&mut self) {
        self.running = false;
        self.last_update = None;
    }

    /// Seek to a position, clamped to the duration.
    pub fn seek(&mut self, position: u64) {
        self.position = position.min(self.duration) as f64;
        self.last_update = self.running.then(Instant::now);
    }

    pub fn seek_to_end(&mut self) {
        self.seek(self.duration);
    }

    /// Advance the clock by `elapsed` real time, scaled by the speed.
    ///
    /// Returns true if the clock reached the end on this tick.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }

        let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
        self.position += elapsed_ms * self.speed;
        self.last_update = Some(Instant::now());

        if self.position >= self.duration as f64 {
            self.position = self.duration as f64;
            self.running = false;
            self.last_update = None;
            return true;
        }

        false
    }

    /// Advance the clock by the wall time since it was last advanced.
    ///
    /// Call this every frame when replaying in real time.
    pub fn update(&mut self) -> bool {
        match self.last_update {
            Some(last) if self.running => self.tick(last.elapsed()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = VirtualClock::new(1_000);
        assert!(!clock.is_running());
        assert_eq!(clock.position(), 0);
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn test_seek() {
        let mut clock = VirtualClock::new(1_000);

        clock.seek(500);
        assert_eq!(clock.position(), 500);

        // Seek beyond duration should clamp
        clock.seek(2_000);
        assert_eq!(clock.position(), 1_000);

        clock.seek_to_end();
        assert_eq!(clock.position(), 1_000);
    }

    #[test]
    fn test_tick_scales_by_speed() {
        let mut clock = VirtualClock::new(10_000);
        clock.play();

        assert!(!clock.tick(Duration::from_millis(100)));
        assert_eq!(clock.position(), 100);

        clock.set_speed(4.0);
        assert!(!clock.tick(Duration::from_millis(100)));
        assert_eq!(clock.position(), 500);
    }

    #[test]
    fn test_tick_stops_at_end() {
        let mut clock = VirtualClock::new(1_000);
        clock.play();

        assert!(clock.tick(Duration::from_millis(1_500)));
        assert_eq!(clock.position(), 1_000);
        assert!(!clock.is_running());

        // Stopped clocks ignore ticks
        assert!(!clock.tick(Duration::from_millis(10)));
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let mut clock = VirtualClock::new(1_000);
        assert!(!clock.tick(Duration::from_millis(100)));
        assert_eq!(clock.position(), 0);

        clock.play();
        clock.tick(Duration::from_millis(100));
        clock.pause();
        clock.tick(Duration::from_millis(100));
        assert_eq!(clock.position(), 100);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut clock = VirtualClock::new(1_000);

        clock.set_speed(2.0);
        assert_eq!(clock.speed(), 2.0);

        clock.set_speed(1_000.0);
        assert_eq!(clock.speed(), MAX_SPEED);

        clock.set_speed(0.01);
        assert_eq!(clock.speed(), MIN_SPEED);

        clock.set_speed(f64::NAN);
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn test_set_duration_clamps_position() {
        let mut clock = VirtualClock::new(1_000);
        clock.seek(800);
        clock.set_duration(500);
        assert_eq!(clock.position(), 500);
    }
}
