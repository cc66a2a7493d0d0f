//! Renderable snapshot of the controls

use crate::{CustomMarker, SwitchView};
use reel_recorder::replay::PlayerState;
use std::fmt;

/// Width of the text timeline, in cells
const TEXT_TRACK_WIDTH: usize = 40;

/// A control that input can be routed to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlTarget {
    /// The timeline scrubber
    Track,
    PlayButton,
    /// Speed button by index into the configured options
    SpeedOption(usize),
    SkipSwitch,
    Notes,
    Fullscreen,
}

/// A speed option button
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedOptionView {
    pub speed: f64,
    pub label: String,
    pub active: bool,
    pub disabled: bool,
}

/// Everything a front end needs to draw the controls
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerView {
    pub visible: bool,
    pub current_time: String,
    pub total_time: String,
    /// CSS width of the played part of the track
    pub percentage: String,
    /// Played fraction in `[0, 1]`
    pub progress: f64,
    pub player_state: PlayerState,
    pub markers: Vec<CustomMarker>,
    pub speed_options: Vec<SpeedOptionView>,
    pub skip_switch: SwitchView,
}

impl ControllerView {
    /// Label of the play button
    pub fn play_label(&self) -> &'static str {
        match self.player_state {
            PlayerState::Playing => "pause",
            PlayerState::Paused => "play",
            PlayerState::Live => "live",
        }
    }
}

impl fmt::Display for ControllerView {
    /// One-line text rendering, e.g.
    /// `[play] 00:12 [=====>------] 01:40 | 1x* 2x 4x 8x | [x] skip inactive`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let played = ((self.progress.clamp(0.0, 1.0)) * TEXT_TRACK_WIDTH as f64).round() as usize;
        let mut track: Vec<char> = (0..TEXT_TRACK_WIDTH)
            .map(|cell| if cell < played { '=' } else { '-' })
            .collect();
        for marker in &self.markers {
            let percent: f64 = marker.position.trim_end_matches('%').parse().unwrap_or(0.0);
            let cell = ((percent / 100.0) * (TEXT_TRACK_WIDTH - 1) as f64).round() as usize;
            if let Some(slot) = track.get_mut(cell) {
                *slot = '|';
            }
        }
        let track: String = track.into_iter().collect();

        write!(
            f,
            "[{}] {} [{}] {} |",
            self.play_label(),
            self.current_time,
            track,
            self.total_time
        )?;
        for option in &self.speed_options {
            let marker = if option.active { "*" } else { "" };
            write!(f, " {}{}", option.label, marker)?;
        }
        let check = if self.skip_switch.checked { 'x' } else { ' ' };
        write!(f, " | [{}] {}", check, self.skip_switch.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(progress: f64) -> ControllerView {
        ControllerView {
            visible: true,
            current_time: "00:05".into(),
            total_time: "00:10".into(),
            percentage: format!("{}%", progress * 100.0),
            progress,
            player_state: PlayerState::Paused,
            markers: Vec::new(),
            speed_options: vec![
                SpeedOptionView {
                    speed: 1.0,
                    label: "1x".into(),
                    active: true,
                    disabled: false,
                },
                SpeedOptionView {
                    speed: 2.0,
                    label: "2x".into(),
                    active: false,
                    disabled: false,
                },
            ],
            skip_switch: SwitchView {
                id: "skip".into(),
                label: "skip inactive".into(),
                checked: true,
                disabled: false,
            },
        }
    }

    #[test]
    fn text_rendering() {
        let text = view(0.5).to_string();
        let expected_track = format!("{}{}", "=".repeat(20), "-".repeat(20));
        assert_eq!(
            text,
            format!("[play] 00:05 [{expected_track}] 00:10 | 1x* 2x | [x] skip inactive")
        );
    }

    #[test]
    fn markers_are_drawn_on_the_track() {
        let mut view = view(0.0);
        view.markers.push(CustomMarker {
            name: "end".into(),
            background: "red".into(),
            position: "100.00%".into(),
        });
        let text = view.to_string();
        assert!(text.contains(&format!("[{}|]", "-".repeat(TEXT_TRACK_WIDTH - 1))));
    }
}
