//! Custom-event markers on the timeline
//!
//! Every custom event in the log becomes a marker placed at its share of
//! the span between the first and the last event.

use reel_recorder::RecordedEvent;
use rustc_hash::FxHashMap;

/// Marker color for tags without a configured color
pub const DEFAULT_MARKER_COLOR: &str = "rgb(73,80,246)";

/// A custom event projected onto the timeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomMarker {
    /// The custom event's tag
    pub name: String,
    /// CSS color of the marker
    pub background: String,
    /// Horizontal position, e.g. `"42.50%"`
    pub position: String,
}

/// Position of `timestamp` between `start` and `end`, in percent.
///
/// Zero-length spans put everything at 0. The result is clamped to
/// `[0, 100]`.
pub fn marker_position(start: u64, end: u64, timestamp: u64) -> f64 {
    if end <= start {
        return 0.0;
    }
    let span = (end - start) as f64;
    let remaining = end as f64 - timestamp as f64;
    let position = 100.0 - (remaining / span) * 100.0;

    if position <= 0.0 {
        0.0
    } else {
        position.min(100.0)
    }
}

/// Markers for every custom event in `events`, in log order.
pub fn compute_markers(
    events: &[RecordedEvent],
    tags: &FxHashMap<String, String>,
) -> Vec<CustomMarker> {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Vec::new();
    };
    let (start, end) = (first.timestamp, last.timestamp);

    events
        .iter()
        .filter_map(|event| {
            let tag = event.custom_tag()?;
            Some(CustomMarker {
                name: tag.to_string(),
                background: tags
                    .get(tag)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_MARKER_COLOR.to_string()),
                position: format!("{:.2}%", marker_position(start, end, event.timestamp)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_recorder::EventKind;

    fn tags(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(tag, color)| (tag.to_string(), color.to_string()))
            .collect()
    }

    #[test]
    fn markers_at_both_ends() {
        let events = vec![
            RecordedEvent::custom(0, "A"),
            RecordedEvent::new(500, EventKind::FullSnapshot),
            RecordedEvent::custom(1_000, "B"),
        ];

        let markers = compute_markers(&events, &tags(&[("A", "red")]));
        assert_eq!(
            markers,
            vec![
                CustomMarker {
                    name: "A".into(),
                    background: "red".into(),
                    position: "0.00%".into(),
                },
                CustomMarker {
                    name: "B".into(),
                    background: DEFAULT_MARKER_COLOR.into(),
                    position: "100.00%".into(),
                },
            ]
        );
    }

    #[test]
    fn positions_are_proportional() {
        let events = vec![
            RecordedEvent::new(1_000, EventKind::Load),
            RecordedEvent::custom(2_000, "third"),
            RecordedEvent::custom(2_500, "half"),
            RecordedEvent::new(4_000, EventKind::Load),
        ];

        let positions: Vec<String> = compute_markers(&events, &FxHashMap::default())
            .into_iter()
            .map(|m| m.position)
            .collect();
        assert_eq!(positions, vec!["33.33%", "50.00%"]);
    }

    #[test]
    fn zero_length_session_puts_markers_at_start() {
        let events = vec![RecordedEvent::custom(7, "a"), RecordedEvent::custom(7, "b")];
        let markers = compute_markers(&events, &FxHashMap::default());
        assert!(markers.iter().all(|m| m.position == "0.00%"));
        assert_eq!(markers.len(), 2);
    }

    #[test]
    fn empty_log_has_no_markers() {
        assert!(compute_markers(&[], &FxHashMap::default()).is_empty());
    }

    #[test]
    fn positions_never_decrease() {
        let events: Vec<RecordedEvent> = (0..50)
            .map(|i| RecordedEvent::custom(i * i * 37, format!("m{i}")))
            .collect();
        let start = events[0].timestamp;
        let end = events[events.len() - 1].timestamp;

        let positions: Vec<f64> = events
            .iter()
            .map(|e| marker_position(start, end, e.timestamp))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert!(positions.iter().all(|p| (0.0..=100.0).contains(p)));
    }
}
