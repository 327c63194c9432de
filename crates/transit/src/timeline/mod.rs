//! Trip timeline engine.
//!
//! Everything in here is pure: a schedule plus "now" (minutes since midnight
//! in the display zone) goes in, a position, an ETA and a rail layout come
//! out. Callers re-run [`TripTimeline::evaluate`] on every poll tick.

pub mod eta;
pub mod position;
pub mod render;
pub mod upcoming;

pub use eta::{compute_eta, Eta};
pub use position::{infer_position, InferredPosition, PositionState};
pub use render::{
    build_timeline, derive_stop_render_state, StopPosition, StopRenderState, StopStatus,
    TimelineEntry, TransitCard,
};
pub use upcoming::{approach_progress, UpcomingArrival, APPROACH_WINDOW_MINUTES};

use crate::identifiers::StopIdentifier;
use crate::models::types::Trip;

/// One evaluation of a trip against the current time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TripTimeline {
    pub position: InferredPosition,
    pub eta: Option<Eta>,
    pub entries: Vec<TimelineEntry>,
}

impl TripTimeline {
    pub fn evaluate(trip: &Trip, now_minutes: i32, user_stop_id: Option<&StopIdentifier>) -> Self {
        let position = infer_position(&trip.stop_times, now_minutes);
        let eta = compute_eta(&trip.stop_times, position.current_stop_index, user_stop_id);
        let entries = build_timeline(&trip.route_name, &trip.stop_times, &position, user_stop_id);

        Self {
            position,
            eta,
            entries,
        }
    }

    /// The transit card, wherever it was placed on the rail.
    pub fn transit_card(&self) -> Option<&TransitCard> {
        self.entries.iter().find_map(|entry| match entry {
            TimelineEntry::Transit(card) => Some(card),
            TimelineEntry::Stop(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::TripIdentifier;
    use crate::models::time::parse_to_minutes;
    use crate::models::types::ScheduledStopTime;

    fn trip() -> Trip {
        let stop = |id: &str, seq: u32, time: &str| {
            let time = Some(time.parse().unwrap());
            ScheduledStopTime::new(id, format!("Stop {id}"), seq, time, time)
        };
        Trip {
            id: TripIdentifier::new("T1"),
            route_name: "502".into(),
            headed_to: "Airport".into(),
            stop_times: vec![
                stop("A", 1, "08:00:00"),
                stop("B", 2, "08:10:00"),
                stop("C", 3, "08:20:00"),
            ],
        }
    }

    #[test]
    fn test_evaluate_mid_trip() {
        let user = StopIdentifier::new("C");
        let timeline =
            TripTimeline::evaluate(&trip(), parse_to_minutes("08:05:00").unwrap(), Some(&user));

        assert_eq!(timeline.position.current_stop_index, Some(0));
        assert_eq!(
            timeline.eta,
            Some(Eta {
                stops_away: 2,
                minutes_away: Some(20)
            })
        );
        assert_eq!(timeline.entries.len(), 4);
        assert_eq!(timeline.transit_card().unwrap().primary(), "Bus 502 is here");
        assert!(matches!(timeline.entries[1], TimelineEntry::Transit(_)));
    }

    #[test]
    fn test_evaluate_after_end_has_no_eta() {
        let user = StopIdentifier::new("C");
        let timeline =
            TripTimeline::evaluate(&trip(), parse_to_minutes("08:25:00").unwrap(), Some(&user));

        assert_eq!(timeline.position.state, PositionState::AfterEnd);
        assert_eq!(timeline.eta, None);
        assert!(matches!(timeline.entries.last(), Some(TimelineEntry::Transit(_))));
    }
}
