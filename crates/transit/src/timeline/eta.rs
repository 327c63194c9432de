//! Rider ETA to a chosen stop.

use crate::identifiers::StopIdentifier;
use crate::models::types::ScheduledStopTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Eta {
    pub stops_away: usize,
    /// Scheduled minutes between the current stop and the rider's stop.
    /// `None` when either stop has no scheduled arrival.
    pub minutes_away: Option<i32>,
}

impl Eta {
    /// Header line such as `"2 stops away · ~20 min"`.
    pub fn summary(&self) -> String {
        match self.minutes_away {
            Some(minutes) if minutes != 0 => {
                format!("{} stops away · ~{} min", self.stops_away, minutes)
            }
            _ => format!("{} stops away", self.stops_away),
        }
    }
}

/// ETA from the bus's current stop to `user_stop_id`.
///
/// Returns `None` when there is no rider stop, the bus has not started, the
/// stop is not on this trip, or the bus has already reached it.
pub fn compute_eta(
    stop_times: &[ScheduledStopTime],
    current_stop_index: Option<usize>,
    user_stop_id: Option<&StopIdentifier>,
) -> Option<Eta> {
    let user_stop_id = user_stop_id?;
    let current_index = current_stop_index?;
    let user_index = stop_times.iter().position(|st| &st.stop_id == user_stop_id)?;
    if user_index <= current_index {
        return None;
    }

    let current = stop_times.get(current_index)?;
    let minutes_away = match (current.arrival_minutes(), stop_times[user_index].arrival_minutes()) {
        (Some(from), Some(to)) => Some(to - from),
        _ => None,
    };

    Some(Eta {
        stops_away: user_index - current_index,
        minutes_away,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::TimeOfDay;

    fn stop(id: &str, sequence: u32, arrival: Option<&str>) -> ScheduledStopTime {
        let arrival = arrival.map(|s| s.parse::<TimeOfDay>().unwrap());
        ScheduledStopTime::new(id, id, sequence, arrival, arrival)
    }

    fn three_stops() -> Vec<ScheduledStopTime> {
        vec![
            stop("A", 1, Some("08:00:00")),
            stop("B", 2, Some("08:10:00")),
            stop("C", 3, Some("08:20:00")),
        ]
    }

    #[test]
    fn test_eta_two_stops_away() {
        let eta = compute_eta(&three_stops(), Some(0), Some(&StopIdentifier::new("C"))).unwrap();
        assert_eq!(eta.stops_away, 2);
        assert_eq!(eta.minutes_away, Some(20));
        assert_eq!(eta.summary(), "2 stops away · ~20 min");
    }

    #[test]
    fn test_eta_none_cases() {
        let stops = three_stops();
        let c = StopIdentifier::new("C");

        assert_eq!(compute_eta(&stops, Some(0), None), None);
        assert_eq!(compute_eta(&stops, None, Some(&c)), None);
        assert_eq!(compute_eta(&stops, Some(0), Some(&StopIdentifier::new("Z"))), None);
        assert_eq!(compute_eta(&stops, Some(2), Some(&c)), None);
        assert_eq!(compute_eta(&[], Some(0), Some(&c)), None);
    }

    #[test]
    fn test_eta_none_when_user_stop_not_ahead() {
        let stops = three_stops();
        for current in 0..stops.len() {
            for (user_index, user) in stops.iter().enumerate() {
                let eta = compute_eta(&stops, Some(current), Some(&user.stop_id));
                assert_eq!(eta.is_none(), user_index <= current);
            }
        }
    }

    #[test]
    fn test_eta_unknown_minutes() {
        let stops = vec![
            stop("A", 1, Some("08:00:00")),
            stop("B", 2, None),
        ];
        let eta = compute_eta(&stops, Some(0), Some(&StopIdentifier::new("B"))).unwrap();
        assert_eq!(eta.stops_away, 1);
        assert_eq!(eta.minutes_away, None);
        assert_eq!(eta.summary(), "1 stops away");
    }

    #[test]
    fn test_eta_does_not_clamp_inconsistent_schedules() {
        let stops = vec![
            stop("A", 1, Some("08:30:00")),
            stop("B", 2, Some("08:10:00")),
        ];
        let eta = compute_eta(&stops, Some(0), Some(&StopIdentifier::new("B"))).unwrap();
        assert_eq!(eta.minutes_away, Some(-20));
    }
}
