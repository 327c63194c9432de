//! Where is the bus right now, according to the schedule?

use std::sync::Arc;

use crate::models::types::ScheduledStopTime;

/// The segment of the route the bus is on at one evaluation instant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum PositionState {
    /// The first stop's arrival is still in the future.
    BeforeStart,
    /// Past `before_index`, heading for `after_index`.
    Between {
        before_index: usize,
        after_index: usize,
        before_stop_name: Arc<str>,
        after_stop_name: Arc<str>,
    },
    /// The last stop has been reached.
    AfterEnd,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InferredPosition {
    pub state: PositionState,
    /// Index of the last stop whose arrival is at or before now.
    pub current_stop_index: Option<usize>,
}

/// Infer the bus position from the schedule alone.
///
/// Stops are scanned in sequence order and the scan ends at the first arrival
/// later than `now_minutes`. Equal arrivals advance the pointer, so the later
/// index wins a tie. Stops without a scheduled arrival are stepped over.
pub fn infer_position(stop_times: &[ScheduledStopTime], now_minutes: i32) -> InferredPosition {
    let mut current_stop_index = None;
    for (index, stop_time) in stop_times.iter().enumerate() {
        match stop_time.arrival_minutes() {
            Some(arrival) if arrival <= now_minutes => current_stop_index = Some(index),
            Some(_) => break,
            None => continue,
        }
    }

    let state = match current_stop_index {
        None => PositionState::BeforeStart,
        Some(index) if index + 1 >= stop_times.len() => PositionState::AfterEnd,
        Some(index) => PositionState::Between {
            before_index: index,
            after_index: index + 1,
            before_stop_name: stop_times[index].stop_name.clone(),
            after_stop_name: stop_times[index + 1].stop_name.clone(),
        },
    };

    InferredPosition {
        state,
        current_stop_index,
    }
}
