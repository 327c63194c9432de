//! Per-stop display state and the rail layout of a trip.

use std::sync::Arc;

use crate::identifiers::StopIdentifier;
use crate::models::types::ScheduledStopTime;
use crate::timeline::position::{InferredPosition, PositionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum StopPosition {
    First,
    Middle,
    Last,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum StopStatus {
    Passed,
    Upcoming,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StopRenderState {
    pub index: usize,
    pub stop_id: StopIdentifier,
    pub stop_name: Arc<str>,
    /// `HH:MM` arrival label, if the stop has a scheduled arrival
    pub scheduled: Option<String>,
    pub position: StopPosition,
    pub status: StopStatus,
    pub is_user_stop: bool,
}

/// Display state for every stop of a trip.
///
/// The stop at `current_stop_index` itself renders as passed.
pub fn derive_stop_render_state(
    stop_times: &[ScheduledStopTime],
    current_stop_index: Option<usize>,
    user_stop_id: Option<&StopIdentifier>,
) -> Vec<StopRenderState> {
    let last = stop_times.len().saturating_sub(1);
    stop_times
        .iter()
        .enumerate()
        .map(|(index, stop_time)| {
            // A single-stop trip is drawn as the terminus.
            let position = if index == last {
                StopPosition::Last
            } else if index == 0 {
                StopPosition::First
            } else {
                StopPosition::Middle
            };
            let status = match current_stop_index {
                Some(current) if index <= current => StopStatus::Passed,
                _ => StopStatus::Upcoming,
            };

            StopRenderState {
                index,
                stop_id: stop_time.stop_id.clone(),
                stop_name: stop_time.stop_name.clone(),
                scheduled: stop_time.arrival.map(|t| t.clock_label()),
                position,
                status,
                is_user_stop: user_stop_id == Some(&stop_time.stop_id),
            }
        })
        .collect()
}

/// The "bus in transit" card placed on the rail.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransitCard {
    pub route_name: Arc<str>,
    pub state: PositionState,
}

impl TransitCard {
    pub fn primary(&self) -> String {
        match &self.state {
            PositionState::BeforeStart => format!("Bus {} hasn't started yet", self.route_name),
            PositionState::Between { .. } => format!("Bus {} is here", self.route_name),
            PositionState::AfterEnd => format!("Bus {} has completed this route", self.route_name),
        }
    }

    pub fn secondary(&self) -> Option<String> {
        match &self.state {
            PositionState::Between {
                before_stop_name,
                after_stop_name,
                ..
            } => Some(format!("Between {} & {}", before_stop_name, after_stop_name)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "kind", rename_all = "lowercase"))]
pub enum TimelineEntry {
    Transit(TransitCard),
    Stop(StopRenderState),
}

/// Interleave the transit card with the stop rows.
///
/// The card goes before every stop when the trip has not started, right
/// before the next stop while in progress, and after every stop once done.
pub fn build_timeline(
    route_name: &Arc<str>,
    stop_times: &[ScheduledStopTime],
    position: &InferredPosition,
    user_stop_id: Option<&StopIdentifier>,
) -> Vec<TimelineEntry> {
    let card = TimelineEntry::Transit(TransitCard {
        route_name: route_name.clone(),
        state: position.state.clone(),
    });
    let stops = derive_stop_render_state(stop_times, position.current_stop_index, user_stop_id);

    let insert_at = match position.state {
        PositionState::BeforeStart => 0,
        PositionState::Between { after_index, .. } => after_index,
        PositionState::AfterEnd => stops.len(),
    };

    let mut entries = Vec::with_capacity(stops.len() + 1);
    let mut stops = stops.into_iter().map(TimelineEntry::Stop);
    entries.extend(stops.by_ref().take(insert_at));
    entries.push(card);
    entries.extend(stops);
    entries
}
