use std::fmt::Write;

use bus_radar_transit::{
    format_rounded_distance, RankedStop, Route, RouteTimetable, StopPosition, StopStatus,
    TimelineEntry, Trip, TripTimeline, UpcomingArrival,
};

/// Width of the textual approach bar in `upcoming` output.
const BAR_WIDTH: usize = 20;

/// One line per stop, nearest first when a distance is known.
pub fn stop_list(stops: &[RankedStop]) -> String {
    if stops.is_empty() {
        return "No stops found\n".to_owned();
    }

    let mut out = String::new();
    for ranked in stops {
        let distance = ranked
            .distance_m
            .map(format_rounded_distance)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>8}",
            ranked.stop.id, ranked.stop.name, distance
        );
    }
    out
}

fn approach_bar(progress: f64) -> String {
    let filled = ((progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn arrival_list(arrivals: &[UpcomingArrival]) -> String {
    if arrivals.is_empty() {
        return "No upcoming buses\n".to_owned();
    }

    let mut out = String::new();
    for arrival in arrivals {
        let clock = arrival
            .trip
            .arrival
            .map(|t| t.clock_label())
            .unwrap_or_else(|| "--:--".to_owned());
        let _ = write!(
            out,
            "{:<6} {:<24} {} {:<14} {}",
            arrival.trip.route_name,
            arrival.trip.headed_to,
            clock,
            arrival.label,
            approach_bar(arrival.progress)
        );
        if arrival.departed {
            out.push_str(" (departed)");
        }
        out.push('\n');
    }
    out
}

/// Header plus the rail view, transit card included.
pub fn trip_view(trip: &Trip, timeline: &TripTimeline) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bus {} to {}", trip.route_name, trip.headed_to);
    if let Some(eta) = &timeline.eta {
        let _ = writeln!(out, "{}", eta.summary());
    }
    out.push('\n');

    for entry in &timeline.entries {
        match entry {
            TimelineEntry::Transit(card) => {
                let _ = writeln!(out, "   >> {}", card.primary());
                if let Some(secondary) = card.secondary() {
                    let _ = writeln!(out, "      {secondary}");
                }
            }
            TimelineEntry::Stop(stop) => {
                let marker = match (stop.status, stop.position) {
                    (StopStatus::Passed, _) => 'x',
                    (StopStatus::Upcoming, StopPosition::First | StopPosition::Last) => 'O',
                    (StopStatus::Upcoming, StopPosition::Middle) => 'o',
                };
                let scheduled = stop.scheduled.as_deref().unwrap_or("--:--");
                let user = if stop.is_user_stop { "  <- your stop" } else { "" };
                let _ = writeln!(out, " {marker} {scheduled}  {}{user}", stop.stop_name);
            }
        }
    }
    out
}

pub fn route_list(routes: &[Route]) -> String {
    if routes.is_empty() {
        return "No routes found\n".to_owned();
    }

    let mut out = String::new();
    for route in routes {
        let _ = writeln!(out, "{:<12} {}", route.id, route.label());
    }
    out
}

/// Trips as rows, stops as columns; `-` where a trip skips a stop.
pub fn timetable_grid(timetable: &RouteTimetable) -> String {
    if timetable.is_empty() {
        return format!("No trips for route {}\n", timetable.route_id);
    }

    let trip_width = timetable
        .trips
        .iter()
        .map(|row| row.trip_id.as_str().chars().count())
        .max()
        .unwrap_or(0)
        .max("Trip".len());
    let widths: Vec<usize> = timetable
        .stops
        .iter()
        .map(|stop| stop.name.chars().count().max("00:00".len()))
        .collect();

    let mut lines = Vec::with_capacity(timetable.trips.len() + 1);
    let mut header = format!("{:<trip_width$}", "Trip");
    for (stop, width) in timetable.stops.iter().zip(widths.iter().copied()) {
        let _ = write!(header, "  {:<width$}", stop.name);
    }
    lines.push(header);

    for row in &timetable.trips {
        let mut line = format!("{:<trip_width$}", row.trip_id);
        for (stop, width) in timetable.stops.iter().zip(widths.iter().copied()) {
            let cell = row
                .time_at(&stop.id)
                .map(|t| t.clock_label())
                .unwrap_or_else(|| "-".to_owned());
            let _ = write!(line, "  {cell:<width$}");
        }
        lines.push(line);
    }

    let mut out = String::new();
    for line in lines {
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}
