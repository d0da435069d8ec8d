//! Schedule and real-time joined into a single circulation list.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{StopEstimate, TimetableTrip};
use crate::feeds::{format_vitrasa_line, is_route_match, normalize_for_matching};

/// Schedule window when there are no live estimates.
pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

/// Upper bound on the window derived from live estimates.
pub const MAX_WINDOW_MINUTES: i64 = 75;

/// Schedule-only feeds look this far ahead.
pub const SCHEDULE_ONLY_WINDOW_MINUTES: i64 = 8 * 60;

/// A scheduled trip may call at most this many minutes after the live ETA.
const MAX_SCHEDULE_AFTER_LIVE: i64 = 7;

/// A scheduled trip may call at most this many minutes before the live ETA.
const MAX_SCHEDULE_BEFORE_LIVE: i64 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleData {
    /// Whether the trip had left its first stop.
    pub running: bool,
    pub minutes: i64,
    pub service_id: String,
    pub trip_id: String,
    pub shape_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeData {
    pub minutes: i64,
    pub distance: i32,
}

/// One vehicle expected at the stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Circulation {
    pub line: String,
    pub route: String,
    pub schedule: Option<ScheduleData>,
    pub real_time: Option<RealTimeData>,
    pub next_streets: Vec<String>,
}

impl Circulation {
    /// Live minutes when known, otherwise scheduled minutes.
    pub fn eta_minutes(&self) -> i64 {
        self.real_time
            .as_ref()
            .map(|r| r.minutes)
            .or_else(|| self.schedule.as_ref().map(|s| s.minutes))
            .unwrap_or(i64::MAX)
    }

    fn live_only(estimate: &StopEstimate) -> Self {
        Self {
            line: estimate.line.clone(),
            route: estimate.destination.clone(),
            schedule: None,
            real_time: Some(RealTimeData {
                minutes: i64::from(estimate.minutes),
                distance: estimate.meters.unwrap_or(0),
            }),
            next_streets: Vec::new(),
        }
    }
}

/// Current time moved forward to the next whole minute.
pub fn round_up_minute(now: NaiveDateTime) -> NaiveDateTime {
    let truncated = now.with_nanosecond(0).unwrap_or(now);
    truncated + Duration::seconds(60 - i64::from(truncated.second()))
}

/// A trip with both its times resolved against the service day.
struct TimedTrip<'a> {
    trip: &'a TimetableTrip,
    starting: NaiveDateTime,
    calling: NaiveDateTime,
}

impl TimedTrip<'_> {
    fn schedule(&self, now: NaiveDateTime) -> ScheduleData {
        ScheduleData {
            running: self.starting <= now,
            minutes: (self.calling - now).num_minutes(),
            service_id: self.trip.service_id.clone(),
            trip_id: self.trip.trip_id.clone(),
            shape_id: self.trip.shape_id.clone(),
        }
    }
}

fn timed(trips: &[TimetableTrip], now_local: NaiveDateTime) -> Vec<TimedTrip<'_>> {
    let date = now_local.date();
    let mut timed: Vec<TimedTrip<'_>> = trips
        .iter()
        .filter_map(|trip| {
            Some(TimedTrip {
                trip,
                starting: trip.starting_at(date)?,
                calling: trip.calling_at(date)?,
            })
        })
        .collect();
    timed.sort_by_key(|t| t.calling);
    timed
}

fn serves_estimate(trip: &TimetableTrip, estimate: &StopEstimate) -> bool {
    if trip.line.trim() != estimate.line.trim() {
        return false;
    }
    let wanted = normalize_for_matching(&estimate.destination);
    normalize_for_matching(&trip.terminus_name) == wanted
        || is_route_match(&normalize_for_matching(&trip.route), &wanted)
}

/// Join live estimates with a stop timetable.
///
/// Each estimate takes the unused scheduled trip of the same line and
/// destination whose calling time is closest to the live ETA. Remaining
/// scheduled trips up to shortly after the last live ETA are appended.
/// Without a timetable every estimate is returned on its own.
pub fn merge_circulations(
    estimates: &[StopEstimate],
    timetable: Option<&[TimetableTrip]>,
    now_local: NaiveDateTime,
) -> Vec<Circulation> {
    let estimates: Vec<&StopEstimate> = estimates
        .iter()
        .filter(|e| {
            let route = e.destination.trim();
            !route.is_empty() && !route.ends_with('*')
        })
        .collect();

    let Some(trips) = timetable else {
        let mut live: Vec<Circulation> = estimates.into_iter().map(Circulation::live_only).collect();
        live.sort_by_key(Circulation::eta_minutes);
        return format_lines(live);
    };

    let now = round_up_minute(now_local);
    let trips = timed(trips, now_local);
    let window_end = now
        + Duration::minutes(
            estimates
                .iter()
                .map(|e| i64::from(e.minutes) + 5)
                .max()
                .map_or(DEFAULT_WINDOW_MINUTES, |m| m.min(MAX_WINDOW_MINUTES)),
        );

    let mut circulations = Vec::new();
    let mut used: HashSet<&str> = HashSet::new();

    for estimate in estimates {
        let live_at = now + Duration::minutes(i64::from(estimate.minutes));
        let best = trips
            .iter()
            .filter(|t| !used.contains(t.trip.trip_id.as_str()))
            .filter(|t| serves_estimate(t.trip, estimate))
            .map(|t| (t, (t.calling - live_at).num_minutes()))
            .filter(|(_, diff)| (-MAX_SCHEDULE_BEFORE_LIVE..=MAX_SCHEDULE_AFTER_LIVE).contains(diff))
            .min_by_key(|(_, diff)| diff.abs())
            .map(|(t, _)| t);

        let Some(matched) = best else {
            warn!(
                line = %estimate.line,
                route = %estimate.destination,
                minutes = estimate.minutes,
                "no scheduled trip for live estimate"
            );
            circulations.push(Circulation::live_only(estimate));
            continue;
        };

        used.insert(matched.trip.trip_id.as_str());
        let route = if estimate.destination == matched.trip.terminus_name {
            matched.trip.route.clone()
        } else {
            estimate.destination.clone()
        };
        circulations.push(Circulation {
            line: estimate.line.clone(),
            route,
            schedule: Some(matched.schedule(now)),
            real_time: Some(RealTimeData {
                minutes: i64::from(estimate.minutes),
                distance: estimate.meters.unwrap_or(0),
            }),
            next_streets: matched.trip.next_streets.clone(),
        });
    }

    for trip in trips
        .iter()
        .filter(|t| t.calling >= now && t.calling <= window_end)
        .filter(|t| !used.contains(t.trip.trip_id.as_str()))
    {
        let schedule = trip.schedule(now);
        if schedule.minutes == 0 {
            continue;
        }
        circulations.push(Circulation {
            line: trip.trip.line.clone(),
            route: trip.trip.route.clone(),
            schedule: Some(schedule),
            real_time: None,
            next_streets: Vec::new(),
        });
    }

    debug!(matched = used.len(), total = circulations.len(), "merged circulations");
    circulations.sort_by_key(Circulation::eta_minutes);
    format_lines(circulations)
}

fn format_lines(circulations: Vec<Circulation>) -> Vec<Circulation> {
    circulations
        .into_iter()
        .map(|mut c| {
            let (line, route) = format_vitrasa_line(&c.line, &c.route);
            c.line = line;
            c.route = route;
            c
        })
        .collect()
}

/// Upcoming departures of a feed with no live data.
///
/// The published trip and service ids are the five characters before the
/// last one of the GTFS service id.
pub fn schedule_only(trips: &[TimetableTrip], now_local: NaiveDateTime) -> Vec<Circulation> {
    let now = round_up_minute(now_local);
    let end = now + Duration::minutes(SCHEDULE_ONLY_WINDOW_MINUTES);

    timed(trips, now_local)
        .iter()
        .filter(|t| t.calling >= now && t.calling <= end)
        .map(|t| {
            let mut schedule = t.schedule(now);
            let id = short_service_id(&t.trip.service_id).to_string();
            schedule.trip_id = id.clone();
            schedule.service_id = id;
            Circulation {
                line: t.trip.line.clone(),
                route: t.trip.route.clone(),
                schedule: Some(schedule),
                real_time: None,
                next_streets: t.trip.next_streets.clone(),
            }
        })
        .collect()
}

fn short_service_id(service_id: &str) -> &str {
    let len = service_id.len();
    len.checked_sub(6)
        .and_then(|start| service_id.get(start..len - 1))
        .unwrap_or(service_id)
}
