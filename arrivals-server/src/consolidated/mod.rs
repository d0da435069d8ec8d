//! Legacy consolidated circulations for Vigo stops.
//!
//! Older clients ask for a flat list that joins a stop's timetable with
//! Vitrasa's live estimates, or the timetable alone for Renfe. This path
//! does not go through the arrivals pipeline.

mod merge;
mod timetable;

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::warn;

use crate::domain::{Feed, StopId};
use crate::realtime::EstimatesSource;

pub use merge::{
    Circulation, DEFAULT_WINDOW_MINUTES, MAX_WINDOW_MINUTES, RealTimeData,
    SCHEDULE_ONLY_WINDOW_MINUTES, ScheduleData, merge_circulations, round_up_minute,
    schedule_only,
};
pub use timetable::{FileTimetableSource, StopTimetable, TimetableError, TimetableSource};

/// Builds circulation lists from a timetable source and Vitrasa estimates.
#[derive(Clone)]
pub struct ConsolidatedService {
    timetable: Arc<dyn TimetableSource>,
    vitrasa: Arc<dyn EstimatesSource>,
}

impl ConsolidatedService {
    pub fn new(timetable: Arc<dyn TimetableSource>, vitrasa: Arc<dyn EstimatesSource>) -> Self {
        Self { timetable, vitrasa }
    }

    /// Circulations at a stop, ordered by expected arrival.
    ///
    /// Only `vitrasa:` and `renfe:` stops are served; other feeds and
    /// non-numeric Vitrasa codes give an empty list. A failing estimates
    /// source leaves the timetable-only result.
    pub async fn circulations(
        &self,
        stop_id: &StopId,
        now: DateTime<Tz>,
    ) -> Result<Vec<Circulation>, TimetableError> {
        let local = now.naive_local();
        let code = stop_id.local_id();

        match stop_id.feed() {
            Feed::Renfe => {
                let timetable = self.timetable.timetable(code, local.date()).await?;
                Ok(timetable.map_or_else(Vec::new, |t| schedule_only(&t.arrivals, local)))
            }
            Feed::Vitrasa => {
                let Ok(numeric) = code.parse::<u32>() else {
                    warn!(stop_id = %stop_id, "invalid vitrasa stop code");
                    return Ok(Vec::new());
                };

                let (estimates, timetable) = tokio::join!(
                    self.vitrasa.estimates(numeric),
                    self.timetable.timetable(code, local.date()),
                );
                let estimates = estimates.unwrap_or_else(|e| {
                    warn!(stop_id = %stop_id, error = %e, "vitrasa estimates unavailable");
                    Vec::new()
                });
                let timetable = timetable?;

                Ok(merge_circulations(
                    &estimates,
                    timetable.as_ref().map(|t| t.arrivals.as_slice()),
                    local,
                ))
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StopEstimate, TimetableTrip};
    use crate::realtime::RealtimeError;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Europe::Madrid;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    struct StaticTimetable(Option<StopTimetable>, Mutex<Vec<String>>);

    impl TimetableSource for StaticTimetable {
        fn timetable<'a>(
            &'a self,
            stop_code: &'a str,
            _date: NaiveDate,
        ) -> BoxFuture<'a, Result<Option<StopTimetable>, TimetableError>> {
            self.1.lock().unwrap().push(stop_code.to_string());
            Box::pin(async move { Ok(self.0.clone()) })
        }
    }

    struct Estimates(Result<Vec<StopEstimate>, u16>);

    impl EstimatesSource for Estimates {
        fn estimates(&self, _stop_code: u32) -> BoxFuture<'_, Result<Vec<StopEstimate>, RealtimeError>> {
            Box::pin(async move {
                self.0.clone().map_err(|status| RealtimeError::Api {
                    status,
                    message: "unavailable".into(),
                })
            })
        }
    }

    fn timetable() -> StopTimetable {
        StopTimetable {
            location: None,
            arrivals: vec![TimetableTrip {
                trip_id: "C1_001004_4".into(),
                service_id: "2025_000123A".into(),
                line: "C1".into(),
                route: "Praza América".into(),
                next_streets: Vec::new(),
                starting_time: "08:40:00".into(),
                calling_time: "09:09:00".into(),
                terminus_name: "Praza de América".into(),
                shape_id: None,
            }],
        }
    }

    fn service(estimates: Result<Vec<StopEstimate>, u16>) -> (ConsolidatedService, Arc<StaticTimetable>) {
        let source = Arc::new(StaticTimetable(Some(timetable()), Mutex::new(Vec::new())));
        let service = ConsolidatedService::new(source.clone(), Arc::new(Estimates(estimates)));
        (service, source)
    }

    fn now() -> DateTime<Tz> {
        Madrid.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn vitrasa_joins_live_and_schedule() {
        let (service, source) = service(Ok(vec![StopEstimate::new("C1", "Praza América", 8)]));
        let stop = StopId::parse("vitrasa:14264").unwrap();

        let out = service.circulations(&stop, now()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].schedule.as_ref().unwrap().running);
        assert_eq!(out[0].real_time.as_ref().unwrap().minutes, 8);
        assert_eq!(*source.1.lock().unwrap(), vec!["14264"]);
    }

    #[tokio::test]
    async fn failed_estimates_fall_back_to_schedule() {
        let (service, _) = service(Err(503));
        let stop = StopId::parse("vitrasa:14264").unwrap();

        let out = service.circulations(&stop, now()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].real_time.is_none());
    }

    #[tokio::test]
    async fn renfe_is_schedule_only() {
        let (service, _) = service(Ok(vec![StopEstimate::new("C1", "Praza América", 8)]));
        let stop = StopId::parse("renfe:08223").unwrap();

        let out = service.circulations(&stop, now()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].real_time.is_none());
        assert_eq!(out[0].schedule.as_ref().unwrap().trip_id, "00123");
    }

    #[tokio::test]
    async fn other_stops_are_empty() {
        let (service, source) = service(Ok(Vec::new()));

        let out = service
            .circulations(&StopId::parse("vitrasa:abc").unwrap(), now())
            .await
            .unwrap();
        assert!(out.is_empty());

        let out = service
            .circulations(&StopId::parse("xunta:1").unwrap(), now())
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(source.1.lock().unwrap().is_empty());
    }
}
