//! Response types for the planner's GTFS GraphQL API.
//!
//! Only the fields requested by the arrivals query are modelled.

use serde::{Deserialize, Serialize};

/// GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopData {
    pub stop: Option<OtpStop>,
}

/// A stop with its routes and upcoming departures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpStop {
    /// Public stop code, may be absent for some feeds
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub routes: Vec<OtpRoute>,
    /// Aliased from `stoptimesWithoutPatterns`
    #[serde(default)]
    pub arrivals: Vec<OtpStoptime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRoute {
    pub gtfs_id: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    /// Hex without `#`
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// Pickup policy at a stoptime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickupType {
    Scheduled,
    None,
    CallAgency,
    CoordinateWithDriver,
}

/// One departure of a trip from the requested stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStoptime {
    #[serde(default)]
    pub headsign: Option<String>,
    /// Seconds since service-day midnight
    pub scheduled_departure: i64,
    /// Unix timestamp of the service day
    pub service_day: i64,
    #[serde(default)]
    pub pickup_type: Option<PickupType>,
    pub trip: OtpTrip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpTrip {
    pub gtfs_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub trip_headsign: Option<String>,
    #[serde(default)]
    pub route_short_name: Option<String>,
    pub route: OtpRoute,
    /// Absent for reduced queries
    #[serde(default)]
    pub trip_geometry: Option<OtpGeometry>,
    /// Final call of the trip
    #[serde(default)]
    pub arrival_stoptime: Option<OtpTerminus>,
    #[serde(default)]
    pub stoptimes: Vec<OtpTripStoptime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpGeometry {
    pub points: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpTerminus {
    pub stop: OtpStopRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStopRef {
    pub gtfs_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpTripStoptime {
    pub stop: OtpTripStop,
    pub scheduled_departure: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpTripStop {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stop_response() {
        let json = r#"{
            "data": {
                "stop": {
                    "code": "14264",
                    "name": "Urzáiz - Príncipe",
                    "lat": 42.2336,
                    "lon": -8.7197,
                    "routes": [
                        {"gtfsId": "vitrasa:C1", "shortName": "C1", "color": "E31E24", "textColor": "FFFFFF"}
                    ],
                    "arrivals": [
                        {
                            "headsign": "Praza América",
                            "scheduledDeparture": 30000,
                            "serviceDay": 1741906800,
                            "pickupType": "SCHEDULED",
                            "trip": {
                                "gtfsId": "vitrasa:C1_001001_1",
                                "serviceId": "vitrasa:LAB",
                                "routeShortName": "C1",
                                "route": {"gtfsId": "vitrasa:C1", "color": null, "textColor": null, "longName": "Circular 1"},
                                "arrivalStoptime": {"stop": {"gtfsId": "vitrasa:999"}},
                                "stoptimes": [
                                    {"stop": {"name": "Urzáiz", "lat": 42.23, "lon": -8.72}, "scheduledDeparture": 30000}
                                ]
                            }
                        }
                    ]
                }
            }
        }"#;

        let response: GraphResponse<StopData> = serde_json::from_str(json).unwrap();
        assert!(response.errors.is_empty());
        let stop = response.data.unwrap().stop.unwrap();
        assert_eq!(stop.code.as_deref(), Some("14264"));
        assert_eq!(stop.routes.len(), 1);

        let departure = &stop.arrivals[0];
        assert_eq!(departure.pickup_type, Some(PickupType::Scheduled));
        assert!(departure.trip.trip_geometry.is_none());
        assert_eq!(departure.trip.route.long_name.as_deref(), Some("Circular 1"));
        assert_eq!(
            departure.trip.arrival_stoptime.as_ref().unwrap().stop.gtfs_id,
            "vitrasa:999"
        );
    }

    #[test]
    fn parse_graphql_errors() {
        let json = r#"{"data": null, "errors": [{"message": "boom", "locations": []}]}"#;
        let response: GraphResponse<StopData> = serde_json::from_str(json).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "boom");
    }
}
