/// A live estimate for one vehicle approaching a stop, normalised across
/// operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEstimate {
    /// Public line label, e.g. `"C1"`.
    pub line: String,
    /// GTFS-local route id, for operators that publish one.
    pub route_id: Option<String>,
    /// Free-text destination as shown on the vehicle.
    pub destination: String,
    pub minutes: i32,
    /// Distance still to travel, when the operator reports it.
    pub meters: Option<i32>,
    pub vehicle_id: Option<String>,
    /// Route colour published by the operator, hex without `#`.
    pub colour: Option<String>,
}

impl StopEstimate {
    pub fn new(line: impl Into<String>, destination: impl Into<String>, minutes: i32) -> Self {
        Self {
            line: line.into(),
            route_id: None,
            destination: destination.into(),
            minutes,
            meters: None,
            vehicle_id: None,
            colour: None,
        }
    }

    pub fn with_meters(mut self, meters: i32) -> Self {
        self.meters = Some(meters);
        self
    }

    pub fn with_route_id(mut self, id: impl Into<String>) -> Self {
        self.route_id = Some(id.into());
        self
    }

    pub fn with_vehicle(mut self, id: impl Into<String>) -> Self {
        self.vehicle_id = Some(id.into());
        self
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }
}
