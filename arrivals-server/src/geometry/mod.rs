//! Planar geometry for locating vehicles along a route.
//!
//! Route shapes arrive as encoded polylines in WGS84. They are decoded,
//! projected to ETRS89 / UTM zone 29N so that distances are plain metres,
//! and then walked backwards from a stop to find where a vehicle is.

mod codec;
mod projection;
mod shape;

pub use codec::{decode_polyline, encode_polyline};
pub use projection::{project, unproject};
pub use shape::{
    ShapePosition, bearing_degrees, bus_position, closest_point_index, cumulative_distance,
    distance, traverse_backward,
};

use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A projected coordinate in metres (easting, northing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Decode a polyline and project every vertex.
///
/// Empty when any vertex fails to project.
pub fn projected_shape(encoded: &str) -> Vec<Point> {
    decode_polyline(encoded)
        .into_iter()
        .map(project)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}
