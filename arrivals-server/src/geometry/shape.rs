//! Distance, traversal and heading along a projected route shape.

use tracing::debug;

use super::projection::unproject;
use super::{LatLon, Point};

/// Where a vehicle sits on a route shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePosition {
    /// Vehicle location, rounded to 6 decimal places.
    pub coordinate: LatLon,
    /// Heading in degrees, 0 = north, clockwise.
    pub orientation_degrees: u16,
    /// Index of the shape vertex the vehicle is heading towards.
    pub shape_index: usize,
    /// Index of the shape vertex nearest the stop.
    pub stop_shape_index: usize,
}

/// Euclidean distance in metres.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Index of the vertex nearest `target`; the first one wins on ties.
pub fn closest_point_index(shape: &[Point], target: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in shape.iter().enumerate() {
        let d = distance(p, target);
        if best.is_none_or(|(_, min)| d < min) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Arc length from the first vertex up to and including `upto`.
pub fn cumulative_distance(shape: &[Point], upto: usize) -> f64 {
    shape
        .windows(2)
        .take(upto)
        .map(|w| distance(w[0], w[1]))
        .sum()
}

/// Walk from `from` towards the start of the shape, consuming `meters`.
///
/// Returns the interpolated point and the index of the vertex ahead of it.
/// Running out of shape clamps to the first vertex. `None` only for an
/// empty shape.
pub fn traverse_backward(shape: &[Point], from: usize, meters: f64) -> Option<(Point, usize)> {
    let first = *shape.first()?;
    let clamped = (first, 1.min(shape.len() - 1));

    let mut current = from.min(shape.len() - 1);
    let mut remaining = meters;

    while current > 0 && remaining > 0.0 {
        let ahead = shape[current];
        let behind = shape[current - 1];
        let segment = distance(ahead, behind);

        if segment >= remaining {
            let ratio = remaining / segment;
            let point = Point::new(
                ahead.x + (behind.x - ahead.x) * ratio,
                ahead.y + (behind.y - ahead.y) * ratio,
            );
            return Some((point, current));
        }

        remaining -= segment;
        current -= 1;
    }

    Some(clamped)
}

/// Heading from `from` to `to` in `[0, 360)`, 0 = north.
pub fn bearing_degrees(from: Point, to: Point) -> f64 {
    let bearing = (to.x - from.x).atan2(to.y - from.y).to_degrees();
    if bearing < 0.0 { bearing + 360.0 } else { bearing }
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Locate a vehicle `meters_remaining` before `stop` along `shape`.
///
/// Returns `None` when the shape is empty, the distance is not positive, or
/// the distance exceeds the length of the shape up to the stop. The last case
/// means the vehicle is still finishing a previous trip on a shape we do not
/// have. A point that cannot be unprojected also yields `None`.
pub fn bus_position(shape: &[Point], stop: Point, meters_remaining: f64) -> Option<ShapePosition> {
    if meters_remaining <= 0.0 {
        return None;
    }

    let stop_index = closest_point_index(shape, stop)?;
    let to_stop = cumulative_distance(shape, stop_index);

    if meters_remaining > to_stop {
        debug!(
            meters_remaining,
            to_stop, "distance exceeds shape length to stop, vehicle likely on previous trip"
        );
        return None;
    }

    let (point, forward_index) = traverse_backward(shape, stop_index, meters_remaining)?;
    let bearing = bearing_degrees(point, shape[forward_index]);
    let coordinate = unproject(point)?;

    Some(ShapePosition {
        coordinate: LatLon::new(round6(coordinate.lat), round6(coordinate.lon)),
        orientation_degrees: (bearing.round() as u16) % 360,
        shape_index: forward_index,
        stop_shape_index: stop_index,
    })
}
