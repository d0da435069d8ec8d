//! Encoded polyline support (precision 1e5).

use geo_types::{Coord, LineString};
use tracing::trace;

use super::LatLon;

const PRECISION: u32 = 5;

/// Characters carry five bits each, offset by 63; bit 0x20 marks that the
/// value continues in the next character.
const CHAR_OFFSET: u8 = 63;
const CONTINUATION: u8 = 0x20;

/// Whether `encoded` is a whole number of latitude/longitude pairs.
///
/// The decoder happily returns a partial coordinate for a cut-off string, so
/// truncation is checked up front: the last value must be terminated and the
/// value count must be even.
fn is_complete(encoded: &str) -> bool {
    let mut values = 0usize;
    let mut open = false;
    for byte in encoded.bytes() {
        let Some(chunk) = byte.checked_sub(CHAR_OFFSET).filter(|c| *c < 0x40) else {
            return false;
        };
        open = chunk & CONTINUATION != 0;
        if !open {
            values += 1;
        }
    }
    !open && values % 2 == 0
}

/// Decode an encoded polyline into coordinates.
///
/// Malformed or truncated input yields an empty vector.
pub fn decode_polyline(encoded: &str) -> Vec<LatLon> {
    if encoded.is_empty() {
        return Vec::new();
    }
    if !is_complete(encoded) {
        trace!(len = encoded.len(), "discarding truncated polyline");
        return Vec::new();
    }

    match ::polyline::decode_polyline(encoded, PRECISION) {
        Ok(line) => line
            .into_inner()
            .into_iter()
            .map(|c| LatLon::new(c.y, c.x))
            .collect(),
        Err(e) => {
            trace!(error = %e, "discarding undecodable polyline");
            Vec::new()
        }
    }
}

/// Encode coordinates as a polyline. Returns `None` for out-of-range input.
pub fn encode_polyline(points: &[LatLon]) -> Option<String> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect();
    ::polyline::encode_coordinates(line, PRECISION).ok()
}
