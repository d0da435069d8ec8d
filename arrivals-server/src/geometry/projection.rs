//! ETRS89 / UTM zone 29N (EPSG:25829) projection.
//!
//! Galicia sits right on the zone 29 central meridian, so one projection
//! covers every operator. Projections are built once per thread.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::warn;

use super::{LatLon, Point};

const GEOGRAPHIC: &str = "+proj=longlat +ellps=GRS80 +no_defs";
const UTM_29N: &str = "+proj=utm +zone=29 +ellps=GRS80 +units=m +no_defs";

struct Utm29 {
    geographic: Proj,
    utm: Proj,
}

impl Utm29 {
    fn new() -> Option<Self> {
        let build = |definition: &str| {
            Proj::from_proj_string(definition)
                .map_err(|e| warn!(definition, error = %e, "invalid projection definition"))
                .ok()
        };
        Some(Self {
            geographic: build(GEOGRAPHIC)?,
            utm: build(UTM_29N)?,
        })
    }
}

thread_local! {
    static UTM29: Option<Utm29> = Utm29::new();
}

/// Project a geographic coordinate to UTM 29N metres.
///
/// `None` when the coordinate cannot be transformed (e.g. NaN input).
pub fn project(coord: LatLon) -> Option<Point> {
    let mut xyz = (coord.lon.to_radians(), coord.lat.to_radians(), 0.0);
    UTM29.with(|p| {
        let p = p.as_ref()?;
        transform(&p.geographic, &p.utm, &mut xyz).ok()?;
        Some(Point::new(xyz.0, xyz.1))
    })
    .filter(|p| p.x.is_finite() && p.y.is_finite())
}

/// Convert UTM 29N metres back to a geographic coordinate.
pub fn unproject(point: Point) -> Option<LatLon> {
    let mut xyz = (point.x, point.y, 0.0);
    UTM29.with(|p| {
        let p = p.as_ref()?;
        transform(&p.utm, &p.geographic, &mut xyz).ok()?;
        Some(LatLon::new(xyz.1.to_degrees(), xyz.0.to_degrees()))
    })
    .filter(|c| c.lat.is_finite() && c.lon.is_finite())
}
