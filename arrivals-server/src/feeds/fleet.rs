//! Tranvías A Coruña fleet, keyed by fleet number range.

use crate::domain::VehicleBadge;

/// A batch of identical vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetEntry {
    pub first: u32,
    pub last: u32,
    pub make: &'static str,
    pub model: &'static str,
    /// `RIG` (rigid) or `ART` (articulated).
    pub kind: &'static str,
    pub year: u16,
}

const fn batch(
    first: u32,
    last: u32,
    make: &'static str,
    model: &'static str,
    kind: &'static str,
    year: u16,
) -> FleetEntry {
    FleetEntry {
        first,
        last,
        make,
        model,
        kind,
        year,
    }
}

const CORUNA_FLEET: &[FleetEntry] = &[
    batch(326, 336, "MB", "O405N2 Venus", "RIG", 2000),
    batch(337, 337, "MB", "O405G Alce", "ART", 2000),
    batch(340, 344, "MAN", "NG313F Delfos Venus", "ART", 2002),
    batch(345, 347, "MAN", "NG313F Delfos Venus", "ART", 2003),
    batch(348, 349, "MAN", "NG313F Delfos Venus", "ART", 2004),
    batch(350, 355, "MAN", "NL263F Luxor II", "RIG", 2004),
    batch(356, 359, "MAN", "NL263F Luxor II", "RIG", 2005),
    batch(360, 362, "MAN", "NG313F Delfos", "ART", 2005),
    batch(363, 370, "MAN", "NL273F Luxor II", "RIG", 2007),
    batch(371, 377, "MAN", "NL273F Luxor II", "RIG", 2008),
    batch(378, 387, "MAN", "NL273F Luxor II", "RIG", 2009),
    batch(388, 392, "MAN", "NL283F Ceres", "RIG", 2012),
    batch(393, 395, "MAN", "NG323F Ceres", "ART", 2012),
    batch(396, 403, "MAN", "NL283F Ceres", "RIG", 2013),
    batch(404, 407, "MB", "Citaro C2", "RIG", 2014),
    batch(408, 411, "MAN", "NL283F Ceres", "RIG", 2014),
    batch(412, 414, "MB", "Citaro C2 G", "ART", 2015),
    batch(415, 419, "MB", "Citaro C2", "RIG", 2015),
    batch(420, 427, "MB", "Citaro C2", "RIG", 2016),
    batch(428, 428, "MAN", "Lion's City 12 E", "RIG", 2024),
    batch(429, 429, "MAN", "Lion's City 18", "RIG", 2025),
    batch(430, 432, "MAN", "Lion's City 12", "RIG", 2025),
];

/// Badge for a Coruña vehicle; unknown numbers carry only the identifier.
pub fn vehicle_badge(identifier: &str) -> VehicleBadge {
    let entry = identifier
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|n| CORUNA_FLEET.iter().find(|e| (e.first..=e.last).contains(&n)));

    VehicleBadge {
        identifier: identifier.to_string(),
        make: entry.map(|e| e.make.to_string()),
        model: entry.map(|e| e.model.to_string()),
        kind: entry.map(|e| e.kind.to_string()),
        year: entry.map(|e| e.year.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_do_not_overlap() {
        for pair in CORUNA_FLEET.windows(2) {
            assert!(pair[0].first <= pair[0].last);
            assert!(pair[0].last < pair[1].first, "{:?} / {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn lookup_by_number() {
        let b = vehicle_badge("337");
        assert_eq!(b.model.as_deref(), Some("O405G Alce"));
        assert_eq!(b.kind.as_deref(), Some("ART"));

        let b = vehicle_badge("425");
        assert_eq!(b.make.as_deref(), Some("MB"));
        assert_eq!(b.year.as_deref(), Some("2016"));
    }

    #[test]
    fn unknown_vehicle_keeps_identifier() {
        let b = vehicle_badge("999");
        assert_eq!(b.identifier, "999");
        assert!(b.make.is_none());

        let b = vehicle_badge("abc");
        assert!(b.model.is_none());
    }
}
