//! Vitrasa line presentation: destination clean-up, themed renames and
//! shift badges.

use crate::domain::{Feed, ShiftBadge};

/// A special service that is shown under its own line name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemedRename {
    /// Line code published by the operator.
    pub line: &'static str,
    /// Destination text that identifies the service exactly.
    pub destination: &'static str,
    pub display_line: &'static str,
    pub display_destination: &'static str,
}

/// Football match-day shuttles run as line `FUT` with these destinations.
pub const THEMED_RENAMES: &[ThemedRename] = &[
    ThemedRename {
        line: "FUT",
        destination: "CASTELAO-CAMELIAS-G.BARBÓN.M.GARRIDO",
        display_line: "MAR",
        display_destination: "MARCADOR ⚽: CASTELAO-CAMELIAS-G.BARBÓN.M.GARRIDO",
    },
    ThemedRename {
        line: "FUT",
        destination: "P. ESPAÑA-T.VIGO-S.BADÍA",
        display_line: "RIO",
        display_destination: "RÍO ⚽: P. ESPAÑA-T.VIGO-S.BADÍA",
    },
    ThemedRename {
        line: "FUT",
        destination: "NAVIA-BOUZAS-URZAIZ-G. ESPINO",
        display_line: "GOL",
        display_destination: "GOL ⚽: NAVIA-BOUZAS-URZAIZ-G. ESPINO",
    },
];

const OUT_OF_SERVICE: &str = "FORA DE SERVIZO.G.B.";
const OUT_OF_SERVICE_DISPLAY: &str = "García Barbón, 7 (fora de servizo)";

/// Route numbers in Vitrasa duty codes and the line they stand for.
const SHIFT_ROUTE_NAMES: &[(u32, &str)] = &[
    (1, "C1"),
    (3, "C3"),
    (8, "A"),
    (30, "N1"),
    (33, "N4"),
    (101, "H"),
    (150, "REF"),
    (201, "U1"),
    (202, "U2"),
    (500, "TUR"),
];

/// Display line and destination for a Vitrasa service.
pub fn format_vitrasa_line(line: &str, destination: &str) -> (String, String) {
    let destination = destination.replace('*', "");

    if destination == OUT_OF_SERVICE {
        return (line.to_string(), OUT_OF_SERVICE_DISPLAY.to_string());
    }

    match line {
        // Variant A1 is announced as a leading `1` on the destination. Any
        // `1` not followed by another digit counts, whatever comes after it.
        "A" => {
            let trimmed = destination.trim_start();
            let rest = trimmed.strip_prefix("\"1\"").or_else(|| {
                let rest = trimmed.strip_prefix('1')?;
                (!rest.starts_with(|c: char| c.is_ascii_digit())).then_some(rest)
            });
            match rest {
                Some(rest) => (
                    "A1".to_string(),
                    rest.trim_start_matches([' ', '-', '.', ':']).to_string(),
                ),
                None => (line.to_string(), destination),
            }
        }
        "6" => (line.to_string(), destination.replace('"', "")),
        _ => THEMED_RENAMES
            .iter()
            .find(|r| r.line == line && r.destination == destination)
            .map_or((line.to_string(), destination.clone()), |r| {
                (r.display_line.to_string(), r.display_destination.to_string())
            }),
    }
}

/// Line name for a duty-code route number.
pub fn shift_route_name(route_number: u32) -> String {
    SHIFT_ROUTE_NAMES
        .iter()
        .find(|(n, _)| *n == route_number)
        .map_or_else(|| format!("L{route_number}"), |(_, name)| name.to_string())
}

/// Duty badge decoded from a Vitrasa trip id.
///
/// Trip ids end in `_RRRSSS_T`: a 3-digit route number, a 3-digit shift
/// number and the trip sequence within the shift, e.g.
/// `C1 04LN 02_001004_4` is trip 4 of shift `C1-4`.
pub fn shift_badge(feed: Feed, trip_id: &str) -> Option<ShiftBadge> {
    if feed != Feed::Vitrasa {
        return None;
    }

    let mut parts = trip_id.rsplit('_');
    let trip = parts.next()?;
    let group = parts.next()?;

    if group.len() != 6 || !group.is_ascii() {
        return None;
    }
    let route: u32 = group[..3].parse().ok()?;
    let shift: u32 = group[3..].parse().ok()?;

    Some(ShiftBadge {
        shift_name: format!("{}-{shift}", shift_route_name(route)),
        shift_trip: trip.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(line: &str, dest: &str) -> (String, String) {
        format_vitrasa_line(line, dest)
    }

    #[test]
    fn themed_renames() {
        for rename in THEMED_RENAMES {
            assert_eq!(
                fmt(rename.line, rename.destination),
                (
                    rename.display_line.to_string(),
                    rename.display_destination.to_string()
                )
            );
        }
        assert_eq!(fmt("FUT", "BALAÍDOS"), ("FUT".into(), "BALAÍDOS".into()));
        // Only applies to the themed line code.
        assert_eq!(
            fmt("15", "P. ESPAÑA-T.VIGO-S.BADÍA"),
            ("15".into(), "P. ESPAÑA-T.VIGO-S.BADÍA".into())
        );
    }

    #[test]
    fn out_of_service() {
        assert_eq!(
            fmt("C1", "FORA DE SERVIZO.G.B.*"),
            ("C1".into(), "García Barbón, 7 (fora de servizo)".into())
        );
    }

    #[test]
    fn line_a_variant_one() {
        assert_eq!(fmt("A", "\"1\" - Castrelos"), ("A1".into(), "Castrelos".into()));
        assert_eq!(fmt("A", "1 Castrelos"), ("A1".into(), "Castrelos".into()));
        assert_eq!(fmt("A", "1"), ("A1".into(), "".into()));
        assert_eq!(fmt("A", "12 Navia"), ("A".into(), "12 Navia".into()));
        assert_eq!(fmt("A", "Navia"), ("A".into(), "Navia".into()));
    }

    #[test]
    fn line_a_takes_any_leading_lone_one() {
        assert_eq!(fmt("A", "1ª Travesía"), ("A1".into(), "ª Travesía".into()));
        assert_eq!(fmt("A", "1.Bouzas"), ("A1".into(), "Bouzas".into()));
        assert_eq!(fmt("A", "10 Coia"), ("A".into(), "10 Coia".into()));
    }

    #[test]
    fn line_six_loses_quotes() {
        assert_eq!(fmt("6", "\"Hospital\""), ("6".into(), "Hospital".into()));
    }

    #[test]
    fn asterisks_are_dropped() {
        assert_eq!(fmt("4C", "Coia*"), ("4C".into(), "Coia".into()));
    }

    #[test]
    fn shift_badges() {
        let b = shift_badge(Feed::Vitrasa, "C1 04LN 02_001004_4").unwrap();
        assert_eq!(b.shift_name, "C1-4");
        assert_eq!(b.shift_trip, "4");

        let b = shift_badge(Feed::Vitrasa, "x_018012_7").unwrap();
        assert_eq!(b.shift_name, "L18-12");

        assert!(shift_badge(Feed::Vitrasa, "nounderscore").is_none());
        assert!(shift_badge(Feed::Vitrasa, "x_12345_1").is_none());
        assert!(shift_badge(Feed::Vitrasa, "x_abc123_1").is_none());
        assert!(shift_badge(Feed::Tussa, "x_001004_4").is_none());
    }

    #[test]
    fn shift_route_table() {
        assert_eq!(shift_route_name(30), "N1");
        assert_eq!(shift_route_name(500), "TUR");
        assert_eq!(shift_route_name(7), "L7");
    }
}
