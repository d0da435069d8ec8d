//! Route lists: de-duplication, Xunta contract collapsing and ordering.

use crate::domain::{Feed, RouteInfo};

/// Prefix groups at least this large are collapsed into one badge.
const ROUTE_COLLAPSE_THRESHOLD: usize = 5;

/// Remove duplicate short names (case-insensitive, first wins).
///
/// For Xunta, routes sharing their first three characters are then grouped;
/// groups of [`ROUTE_COLLAPSE_THRESHOLD`] or more become a single
/// `XG{prefix}` entry with the first member's id and colours.
pub fn consolidate_routes(feed: Feed, routes: Vec<RouteInfo>) -> Vec<RouteInfo> {
    let mut seen = std::collections::HashSet::new();
    let deduplicated: Vec<RouteInfo> = routes
        .into_iter()
        .filter(|r| seen.insert(r.short_name.to_lowercase()))
        .collect();

    if feed != Feed::Xunta {
        return deduplicated;
    }

    let mut groups: Vec<(String, Vec<RouteInfo>)> = Vec::new();
    for route in deduplicated {
        let key: String = route.short_name.chars().take(3).collect();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(route),
            None => groups.push((key, vec![route])),
        }
    }

    let mut result = Vec::new();
    for (prefix, members) in groups {
        if members.len() >= ROUTE_COLLAPSE_THRESHOLD {
            let first = &members[0];
            result.push(RouteInfo {
                gtfs_id: first.gtfs_id.clone(),
                short_name: format!("XG{prefix}"),
                colour: first.colour.clone(),
                text_colour: first.text_colour.clone(),
            });
        } else {
            result.extend(members);
        }
    }
    result
}

/// Ordering key for route badges.
///
/// Fields compare in order: group, alphabetic prefix, number, name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RouteSortKey {
    pub group: u8,
    pub prefix: String,
    pub number: u32,
    pub name: String,
}

fn extract_number(name: &str) -> Option<u32> {
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Vitrasa groups: circular `C<n>` lines, then regular lines, then hospital
/// `H` lines, then night, university, PSA and letter-only specials.
fn vitrasa_group(short_name: &str) -> u8 {
    let mut chars = short_name.chars();
    let first = chars.next();
    let second_is_digit = chars.next().is_some_and(|c| c.is_ascii_digit());

    match first {
        Some('C') if second_is_digit => 0,
        Some('H') => 2,
        Some('N' | 'U') if second_is_digit => 3,
        _ if short_name.to_ascii_uppercase().starts_with("PSA") => 3,
        _ if short_name.chars().count() >= 2 && short_name.chars().all(char::is_alphabetic) => 3,
        _ => 1,
    }
}

/// Sort key for a route given its short name and prefixed GTFS id.
///
/// Outside Vitrasa, letter-only names come first, then numbers ascending.
pub fn route_sort_key(short_name: &str, route_id: Option<&str>) -> RouteSortKey {
    if short_name.is_empty() {
        return RouteSortKey {
            group: 99,
            prefix: String::new(),
            number: u32::MAX,
            name: String::new(),
        };
    }

    let number = extract_number(short_name);

    if route_id.map(Feed::of) == Some(Feed::Vitrasa) {
        let group = vitrasa_group(short_name);
        let prefix = if group == 3 {
            short_name.chars().take_while(|c| c.is_alphabetic()).collect()
        } else {
            String::new()
        };
        let number = number
            .or_else(|| {
                route_id
                    .and_then(|id| id.rsplit(':').next())
                    .and_then(|local| local.parse().ok())
            })
            .unwrap_or(u32::MAX);

        return RouteSortKey {
            group,
            prefix,
            number,
            name: short_name.to_string(),
        };
    }

    RouteSortKey {
        group: u8::from(number.is_some()),
        prefix: String::new(),
        number: number.unwrap_or(u32::MAX),
        name: short_name.to_string(),
    }
}
