//! Per-operator normalisation of names, codes and colours.
//!
//! Every function branches on [`Feed`](crate::domain::Feed); feeds without a
//! rule pass their input through unchanged. Operator facts that are pure
//! lookups (themed line renames, shift route names, the Coruña fleet) live
//! in data tables so they can be checked on their own.

mod colour;
mod fleet;
mod lines;
mod names;
mod routes;

pub use colour::{InvalidColour, apply_colour_fallback, best_text_colour, fallback_colours};
pub use fleet::{FleetEntry, vehicle_badge};
pub use lines::{THEMED_RENAMES, ThemedRename, format_vitrasa_line, shift_badge, shift_route_name};
pub use names::{
    is_route_match, marquee, normalize_for_matching, normalize_route_short_name,
    normalize_stop_code, normalize_stop_name, street_name,
};
pub use routes::{RouteSortKey, consolidate_routes, route_sort_key};
