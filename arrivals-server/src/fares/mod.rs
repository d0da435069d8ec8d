//! Fare estimation for multi-leg itineraries.
//!
//! Cash fares are a plain sum per boarding. Card fares model a wallet of
//! tickets with per-operator transfer windows and usage caps; Xunta coaches
//! price by origin/destination zone and, inside metropolitan areas, charge
//! the difference when a transfer extends the journey.

mod engine;
mod table;

pub use engine::{Cents, FareLeg, FareResult, calculate_fare, card_total, cash_total, to_euros};
pub use table::{FareTableError, PriceRecord, ZoneFareTable};
