//! Cash and card fare totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Feed;

use super::table::ZoneFareTable;

/// Money in euro cents.
pub type Cents = u32;

pub fn to_euros(cents: Cents) -> f64 {
    f64::from(cents) / 100.0
}

const VITRASA_CASH: Cents = 163;
const VITRASA_CARD: Cents = 67;
const TRANVIAS_CASH: Cents = 130;
const TRANVIAS_CARD: Cents = 45;
const TUSSA_CASH: Cents = 100;
const TUSSA_CARD: Cents = 36;

/// Transfer window for Xunta card tickets.
const XUNTA_WINDOW_MINUTES: i64 = 60;

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareLeg {
    /// Feed prefix, e.g. `vitrasa`.
    pub feed_id: String,
    pub start_time: DateTime<Utc>,
    pub from_zone_id: Option<String>,
    pub to_zone_id: Option<String>,
    /// Transport mode; `WALK` legs are free.
    #[serde(default)]
    pub mode: Option<String>,
}

impl FareLeg {
    fn feed(&self) -> Feed {
        Feed::from_prefix(&self.feed_id)
    }

    fn is_walk(&self) -> bool {
        self.mode
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("WALK"))
    }

    fn zones(&self) -> Option<(&str, &str)> {
        Some((self.from_zone_id.as_deref()?, self.to_zone_id.as_deref()?))
    }
}

/// Fare totals; each `*_is_total` is false when some leg could not be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FareResult {
    pub cash: Cents,
    pub cash_is_total: bool,
    pub card: Cents,
    pub card_is_total: bool,
}

/// A card ticket bought during the itinerary.
#[derive(Debug)]
struct Ticket {
    feed: Feed,
    purchased_at: DateTime<Utc>,
    start_zone: Option<String>,
    used_times: u32,
    total_paid: Cents,
}

impl Ticket {
    fn covers(&self, feed: Feed, at: DateTime<Utc>, window_minutes: i64, max_uses: u32) -> bool {
        self.feed == feed
            && (at - self.purchased_at).num_seconds() <= window_minutes * 60
            && self.used_times < max_uses
    }
}

/// Card terms for one leg.
struct CardTerms {
    fare: Cents,
    window_minutes: i64,
    max_uses: u32,
}

/// Price an itinerary, ignoring walking legs.
pub fn calculate_fare(legs: &[FareLeg], table: &ZoneFareTable) -> FareResult {
    let transit: Vec<FareLeg> = legs.iter().filter(|l| !l.is_walk()).cloned().collect();

    let (cash, cash_is_total) = cash_total(&transit, table);
    let (card, card_is_total) = card_total(&transit, table);

    FareResult {
        cash,
        cash_is_total,
        card,
        card_is_total,
    }
}

/// Sum of single cash fares. Unpriceable legs are skipped and flagged.
pub fn cash_total(legs: &[FareLeg], table: &ZoneFareTable) -> (Cents, bool) {
    let mut total = 0;
    let mut complete = true;

    for leg in legs {
        let price = match leg.feed() {
            Feed::Vitrasa => Some(VITRASA_CASH),
            Feed::Tranvias => Some(TRANVIAS_CASH),
            Feed::Tussa => Some(TUSSA_CASH),
            Feed::Xunta => leg
                .zones()
                .and_then(|(from, to)| table.price(from, to))
                .map(|r| r.cash),
            _ => None,
        };

        match price {
            Some(p) => total += p,
            None => {
                warn!(feed = %leg.feed_id, "no cash fare for leg");
                complete = false;
            }
        }
    }

    (total, complete)
}

/// Card total, carrying a wallet of tickets across the itinerary.
///
/// A leg rides on the first ticket of the same feed still inside its
/// transfer window and below its usage cap. In Xunta metropolitan areas the
/// transfer instead pays the difference between the fare from the ticket's
/// original zone to this leg's destination and what the ticket has cost so
/// far.
pub fn card_total(legs: &[FareLeg], table: &ZoneFareTable) -> (Cents, bool) {
    let mut wallet: Vec<Ticket> = Vec::new();
    let mut total = 0;
    let mut complete = true;

    for leg in legs {
        let feed = leg.feed();
        let terms = match feed {
            Feed::Vitrasa => CardTerms {
                fare: VITRASA_CARD,
                window_minutes: 45,
                max_uses: 3,
            },
            Feed::Tranvias => CardTerms {
                fare: TRANVIAS_CARD,
                window_minutes: 45,
                max_uses: 2,
            },
            Feed::Tussa => CardTerms {
                fare: TUSSA_CARD,
                window_minutes: 60,
                max_uses: 2,
            },
            Feed::Xunta => {
                let Some(record) = leg.zones().and_then(|(from, to)| table.price(from, to)) else {
                    warn!(
                        from = ?leg.from_zone_id,
                        to = ?leg.to_zone_id,
                        "no zone price for xunta leg"
                    );
                    complete = false;
                    continue;
                };
                CardTerms {
                    fare: record.card,
                    window_minutes: XUNTA_WINDOW_MINUTES,
                    max_uses: if record.is_metropolitan() { 3 } else { 1 },
                }
            }
            _ => {
                warn!(feed = %leg.feed_id, "no card fare for leg");
                complete = false;
                continue;
            }
        };

        let ticket = wallet
            .iter_mut()
            .find(|t| t.covers(feed, leg.start_time, terms.window_minutes, terms.max_uses));

        match ticket {
            Some(ticket) if feed == Feed::Xunta && terms.max_uses > 1 => {
                let upgrade = ticket
                    .start_zone
                    .as_deref()
                    .zip(leg.to_zone_id.as_deref())
                    .and_then(|(from, to)| table.price(from, to));

                match upgrade {
                    Some(record) => {
                        let cost = record.card.saturating_sub(ticket.total_paid);
                        total += cost;
                        ticket.total_paid += cost;
                        ticket.used_times += 1;
                        debug!(cost, paid = ticket.total_paid, "metropolitan transfer upgrade");
                    }
                    None => {
                        total += terms.fare;
                        wallet.push(buy(leg, feed, terms.fare));
                    }
                }
            }
            Some(ticket) => {
                ticket.used_times += 1;
                debug!(feed = %leg.feed_id, uses = ticket.used_times, "free transfer");
            }
            None => {
                total += terms.fare;
                wallet.push(buy(leg, feed, terms.fare));
                debug!(feed = %leg.feed_id, fare = terms.fare, "new ticket");
            }
        }
    }

    (total, complete)
}

fn buy(leg: &FareLeg, feed: Feed, fare: Cents) -> Ticket {
    Ticket {
        feed,
        purchased_at: leg.start_time,
        start_zone: leg.from_zone_id.clone(),
        used_times: 1,
        total_paid: fare,
    }
}
