//! Xunta zone-to-zone price table.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::engine::Cents;

/// Stored prices of zero mean the pair has no direct tariff; they are
/// priced at this sentinel (100 €) instead of being free.
const FORBIDDEN_PRICE: Cents = 10_000;

/// Zone codes are matched on their municipality prefix.
const ZONE_PREFIX_LEN: usize = 5;

/// Errors from loading the price table.
#[derive(Debug, thiserror::Error)]
pub enum FareTableError {
    #[error("failed to read fare table: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed fare table: {0}")]
    Csv(#[from] csv::Error),
}

/// One origin/destination price pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    /// Metropolitan transport area (`bonificacion`), e.g. `ATM Vigo`.
    pub metro_area: Option<String>,
    pub cash: Cents,
    pub card: Cents,
}

impl PriceRecord {
    /// Whether the record belongs to a metropolitan area with transfers.
    pub fn is_metropolitan(&self) -> bool {
        self.metro_area
            .as_deref()
            .and_then(|a| a.get(..3))
            .is_some_and(|p| p.eq_ignore_ascii_case("ATM"))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    conc_inicio: String,
    conc_fin: String,
    bonificacion: Option<String>,
    efectivo: f64,
    tpg: f64,
}

fn to_cents(euros: f64) -> Cents {
    (euros * 100.0).round().max(0.0) as Cents
}

/// Immutable price matrix keyed by (origin, destination) municipality.
#[derive(Debug, Clone, Default)]
pub struct ZoneFareTable {
    prices: HashMap<(String, String), PriceRecord>,
}

impl ZoneFareTable {
    /// An empty table; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a CSV file with columns `conc_inicio, conc_fin,
    /// bonificacion, efectivo, tpg`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FareTableError> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            pairs = table.len(),
            "loaded zone fare table"
        );
        Ok(table)
    }

    /// Parse CSV data. The first row wins when a pair repeats.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, FareTableError> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut prices = HashMap::new();

        for row in csv.deserialize::<CsvRow>() {
            let row = row?;
            prices
                .entry((row.conc_inicio, row.conc_fin))
                .or_insert_with(|| PriceRecord {
                    metro_area: row.bonificacion.filter(|a| !a.is_empty()),
                    cash: to_cents(row.efectivo),
                    card: to_cents(row.tpg),
                });
        }

        Ok(Self { prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Price between two zone codes, looked up by municipality prefix.
    ///
    /// Zero prices come back as the forbidden-route sentinel.
    pub fn price(&self, origin_zone: &str, destination_zone: &str) -> Option<PriceRecord> {
        let origin = origin_zone.get(..ZONE_PREFIX_LEN)?;
        let destination = destination_zone.get(..ZONE_PREFIX_LEN)?;

        let mut record = self
            .prices
            .get(&(origin.to_string(), destination.to_string()))?
            .clone();

        if record.cash == 0 {
            record.cash = FORBIDDEN_PRICE;
        }
        if record.card == 0 {
            record.card = FORBIDDEN_PRICE;
        }
        Some(record)
    }
}
