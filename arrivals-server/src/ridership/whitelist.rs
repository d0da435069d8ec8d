//! Stops with published ridership data.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

/// Errors from loading the whitelist.
#[derive(Debug, thiserror::Error)]
pub enum WhitelistError {
    #[error("failed to read whitelist: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed whitelist: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct WhitelistRow {
    codigo: String,
}

/// Normalised Vitrasa stop codes whose usage data is worth fetching.
#[derive(Debug, Clone, Default)]
pub struct RidershipWhitelist {
    codes: HashSet<String>,
}

impl RidershipWhitelist {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a CSV file with a `codigo` column.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WhitelistError> {
        let file = std::fs::File::open(path.as_ref())?;
        let whitelist = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            stops = whitelist.len(),
            "loaded ridership whitelist"
        );
        Ok(whitelist)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, WhitelistError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut codes = HashSet::new();
        for row in csv.deserialize::<WhitelistRow>() {
            let row = row?;
            if !row.codigo.is_empty() {
                codes.insert(row.codigo);
            }
        }
        Ok(Self { codes })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl FromIterator<String> for RidershipWhitelist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}
