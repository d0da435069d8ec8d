//! Feed prefixes and stop identifiers.

use std::fmt;

/// Error returned when parsing an identifier without a feed prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A transit operator, identified by the prefix of its GTFS ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Vitrasa, urban buses in Vigo.
    Vitrasa,
    /// Compañía de Tranvías de A Coruña.
    Tranvias,
    /// TUSSA, urban buses in Santiago de Compostela.
    Tussa,
    /// Xunta de Galicia inter-municipal coaches (zone fares).
    Xunta,
    Renfe,
    Feve,
    /// CTAG campus shuttle.
    Shuttle,
    Other,
}

impl Feed {
    /// Map a prefix such as `"vitrasa"` to a feed.
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "vitrasa" => Feed::Vitrasa,
            "tranvias" => Feed::Tranvias,
            "tussa" => Feed::Tussa,
            "xunta" => Feed::Xunta,
            "renfe" => Feed::Renfe,
            "feve" => Feed::Feve,
            "shuttle" => Feed::Shuttle,
            _ => Feed::Other,
        }
    }

    /// The feed of a prefixed id. Ids without a colon belong to `Other`.
    pub fn of(id: &str) -> Self {
        id.split_once(':')
            .map_or(Feed::Other, |(prefix, _)| Feed::from_prefix(prefix))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Vitrasa => "vitrasa",
            Feed::Tranvias => "tranvias",
            Feed::Tussa => "tussa",
            Feed::Xunta => "xunta",
            Feed::Renfe => "renfe",
            Feed::Feve => "feve",
            Feed::Shuttle => "shuttle",
            Feed::Other => "other",
        }
    }

    /// Urban feeds with live coverage hide arrivals that are already past.
    pub fn hides_past_arrivals(&self) -> bool {
        matches!(self, Feed::Vitrasa | Feed::Tranvias | Feed::Tussa)
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prefixed stop id such as `vitrasa:1400`.
///
/// # Examples
///
/// ```
/// use arrivals_server::domain::{Feed, StopId};
///
/// let id = StopId::parse("vitrasa:1400").unwrap();
/// assert_eq!(id.feed(), Feed::Vitrasa);
/// assert_eq!(id.local_id(), "1400");
/// assert!(StopId::parse("1400").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopId {
    raw: String,
    feed: Feed,
    split: usize,
}

impl StopId {
    /// Parse a `feed:local` id. Both halves must be non-empty.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();
        let split = s.find(':').ok_or(InvalidStopId {
            reason: "missing feed prefix",
        })?;

        if split == 0 {
            return Err(InvalidStopId {
                reason: "empty feed prefix",
            });
        }
        if split + 1 == s.len() {
            return Err(InvalidStopId {
                reason: "empty local id",
            });
        }

        Ok(Self {
            raw: s.to_string(),
            feed: Feed::from_prefix(&s[..split]),
            split,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    /// The feed prefix exactly as written.
    pub fn prefix(&self) -> &str {
        &self.raw[..self.split]
    }

    pub fn local_id(&self) -> &str {
        &self.raw[self.split + 1..]
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.raw)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_feeds() {
        assert_eq!(StopId::parse("vitrasa:1400").unwrap().feed(), Feed::Vitrasa);
        assert_eq!(StopId::parse("tranvias:42").unwrap().feed(), Feed::Tranvias);
        assert_eq!(StopId::parse("tussa:7").unwrap().feed(), Feed::Tussa);
        assert_eq!(StopId::parse("xunta:1530").unwrap().feed(), Feed::Xunta);
        assert_eq!(StopId::parse("shuttle:1").unwrap().feed(), Feed::Shuttle);
    }

    #[test]
    fn unknown_prefix_is_other() {
        let id = StopId::parse("metro:12").unwrap();
        assert_eq!(id.feed(), Feed::Other);
        assert_eq!(id.prefix(), "metro");
        assert_eq!(id.local_id(), "12");
    }

    #[test]
    fn local_id_may_contain_colons() {
        let id = StopId::parse("renfe:a:b").unwrap();
        assert_eq!(id.local_id(), "a:b");
    }

    #[test]
    fn reject_malformed() {
        assert!(StopId::parse("").is_err());
        assert!(StopId::parse("1400").is_err());
        assert!(StopId::parse(":1400").is_err());
        assert!(StopId::parse("vitrasa:").is_err());
    }

    #[test]
    fn feed_of_id() {
        assert_eq!(Feed::of("vitrasa:C1"), Feed::Vitrasa);
        assert_eq!(Feed::of("C1"), Feed::Other);
    }

    #[test]
    fn display_and_debug() {
        let id = StopId::parse("tussa:7").unwrap();
        assert_eq!(id.to_string(), "tussa:7");
        assert_eq!(format!("{id:?}"), "StopId(tussa:7)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-empty prefix and local id round-trip through parse.
        #[test]
        fn roundtrip(prefix in "[a-z]{1,10}", local in "[A-Za-z0-9_]{1,12}") {
            let raw = format!("{prefix}:{local}");
            let id = StopId::parse(&raw).unwrap();
            prop_assert_eq!(id.as_str(), raw.as_str());
            prop_assert_eq!(id.prefix(), prefix.as_str());
            prop_assert_eq!(id.local_id(), local.as_str());
        }

        /// Strings without a colon never parse.
        #[test]
        fn colonless_rejected(s in "[a-z0-9]{0,20}") {
            prop_assert!(StopId::parse(&s).is_err());
        }
    }
}
