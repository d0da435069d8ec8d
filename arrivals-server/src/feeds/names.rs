//! Stop, route and street name normalisation.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::domain::Feed;

static QUOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["”]"#).expect("valid regex"));

static STREET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)(?:,|\s\s|\s-\s| \d| S/N|\s\()").expect("valid regex")
});

/// Street name substitutions, first match wins.
const STREET_REPLACEMENTS: &[(&str, &str)] = &[
    ("Rúa da Salguera Entrada", "Rúa da Salgueira"),
    ("Rúa da Salgueira Entrada", "Rúa da Salgueira"),
    ("Estrada de Miraflores", "Estrada Miraflores"),
    ("Avda. de Europa", "Avda. Europa"),
    ("Avda. de Galicia", "Avda. Galicia"),
    ("Avda. de Vigo", "Avda. Vigo"),
    ("FORA DE SERVIZO.G.B.", ""),
    ("Praza de Fernando O Católico", ""),
    ("Rúa da Travesía de Vigo", "Travesía de Vigo"),
    ("Rúa de ", " "),
    ("Rúa do ", " "),
    ("Rúa da ", " "),
    ("Rúa das ", " "),
    ("Avda. de ", " "),
    ("Avda. do ", " "),
    ("Avda. da ", " "),
    ("Avda. das ", " "),
    ("Riós", "Ríos"),
    ("Avda. Beiramar Porto Pesqueiro Berbés", "Berbés"),
    ("Conde de Torrecedeira", "Torrecedeira"),
];

static STREET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    STREET_REPLACEMENTS
        .iter()
        .map(|&(from, to)| {
            let re = Regex::new(&format!("(?i){}", regex::escape(from))).expect("escaped literal");
            (re, to)
        })
        .collect()
});

/// Canonical public stop code.
///
/// Vitrasa codes may carry leading zeros or markup around the number;
/// only the digits are kept.
pub fn normalize_stop_code(feed: Feed, code: &str) -> String {
    if feed == Feed::Vitrasa {
        let digits: String = code.chars().filter(char::is_ascii_digit).collect();
        if let Ok(n) = digits.parse::<u64>() {
            return n.to_string();
        }
    }
    code.to_string()
}

/// Canonical route short name.
///
/// Xunta contract codes `XG` + 3-digit contract + line become
/// `"{contract}.{line:02}"`; shorter `XG` codes lose the prefix.
pub fn normalize_route_short_name(feed: Feed, short_name: &str) -> String {
    if feed == Feed::Xunta {
        if let Some(rest) = short_name.strip_prefix("XG") {
            if short_name.len() >= 8 {
                if let (Some(contract), Some(line)) = (rest.get(..3), rest.get(3..)) {
                    if let Ok(line) = line.parse::<u32>() {
                        return format!("{contract}.{line:02}");
                    }
                }
            } else if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }
    short_name.to_string()
}

/// Display form of a stop or destination name.
pub fn normalize_stop_name(feed: Feed, name: &str) -> String {
    if feed == Feed::Vitrasa {
        return name
            .trim()
            .replace('"', "")
            .replace("  ", ", ")
            .trim()
            .to_string();
    }
    name.to_string()
}

/// Lowercase ASCII letters and digits only, with diacritics folded away.
pub fn normalize_for_matching(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Whether two already-normalised names refer to the same destination.
pub fn is_route_match(a: &str, b: &str) -> bool {
    a == b || a.contains(b) || b.contains(a)
}

/// The street part of a stop name, as shown in marquees.
pub fn street_name(name: &str) -> String {
    let name = QUOTES.replace_all(name, "");
    let name = name.trim();
    let street = STREET
        .captures(name)
        .and_then(|c| c.get(1))
        .map_or(name, |m| m.as_str());

    for (pattern, replacement) in STREET_PATTERNS.iter() {
        if pattern.is_match(street) {
            return pattern.replace_all(street, *replacement).trim().to_string();
        }
    }

    street.trim().to_string()
}

/// Scrolling summary of the next stops, styled per feed.
pub fn marquee(feed: Feed, next_stops: &[String]) -> Option<String> {
    if next_stops.is_empty() {
        return None;
    }

    let text = match feed {
        Feed::Vitrasa | Feed::Tranvias | Feed::Tussa => {
            let mut seen = HashSet::new();
            let streets: Vec<String> = next_stops
                .iter()
                .map(|s| street_name(s))
                .filter(|s| !s.trim().is_empty())
                .filter(|s| seen.insert(s.clone()))
                .collect();
            streets.join(" - ")
        }
        Feed::Xunta => next_stops.join(" > "),
        _ => next_stops
            .iter()
            .take(4)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    };

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitrasa_stop_code_keeps_digits() {
        assert_eq!(normalize_stop_code(Feed::Vitrasa, "00140"), "140");
        assert_eq!(normalize_stop_code(Feed::Vitrasa, "P-1400"), "1400");
        assert_eq!(normalize_stop_code(Feed::Vitrasa, "ABC"), "ABC");
        assert_eq!(normalize_stop_code(Feed::Tussa, "0042"), "0042");
    }

    #[test]
    fn xunta_short_names() {
        assert_eq!(normalize_route_short_name(Feed::Xunta, "XG817014"), "817.14");
        assert_eq!(normalize_route_short_name(Feed::Xunta, "XG621005"), "621.05");
        assert_eq!(normalize_route_short_name(Feed::Xunta, "XG883"), "883");
        assert_eq!(normalize_route_short_name(Feed::Xunta, "XG"), "XG");
        assert_eq!(normalize_route_short_name(Feed::Xunta, "A5"), "A5");
        assert_eq!(normalize_route_short_name(Feed::Vitrasa, "XG817014"), "XG817014");
    }

    #[test]
    fn vitrasa_stop_names() {
        assert_eq!(
            normalize_stop_name(Feed::Vitrasa, "  Praza de América  \"Centro\" "),
            "Praza de América, Centro"
        );
        assert_eq!(normalize_stop_name(Feed::Tussa, " X "), " X ");
    }

    #[test]
    fn matching_folds_case_and_accents() {
        assert_eq!(normalize_for_matching(" Praza de España "), "prazadeespana");
        assert_eq!(normalize_for_matching("GARCÍA BARBÓN-7"), "garciabarbon7");
        assert_eq!(normalize_for_matching("Ñ"), "n");
    }

    #[test]
    fn route_match_is_symmetric_containment() {
        assert!(is_route_match("bouzas", "bouzas"));
        assert!(is_route_match("bouzas", "portobouzas"));
        assert!(is_route_match("portobouzas", "bouzas"));
        assert!(!is_route_match("bouzas", "coia"));
    }

    #[test]
    fn street_names() {
        assert_eq!(street_name("Rúa de Urzaiz, 51"), "Urzaiz");
        assert_eq!(street_name("Avda. de Europa 12"), "Avda. Europa");
        assert_eq!(street_name("Gran Vía  Plaza"), "Gran Vía");
        assert_eq!(street_name("Praza de Fernando O Católico"), "");
        assert_eq!(street_name("\"Conde de Torrecedeira\" - 5"), "Torrecedeira");
        assert_eq!(street_name("Rúa do Príncipe S/N"), "Príncipe");
        assert_eq!(street_name("Samil"), "Samil");
    }

    #[test]
    fn street_replacement_is_case_insensitive() {
        assert_eq!(street_name("RÚA DE URZAIZ, 1"), "URZAIZ");
    }

    #[test]
    fn marquee_styles() {
        let stops = vec![
            "Rúa de Urzaiz, 51".to_string(),
            "Rúa de Urzaiz, 90".to_string(),
            "Gran Vía, 12".to_string(),
        ];
        assert_eq!(
            marquee(Feed::Vitrasa, &stops).as_deref(),
            Some("Urzaiz - Gran Vía")
        );
        assert_eq!(
            marquee(Feed::Xunta, &stops).as_deref(),
            Some("Rúa de Urzaiz, 51 > Rúa de Urzaiz, 90 > Gran Vía, 12")
        );

        let many: Vec<String> = (1..=6).map(|i| format!("S{i}")).collect();
        assert_eq!(marquee(Feed::Renfe, &many).as_deref(), Some("S1, S2, S3, S4"));
        assert_eq!(marquee(Feed::Renfe, &[]), None);
    }
}
