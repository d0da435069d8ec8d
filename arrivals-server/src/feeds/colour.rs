//! Route colours: per-feed fallbacks and readable text colours.

use crate::domain::{Feed, RouteInfo};

/// Error returned for a colour that is not six hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour {value:?}: expected RRGGBB")]
pub struct InvalidColour {
    value: String,
}

/// Contrast ratio against white at or above which white text is used.
const WHITE_TEXT_MIN_CONTRAST: f64 = 2.5;

/// Default (background, text) colours for each feed.
pub fn fallback_colours(feed: Feed) -> (&'static str, &'static str) {
    match feed {
        Feed::Vitrasa => ("#81D002", "#000000"),
        Feed::Tussa => ("#508096", "#FFFFFF"),
        Feed::Tranvias => ("#E61C29", "#FFFFFF"),
        Feed::Xunta => ("#007BC4", "#FFFFFF"),
        Feed::Renfe => ("#870164", "#FFFFFF"),
        Feed::Feve => ("#EE3D32", "#FFFFFF"),
        _ => ("#000000", "#FFFFFF"),
    }
}

fn channel(hex: &str) -> f64 {
    let v = u8::from_str_radix(hex, 16).unwrap_or(0) as f64 / 255.0;
    if v <= 0.039_28 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// `#FFFFFF` or `#000000`, whichever reads better on `background`.
pub fn best_text_colour(background: &str) -> Result<&'static str, InvalidColour> {
    let hex = background.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InvalidColour {
            value: background.to_string(),
        });
    }

    let luminance =
        0.2126 * channel(&hex[0..2]) + 0.7152 * channel(&hex[2..4]) + 0.0722 * channel(&hex[4..6]);
    let contrast_with_white = 1.05 / (luminance + 0.05);

    Ok(if contrast_with_white >= WHITE_TEXT_MIN_CONTRAST {
        "#FFFFFF"
    } else {
        "#000000"
    })
}

/// Fill in missing or placeholder route colours.
///
/// Empty or pure white backgrounds take the feed defaults. Otherwise an
/// empty or pure black text colour is replaced by the best contrast.
pub fn apply_colour_fallback(feed: Feed, route: &mut RouteInfo) {
    let (colour, text) = fallback_colours(feed);
    let bare = |s: &str| s.trim_start_matches('#').to_ascii_uppercase();

    if route.colour.is_empty() || bare(&route.colour) == "FFFFFF" {
        route.colour = colour.to_string();
        route.text_colour = text.to_string();
    } else if route.text_colour.is_empty() || bare(&route.text_colour) == "000000" {
        route.text_colour = best_text_colour(&route.colour).unwrap_or(text).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(colour: &str, text: &str) -> RouteInfo {
        RouteInfo {
            gtfs_id: "vitrasa:1".into(),
            short_name: "1".into(),
            colour: colour.into(),
            text_colour: text.into(),
        }
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(best_text_colour("#000000"), Ok("#FFFFFF"));
        assert_eq!(best_text_colour("FFFFFF"), Ok("#000000"));
        assert_eq!(best_text_colour("#81D002"), Ok("#000000"));
        assert_eq!(best_text_colour("E61C29"), Ok("#FFFFFF"));
        assert_eq!(best_text_colour("007BC4"), Ok("#FFFFFF"));
    }

    #[test]
    fn contrast_rejects_malformed() {
        assert!(best_text_colour("FFF").is_err());
        assert!(best_text_colour("GGGGGG").is_err());
        assert!(best_text_colour("").is_err());
    }

    #[test]
    fn white_background_takes_feed_default() {
        let mut r = route("FFFFFF", "000000");
        apply_colour_fallback(Feed::Vitrasa, &mut r);
        assert_eq!(r.colour, "#81D002");
        assert_eq!(r.text_colour, "#000000");

        let mut r = route("", "");
        apply_colour_fallback(Feed::Other, &mut r);
        assert_eq!(r.colour, "#000000");
        assert_eq!(r.text_colour, "#FFFFFF");
    }

    #[test]
    fn black_text_is_recomputed() {
        let mut r = route("E61C29", "000000");
        apply_colour_fallback(Feed::Tranvias, &mut r);
        assert_eq!(r.colour, "E61C29");
        assert_eq!(r.text_colour, "#FFFFFF");
    }

    #[test]
    fn explicit_text_colour_is_kept() {
        let mut r = route("E61C29", "FFFF00");
        apply_colour_fallback(Feed::Tranvias, &mut r);
        assert_eq!(r.text_colour, "FFFF00");
    }
}
