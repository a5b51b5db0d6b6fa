//! Maps a lookup result into display cards.
//!
//! Everything here is pure: [`present`] borrows its input and builds a fresh
//! [`RenderedList`]. Backend strings are untrusted and pass through
//! [`sanitize`] before they reach the terminal.

use crate::models::{ResourceQueryResult, ResourceRecord};

pub const EMPTY_PLACEHOLDER: &str = "No resources found nearby";
pub const DISTANCE_MARKER: &str = "📍";
pub const DISTANCE_UNIT: &str = "km away";

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedList {
    Placeholder(String),
    Cards(Vec<ResourceCard>),
}

impl RenderedList {
    pub fn cards(&self) -> &[ResourceCard] {
        match self {
            RenderedList::Cards(cards) => cards,
            RenderedList::Placeholder(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCard {
    pub name: String,
    pub kind: String,
    pub address: String,
    pub phone: Option<PhoneContact>,
    /// Distance in km with exactly two decimals, e.g. `"3.14"`.
    pub distance: String,
}

impl ResourceCard {
    pub fn distance_label(&self) -> String {
        format!("{} {} {}", DISTANCE_MARKER, self.distance, DISTANCE_UNIT)
    }
}

/// A dialable contact reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneContact {
    pub number: String,
    pub href: String,
}

impl PhoneContact {
    fn new(raw: &str) -> Self {
        let dialable: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '*' | '#' | '(' | ')' | '-' | '.'))
            .collect();
        Self {
            number: sanitize(raw),
            href: format!("tel:{}", dialable),
        }
    }
}

pub fn present(result: &ResourceQueryResult) -> RenderedList {
    if result.is_empty() {
        return RenderedList::Placeholder(EMPTY_PLACEHOLDER.to_string());
    }
    RenderedList::Cards(result.resources.iter().map(card).collect())
}

fn card(record: &ResourceRecord) -> ResourceCard {
    ResourceCard {
        name: sanitize(&record.name),
        kind: sanitize(&record.kind),
        address: sanitize(&record.address),
        phone: record
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PhoneContact::new),
        distance: format!("{:.2}", record.distance_km),
    }
}

/// Makes an untrusted string safe to draw in a terminal cell.
///
/// Control characters (ESC in particular) and bidi overrides become spaces,
/// then whitespace runs collapse to one space.
pub fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() || is_bidi_control(c) { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{200E}' | '\u{200F}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, phone: Option<&str>, distance_km: f64) -> ResourceRecord {
        ResourceRecord {
            name: name.to_string(),
            kind: "shelter".to_string(),
            address: "1 Main St".to_string(),
            phone: phone.map(str::to_string),
            distance_km,
        }
    }

    fn result(records: Vec<ResourceRecord>) -> ResourceQueryResult {
        ResourceQueryResult { resources: records }
    }

    #[test]
    fn empty_result_is_single_placeholder() {
        assert_eq!(
            present(&ResourceQueryResult::default()),
            RenderedList::Placeholder("No resources found nearby".to_string())
        );
        assert!(present(&ResourceQueryResult::default()).cards().is_empty());
    }

    #[test]
    fn distance_has_two_decimals() {
        let rendered = present(&result(vec![
            record("A", None, 3.14159),
            record("B", None, 0.0),
        ]));
        let cards = rendered.cards();
        assert_eq!(cards[0].distance, "3.14");
        assert_eq!(cards[1].distance, "0.00");
        assert_eq!(cards[0].distance_label(), "📍 3.14 km away");
    }

    #[test]
    fn phone_line_only_when_present() {
        let rendered = present(&result(vec![
            record("No phone", None, 1.0),
            record("Phone", Some("555-1234"), 1.0),
            record("Blank phone", Some("  "), 1.0),
        ]));
        let cards = rendered.cards();
        assert!(cards[0].phone.is_none());
        let phone = cards[1].phone.as_ref().unwrap();
        assert_eq!(phone.number, "555-1234");
        assert_eq!(phone.href, "tel:555-1234");
        assert!(cards[2].phone.is_none());
    }

    #[test]
    fn cards_keep_input_order() {
        let rendered = present(&result(vec![
            record("Far", None, 9.0),
            record("Near", None, 1.0),
        ]));
        let names: Vec<_> = rendered.cards().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Far", "Near"]);
    }

    #[test]
    fn terminal_escapes_are_neutralised() {
        assert_eq!(sanitize("Safe\x1b[2J\x1b]0;pwned\x07 Haven"), "Safe [2J ]0;pwned Haven");
        assert_eq!(sanitize("Line one\nLine\ttwo"), "Line one Line two");
        assert_eq!(sanitize("abc\u{202E}fed"), "abc fed");
    }

    #[test]
    fn tel_href_keeps_only_dialable_characters() {
        let rendered = present(&result(vec![record(
            "A",
            Some("+1 (555) 123-4567\"><script>"),
            1.0,
        )]));
        let phone = rendered.cards()[0].phone.as_ref().unwrap();
        assert_eq!(phone.href, "tel:+1(555)123-4567");
    }

    proptest! {
        #[test]
        fn present_is_idempotent(
            names in proptest::collection::vec("[^\\x00]{0,24}", 0..6),
            distance in 0.0f64..20_000.0,
        ) {
            let input = result(names.iter().map(|n| record(n, Some(n), distance)).collect());
            let snapshot = input.clone();
            prop_assert_eq!(present(&input), present(&input));
            prop_assert_eq!(input, snapshot);
        }

        #[test]
        fn distance_always_rounds_to_two_places(distance in 0.0f64..20_000.0) {
            let rendered = present(&result(vec![record("A", None, distance)]));
            let shown = &rendered.cards()[0].distance;
            let (_, decimals) = shown.split_once('.').unwrap();
            prop_assert_eq!(decimals.len(), 2);
            prop_assert!((shown.parse::<f64>().unwrap() - distance).abs() <= 0.005 + 1e-9);
        }
    }
}
