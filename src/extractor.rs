//! Field extraction
//!
//! Pulls the seven numeric slots out of free text with one compiled pattern
//! per slot. Every alias is matched case-insensitively as a whole token, so
//! `p` never matches the front of `ph`, single-letter aliases never match
//! the tail of another word (`rain`, `temp`) and oxide notation such as
//! `P2O5` or `K2O` is not read as a value. Glued forms like `n40` are ignored.

use crate::models::{Slot, SlotFrame};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Separator between a field name and its value: `=`, `is`, `:` or whitespace
const SEPARATOR: &str = r"\s*(?:=|\bis\b|:)?\s*";
const NUMBER: &str = r"(\d+(?:\.\d+)?)";

fn aliases(slot: Slot) -> &'static str {
    match slot {
        Slot::N => "n|nitrogen",
        Slot::P => "p|phosphorus",
        Slot::K => "k|potassium",
        Slot::Temp => "temp|temperature",
        Slot::Humidity => "humidity",
        Slot::Ph => "ph",
        Slot::Rain => "rain|rainfall",
    }
}

fn build_pattern(slot: Slot) -> Regex {
    let pattern = format!(r"(?i)\b(?:{})\b{}{}", aliases(slot), SEPARATOR, NUMBER);
    Regex::new(&pattern).expect("slot pattern is a valid regex")
}

lazy_static! {
    static ref SLOT_PATTERNS: Vec<(Slot, Regex)> = Slot::ALL
        .iter()
        .map(|slot| (*slot, build_pattern(*slot)))
        .collect();
}

/// Extract every slot mentioned in `utterance`.
///
/// Only the first match per slot is taken; slots with no match are absent.
pub fn extract(utterance: &str) -> SlotFrame {
    let mut frame = SlotFrame::new();

    for (slot, pattern) in SLOT_PATTERNS.iter() {
        let value = pattern
            .captures(utterance)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());

        if let Some(value) = value {
            frame.insert(*slot, value);
        }
    }

    if !frame.is_empty() {
        debug!(fields = frame.len(), "Extracted slot values");
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nitrogen_forms() {
        for text in ["nitrogen 40", "n=40", "N: 40", "Nitrogen is 40", "my n 40 please"] {
            let frame = extract(text);
            assert_eq!(frame.get(Slot::N), Some(40.0), "input: {}", text);
            assert_eq!(frame.len(), 1, "input: {}", text);
        }
    }

    #[test]
    fn test_full_sentence() {
        let frame = extract(
            "N=90, P=42, K=43, temperature 20.8, humidity is 82, ph: 6.5, rainfall 202.9",
        );

        let reading = frame.complete().expect("all slots present");
        assert_eq!(reading.features(), [90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]);
    }

    #[test]
    fn test_phosphorus_and_ph_do_not_collide() {
        let frame = extract("ph 6.5 p 42");
        assert_eq!(frame.get(Slot::Ph), Some(6.5));
        assert_eq!(frame.get(Slot::P), Some(42.0));

        let frame = extract("pH 7");
        assert_eq!(frame.get(Slot::Ph), Some(7.0));
        assert_eq!(frame.get(Slot::P), None);

        let frame = extract("phosphorus 30");
        assert_eq!(frame.get(Slot::P), Some(30.0));
        assert_eq!(frame.get(Slot::Ph), None);
    }

    #[test]
    fn test_single_letters_need_whole_tokens() {
        let frame = extract("rain 120 temp 25");
        assert_eq!(frame.get(Slot::Rain), Some(120.0));
        assert_eq!(frame.get(Slot::Temp), Some(25.0));
        assert_eq!(frame.get(Slot::N), None);
        assert_eq!(frame.get(Slot::P), None);
    }

    #[test]
    fn test_oxide_notation_is_not_a_value() {
        let frame = extract("apply P2O5 60 and K2O 40");
        assert_eq!(frame.get(Slot::P), None);
        assert_eq!(frame.get(Slot::K), None);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_alias_glued_to_number_is_ignored() {
        assert_eq!(extract("n40").get(Slot::N), None);
        assert_eq!(extract("ph6.5").get(Slot::Ph), None);
        assert_eq!(extract("temp25").get(Slot::Temp), None);
        assert_eq!(extract("n=40").get(Slot::N), Some(40.0));
    }

    #[test]
    fn test_first_match_wins() {
        let frame = extract("k 10 and later k 99");
        assert_eq!(frame.get(Slot::K), Some(10.0));
    }

    #[test]
    fn test_no_fields() {
        assert!(extract("hello there").is_empty());
        assert!(extract("nitrogen is high").is_empty());
    }
}
