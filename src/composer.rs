//! Response composition
//!
//! Pure string templating over knowledge base lookups. Missing facts render
//! as empty text.

use crate::knowledge::KnowledgeBase;
use crate::models::{Slot, SlotFrame, Topic};

/// Candidate "try asking" hints appended to a recommendation
pub const SUGGESTIONS: &[&str] = &[
    "✅ Want tips for increasing yield?",
    "💧 Curious how much water your crop needs?",
    "🌱 Want to know similar crops for your climate?",
    "🛆 Ask what fertilizer brands are good.",
    "🧪 Curious about organic vs chemical farming?",
];

/// Uppercase the first character, lowercase the rest
pub fn display_name(crop: &str) -> String {
    let mut chars = crop.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Format a slot value the way it was understood, always with a fraction
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

pub fn growth_guidance(kb: &KnowledgeBase, crop: &str) -> String {
    format!(
        "🌾 To grow **{}**, here are the ideal conditions:\n\n\
         📘 _Why?_ {}\n\n\
         💧 _Water:_ {}\n\n\
         📅 _Best Season:_ {}\n\n\
         🧪 _Fertilizer Tip:_ {}",
        display_name(crop),
        kb.explanation(crop),
        kb.water(crop),
        kb.season(crop),
        kb.fertilizer(crop),
    )
}

pub fn follow_up(kb: &KnowledgeBase, crop: &str, topic: Topic) -> String {
    let name = display_name(crop);
    match topic {
        Topic::Fertilizer => format!("🧪 For **{}**, use:\n\n{}", name, kb.fertilizer(crop)),
        Topic::Season => format!("📅 Best planting time for **{}**:\n\n{}", name, kb.season(crop)),
        Topic::Water => format!("💧 Water needs for **{}**:\n\n{}", name, kb.water(crop)),
        Topic::Organic => format!(
            "🌿 Organic vs Chemical for **{}**:\n\n{}",
            name,
            kb.organic_vs_chemical(crop)
        ),
        Topic::Similar => format!(
            "🌱 Similar crops to **{}**: {}",
            name,
            kb.similar(crop).join(", ")
        ),
    }
}

/// Acknowledge the values understood this turn
pub fn acknowledgment(extracted: &SlotFrame) -> String {
    let noted = extracted
        .iter()
        .map(|(slot, value)| format!("{}: {}", slot.key().to_uppercase(), format_value(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("✅ Got it: {}", noted)
}

pub fn missing_prompt(missing: &[Slot]) -> String {
    let ask = missing
        .iter()
        .map(|slot| slot.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!("🤖 Just need your {} to make the best suggestion! 🌿", ask)
}

pub fn recommendation(kb: &KnowledgeBase, crop: &str, suggestion: &str) -> String {
    format!(
        "🌿 I recommend **{}** based on your inputs!\n\n\
         📘 _Why?_ {}\n\n\
         🧪 _Fertilizer Tip:_ {}\n\n\
         📅 _Best Planting Time:_ {}\n\n\
         💬 Try asking: **{}**",
        display_name(crop),
        kb.explanation(crop),
        kb.fertilizer(crop),
        kb.season(crop),
        suggestion,
    )
}
