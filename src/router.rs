//! Intent routing
//!
//! An ordered list of named rules. Each rule inspects the current turn and
//! session and either claims the turn with an [`Intent`] or passes. The first
//! rule to claim wins, so list order is the priority contract.

use crate::models::{SlotFrame, Topic};
use crate::session::Session;
use serde::Serialize;

/// Phrases that mark an explicit "how do I grow X" request
pub const GROWTH_TRIGGERS: &[&str] = &["i want to grow", "suggest conditions for", "how to grow"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Explicit request for growing conditions of a named crop
    GrowthGuidance { crop: String },
    /// Question about the crop in focus
    FollowUp { topic: Topic },
    /// Continue collecting slots, recommending once the frame is complete
    FillSlots,
}

/// Everything the rules may look at for one utterance
#[derive(Debug, Clone)]
pub struct Turn {
    pub lowered: String,
    /// Fields extracted from this utterance alone
    pub extracted: SlotFrame,
    /// First known crop named in the utterance
    pub crop_mention: Option<String>,
}

impl Turn {
    pub fn new(utterance: &str, extracted: SlotFrame, crop_mention: Option<String>) -> Self {
        Self {
            lowered: utterance.to_lowercase(),
            extracted,
            crop_mention,
        }
    }
}

pub type Rule = fn(&Turn, &Session) -> Option<Intent>;

pub struct IntentRouter {
    rules: Vec<(&'static str, Rule)>,
}

impl IntentRouter {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule at the lowest priority
    pub fn with_rule(mut self, name: &'static str, rule: Rule) -> Self {
        self.rules.push((name, rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(name, _)| *name).collect()
    }

    /// Resolve the intent for a turn. Falls back to slot filling when no
    /// rule claims it.
    pub fn resolve(&self, turn: &Turn, session: &Session) -> (&'static str, Intent) {
        self.rules
            .iter()
            .find_map(|(name, rule)| rule(turn, session).map(|intent| (*name, intent)))
            .unwrap_or(("fill_slots", Intent::FillSlots))
    }
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new()
            .with_rule("growth_guidance", growth_guidance)
            .with_rule("follow_up", follow_up)
            .with_rule("fill_slots", fill_slots)
    }
}

fn growth_guidance(turn: &Turn, _session: &Session) -> Option<Intent> {
    if !GROWTH_TRIGGERS.iter().any(|phrase| turn.lowered.contains(phrase)) {
        return None;
    }
    turn.crop_mention
        .clone()
        .map(|crop| Intent::GrowthGuidance { crop })
}

fn follow_up(turn: &Turn, session: &Session) -> Option<Intent> {
    session.last_crop.as_ref()?;
    Topic::ALL
        .iter()
        .find(|topic| turn.lowered.contains(topic.keyword()))
        .map(|topic| Intent::FollowUp { topic: *topic })
}

fn fill_slots(_turn: &Turn, _session: &Session) -> Option<Intent> {
    Some(Intent::FillSlots)
}
