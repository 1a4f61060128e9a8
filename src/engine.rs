//! Dialogue engine - one synchronous pass per utterance
//!
//! EXTRACT → MERGE → ROUTE → RESPOND
//!
//! The engine itself is read-only and shared; all conversation state lives
//! in the [`Session`] passed to each call.

use crate::chart::NutrientChart;
use crate::classifier::CropClassifier;
use crate::composer;
use crate::crops::CropMatcher;
use crate::extractor;
use crate::knowledge::KnowledgeBase;
use crate::models::MessageRole;
use crate::router::{Intent, IntentRouter, Turn};
use crate::session::Session;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Outcome of a single turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub intent: Intent,
    /// Separate bot message listing the values understood this turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Present whenever a response was produced and a reading is on record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<NutrientChart>,
}

pub struct DialogueEngine {
    knowledge: Arc<KnowledgeBase>,
    classifier: Arc<dyn CropClassifier>,
    matcher: CropMatcher,
    router: IntentRouter,
    rng: Mutex<StdRng>,
}

impl DialogueEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>, classifier: Arc<dyn CropClassifier>) -> Self {
        let matcher = CropMatcher::from_knowledge(&knowledge);
        Self {
            knowledge,
            classifier,
            matcher,
            router: IntentRouter::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Make suggestion picking reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_router(mut self, router: IntentRouter) -> Self {
        self.router = router;
        self
    }

    /// Handle one utterance using the engine's own RNG
    pub fn respond(&self, session: &mut Session, utterance: &str) -> Result<TurnReply> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.respond_with(session, utterance, &mut *rng)
    }

    /// Handle one utterance with an injected RNG
    pub fn respond_with(
        &self,
        session: &mut Session,
        utterance: &str,
        rng: &mut dyn RngCore,
    ) -> Result<TurnReply> {
        session.history.push(MessageRole::User, utterance);

        let extracted = extractor::extract(utterance);
        session.slots.merge(&extracted);

        let turn = Turn::new(utterance, extracted, self.matcher.match_crop(utterance));
        let (rule, intent) = self.router.resolve(&turn, session);
        info!(rule, filled = session.slots.len(), "Routed utterance");

        let mut acknowledgment = None;
        let response = match &intent {
            Intent::GrowthGuidance { crop } => {
                session.last_crop = Some(crop.clone());
                composer::growth_guidance(&self.knowledge, crop)
            }
            Intent::FollowUp { topic } => {
                let crop = session.last_crop.as_deref().unwrap_or_default();
                composer::follow_up(&self.knowledge, crop, *topic)
            }
            Intent::FillSlots => {
                let text = self.fill_slots(session, rng)?;
                if !turn.extracted.is_empty() {
                    let ack = composer::acknowledgment(&turn.extracted);
                    session.history.push(MessageRole::Bot, ack.clone());
                    acknowledgment = Some(ack);
                }
                text
            }
        };

        let response = (!response.is_empty()).then_some(response);
        if let Some(text) = &response {
            session.history.push(MessageRole::Bot, text.clone());
        }

        let chart = match (&response, &session.last_inputs, &session.last_crop) {
            (Some(_), Some(reading), Some(crop)) => Some(NutrientChart::from_reading(crop, reading)),
            _ => None,
        };

        Ok(TurnReply {
            intent,
            acknowledgment,
            response,
            chart,
        })
    }

    /// Prompt for missing slots, or recommend once the frame is complete
    fn fill_slots(&self, session: &mut Session, rng: &mut dyn RngCore) -> Result<String> {
        let Some(reading) = session.slots.complete() else {
            let missing = session.slots.missing();
            debug!(missing = missing.len(), "Frame incomplete");
            return Ok(composer::missing_prompt(&missing));
        };

        let label = self.classifier.predict(&reading).map_err(|e| {
            warn!(error = %e, "Recommendation failed, keeping collected values");
            e
        })?;
        let crop = label.to_lowercase();

        info!(crop = %crop, "Recommending crop");
        session.last_crop = Some(crop.clone());
        session.last_inputs = Some(reading);
        session.slots.clear();

        let suggestion = composer::SUGGESTIONS.choose(rng).copied().unwrap_or_default();
        Ok(composer::recommendation(&self.knowledge, &crop, suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CentroidClassifier;
    use crate::error::CropBuddyError;
    use crate::models::{Slot, SoilReading, Topic};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RICE_INPUT: &str =
        "n 90 p 42 k 43 temperature 20.8 humidity 82 ph 6.5 rainfall 202.9";

    /// Returns a fixed label and counts calls
    struct FixedClassifier {
        label: &'static str,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CropClassifier for FixedClassifier {
        fn predict(&self, _reading: &SoilReading) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label.to_string())
        }
    }

    struct FailingClassifier;

    impl CropClassifier for FailingClassifier {
        fn predict(&self, _reading: &SoilReading) -> Result<String> {
            Err(CropBuddyError::Classifier("model unavailable".to_string()))
        }
    }

    /// All-zero RNG; always picks the first suggestion
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    fn engine_with(classifier: Arc<dyn CropClassifier>) -> DialogueEngine {
        DialogueEngine::new(KnowledgeBase::builtin(), classifier).with_seed(7)
    }

    #[test]
    fn test_rice_recommendation() {
        let classifier = FixedClassifier::new("Rice");
        let engine = engine_with(classifier.clone());
        let kb = KnowledgeBase::builtin();
        let mut session = Session::new();

        let reply = engine
            .respond_with(&mut session, RICE_INPUT, &mut ZeroRng)
            .unwrap();
        let text = reply.response.unwrap();

        assert_eq!(reply.intent, Intent::FillSlots);
        assert!(text.contains("**Rice**"));
        assert!(text.contains(kb.explanation("rice")));
        assert!(text.contains(kb.fertilizer("rice")));
        assert!(text.contains(kb.season("rice")));
        assert!(text.ends_with("💬 Try asking: **✅ Want tips for increasing yield?**"));

        assert_eq!(classifier.calls(), 1);
        assert!(session.slots.is_empty());
        assert_eq!(session.last_crop.as_deref(), Some("rice"));
        assert_eq!(
            session.last_inputs.map(|r| r.features()),
            Some([90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9])
        );

        let chart = reply.chart.expect("chart after recommendation");
        assert_eq!(chart.title, "NPK for Rice");
    }

    #[test]
    fn test_shipped_classifier_recommends_rice() {
        let engine = engine_with(Arc::new(CentroidClassifier::default()));
        let mut session = Session::new();

        engine.respond(&mut session, RICE_INPUT).unwrap();
        assert_eq!(session.last_crop.as_deref(), Some("rice"));
    }

    #[test]
    fn test_slots_accumulate_across_turns() {
        let classifier = FixedClassifier::new("maize");
        let engine = engine_with(classifier.clone());
        let mut session = Session::new();

        let reply = engine.respond(&mut session, "humidity 65 and ph 6.2").unwrap();
        assert_eq!(
            reply.response.as_deref(),
            Some("🤖 Just need your Nitrogen, Phosphorus, Potassium, Temperature, Rainfall to make the best suggestion! 🌿")
        );
        assert_eq!(reply.acknowledgment.as_deref(), Some("✅ Got it: HUMIDITY: 65.0, PH: 6.2"));

        engine.respond(&mut session, "rain 85").unwrap();
        engine.respond(&mut session, "n=78, p=48").unwrap();
        let reply = engine.respond(&mut session, "hello?").unwrap();
        assert!(reply.acknowledgment.is_none());
        assert_eq!(
            reply.response.as_deref(),
            Some("🤖 Just need your Potassium, Temperature to make the best suggestion! 🌿")
        );
        assert_eq!(classifier.calls(), 0);

        let reply = engine.respond(&mut session, "K: 20 temp 22").unwrap();
        assert!(reply.response.unwrap().contains("**Maize**"));
        assert_eq!(classifier.calls(), 1);
    }

    #[test]
    fn test_recommendation_is_repeatable() {
        let engine = engine_with(Arc::new(CentroidClassifier::default()));
        let mut session = Session::new();

        engine.respond(&mut session, RICE_INPUT).unwrap();
        let first = session.last_crop.clone();
        assert!(session.slots.is_empty());

        engine.respond(&mut session, RICE_INPUT).unwrap();
        assert_eq!(session.last_crop, first);
    }

    #[test]
    fn test_same_seed_same_suggestion() {
        let a = engine_with(FixedClassifier::new("rice"));
        let b = engine_with(FixedClassifier::new("rice"));

        let first = a.respond(&mut Session::new(), RICE_INPUT).unwrap().response;
        let second = b.respond(&mut Session::new(), RICE_INPUT).unwrap().response;
        assert_eq!(first, second);
    }

    #[test]
    fn test_follow_up_after_recommendation() {
        let classifier = FixedClassifier::new("rice");
        let engine = engine_with(classifier.clone());
        let mut session = Session::new();
        engine.respond(&mut session, RICE_INPUT).unwrap();

        let reply = engine.respond(&mut session, "what fertilizer?").unwrap();
        assert_eq!(reply.intent, Intent::FollowUp { topic: Topic::Fertilizer });
        assert_eq!(
            reply.response.as_deref(),
            Some("🧪 For **Rice**, use:\n\nApply urea (N), DAP (P), and MOP (K) in 3 split doses.")
        );
        assert!(reply.chart.is_some());
        assert!(session.slots.is_empty());
        assert_eq!(classifier.calls(), 1);
    }

    #[test]
    fn test_growth_guidance_without_prior_state() {
        let classifier = FixedClassifier::new("rice");
        let engine = engine_with(classifier.clone());
        let kb = KnowledgeBase::builtin();
        let mut session = Session::new();

        let reply = engine.respond(&mut session, "I want to grow mango").unwrap();
        let text = reply.response.unwrap();

        assert_eq!(session.last_crop.as_deref(), Some("mango"));
        assert!(text.contains(kb.explanation("mango")));
        assert!(text.contains(kb.water("mango")));
        assert!(text.contains(kb.season("mango")));
        assert!(text.contains(kb.fertilizer("mango")));
        assert!(reply.chart.is_none());
        assert_eq!(classifier.calls(), 0);
    }

    #[test]
    fn test_focus_survives_unrelated_turns() {
        let engine = engine_with(FixedClassifier::new("rice"));
        let mut session = Session::new();
        engine.respond(&mut session, "how to grow lentil").unwrap();
        engine.respond(&mut session, "good morning").unwrap();

        let reply = engine.respond(&mut session, "similar ones?").unwrap();
        assert_eq!(
            reply.response.as_deref(),
            Some("🌱 Similar crops to **Lentil**: gram, pea")
        );
    }

    #[test]
    fn test_follow_up_does_not_ack_values() {
        let engine = engine_with(FixedClassifier::new("rice"));
        let mut session = Session::new();
        engine.respond(&mut session, "how to grow jute").unwrap();

        let reply = engine.respond(&mut session, "water with n 40?").unwrap();
        assert!(reply.acknowledgment.is_none());
        assert_eq!(session.slots.get(Slot::N), Some(40.0));
    }

    #[test]
    fn test_unknown_label_degrades_to_blank_facts() {
        let engine = engine_with(FixedClassifier::new("Coffee"));
        let mut session = Session::new();

        let reply = engine.respond_with(&mut session, RICE_INPUT, &mut ZeroRng).unwrap();
        assert!(reply.response.unwrap().contains("📘 _Why?_ \n\n"));
        assert_eq!(session.last_crop.as_deref(), Some("coffee"));
    }

    #[test]
    fn test_classifier_failure_keeps_frame() {
        let engine = engine_with(Arc::new(FailingClassifier));
        let mut session = Session::new();

        let result = engine.respond(&mut session, RICE_INPUT);
        assert!(matches!(result, Err(CropBuddyError::Classifier(_))));
        assert!(session.slots.is_complete());
        assert!(session.last_crop.is_none());
        assert!(session.last_inputs.is_none());
    }

    #[test]
    fn test_failed_recommendation_records_only_the_user_message() {
        let engine = engine_with(Arc::new(FailingClassifier));
        let mut session = Session::new();

        assert!(engine.respond(&mut session, RICE_INPUT).is_err());
        let roles: Vec<MessageRole> = session.history.messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User]);
    }

    #[test]
    fn test_classifier_runs_once_whatever_the_slot_order() {
        const FRAGMENTS: [&str; 7] = [
            "n 90",
            "p 42",
            "k 43",
            "temperature 20.8",
            "humidity 82",
            "ph 6.5",
            "rainfall 202.9",
        ];

        let mut conversations: Vec<Vec<String>> = Vec::new();
        for shift in 0..FRAGMENTS.len() {
            let mut order = FRAGMENTS.to_vec();
            order.rotate_left(shift);
            conversations.push(order.iter().map(|f| f.to_string()).collect());
            conversations.push(order.chunks(2).map(|c| c.join(" ")).collect());
            order.reverse();
            conversations.push(order.chunks(3).map(|c| c.join(" ")).collect());
        }
        // a slot given twice; the later value is used
        conversations.push(vec![
            "n 10 p 42".to_string(),
            "n 90 k 43 temperature 20.8".to_string(),
            "humidity 82 ph 6.5".to_string(),
            "rainfall 202.9".to_string(),
        ]);

        for turns in conversations {
            let classifier = FixedClassifier::new("rice");
            let engine = engine_with(classifier.clone());
            let mut session = Session::new();
            let (last, earlier) = turns.split_last().unwrap();

            for utterance in earlier {
                engine.respond(&mut session, utterance).unwrap();
                assert_eq!(classifier.calls(), 0, "turns: {:?}", turns);
            }

            let reply = engine.respond(&mut session, last).unwrap();
            assert!(reply.response.unwrap().contains("**Rice**"), "turns: {:?}", turns);
            assert_eq!(classifier.calls(), 1, "turns: {:?}", turns);
            assert!(session.slots.is_empty());
            assert_eq!(
                session.last_inputs.map(|r| r.features()),
                Some([90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]),
                "turns: {:?}",
                turns
            );
        }
    }

    #[test]
    fn test_custom_router() {
        fn any_crop_mention(turn: &Turn, _session: &Session) -> Option<Intent> {
            turn.crop_mention
                .clone()
                .map(|crop| Intent::GrowthGuidance { crop })
        }

        let router = IntentRouter::new().with_rule("crop_mention", any_crop_mention);
        let engine = engine_with(FixedClassifier::new("rice")).with_router(router);
        let mut session = Session::new();

        let reply = engine.respond(&mut session, "mango").unwrap();
        assert_eq!(reply.intent, Intent::GrowthGuidance { crop: "mango".to_string() });
        assert_eq!(session.last_crop.as_deref(), Some("mango"));

        // no follow-up rule registered, so topic questions fall through
        let reply = engine.respond(&mut session, "what fertilizer?").unwrap();
        assert_eq!(reply.intent, Intent::FillSlots);
    }

    #[test]
    fn test_history_order() {
        let engine = engine_with(FixedClassifier::new("rice"));
        let mut session = Session::new();
        engine.respond(&mut session, "n 40").unwrap();

        let contents: Vec<&str> = session.history.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0], "n 40");
        assert_eq!(contents[1], "✅ Got it: N: 40.0");
        assert!(contents[2].starts_with("🤖 Just need your Phosphorus"));
    }
}
