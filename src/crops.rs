//! Crop name matching
//!
//! Finds a known crop mentioned anywhere in an utterance. Matching is plain
//! substring containment, so short names also match inside longer words
//! ("bananaphone" mentions banana). That is accepted behavior.

use crate::knowledge::KnowledgeBase;

/// Known crop names, in registration order
#[derive(Debug, Clone)]
pub struct CropMatcher {
    crops: Vec<String>,
}

impl CropMatcher {
    pub fn new<I, S>(crops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            crops: crops
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_knowledge(kb: &KnowledgeBase) -> Self {
        Self::new(kb.crop_names())
    }

    /// First registered crop whose name appears in `utterance`
    pub fn match_crop(&self, utterance: &str) -> Option<String> {
        let text = utterance.to_lowercase();
        self.crops
            .iter()
            .find(|crop| text.contains(crop.as_str()))
            .cloned()
    }
}
