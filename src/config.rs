//! Runtime settings
//!
//! Read from the environment (optionally seeded from a `.env` file by the
//! binaries before calling [`Settings::from_env`]).

use crate::classifier::{CentroidClassifier, CropClassifier};
use crate::engine::DialogueEngine;
use crate::error::CropBuddyError;
use crate::knowledge::KnowledgeBase;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_port: u16,
    /// Alternative knowledge base JSON; built-in table when unset
    pub knowledge_path: Option<PathBuf>,
    /// Alternative classifier model JSON; built-in centroids when unset
    pub model_path: Option<PathBuf>,
    /// Fixed seed for follow-up suggestions
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_port: DEFAULT_PORT,
            knowledge_path: None,
            model_path: None,
            seed: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_port = match non_empty("PORT").or_else(|| non_empty("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                CropBuddyError::Config(format!("invalid port: {}", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let seed = match non_empty("CROP_BUDDY_SEED") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                CropBuddyError::Config(format!("CROP_BUDDY_SEED must be an unsigned integer: {}", raw))
            })?),
            None => None,
        };

        Ok(Self {
            api_port,
            knowledge_path: non_empty("CROP_BUDDY_KNOWLEDGE_PATH").map(PathBuf::from),
            model_path: non_empty("CROP_BUDDY_MODEL_PATH").map(PathBuf::from),
            seed,
        })
    }

    pub fn load_knowledge(&self) -> Result<Arc<KnowledgeBase>> {
        match &self.knowledge_path {
            Some(path) => Ok(Arc::new(KnowledgeBase::from_json_file(path)?)),
            None => Ok(KnowledgeBase::builtin()),
        }
    }

    pub fn load_classifier(&self) -> Result<Arc<dyn CropClassifier>> {
        match &self.model_path {
            Some(path) => Ok(Arc::new(CentroidClassifier::from_json_file(path)?)),
            None => Ok(Arc::new(CentroidClassifier::default())),
        }
    }

    /// Wire up a dialogue engine from these settings
    pub fn build_engine(&self) -> Result<DialogueEngine> {
        let knowledge = self.load_knowledge()?;
        let classifier = self.load_classifier()?;
        info!(crops = knowledge.len(), seeded = self.seed.is_some(), "Dialogue engine ready");

        let engine = DialogueEngine::new(knowledge, classifier);
        Ok(match self.seed {
            Some(seed) => engine.with_seed(seed),
            None => engine,
        })
    }
}
