//! Crop knowledge base
//!
//! Read-only fact tables keyed by lowercase crop name. Every field of an
//! entry is optional; lookups on a missing crop or field degrade to empty
//! text instead of failing.

use crate::error::CropBuddyError;
use crate::Result;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Facts about a single crop
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CropFacts {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organic_vs_chemical: Option<String>,
}

/// Registered crops, in registration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    crops: Vec<CropFacts>,
}

impl KnowledgeBase {
    pub fn new(crops: Vec<CropFacts>) -> Self {
        let crops = crops
            .into_iter()
            .map(|mut facts| {
                facts.name = facts.name.trim().to_lowercase();
                facts
            })
            .collect();
        Self { crops }
    }

    /// Shared handle to the built-in eight crop table
    pub fn builtin() -> Arc<KnowledgeBase> {
        Arc::clone(&*BUILTIN)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: KnowledgeBase = serde_json::from_str(json)?;
        if parsed.crops.iter().any(|c| c.name.trim().is_empty()) {
            return Err(CropBuddyError::KnowledgeBase(
                "every crop entry needs a non-empty name".to_string(),
            ));
        }
        Ok(Self::new(parsed.crops))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CropBuddyError::KnowledgeBase(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let kb = Self::from_json_str(&json)?;
        info!(path = %path.display(), crops = kb.len(), "Loaded knowledge base");
        Ok(kb)
    }

    /// Crop names in registration order
    pub fn crop_names(&self) -> impl Iterator<Item = &str> {
        self.crops.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn facts(&self, crop: &str) -> Option<&CropFacts> {
        let crop = crop.to_lowercase();
        self.crops.iter().find(|c| c.name == crop)
    }

    fn text(&self, crop: &str, field: impl Fn(&CropFacts) -> Option<&String>) -> &str {
        self.facts(crop)
            .and_then(field)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn explanation(&self, crop: &str) -> &str {
        self.text(crop, |f| f.explanation.as_ref())
    }

    pub fn fertilizer(&self, crop: &str) -> &str {
        self.text(crop, |f| f.fertilizer.as_ref())
    }

    pub fn season(&self, crop: &str) -> &str {
        self.text(crop, |f| f.season.as_ref())
    }

    pub fn water(&self, crop: &str) -> &str {
        self.text(crop, |f| f.water.as_ref())
    }

    pub fn organic_vs_chemical(&self, crop: &str) -> &str {
        self.text(crop, |f| f.organic_vs_chemical.as_ref())
    }

    pub fn similar(&self, crop: &str) -> &[String] {
        self.facts(crop).map(|f| f.similar.as_slice()).unwrap_or(&[])
    }
}

fn entry(
    name: &str,
    explanation: &str,
    fertilizer: &str,
    season: &str,
    water: &str,
    similar: [&str; 2],
    organic_vs_chemical: &str,
) -> CropFacts {
    CropFacts {
        name: name.to_string(),
        explanation: Some(explanation.to_string()),
        fertilizer: Some(fertilizer.to_string()),
        season: Some(season.to_string()),
        water: Some(water.to_string()),
        similar: similar.iter().map(|s| s.to_string()).collect(),
        organic_vs_chemical: Some(organic_vs_chemical.to_string()),
    }
}

lazy_static! {
    static ref BUILTIN: Arc<KnowledgeBase> = Arc::new(KnowledgeBase::new(vec![
        entry(
            "rice",
            "Rice grows well in areas with high rainfall, high humidity, and warm temperatures.",
            "Apply urea (N), DAP (P), and MOP (K) in 3 split doses.",
            "June to August (Kharif season)",
            "1200-1600 mm. Needs standing water.",
            ["sugarcane", "wheat"],
            "Organic improves soil but may reduce yield. Chemicals act faster.",
        ),
        entry(
            "maize",
            "Maize requires moderate rainfall and warm temperatures.",
            "Use NPK 20-20-0 at sowing and top dress with urea after 20 days.",
            "June to July or October to November",
            "500-800 mm. Moderate irrigation.",
            ["sorghum", "millet"],
            "Organic composts enhance soil; chemicals give rapid results.",
        ),
        entry(
            "cotton",
            "Cotton thrives in black soil with high temperature and moderate rainfall.",
            "Apply 100 kg urea, 50 kg DAP, and 50 kg potash per acre.",
            "April to May (hot season)",
            "700-1200 mm. Dry at maturity.",
            ["soybean", "sunflower"],
            "Organic cotton fetches more price. Chemicals resist pests.",
        ),
        entry(
            "jute",
            "Jute grows best in hot and humid climates with high rainfall.",
            "Use compost, urea (40–60 kg/ha), and super phosphate.",
            "March to May (just before monsoon)",
            "1500-2000 mm. Avoid waterlogging.",
            ["hemp", "flax"],
            "Organic jute is eco-friendly. Chemicals boost yield.",
        ),
        entry(
            "lentil",
            "Lentils prefer cool growing seasons and loamy soil with good drainage.",
            "Apply DAP and potash during sowing; avoid waterlogging.",
            "October to November (Rabi season)",
            "350-450 mm. Semi-arid conditions.",
            ["gram", "pea"],
            "Use Rhizobium culture for nitrogen fixation.",
        ),
        entry(
            "banana",
            "Bananas grow well in hot, humid areas with high rainfall.",
            "Use well-rotted manure, urea, and NPK 2:1:1 ratio monthly.",
            "Any month with irrigation (preferably Feb–Mar)",
            "2000-2500 mm. Frequent irrigation.",
            ["papaya", "plantain"],
            "Organic bananas are sweeter. Use vermicompost.",
        ),
        entry(
            "mango",
            "Mango trees require warm, frost-free climate and well-drained soil.",
            "Apply FYM, urea, and NPK mix before flowering season.",
            "June to August or February to March for grafting",
            "900-1200 mm. Needs dry spell before flowering.",
            ["guava", "sapota"],
            "Organic mangoes taste better. Avoid sprays.",
        ),
        entry(
            "apple",
            "Apples need a temperate climate with cold winters and well-drained loamy soil.",
            "Use compost + NPK 10:10:10 before flowering and during fruit setting.",
            "December to February (cold regions)",
            "1000-1200 mm. Avoid waterlogging.",
            ["pear", "plum"],
            "Use organic mulch. Chemicals may leave residues.",
        ),
    ]));
}
