//! Crop classifier
//!
//! The dialogue engine treats the classifier as an opaque, side-effect-free
//! function from a complete [`SoilReading`] to a crop label. The shipped
//! implementation is a nearest-centroid model over scaled features.

use crate::error::CropBuddyError;
use crate::models::SoilReading;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Predicts a crop label from seven soil and climate values
pub trait CropClassifier: Send + Sync {
    fn predict(&self, reading: &SoilReading) -> Result<String>;
}

/// Per-crop mean feature vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Centroid {
    pub label: String,
    /// (N, P, K, temperature, humidity, pH, rainfall)
    pub features: [f64; 7],
}

/// Nearest-centroid model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidClassifier {
    /// Divisor applied to each feature before measuring distance
    pub scale: [f64; 7],
    pub centroids: Vec<Centroid>,
}

/// Typical value ranges for (N, P, K, temperature, humidity, pH, rainfall)
const DEFAULT_SCALE: [f64; 7] = [140.0, 145.0, 205.0, 45.0, 100.0, 14.0, 300.0];

/// Static centroid table — mean conditions per crop
const DEFAULT_CENTROIDS: &[(&str, [f64; 7])] = &[
    ("rice", [79.9, 47.6, 39.9, 23.7, 82.3, 6.4, 236.2]),
    ("maize", [77.8, 48.4, 19.8, 22.4, 65.1, 6.2, 84.8]),
    ("cotton", [117.8, 46.2, 19.6, 24.0, 79.8, 6.9, 80.4]),
    ("jute", [78.4, 46.9, 40.0, 25.0, 79.6, 6.7, 174.8]),
    ("lentil", [18.8, 68.4, 19.4, 24.5, 64.8, 6.9, 45.7]),
    ("banana", [100.2, 82.0, 50.1, 27.4, 80.4, 6.0, 104.6]),
    ("mango", [20.1, 27.2, 29.9, 31.2, 50.2, 5.8, 94.7]),
    ("apple", [20.8, 134.2, 199.9, 22.6, 92.3, 5.9, 112.7]),
];

impl CentroidClassifier {
    pub fn new(scale: [f64; 7], centroids: Vec<Centroid>) -> Result<Self> {
        if centroids.is_empty() {
            return Err(CropBuddyError::Classifier(
                "model has no centroids".to_string(),
            ));
        }
        if scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(CropBuddyError::Classifier(
                "feature scale must be positive and finite".to_string(),
            ));
        }
        Ok(Self { scale, centroids })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CropBuddyError::Classifier(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        let model: CentroidClassifier = serde_json::from_str(&json)?;
        let model = Self::new(model.scale, model.centroids)?;
        info!(path = %path.display(), labels = model.centroids.len(), "Loaded classifier model");
        Ok(model)
    }

    fn distance(&self, a: &[f64; 7], b: &[f64; 7]) -> f64 {
        a.iter()
            .zip(b.iter())
            .zip(self.scale.iter())
            .map(|((x, y), s)| ((x - y) / s).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl Default for CentroidClassifier {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            centroids: DEFAULT_CENTROIDS
                .iter()
                .map(|(label, features)| Centroid {
                    label: label.to_string(),
                    features: *features,
                })
                .collect(),
        }
    }
}

impl CropClassifier for CentroidClassifier {
    fn predict(&self, reading: &SoilReading) -> Result<String> {
        let features = reading.features();
        if features.iter().any(|v| !v.is_finite()) {
            return Err(CropBuddyError::Classifier(
                "reading contains a non-finite value".to_string(),
            ));
        }

        let (best, distance) = self
            .centroids
            .iter()
            .map(|c| (c, self.distance(&features, &c.features)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| CropBuddyError::Classifier("model has no centroids".to_string()))?;

        debug!(label = %best.label, distance, "Classifier prediction");
        Ok(best.label.clone())
    }
}
