//! Nutrient bar chart
//!
//! A three-bar N/P/K chart request attached to replies once a recommendation
//! has been made. Front-ends decide how to draw it.

use crate::composer::display_name;
use crate::models::SoilReading;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl NutrientChart {
    pub fn from_reading(crop: &str, reading: &SoilReading) -> Self {
        let bars = [
            ("Nitrogen", reading.n),
            ("Phosphorus", reading.p),
            ("Potassium", reading.k),
        ]
        .into_iter()
        .map(|(label, value)| Bar {
            label: label.to_string(),
            value,
        })
        .collect();

        Self {
            title: format!("NPK for {}", display_name(crop)),
            bars,
        }
    }

    /// Draw as horizontal text bars; the largest value spans `width` cells
    pub fn render_ascii(&self, width: usize) -> String {
        let max = self
            .bars
            .iter()
            .map(|b| b.value)
            .fold(0.0_f64, f64::max);
        let label_width = self.bars.iter().map(|b| b.label.len()).max().unwrap_or(0);

        let mut out = format!("{}\n", self.title);
        for bar in &self.bars {
            let cells = if max > 0.0 {
                ((bar.value.max(0.0) / max) * width as f64).round() as usize
            } else {
                0
            };
            out.push_str(&format!(
                "{:<label_width$} | {} {}\n",
                bar.label,
                "█".repeat(cells),
                bar.value,
            ));
        }
        out
    }
}
