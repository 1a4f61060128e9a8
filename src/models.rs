//! Core data models for the crop advisor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ================= Slots =================
//

/// One of the seven numeric fields required before a recommendation.
///
/// Variant order is the canonical order used for prompts, acknowledgments
/// and the classifier feature vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    N,
    P,
    K,
    Temp,
    Humidity,
    Ph,
    Rain,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::N,
        Slot::P,
        Slot::K,
        Slot::Temp,
        Slot::Humidity,
        Slot::Ph,
        Slot::Rain,
    ];

    /// Lowercase key used in frames and serialized payloads
    pub fn key(self) -> &'static str {
        match self {
            Slot::N => "n",
            Slot::P => "p",
            Slot::K => "k",
            Slot::Temp => "temp",
            Slot::Humidity => "humidity",
            Slot::Ph => "ph",
            Slot::Rain => "rain",
        }
    }

    /// Human readable name used when prompting for missing values
    pub fn label(self) -> &'static str {
        match self {
            Slot::N => "Nitrogen",
            Slot::P => "Phosphorus",
            Slot::K => "Potassium",
            Slot::Temp => "Temperature",
            Slot::Humidity => "Humidity",
            Slot::Ph => "pH",
            Slot::Rain => "Rainfall",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

//
// ================= Frame =================
//

/// Partial mapping of slot to submitted value.
///
/// Keys are the [`Slot`] enum, so a frame can never hold an unknown field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotFrame {
    values: BTreeMap<Slot, f64>,
}

impl SlotFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: Slot, value: f64) {
        self.values.insert(slot, value);
    }

    pub fn get(&self, slot: Slot) -> Option<f64> {
        self.values.get(&slot).copied()
    }

    /// Merge another frame into this one; incoming values win
    pub fn merge(&mut self, other: &SlotFrame) {
        for (slot, value) in other.iter() {
            self.values.insert(slot, value);
        }
    }

    /// Slots still without a value, in canonical order
    pub fn missing(&self) -> Vec<Slot> {
        Slot::ALL
            .iter()
            .copied()
            .filter(|slot| !self.values.contains_key(slot))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        Slot::ALL.iter().all(|slot| self.values.contains_key(slot))
    }

    /// Snapshot the frame as a reading once every slot is filled
    pub fn complete(&self) -> Option<SoilReading> {
        Some(SoilReading {
            n: self.get(Slot::N)?,
            p: self.get(Slot::P)?,
            k: self.get(Slot::K)?,
            temperature: self.get(Slot::Temp)?,
            humidity: self.get(Slot::Humidity)?,
            ph: self.get(Slot::Ph)?,
            rainfall: self.get(Slot::Rain)?,
        })
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in canonical slot order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, f64)> + '_ {
        self.values.iter().map(|(slot, value)| (*slot, *value))
    }
}

impl FromIterator<(Slot, f64)> for SlotFrame {
    fn from_iter<I: IntoIterator<Item = (Slot, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

//
// ================= Reading =================
//

/// A complete set of soil and climate values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl SoilReading {
    /// Classifier input, ordered (N, P, K, temperature, humidity, pH, rainfall)
    pub fn features(&self) -> [f64; 7] {
        [
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

//
// ================= Follow-up topics =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Fertilizer,
    Season,
    Water,
    Organic,
    Similar,
}

impl Topic {
    /// Keyword check order; the first keyword found wins
    pub const ALL: [Topic; 5] = [
        Topic::Fertilizer,
        Topic::Season,
        Topic::Water,
        Topic::Organic,
        Topic::Similar,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Topic::Fertilizer => "fertilizer",
            Topic::Season => "season",
            Topic::Water => "water",
            Topic::Organic => "organic",
            Topic::Similar => "similar",
        }
    }
}

//
// ================= Conversation =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageRole::User => "user",
            MessageRole::Bot => "bot",
        };
        write!(f, "{}", s)
    }
}
