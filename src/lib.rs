//! Crop Buddy
//!
//! A conversational crop advisor that:
//! - Collects seven soil/climate values from free text across turns
//! - Prompts for exactly the values still missing
//! - Recommends a crop with a pluggable classifier once the frame is complete
//! - Answers follow-up questions about the crop in focus
//!
//! TURN LOOP:
//! EXTRACT → MERGE → ROUTE → RESPOND

pub mod api;
pub mod chart;
pub mod classifier;
pub mod composer;
pub mod config;
pub mod crops;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod knowledge;
pub mod models;
pub mod router;
pub mod session;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{CentroidClassifier, CropClassifier};
pub use engine::{DialogueEngine, TurnReply};
pub use session::Session;
