//! Quiz question type
//!
//! Questions are transient session state - they are generated per city,
//! never persisted, and cleared when a trip is loaded or resumed.

use serde::{Deserialize, Serialize};

/// A generated trivia question about a city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Stable within a generation batch (`q-0`, `q-1`, ...)
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    /// Topic used to personalize the suggestion generation that follows
    pub related_topic: String,
    pub fun_fact: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_index
    }
}
