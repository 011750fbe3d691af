//! The transient result of one spin.

use crate::core::{ScoreChanges, WheelOption};

/// What the wheel landed on, and what it did once resolved.
///
/// Created by `GameWheel::spin` with empty changes; `GameWheel::resolve`
/// fills in `score_changes` and `description` and commits them as a
/// `GameEvent`. The outcome itself is never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Label of the selected option.
    pub label: String,
    /// Action spec of the selected option.
    pub action: String,
    /// Weight the option was drawn with.
    pub weight: u32,
    /// Requested score changes.
    pub score_changes: ScoreChanges,
    /// What happened, in words.
    pub description: String,
}

impl Outcome {
    /// A fresh, unresolved outcome for `option`.
    #[must_use]
    pub fn new(option: &WheelOption) -> Self {
        Self {
            label: option.label.clone(),
            action: option.action.clone(),
            weight: option.weight,
            score_changes: ScoreChanges::new(),
            description: String::new(),
        }
    }

    /// Has this outcome been resolved yet?
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.description.is_empty()
    }
}
