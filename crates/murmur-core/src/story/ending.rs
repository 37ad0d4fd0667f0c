//! Terminal outcomes selected from accumulated state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use crate::state::PlayState;

/// Broad classification of an ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingCategory {
    /// A good outcome.
    Good,
    /// A mixed outcome.
    Neutral,
    /// A bad outcome.
    Bad,
    /// Any other authored category.
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for EndingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "GOOD"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Bad => write!(f, "BAD"),
            Self::Other(name) => write!(f, "{}", name.to_uppercase()),
        }
    }
}

/// An authored ending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ending {
    /// Unique ending id.
    pub id: String,
    /// Classification shown in the ending marker.
    pub category: EndingCategory,
    /// Descriptive epilogue text.
    pub text: String,
    /// When this ending applies.
    pub condition: Condition,
}

impl Ending {
    /// Create an ending.
    pub fn new(
        id: impl Into<String>,
        category: EndingCategory,
        text: impl Into<String>,
        condition: Condition,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            text: text.into(),
            condition,
        }
    }

    /// Whether this ending applies to `state`.
    pub fn matches(&self, state: &PlayState) -> bool {
        self.condition.evaluate(state)
    }

    /// The system line announcing this ending, e.g. `[BAD ENDING]`.
    pub fn marker(&self) -> String {
        format!("[{} ENDING]", self.category)
    }

    /// First ending in `endings` that matches `state`.
    ///
    /// Authors order endings from most to least specific; ties go to the
    /// earlier entry.
    pub fn first_match<'a>(endings: &'a [Ending], state: &PlayState) -> Option<&'a Ending> {
        endings.iter().find(|e| e.matches(state))
    }
}
