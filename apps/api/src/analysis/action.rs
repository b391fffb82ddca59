//! The fixed action vocabulary the decision component may choose from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "extract-requirements")]
    ExtractRequirements,
    #[serde(rename = "extract-evidence")]
    ExtractEvidence,
    #[serde(rename = "infer-skills")]
    InferSkills,
    #[serde(rename = "match-gaps")]
    MatchGaps,
    #[serde(rename = "classify-requirements")]
    ClassifyRequirements,
    #[serde(rename = "recommend")]
    Recommend,
    #[serde(rename = "answer-question")]
    AnswerQuestion,
    #[serde(rename = "HUMAN")]
    Human,
    #[serde(rename = "DONE")]
    Done,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::ExtractRequirements,
        Action::ExtractEvidence,
        Action::InferSkills,
        Action::MatchGaps,
        Action::ClassifyRequirements,
        Action::Recommend,
        Action::AnswerQuestion,
        Action::Human,
        Action::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ExtractRequirements => "extract-requirements",
            Action::ExtractEvidence => "extract-evidence",
            Action::InferSkills => "infer-skills",
            Action::MatchGaps => "match-gaps",
            Action::ClassifyRequirements => "classify-requirements",
            Action::Recommend => "recommend",
            Action::AnswerQuestion => "answer-question",
            Action::Human => "HUMAN",
            Action::Done => "DONE",
        }
    }

    /// HUMAN and DONE end a run; everything else executes a step.
    pub fn is_control(self) -> bool {
        matches!(self, Action::Human | Action::Done)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a decision names an action outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid action chosen: {0:?}")]
pub struct InvalidActionError(pub String);

impl FromStr for Action {
    type Err = InvalidActionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == trimmed)
            .ok_or_else(|| InvalidActionError(raw.to_string()))
    }
}
