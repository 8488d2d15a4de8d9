use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification outcome for a document: a single dominant question type, or
/// mixed content where each item is classified independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseMode {
    Mcq,
    Emq,
    Saq,
    Mixed,
}

impl ParseMode {
    /// Canonical name as it appears in source documents and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Mcq => "MCQ",
            ParseMode::Emq => "EMQ",
            ParseMode::Saq => "SAQ",
            ParseMode::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MCQ" => Ok(ParseMode::Mcq),
            "EMQ" => Ok(ParseMode::Emq),
            "SAQ" => Ok(ParseMode::Saq),
            "MIXED" => Ok(ParseMode::Mixed),
            _ => Err(format!("unknown parse mode: {s}")),
        }
    }
}
