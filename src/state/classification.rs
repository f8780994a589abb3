/// Lexical classification of a slang word
///
/// This module defines the two outcomes of checking a word against the lexical authority.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the lexical authority knows a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Every token of the word has at least one dictionary entry (`N`)
    #[serde(rename = "N")]
    Known,

    /// At least one token has no entry, or its lookup failed (`U`)
    #[serde(rename = "U")]
    Unknown,
}

impl Classification {
    /// Converts the classification to its single-letter store code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Known => "N",
            Self::Unknown => "U",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
