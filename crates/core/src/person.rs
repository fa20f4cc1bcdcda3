//! Person names from the person directory, and the display formatting
//! applied everywhere a name is surfaced.

use serde::{Deserialize, Serialize};

/// A person's name as returned by the person directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navn {
    pub fornavn: String,
    #[serde(default)]
    pub mellomnavn: Option<String>,
    pub etternavn: String,
}

impl Navn {
    /// Full display name: "Fornavn [Mellomnavn] Etternavn", normalized.
    pub fn formatted(&self) -> String {
        match &self.mellomnavn {
            Some(mellomnavn) if !mellomnavn.is_empty() => {
                format_name(&format!("{} {} {}", self.fornavn, mellomnavn, self.etternavn))
            }
            _ => format_name(&format!("{} {}", self.fornavn, self.etternavn)),
        }
    }
}

/// Normalize a raw name for display: every word lower-cased, then the first
/// letter of the word and the first letter after each hyphen upper-cased.
/// Surrounding and repeated whitespace collapses to single spaces.
pub fn format_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    word.split('-')
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
