// Guessable entities and the game modes that score them.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which guessing game is being played. Determines the scoring policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Exact trait name, one point.
    Trait,
    /// Tactician name with partial credit for the leading word.
    Tactician,
    /// Augment name without its trailing tier qualifier.
    Augment,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Trait, Mode::Tactician, Mode::Augment];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Trait => "trait",
            Mode::Tactician => "tactician",
            Mode::Augment => "augment",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trait" | "traits" => Ok(Mode::Trait),
            "tactician" | "tacticians" => Ok(Mode::Tactician),
            "augment" | "augments" => Ok(Mode::Augment),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// One guessable entity: the name to type and the image shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub image_ref: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_ref: image_ref.into(),
        }
    }
}

/// Immutable, cheaply clonable list of candidates for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSource {
    candidates: Arc<[Candidate]>,
}

impl CandidateSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: candidates.into(),
        }
    }
}

impl Deref for CandidateSource {
    type Target = [Candidate];

    fn deref(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl From<Vec<Candidate>> for CandidateSource {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self::new(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("trait".parse::<Mode>().unwrap(), Mode::Trait);
        assert_eq!("Tacticians".parse::<Mode>().unwrap(), Mode::Tactician);
        assert_eq!(" augment ".parse::<Mode>().unwrap(), Mode::Augment);
        assert!("items".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        let json = serde_json::to_string(&Mode::Tactician).unwrap();
        assert_eq!(json, "\"tactician\"");
    }

    #[test]
    fn test_source_clone_shares_storage() {
        let source = CandidateSource::new(vec![
            Candidate::new("Arcana", "arcana.svg"),
            Candidate::new("Chrono", "chrono.svg"),
        ]);
        let copy = source.clone();
        assert_eq!(copy.len(), 2);
        assert_eq!(copy[1].name, "Chrono");
        assert!(std::ptr::eq(source.as_ptr(), copy.as_ptr()));
    }
}
