// Answer scoring. Pure: the same (mode, guess, name) always scores the same.

use serde::{Deserialize, Serialize};

use super::candidate::Mode;
use super::config::*;

/// Verdict for one submitted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub correct: bool,
    pub points_awarded: u32,
}

impl GuessResult {
    pub const INCORRECT: GuessResult = GuessResult {
        correct: false,
        points_awarded: 0,
    };

    fn award(points: u32) -> Self {
        GuessResult {
            correct: true,
            points_awarded: points,
        }
    }
}

/// Trim and lower-case. Internal whitespace is kept as typed.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Score `guess` against `correct_name` under the rules of `mode`.
pub fn evaluate(mode: Mode, guess: &str, correct_name: &str) -> GuessResult {
    let guess = normalize(guess);
    if guess.is_empty() {
        return GuessResult::INCORRECT;
    }
    let name = normalize(correct_name);

    match mode {
        Mode::Trait => {
            if guess == name {
                GuessResult::award(TRAIT_POINTS)
            } else {
                GuessResult::INCORRECT
            }
        }
        Mode::Tactician => {
            if guess == name {
                GuessResult::award(TACTICIAN_FULL_NAME_POINTS)
            } else if short_name(&name) == Some(guess.as_str()) {
                GuessResult::award(TACTICIAN_SHORT_NAME_POINTS)
            } else {
                GuessResult::INCORRECT
            }
        }
        Mode::Augment => match derived_name(&name) {
            Some(answer) if guess == answer => {
                GuessResult::award(answer.split(char::is_whitespace).count() as u32)
            }
            _ => GuessResult::INCORRECT,
        },
    }
}

/// Leading word of a multi-word name ("norra and yuumi" -> "norra").
/// Single-word names have no short form.
fn short_name(name: &str) -> Option<&str> {
    name.split_once(char::is_whitespace)
        .map(|(first, _)| first)
        .filter(|first| !first.is_empty())
}

/// Name with its trailing qualifier word removed ("sunfire board ii" -> "sunfire board").
fn derived_name(name: &str) -> Option<&str> {
    name.rsplit_once(char::is_whitespace)
        .map(|(head, _)| head.trim_end())
        .filter(|head| !head.is_empty())
}
