// src/engine/mastery.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::EngineError;

pub const MASTERY_MIN: i32 = 0;
pub const MASTERY_MAX: i32 = 100;

/// School subjects tracked per student.
///
/// The set is closed: every `MasteryProfile` carries exactly one value per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Math,
    Science,
    English,
    History,
    ForeignLanguage,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Math,
        Subject::Science,
        Subject::English,
        Subject::History,
        Subject::ForeignLanguage,
    ];

    /// Storage and wire key (e.g. `foreign_language`).
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Science => "science",
            Subject::English => "english",
            Subject::History => "history",
            Subject::ForeignLanguage => "foreign_language",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown subject '{}'", s)))
    }
}

/// Lets `sqlx` decode TEXT columns straight into `Subject` via `#[sqlx(try_from = "String")]`.
impl TryFrom<String> for Subject {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-subject mastery percentages of a student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryProfile {
    pub math: i32,
    pub science: i32,
    pub english: i32,
    pub history: i32,
    pub foreign_language: i32,
}

impl MasteryProfile {
    /// Same value for every subject, clamped into range.
    pub fn uniform(value: i32) -> Self {
        let value = clamp_mastery(value);
        Self {
            math: value,
            science: value,
            english: value,
            history: value,
            foreign_language: value,
        }
    }

    pub fn get(&self, subject: Subject) -> i32 {
        match subject {
            Subject::Math => self.math,
            Subject::Science => self.science,
            Subject::English => self.english,
            Subject::History => self.history,
            Subject::ForeignLanguage => self.foreign_language,
        }
    }

    /// Stores `value` for `subject`, clamped into 0..=100.
    pub fn set(&mut self, subject: Subject, value: i32) {
        let slot = match subject {
            Subject::Math => &mut self.math,
            Subject::Science => &mut self.science,
            Subject::English => &mut self.english,
            Subject::History => &mut self.history,
            Subject::ForeignLanguage => &mut self.foreign_language,
        };
        *slot = clamp_mastery(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, i32)> + '_ {
        Subject::ALL.into_iter().map(|subject| (subject, self.get(subject)))
    }

    /// Rejects profiles with any value outside 0..=100.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self
            .iter()
            .find(|(_, value)| !(MASTERY_MIN..=MASTERY_MAX).contains(value))
        {
            Some((subject, value)) => Err(EngineError::InvalidInput(format!(
                "mastery for {} must be between {} and {}, got {}",
                subject, MASTERY_MIN, MASTERY_MAX, value
            ))),
            None => Ok(()),
        }
    }

    /// Applies a quiz score to one subject and returns what changed.
    pub fn apply_score(&mut self, subject: Subject, score: i32) -> MasteryAdjustment {
        let adjustment = adjust(self.get(subject), score);
        self.set(subject, adjustment.new_mastery);
        adjustment
    }
}

/// Outcome of applying one quiz score to a mastery value.
///
/// `delta` is the band value, so it can differ from `new_mastery - previous`
/// when the result was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryAdjustment {
    pub previous: i32,
    pub new_mastery: i32,
    pub delta: i32,
}

/// Maps a quiz score to a mastery delta. Each band's lower bound is inclusive.
pub fn mastery_delta(score: i32) -> i32 {
    match score {
        s if s >= 90 => 8,
        s if s >= 80 => 5,
        s if s >= 70 => 2,
        s if s >= 60 => 0,
        s if s >= 50 => -2,
        _ => -5,
    }
}

/// Adjusts `current` mastery by the band `score` falls into.
pub fn adjust(current: i32, score: i32) -> MasteryAdjustment {
    let previous = clamp_mastery(current);
    let delta = mastery_delta(score);

    MasteryAdjustment {
        previous,
        new_mastery: clamp_mastery(previous + delta),
        delta,
    }
}

fn clamp_mastery(value: i32) -> i32 {
    value.clamp(MASTERY_MIN, MASTERY_MAX)
}
