use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [Self; 4] = [
        Self::SingleChoice,
        Self::MultipleChoice,
        Self::TrueFalse,
        Self::ShortAnswer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = AppError;

    /// Exact, case-sensitive match against the four known tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown question type: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(AppError::Validation(format!("unknown difficulty: {other}"))),
        }
    }
}

/// Identifier of a persisted question. Answer maps are keyed by this type
/// rather than its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(Uuid);

impl QuestionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for QuestionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_tags_round_trip_through_from_str() {
        for kind in QuestionType::ALL {
            assert_eq!(kind.as_str().parse::<QuestionType>().ok(), Some(kind));
        }
    }

    #[test]
    fn question_type_parsing_is_exact() {
        assert!("essay".parse::<QuestionType>().is_err());
        assert!("Single_Choice".parse::<QuestionType>().is_err());
        assert!(" true_false".parse::<QuestionType>().is_err());
    }

    #[test]
    fn question_type_serializes_as_snake_case_tag() {
        let json = serde_json::to_string(&QuestionType::MultipleChoice).expect("serialize");
        assert_eq!(json, "\"multiple_choice\"");
    }

    #[test]
    fn difficulty_parsing_is_lenient_about_case() {
        assert_eq!("HARD".parse::<Difficulty>().ok(), Some(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>().ok(), Some(Difficulty::Easy));
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn question_ids_are_unique() {
        assert_ne!(QuestionId::new(), QuestionId::new());
    }

    #[test]
    fn persisted_uuid_round_trips_through_question_id() {
        let stored = Uuid::parse_str("6f1c1f8e-3a51-4e8b-9d0c-2b7f4a9e5d10").expect("valid uuid");
        let id = QuestionId::from(stored);

        assert_eq!(id.as_uuid(), &stored);
        assert_eq!(id.to_string(), stored.to_string());

        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{stored}\""));
        let back: QuestionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
