use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::question::{Difficulty, QuestionType};

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 50;

/// Input for a single question-generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub text: String,
    pub num_questions: usize,
    pub difficulty: Option<Difficulty>,
    /// Empty means "use the default type" (single choice).
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
    pub language: Option<String>,
}

impl GenerationParams {
    pub fn new(text: impl Into<String>, num_questions: usize) -> Self {
        Self {
            text: text.into(),
            num_questions,
            difficulty: None,
            question_types: Vec::new(),
            language: None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.num_questions) {
            return Err(AppError::Validation(format!(
                "num_questions must be between {MIN_QUESTIONS} and {MAX_QUESTIONS}, got {}",
                self.num_questions
            )));
        }
        if self.text.trim().is_empty() {
            return Err(AppError::Validation(
                "source text for generation is empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub text: String,
    pub is_correct: bool,
}

/// A question as produced by a generation strategy. Not persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub answers: Vec<GeneratedAnswer>,
    pub explanation: Option<String>,
}

impl GeneratedQuestion {
    /// Non-empty text, at least one answer, and at least one correct answer.
    pub fn is_well_formed(&self) -> bool {
        !self.question_text.trim().is_empty()
            && !self.answers.is_empty()
            && self.answers.iter().any(|answer| answer.is_correct)
    }
}
