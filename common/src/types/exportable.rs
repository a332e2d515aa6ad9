use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{generation::GeneratedQuestion, question::QuestionId};

/// Default grade assigned to freshly generated questions.
pub const DEFAULT_POINTS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportableAnswer {
    pub text: String,
    pub is_correct: bool,
}

/// The persisted question shape consumed by the quiz exporter.
///
/// `question_type` stays a raw tag so that data written by older or foreign
/// producers can be rejected at export time instead of at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportableQuestion {
    pub id: QuestionId,
    pub question_text: String,
    pub question_type: String,
    pub points: f64,
}

pub type AnswersByQuestion = HashMap<QuestionId, Vec<ExportableAnswer>>;

impl ExportableQuestion {
    pub fn from_generated(generated: &GeneratedQuestion) -> (Self, Vec<ExportableAnswer>) {
        let question = Self {
            id: QuestionId::new(),
            question_text: generated.question_text.clone(),
            question_type: generated.question_type.as_str().to_string(),
            points: DEFAULT_POINTS,
        };
        let answers = generated
            .answers
            .iter()
            .map(|answer| ExportableAnswer {
                text: answer.text.clone(),
                is_correct: answer.is_correct,
            })
            .collect();
        (question, answers)
    }

    /// Converts a generation batch into exporter input, keeping the batch order.
    pub fn collect_generated(
        generated: &[GeneratedQuestion],
    ) -> (Vec<Self>, AnswersByQuestion) {
        let mut questions = Vec::with_capacity(generated.len());
        let mut answers = HashMap::with_capacity(generated.len());
        for item in generated {
            let (question, question_answers) = Self::from_generated(item);
            answers.insert(question.id, question_answers);
            questions.push(question);
        }
        (questions, answers)
    }
}
