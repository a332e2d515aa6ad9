use std::str::FromStr;

use common::{
    error::AppError,
    types::{
        generation::{GeneratedAnswer, GeneratedQuestion, GenerationParams},
        question::{Difficulty, QuestionType},
    },
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct QuestionsReply {
    #[serde(default)]
    questions: Vec<ReplyQuestion>,
}

#[derive(Debug, Deserialize)]
struct ReplyQuestion {
    #[serde(default)]
    question: String,
    #[serde(rename = "type", default)]
    question_type: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    answers: Vec<ReplyAnswer>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyAnswer {
    text: String,
    #[serde(default)]
    is_correct: bool,
}

/// Strips one surrounding Markdown code fence (plain or tagged `json`).
///
/// Other wrappings are left alone and will fail JSON parsing.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Parses a provider reply into questions.
///
/// Questions with an unknown type tag, blank text, no answers or no correct
/// answer are dropped, and the remainder is capped at `params.num_questions`.
/// An empty result is a malformed response.
pub fn parse_questions_reply(
    provider: &str,
    reply: &str,
    params: &GenerationParams,
) -> Result<Vec<GeneratedQuestion>, AppError> {
    let payload = strip_code_fence(reply);
    let parsed: QuestionsReply =
        serde_json::from_str(payload).map_err(|e| AppError::MalformedProviderResponse {
            provider: provider.to_string(),
            message: format!("reply is not valid question JSON: {e}"),
        })?;

    let received = parsed.questions.len();
    let fallback_difficulty = params.difficulty.unwrap_or_default();

    let questions: Vec<GeneratedQuestion> = parsed
        .questions
        .into_iter()
        .filter_map(|question| convert_question(question, fallback_difficulty))
        .filter(GeneratedQuestion::is_well_formed)
        .take(params.num_questions)
        .collect();

    debug!(
        provider,
        received,
        accepted = questions.len(),
        requested = params.num_questions,
        "parsed provider reply"
    );

    if questions.is_empty() {
        return Err(AppError::MalformedProviderResponse {
            provider: provider.to_string(),
            message: "reply contained no usable questions".into(),
        });
    }

    Ok(questions)
}

fn convert_question(question: ReplyQuestion, fallback: Difficulty) -> Option<GeneratedQuestion> {
    let question_type = QuestionType::from_str(&question.question_type).ok()?;
    let difficulty = question
        .difficulty
        .as_deref()
        .and_then(|value| Difficulty::from_str(value).ok())
        .unwrap_or(fallback);

    Some(GeneratedQuestion {
        question_text: question.question.trim().to_string(),
        question_type,
        difficulty,
        answers: question
            .answers
            .into_iter()
            .map(|answer| GeneratedAnswer {
                text: answer.text,
                is_correct: answer.is_correct,
            })
            .collect(),
        explanation: question
            .explanation
            .filter(|explanation| !explanation.trim().is_empty()),
    })
}
