use common::types::{generation::GenerationParams, question::QuestionType};
use serde_json::json;

pub const DEFAULT_LANGUAGE: &str = "en";

pub static QUESTION_GENERATION_SYSTEM_MESSAGE: &str = "You are a professional author of assessment questions for educational purposes. \
You write clear, unambiguous questions that can be answered from the supplied material alone, \
and you always reply with valid JSON only.";

/// Builds the user prompt. The same params always produce the same prompt.
pub fn build_prompt(params: &GenerationParams) -> String {
    let question_types = if params.question_types.is_empty() {
        QuestionType::SingleChoice.as_str().to_string()
    } else {
        params
            .question_types
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let difficulty = params.difficulty.unwrap_or_default();
    let language = params
        .language
        .as_deref()
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    format!(
        r#"Create {count} test questions based on the following text.

TEXT:
{text}

REQUIREMENTS:
- Question types: {question_types}
- Difficulty: {difficulty}
- Language: {language}
- For every single_choice question provide 4 answers (1 correct, 3 incorrect)
- For every multiple_choice question provide 5-6 answers (2-3 correct, 2-3 incorrect)
- For every true_false question provide exactly 2 answers: "true" and "false"
- For every short_answer question list the accepted answers, all marked correct

RESPONSE FORMAT (strict JSON):
{{
  "questions": [
    {{
      "question": "Question text",
      "type": "single_choice",
      "difficulty": "{difficulty}",
      "answers": [
        {{"text": "Answer 1", "is_correct": true}},
        {{"text": "Answer 2", "is_correct": false}},
        {{"text": "Answer 3", "is_correct": false}},
        {{"text": "Answer 4", "is_correct": false}}
      ],
      "explanation": "Short explanation of the correct answer"
    }}
  ]
}}

Return ONLY valid JSON without any additional text."#,
        count = params.num_questions,
        text = params.text,
    )
}

/// JSON schema for providers that support strict structured output.
pub fn get_question_generation_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "questions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string" },
                        "type": {
                            "type": "string",
                            "enum": ["single_choice", "multiple_choice", "true_false", "short_answer"]
                        },
                        "difficulty": { "type": "string", "enum": ["easy", "medium", "hard"] },
                        "answers": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "text": { "type": "string" },
                                    "is_correct": { "type": "boolean" }
                                },
                                "required": ["text", "is_correct"],
                                "additionalProperties": false
                            }
                        },
                        "explanation": { "type": "string" }
                    },
                    "required": ["question", "type", "difficulty", "answers", "explanation"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["questions"],
        "additionalProperties": false
    })
}
