use common::{
    error::AppError,
    types::{
        exportable::{AnswersByQuestion, ExportableAnswer, ExportableQuestion},
        question::QuestionType,
    },
};
use tracing::debug;

use crate::{
    model::{
        ChoiceSettings, Fraction, MoodleQuestionType, QuizAnswer, QuizDocument, QuizQuestion,
        TextFormat, FALSE_TEXT, PENALTY, TRUE_TEXT,
    },
    sanitize::sanitize_text,
};

/// Converts persisted questions into a Moodle XML quiz.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizExporter;

impl QuizExporter {
    pub fn new() -> Self {
        Self
    }

    /// Exports `questions` in the given order. Any single conversion failure
    /// aborts the whole export.
    ///
    /// `quiz_title` is not part of the emitted schema; it only labels the
    /// diagnostics of this call.
    pub fn export(
        &self,
        quiz_title: &str,
        questions: &[ExportableQuestion],
        answers: &AnswersByQuestion,
    ) -> Result<String, AppError> {
        let document = self.build_document(quiz_title, questions, answers)?;
        let xml = document.to_xml()?;
        debug!(quiz_title, bytes = xml.len(), "quiz exported");
        Ok(xml)
    }

    pub fn build_document(
        &self,
        quiz_title: &str,
        questions: &[ExportableQuestion],
        answers: &AnswersByQuestion,
    ) -> Result<QuizDocument, AppError> {
        debug!(quiz_title, questions = questions.len(), "building quiz document");

        let questions = questions
            .iter()
            .map(|question| {
                let source = answers.get(&question.id).map_or(&[][..], Vec::as_slice);
                convert_question(question, source)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuizDocument { questions })
    }
}

fn convert_question(
    question: &ExportableQuestion,
    answers: &[ExportableAnswer],
) -> Result<QuizQuestion, AppError> {
    let question_type: QuestionType = question.question_type.parse().map_err(|_| {
        AppError::ConversionFailure {
            question_id: question.id.to_string(),
            reason: format!("unsupported question type: {}", question.question_type),
        }
    })?;

    let (moodle_type, choice, answers) = match question_type {
        QuestionType::SingleChoice => (
            MoodleQuestionType::MultiChoice,
            Some(ChoiceSettings::new(true)),
            convert_answers(answers),
        ),
        QuestionType::MultipleChoice => (
            MoodleQuestionType::MultiChoice,
            Some(ChoiceSettings::new(false)),
            convert_answers(answers),
        ),
        QuestionType::TrueFalse => (
            MoodleQuestionType::TrueFalse,
            None,
            true_false_answers(answers),
        ),
        QuestionType::ShortAnswer => (
            MoodleQuestionType::ShortAnswer,
            None,
            convert_answers(answers),
        ),
    };

    let text = sanitize_text(&question.question_text);
    Ok(QuizQuestion {
        question_type: moodle_type,
        name: text.clone(),
        question_text: text,
        general_feedback: String::new(),
        default_grade: question.points,
        penalty: PENALTY,
        hidden: false,
        choice,
        answers,
    })
}

fn convert_answers(answers: &[ExportableAnswer]) -> Vec<QuizAnswer> {
    answers
        .iter()
        .map(|answer| QuizAnswer {
            fraction: Fraction::from_correct(answer.is_correct),
            format: TextFormat::Html,
            text: sanitize_text(&answer.text),
            feedback: String::new(),
        })
        .collect()
}

/// Always `True` then `False`. `True` gets full credit iff a correct source
/// answer reads "true" (trimmed, any case); otherwise `False` does.
fn true_false_answers(answers: &[ExportableAnswer]) -> Vec<QuizAnswer> {
    let true_is_correct = answers
        .iter()
        .filter(|answer| answer.is_correct)
        .any(|answer| answer.text.trim().eq_ignore_ascii_case("true"));

    let fixed = |text: &str, is_correct: bool| QuizAnswer {
        fraction: Fraction::from_correct(is_correct),
        format: TextFormat::MoodleAutoFormat,
        text: text.to_string(),
        feedback: String::new(),
    };

    vec![
        fixed(TRUE_TEXT, true_is_correct),
        fixed(FALSE_TEXT, !true_is_correct),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use common::types::question::QuestionId;

    use super::*;

    fn answer(text: &str, is_correct: bool) -> ExportableAnswer {
        ExportableAnswer {
            text: text.into(),
            is_correct,
        }
    }

    fn question(kind: &str, text: &str) -> ExportableQuestion {
        ExportableQuestion {
            id: QuestionId::new(),
            question_text: text.into(),
            question_type: kind.into(),
            points: 1.0,
        }
    }

    fn build(
        question: &ExportableQuestion,
        answers: Vec<ExportableAnswer>,
    ) -> Result<QuizDocument, AppError> {
        let map = HashMap::from([(question.id, answers)]);
        QuizExporter::new().build_document("quiz", std::slice::from_ref(question), &map)
    }

    fn fractions(question: &QuizQuestion) -> Vec<u8> {
        question
            .answers
            .iter()
            .map(|answer| answer.fraction.percent())
            .collect()
    }

    #[test]
    fn single_choice_becomes_single_multichoice() {
        let q = question("single_choice", "Pick one");
        let doc = build(
            &q,
            vec![
                answer("A", true),
                answer("B", false),
                answer("C", false),
                answer("D", false),
            ],
        )
        .expect("convert");

        let converted = &doc.questions[0];
        assert_eq!(converted.question_type, MoodleQuestionType::MultiChoice);
        assert_eq!(converted.choice.as_ref().map(|c| c.single), Some(true));
        assert_eq!(fractions(converted), vec![100, 0, 0, 0]);
        assert!(converted
            .answers
            .iter()
            .all(|a| a.format == TextFormat::Html));
    }

    #[test]
    fn multiple_choice_keeps_every_correct_answer_in_order() {
        let q = question("multiple_choice", "Pick many");
        let doc = build(
            &q,
            vec![answer("A", true), answer("B", false), answer("C", true)],
        )
        .expect("convert");

        let converted = &doc.questions[0];
        assert_eq!(converted.choice.as_ref().map(|c| c.single), Some(false));
        assert_eq!(fractions(converted), vec![100, 0, 100]);
        let texts: Vec<_> = converted.answers.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, ["A", "B", "C"]);
    }

    #[test]
    fn true_false_is_normalised_regardless_of_source_order() {
        let q = question("true_false", "Water is wet");
        let doc = build(&q, vec![answer("false", false), answer("  TRUE ", true)]).expect("convert");

        let converted = &doc.questions[0];
        assert_eq!(converted.question_type, MoodleQuestionType::TrueFalse);
        assert!(converted.choice.is_none());
        let texts: Vec<_> = converted.answers.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, [TRUE_TEXT, FALSE_TEXT]);
        assert_eq!(fractions(converted), vec![100, 0]);
        assert!(converted
            .answers
            .iter()
            .all(|a| a.format == TextFormat::MoodleAutoFormat));
    }

    #[test]
    fn true_false_with_correct_false_answer() {
        let q = question("true_false", "Fire is cold");
        let doc = build(&q, vec![answer("True", false), answer("False", true)]).expect("convert");
        assert_eq!(fractions(&doc.questions[0]), vec![0, 100]);
    }

    #[test]
    fn true_false_always_has_exactly_one_full_credit_answer() {
        for source in [
            vec![],
            vec![answer("true", false), answer("false", false)],
            vec![answer("true", true), answer("false", true)],
            vec![answer("yes", true)],
        ] {
            let q = question("true_false", "Edge case");
            let doc = build(&q, source).expect("convert");
            let full = fractions(&doc.questions[0])
                .into_iter()
                .filter(|f| *f == 100)
                .count();
            assert_eq!(full, 1);
            assert_eq!(doc.questions[0].answers.len(), 2);
        }
    }

    #[test]
    fn short_answer_exports_every_answer() {
        let q = question("short_answer", "Capital of France?");
        let doc = build(&q, vec![answer(" Paris ", true), answer("paris", true)]).expect("convert");

        let converted = &doc.questions[0];
        assert_eq!(converted.question_type, MoodleQuestionType::ShortAnswer);
        assert!(converted.choice.is_none());
        assert_eq!(converted.answers[0].text, "Paris");
        assert_eq!(fractions(converted), vec![100, 100]);
    }

    #[test]
    fn unknown_type_is_a_conversion_failure() {
        let q = question("essay", "Discuss");
        let err = build(&q, vec![answer("anything", true)]).expect_err("essay is unsupported");

        match err {
            AppError::ConversionFailure {
                question_id,
                reason,
            } => {
                assert_eq!(question_id, q.id.to_string());
                assert!(reason.contains("essay"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_answers_entry_means_no_answers() {
        let q = question("single_choice", "Orphan");
        let doc = QuizExporter::new()
            .build_document("quiz", std::slice::from_ref(&q), &HashMap::new())
            .expect("convert");
        assert!(doc.questions[0].answers.is_empty());
    }

    #[test]
    fn shared_fields_are_fixed() {
        let mut q = question("short_answer", "   Spaced   ");
        q.points = 3.0;
        let doc = build(&q, vec![answer("x", true)]).expect("convert");

        let converted = &doc.questions[0];
        assert_eq!(converted.name, "Spaced");
        assert_eq!(converted.question_text, "Spaced");
        assert!(converted.general_feedback.is_empty());
        assert!((converted.default_grade - 3.0).abs() < f64::EPSILON);
        assert!((converted.penalty - PENALTY).abs() < f64::EPSILON);
        assert!(!converted.hidden);
    }
}
