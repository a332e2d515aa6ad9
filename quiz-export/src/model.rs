//! Typed form of the Moodle quiz document, built fresh for every export.

pub const PENALTY: f64 = 0.333_333_3;
pub const ANSWER_NUMBERING: &str = "abc";
pub const CORRECT_FEEDBACK: &str = "Correct!";
pub const INCORRECT_FEEDBACK: &str = "Incorrect.";
pub const TRUE_TEXT: &str = "True";
pub const FALSE_TEXT: &str = "False";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodleQuestionType {
    MultiChoice,
    TrueFalse,
    ShortAnswer,
}

impl MoodleQuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiChoice => "multichoice",
            Self::TrueFalse => "truefalse",
            Self::ShortAnswer => "shortanswer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Html,
    MoodleAutoFormat,
}

impl TextFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::MoodleAutoFormat => "moodle_auto_format",
        }
    }
}

/// Score weight of an answer; only full or no credit is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fraction {
    Zero,
    Full,
}

impl Fraction {
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            Self::Full
        } else {
            Self::Zero
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::Full => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizAnswer {
    pub fraction: Fraction,
    pub format: TextFormat,
    pub text: String,
    pub feedback: String,
}

/// Settings emitted only for `multichoice` questions.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSettings {
    pub single: bool,
    pub shuffle_answers: bool,
    pub answer_numbering: &'static str,
    pub correct_feedback: &'static str,
    pub incorrect_feedback: &'static str,
}

impl ChoiceSettings {
    pub fn new(single: bool) -> Self {
        Self {
            single,
            shuffle_answers: true,
            answer_numbering: ANSWER_NUMBERING,
            correct_feedback: CORRECT_FEEDBACK,
            incorrect_feedback: INCORRECT_FEEDBACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub question_type: MoodleQuestionType,
    pub name: String,
    pub question_text: String,
    pub general_feedback: String,
    pub default_grade: f64,
    pub penalty: f64,
    pub hidden: bool,
    pub choice: Option<ChoiceSettings>,
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizDocument {
    pub questions: Vec<QuizQuestion>,
}
