use common::error::AppError;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::model::{QuizAnswer, QuizDocument, QuizQuestion, TextFormat};

const INDENT_WIDTH: usize = 2;

impl QuizDocument {
    /// Serialises the document as Moodle XML, prefixed with the XML
    /// declaration and indented by two spaces.
    pub fn to_xml(&self) -> Result<String, AppError> {
        let mut writer = QuizWriter::new();
        writer.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.open("quiz", &[])?;
        for question in &self.questions {
            writer.question(question)?;
        }
        writer.close("quiz")?;
        writer.finish()
    }
}

struct QuizWriter {
    inner: Writer<Vec<u8>>,
}

impl QuizWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), AppError> {
        self.inner
            .write_event(event)
            .map_err(|e| AppError::Serialization(format!("failed to write quiz XML: {e}")))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), AppError> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<(), AppError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    // Empty text still produces an explicit open/close pair.
    fn leaf(&mut self, name: &str, text: &str) -> Result<(), AppError> {
        self.open(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// `<name format=".."><text>..</text></name>`
    fn formatted(&mut self, name: &str, format: TextFormat, text: &str) -> Result<(), AppError> {
        self.open(name, &[("format", format.as_str())])?;
        self.leaf("text", text)?;
        self.close(name)
    }

    fn question(&mut self, question: &QuizQuestion) -> Result<(), AppError> {
        self.open("question", &[("type", question.question_type.as_str())])?;

        self.open("name", &[])?;
        self.leaf("text", &question.name)?;
        self.close("name")?;
        self.formatted("questiontext", TextFormat::Html, &question.question_text)?;
        self.formatted("generalfeedback", TextFormat::Html, &question.general_feedback)?;
        self.leaf("defaultgrade", &question.default_grade.to_string())?;
        self.leaf("penalty", &question.penalty.to_string())?;
        self.leaf("hidden", if question.hidden { "1" } else { "0" })?;

        if let Some(choice) = &question.choice {
            self.leaf("single", bool_text(choice.single))?;
            self.leaf("shuffleanswers", bool_text(choice.shuffle_answers))?;
            self.leaf("answernumbering", choice.answer_numbering)?;
            self.formatted("correctfeedback", TextFormat::Html, choice.correct_feedback)?;
            self.formatted("incorrectfeedback", TextFormat::Html, choice.incorrect_feedback)?;
        }

        for answer in &question.answers {
            self.answer(answer)?;
        }

        self.close("question")
    }

    fn answer(&mut self, answer: &QuizAnswer) -> Result<(), AppError> {
        let fraction = answer.fraction.percent().to_string();
        self.open(
            "answer",
            &[("fraction", fraction.as_str()), ("format", answer.format.as_str())],
        )?;
        self.leaf("text", &answer.text)?;
        self.formatted("feedback", TextFormat::Html, &answer.feedback)?;
        self.close("answer")
    }

    fn finish(self) -> Result<String, AppError> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|e| AppError::Serialization(format!("quiz XML is not valid UTF-8: {e}")))
    }
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
