#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod exporter;
pub mod model;
pub mod sanitize;
mod xml;

pub use exporter::QuizExporter;
pub use model::QuizDocument;
pub use sanitize::sanitize_text;
