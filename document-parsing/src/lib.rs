#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod parsers;
pub mod registry;
pub mod stream;

pub use registry::{DocumentParser, ParserRegistry};
