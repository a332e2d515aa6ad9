#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod error;
pub mod types;
pub mod utils;
