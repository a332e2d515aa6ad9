#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod factory;
mod http;
pub mod openai;
pub mod prompt;
pub mod response;
pub mod strategy;
pub mod yandex;

pub use factory::{LlmProvider, StrategyFactory};
pub use strategy::{GenerationContext, GenerationStrategy};
