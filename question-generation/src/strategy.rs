use std::{fmt, sync::Arc};

use async_trait::async_trait;
use common::{
    error::AppError,
    types::generation::{GeneratedQuestion, GenerationParams},
};
use tokio_util::sync::CancellationToken;

/// A question-generation backend.
#[async_trait]
pub trait GenerationStrategy: Send + Sync {
    /// Returns at most `params.num_questions` well-formed questions.
    ///
    /// Outbound calls are abandoned when `cancel` fires, yielding
    /// [`AppError::Cancelled`].
    async fn generate_questions(
        &self,
        cancel: &CancellationToken,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedQuestion>, AppError>;

    fn provider_name(&self) -> &str;
}

pub const NO_PROVIDER: &str = "none";

/// Holds the currently selected strategy, if any.
#[derive(Clone, Default)]
pub struct GenerationContext {
    strategy: Option<Arc<dyn GenerationStrategy>>,
}

impl GenerationContext {
    pub fn new(strategy: Arc<dyn GenerationStrategy>) -> Self {
        Self {
            strategy: Some(strategy),
        }
    }

    pub fn set_strategy(&mut self, strategy: Arc<dyn GenerationStrategy>) {
        self.strategy = Some(strategy);
    }

    pub fn clear_strategy(&mut self) {
        self.strategy = None;
    }

    pub fn provider_name(&self) -> &str {
        self.strategy
            .as_deref()
            .map_or(NO_PROVIDER, |strategy| strategy.provider_name())
    }

    pub async fn generate_questions(
        &self,
        cancel: &CancellationToken,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedQuestion>, AppError> {
        let strategy = self.strategy.as_ref().ok_or(AppError::NoStrategySet)?;
        strategy.generate_questions(cancel, params).await
    }
}

impl fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("provider", &self.provider_name())
            .finish()
    }
}
