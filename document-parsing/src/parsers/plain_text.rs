use async_trait::async_trait;
use common::error::AppError;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::{registry::DocumentParser, stream::read_stream};

/// Parser for formats that are already text (`txt`, `md`).
///
/// Bytes are decoded lossily, so binary or mis-encoded uploads produce
/// replacement characters instead of an error.
#[derive(Debug, Clone, Copy)]
pub struct PlainTextParser {
    file_type: &'static str,
}

impl PlainTextParser {
    pub fn txt() -> Self {
        Self { file_type: "txt" }
    }

    pub fn markdown() -> Self {
        Self { file_type: "md" }
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn supported_type(&self) -> &str {
        self.file_type
    }

    async fn parse(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        cancel: &CancellationToken,
    ) -> Result<String, AppError> {
        let bytes = read_stream(reader, cancel).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
