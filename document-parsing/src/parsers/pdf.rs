use async_trait::async_trait;
use common::error::AppError;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::{
    registry::DocumentParser,
    stream::{extract_blocking, read_stream},
};

/// Extracts the text layer of a PDF with `pdf-extract`.
///
/// Scanned documents without a text layer come back as (near) empty strings;
/// OCR is left to a parser registered in this one's place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

#[async_trait]
impl DocumentParser for PdfParser {
    fn supported_type(&self) -> &str {
        "pdf"
    }

    async fn parse(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        cancel: &CancellationToken,
    ) -> Result<String, AppError> {
        let pdf_bytes = read_stream(reader, cancel).await?;
        if pdf_bytes.is_empty() {
            return Ok(String::new());
        }

        extract_blocking("pdf", cancel, move || {
            pdf_extract::extract_text_from_mem(&pdf_bytes)
                .map(|text| text.trim().to_string())
                .map_err(|err| err.to_string())
        })
        .await
    }
}
