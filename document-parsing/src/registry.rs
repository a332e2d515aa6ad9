use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use common::error::AppError;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::parsers::{OfficeXmlParser, PdfParser, PlainTextParser};

/// A text-extraction capability for one file type.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// The file-type tag this parser is registered under, e.g. `"pdf"`.
    fn supported_type(&self) -> &str;

    /// Reads the entire stream and returns the extracted text.
    ///
    /// Empty input yields an empty string. Implementations must stop waiting
    /// on the stream once `cancel` fires and return [`AppError::Cancelled`].
    async fn parse(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        cancel: &CancellationToken,
    ) -> Result<String, AppError>;
}

/// File-type tag to parser lookup.
///
/// Registration takes `&mut self`, so once the registry is shared behind an
/// `Arc` it is read-only and lookups need no locking.
#[derive(Default, Clone)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn DocumentParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `pdf`, `docx`, `pptx`, `txt` and `md` parsers.
    pub fn with_default_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(PdfParser);
        registry.register(OfficeXmlParser::docx());
        registry.register(OfficeXmlParser::pptx());
        registry.register(PlainTextParser::txt());
        registry.register(PlainTextParser::markdown());
        registry
    }

    /// Inserts `parser` under its own tag. A later registration for the same
    /// tag replaces the earlier one.
    pub fn register<P>(&mut self, parser: P)
    where
        P: DocumentParser + 'static,
    {
        let file_type = parser.supported_type().to_string();
        if self
            .parsers
            .insert(file_type.clone(), Arc::new(parser))
            .is_some()
        {
            debug!(%file_type, "replaced previously registered parser");
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn create_parser(&self, file_type: &str) -> Result<Arc<dyn DocumentParser>, AppError> {
        self.parsers
            .get(file_type)
            .cloned()
            .ok_or_else(|| AppError::UnsupportedFileType(file_type.to_string()))
    }

    pub fn supported_types(&self) -> HashSet<&str> {
        self.parsers.keys().map(String::as_str).collect()
    }

    pub fn is_supported(&self, file_type: &str) -> bool {
        self.parsers.contains_key(file_type)
    }

    /// Looks up the parser for `file_type` and runs it over `reader`.
    pub async fn parse(
        &self,
        file_type: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        cancel: &CancellationToken,
    ) -> Result<String, AppError> {
        let parser = self.create_parser(file_type)?;
        let text = parser.parse(reader, cancel).await?;
        debug!(%file_type, bytes = text.len(), "extracted document text");
        Ok(text)
    }
}
