mod office;
mod pdf;
mod plain_text;

pub use office::OfficeXmlParser;
pub use pdf::PdfParser;
pub use plain_text::PlainTextParser;
