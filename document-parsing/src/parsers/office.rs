use std::io::{Cursor, Read};

use async_trait::async_trait;
use common::error::AppError;
use quick_xml::{events::Event, Reader};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use crate::{
    registry::DocumentParser,
    stream::{extract_blocking, read_stream},
};

const DOCX_BODY: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OfficeFormat {
    Docx,
    Pptx,
}

/// Parser for the zipped Office Open XML formats (`docx`, `pptx`).
///
/// Both formats keep their text in `<*:t>` runs grouped into `<*:p>`
/// paragraphs, so one reader handles both; only the part names differ.
#[derive(Debug, Clone, Copy)]
pub struct OfficeXmlParser {
    format: OfficeFormat,
}

impl OfficeXmlParser {
    pub fn docx() -> Self {
        Self {
            format: OfficeFormat::Docx,
        }
    }

    pub fn pptx() -> Self {
        Self {
            format: OfficeFormat::Pptx,
        }
    }
}

#[async_trait]
impl DocumentParser for OfficeXmlParser {
    fn supported_type(&self) -> &str {
        match self.format {
            OfficeFormat::Docx => "docx",
            OfficeFormat::Pptx => "pptx",
        }
    }

    async fn parse(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        cancel: &CancellationToken,
    ) -> Result<String, AppError> {
        let bytes = read_stream(reader, cancel).await?;
        if bytes.is_empty() {
            return Ok(String::new());
        }

        match self.format {
            OfficeFormat::Docx => {
                extract_blocking("docx", cancel, move || extract_docx(&bytes)).await
            }
            OfficeFormat::Pptx => {
                extract_blocking("pptx", cancel, move || extract_pptx(&bytes)).await
            }
        }
    }
}

fn open_archive(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, String> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a valid Office archive: {e}"))
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String, String> {
    let mut entry = archive.by_name(name).map_err(|_| format!("missing {name}"))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {name}: {e}"))?;
    Ok(xml)
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_archive(bytes)?;
    let xml = read_part(&mut archive, DOCX_BODY)?;
    Ok(paragraphs(&xml)?.join("\n\n"))
}

fn extract_pptx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_archive(bytes)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(PPTX_SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    // slide10.xml sorts after slide2.xml
    slides.sort_unstable_by_key(|(number, _)| *number);

    let mut sections = Vec::with_capacity(slides.len());
    for (_, name) in slides {
        let xml = read_part(&mut archive, &name)?;
        let text = paragraphs(&xml)?.join("\n");
        if !text.is_empty() {
            sections.push(text);
        }
    }

    Ok(sections.join("\n\n"))
}

/// Collects the text of every non-empty paragraph, in document order.
fn paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut output = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        output.push(paragraph.to_string());
                    }
                    current.clear();
                }
                b"t" => in_text_run = false,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text_run => {
                let text = e.unescape().map_err(|err| format!("XML parse error: {err}"))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(format!("XML parse error: {err}")),
            _ => {}
        }
    }

    Ok(output)
}
