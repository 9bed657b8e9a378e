//! Readers for uploaded syllabus files.

use pulldown_cmark::{Event, Parser, TagEnd};
use serde::Serialize;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Wrap width used when flattening HTML.
const HTML_TEXT_WIDTH: usize = 80;

/// File formats with a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileFormat {
    Text,
    Markdown,
    Pdf,
    Json,
    Html,
}

impl FileFormat {
    /// Extension table, checked case-insensitively.
    pub const EXTENSIONS: &'static [(&'static str, FileFormat)] = &[
        (".txt", FileFormat::Text),
        (".md", FileFormat::Markdown),
        (".pdf", FileFormat::Pdf),
        (".json", FileFormat::Json),
        (".py", FileFormat::Text),
        (".js", FileFormat::Text),
        (".html", FileFormat::Html),
        (".csv", FileFormat::Text),
    ];

    /// Supported extensions, in table order.
    pub fn supported() -> Vec<&'static str> {
        Self::EXTENSIONS.iter().map(|(ext, _)| *ext).collect()
    }

    /// Look up the reader for a lowercase extension such as `.md`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, format)| *format)
    }

    fn read(&self, bytes: &[u8]) -> Result<String> {
        match self {
            FileFormat::Text => read_text(bytes),
            FileFormat::Markdown => read_markdown(bytes),
            FileFormat::Pdf => read_pdf(bytes),
            FileFormat::Json => read_json(bytes),
            FileFormat::Html => read_html(bytes),
        }
    }
}

/// Text extracted from one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedFile {
    pub filename: String,
    /// Lowercase extension including the dot.
    pub format: String,
    pub content: String,
    /// Length of `content` in characters.
    pub size: usize,
}

/// Lowercase extension of `filename` including the dot, or `""`.
pub fn extension_of(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Extract text from an uploaded file, dispatching on its extension.
pub fn process_file(filename: &str, bytes: &[u8]) -> Result<IngestedFile> {
    let extension = extension_of(filename);
    let format =
        FileFormat::from_extension(&extension).ok_or_else(|| IngestError::UnsupportedFormat {
            extension: extension.clone(),
            supported: FileFormat::supported(),
        })?;

    debug!("Reading {} ({} bytes) as {:?}", filename, bytes.len(), format);

    let content = format.read(bytes)?;
    let size = content.chars().count();

    Ok(IngestedFile {
        filename: filename.to_string(),
        format: extension,
        content,
        size,
    })
}

/// Render an upload as the markdown document fed to curriculum generation.
pub fn syllabus_document(file: &IngestedFile) -> String {
    format!(
        "# Uploaded Syllabus: {}\n\n## Content\n{}\n\n## Analysis\n- File Type: {}\n- Content Length: {} characters\n",
        file.filename, file.content, file.format, file.size
    )
}

fn read_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| IngestError::Read(e.to_string()))
}

fn read_markdown(bytes: &[u8]) -> Result<String> {
    let source = read_text(bytes)?;
    let mut text = String::with_capacity(source.len());

    for event in Parser::new(&source) {
        match event {
            Event::Text(t) | Event::Code(t) | Event::Html(t) | Event::InlineHtml(t) => {
                text.push_str(&t)
            }
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock) => {
                text.push('\n')
            }
            _ => {}
        }
    }

    Ok(text)
}

fn read_pdf(bytes: &[u8]) -> Result<String> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| IngestError::Read(format!("PDF: {}", e)))?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        let text = document
            .extract_text(&[*page_number])
            .map_err(|e| IngestError::Read(format!("PDF page {}: {}", page_number, e)))?;
        pages.push(text);
    }

    Ok(pages.join("\n"))
}

fn read_json(bytes: &[u8]) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| IngestError::Read(format!("JSON: {}", e)))?;
    serde_json::to_string_pretty(&value).map_err(|e| IngestError::Read(e.to_string()))
}

fn read_html(bytes: &[u8]) -> Result<String> {
    html2text::from_read(bytes, HTML_TEXT_WIDTH)
        .map_err(|e| IngestError::Read(format!("HTML parsing error: {}", e)))
}
