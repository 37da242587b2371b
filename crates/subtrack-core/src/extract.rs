//! PDF text extraction seam
//!
//! The parsers only ever see text. Turning PDF bytes into that text is an
//! opaque step: all pages concatenated with newlines, column layout lost.

use crate::error::{Error, Result};

/// Turns a binary statement into plain text
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// `pdf-extract` backed extractor
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::Extraction(format!("Failed to extract PDF text: {}", e)))
    }
}

/// Extractor used when PDF support is compiled out
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedExtractor;

impl TextExtractor for UnsupportedExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
        Err(Error::Extraction(
            "PDF support not enabled (rebuild with --features pdf), or convert the statement to text first".into(),
        ))
    }
}

/// Best extractor available in this build
pub fn default_extractor() -> Box<dyn TextExtractor> {
    #[cfg(feature = "pdf")]
    {
        Box::new(PdfTextExtractor)
    }
    #[cfg(not(feature = "pdf"))]
    {
        Box::new(UnsupportedExtractor)
    }
}
