//! Document text extraction
//!
//! Attachments are turned into page text by a [`TextExtractor`]. The
//! default [`PdfExtractor`] is backed by `lopdf`; tests and embedders can
//! inject their own implementation.

use crate::error::{ParleyError, Result};
use async_trait::async_trait;
use std::path::Path;

/// The only MIME type accepted for attachments
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Magic prefix of a PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// An uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown in the transcript
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from its parts
    ///
    /// The MIME type is taken as given; use [`Attachment::from_path`] to
    /// infer it from a file.
    ///
    /// # Arguments
    ///
    /// * `name` - File name shown in the transcript marker
    /// * `mime_type` - Declared MIME type, compared case-insensitively
    /// * `bytes` - Raw file contents
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::extract::Attachment;
    ///
    /// let attachment = Attachment::new("paper.pdf", "application/pdf", b"%PDF-1.4".to_vec());
    /// assert!(attachment.is_pdf());
    /// ```
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, inferring its MIME type
    ///
    /// # Arguments
    ///
    /// * `path` - File to read; its final component becomes the name
    ///
    /// # Returns
    ///
    /// Returns the attachment with a MIME type from [`infer_mime_type`]
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = infer_mime_type(path, &bytes).to_string();

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// Whether this attachment is a PDF
    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE)
    }
}

/// Infers a MIME type from the file extension or content
///
/// Only PDFs are recognized; everything else is `application/octet-stream`.
///
/// # Examples
///
/// ```
/// use parley::extract::infer_mime_type;
/// use std::path::Path;
///
/// assert_eq!(infer_mime_type(Path::new("paper.PDF"), b""), "application/pdf");
/// assert_eq!(infer_mime_type(Path::new("blob"), b"%PDF-1.7"), "application/pdf");
/// assert_eq!(infer_mime_type(Path::new("notes.txt"), b"hello"), "application/octet-stream");
/// ```
pub fn infer_mime_type(path: &Path, bytes: &[u8]) -> &'static str {
    let pdf_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if pdf_extension || bytes.starts_with(PDF_MAGIC) {
        PDF_MIME_TYPE
    } else {
        "application/octet-stream"
    }
}

/// Produces page text from a document
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts the text of every page, in page order
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or cannot be read
    async fn extract_text(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Joins page texts with blank lines into a single attachment string
///
/// # Examples
///
/// ```
/// use parley::extract::join_pages;
///
/// let pages = vec!["Page one".to_string(), "Page two".to_string()];
/// assert_eq!(join_pages(&pages), "Page one\n\nPage two");
/// ```
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n\n")
}

/// `lopdf`-backed PDF text extractor
///
/// Parsing runs on the blocking thread pool so a large document does not
/// stall the async runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    fn extract_blocking(bytes: &[u8]) -> Result<Vec<String>> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| ParleyError::Extraction(format!("Failed to load PDF: {}", e)))?;

        // get_pages is keyed by 1-based page number in ascending order
        let pages = document.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        for page_number in pages.keys() {
            let text = document.extract_text(&[*page_number]).map_err(|e| {
                ParleyError::Extraction(format!(
                    "Failed to extract text from page {}: {}",
                    page_number, e
                ))
            })?;
            texts.push(text.trim().to_string());
        }

        tracing::debug!("Extracted text from {} PDF pages", texts.len());
        Ok(texts)
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || Self::extract_blocking(&owned))
            .await
            .map_err(|e| ParleyError::Extraction(format!("Extraction task failed: {}", e)))?
    }
}
