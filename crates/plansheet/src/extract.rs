//! Text extraction for drawing sets.
//!
//! Only PDF is supported. Failures are returned, never raised: an import
//! logs the error and registers the document without text.

use std::path::Path;

#[derive(Debug)]
pub enum ExtractError {
    UnsupportedType(String),
    Pdf(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::UnsupportedType(ext) => {
                write!(f, "unsupported file type: {}", ext)
            }
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Whether [`extract_text`] can handle a file with this name.
pub fn is_extractable(file_name: &str) -> bool {
    extension(file_name).as_deref() == Some("pdf")
}

/// Extract plain text from a file's bytes, choosing the decoder by extension.
pub fn extract_text(bytes: &[u8], file_name: &str) -> Result<String, ExtractError> {
    match extension(file_name).as_deref() {
        Some("pdf") => extract_pdf(bytes),
        Some(other) => Err(ExtractError::UnsupportedType(other.to_string())),
        None => Err(ExtractError::UnsupportedType(String::new())),
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed files.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractError::Pdf("malformed PDF".to_string()))?;
    let text = result.map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_extractable() {
        assert!(is_extractable("A-101.pdf"));
        assert!(is_extractable("A-101.PDF"));
        assert!(!is_extractable("notes.txt"));
        assert!(!is_extractable("README"));
    }

    #[test]
    fn test_unsupported_type() {
        let err = extract_text(b"hello", "notes.txt").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(ref e) if e == "txt"));
        assert_eq!(err.to_string(), "unsupported file type: txt");
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        let err = extract_text(b"definitely not a pdf", "A-1.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }
}
