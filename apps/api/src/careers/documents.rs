//! Uploaded documents and PDF text extraction.

use anyhow::anyhow;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One resume: where it came from and its extracted text. Lives for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// True for `application/pdf`, ignoring case and parameters such as `; charset=binary`.
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Extracts the text layer of a PDF. A PDF without text yields an empty string.
///
/// Parsing runs on the blocking pool; a malformed file is reported as 422, including
/// the case where the parser panics.
pub async fn pdf_to_text(name: &str, bytes: Bytes) -> Result<String, AppError> {
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await;

    match result {
        Ok(Ok(text)) => {
            let text = text.trim().to_string();
            debug!(file = name, chars = text.len(), "extracted PDF text");
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!(file = name, "PDF extraction failed: {e}");
            Err(AppError::UnprocessableEntity(format!(
                "{name} could not be read as a PDF"
            )))
        }
        Err(join_err) if join_err.is_panic() => {
            warn!(file = name, "PDF parser panicked");
            Err(AppError::UnprocessableEntity(format!(
                "{name} could not be read as a PDF"
            )))
        }
        Err(join_err) => Err(AppError::Internal(anyhow!(
            "PDF extraction task failed: {join_err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_accepts_pdf_variants() {
        assert!(is_pdf(Some("application/pdf")));
        assert!(is_pdf(Some("Application/PDF")));
        assert!(is_pdf(Some("application/pdf; charset=binary")));
    }

    #[test]
    fn test_is_pdf_rejects_everything_else() {
        assert!(!is_pdf(None));
        assert!(!is_pdf(Some("text/plain")));
        assert!(!is_pdf(Some(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        )));
        assert!(!is_pdf(Some("application/pdfx")));
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_unprocessable() {
        let err = pdf_to_text("resume.pdf", Bytes::from_static(b"definitely not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
