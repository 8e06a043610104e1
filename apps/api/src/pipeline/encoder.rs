//! Document Encoder — turns an uploaded résumé into a transport-safe form.
//!
//! The MIME gate and read checks run before any network call, so a bad file
//! never costs an inference request. Encoding is lossless base64 for
//! JSON-embedded transport; the raw bytes are held only in memory.

use base64::Engine;
use bytes::Bytes;

use crate::errors::AppError;
use crate::llm_client::{InlinePdf, PDF_MIME};

/// An uploaded résumé held in memory for the duration of one submission.
#[derive(Debug, Clone)]
pub struct ResumeAttachment {
    pub filename: String,
    bytes: Bytes,
}

impl ResumeAttachment {
    /// Accepts an upload, enforcing the `application/pdf` MIME gate.
    ///
    /// A wrong declared type is a validation problem (pick a different file);
    /// an empty payload is a read problem (re-select the same file).
    pub fn from_upload(
        filename: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, AppError> {
        match content_type {
            Some(mime) if mime == PDF_MIME => {}
            Some(mime) => {
                return Err(AppError::Validation(format!(
                    "Only PDF files are accepted (got '{mime}'). Please select a PDF file."
                )))
            }
            None => {
                return Err(AppError::Validation(
                    "The uploaded file did not declare a content type. Please select a PDF file."
                        .to_string(),
                ))
            }
        }

        if bytes.is_empty() {
            return Err(AppError::DocumentRead("the file was empty".to_string()));
        }

        Ok(Self {
            filename: filename.to_string(),
            bytes,
        })
    }

    /// Encodes the attachment for JSON-embedded transport. Pure; the original
    /// bytes stay untouched so encoding is reversible.
    pub fn encode(&self) -> InlinePdf {
        InlinePdf {
            mime_type: PDF_MIME.to_string(),
            data_base64: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}
