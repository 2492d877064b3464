//! Document pre-check for the parsing flows.
//!
//! Uploaded documents arrive as data URIs. Only text is forwarded to the model;
//! binary office formats are rejected up front with a message the UI can show.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Known binary document formats and the label shown to users.
pub const UNSUPPORTED_DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "PDF"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "DOCX",
    ),
    ("application/msword", "DOC"),
    ("application/vnd.oasis.opendocument.text", "ODT"),
];

#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("{label} files cannot be processed yet. Please upload a plain text (.txt) file or paste the content instead.")]
    UnsupportedType { mime_type: String, label: &'static str },

    #[error("Unsupported file type '{0}'. Please upload a plain text (.txt) file.")]
    NotText(String),

    #[error("The uploaded document is not a valid data URI")]
    MalformedUri,

    #[error("The uploaded document could not be decoded: {0}")]
    Decode(String),

    #[error("The uploaded document is empty")]
    Empty,
}

/// A decoded text document ready to be interpolated into a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDocument {
    pub mime_type: String,
    pub text: String,
}

/// Returns the user-facing label if `mime_type` is a known-unsupported binary format.
pub fn unsupported_label(mime_type: &str) -> Option<&'static str> {
    let mime_type = mime_type.trim().to_ascii_lowercase();
    UNSUPPORTED_DOCUMENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .map(|(_, label)| *label)
}

/// Parses a `data:<mime>[;params][;base64],<payload>` URI into text.
///
/// The MIME type is checked before the payload is decoded, so rejected
/// binaries are never materialized.
pub fn extract_text(data_uri: &str) -> Result<TextDocument, DocumentError> {
    let trimmed = data_uri.trim();
    let rest = match trimmed.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &trimmed[5..],
        _ => return Err(DocumentError::MalformedUri),
    };
    let (meta, payload) = rest.split_once(',').ok_or(DocumentError::MalformedUri)?;

    let mut parts = meta.split(';');
    let mime_type = match parts.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    if let Some(label) = unsupported_label(&mime_type) {
        return Err(DocumentError::UnsupportedType { mime_type, label });
    }
    if !mime_type.starts_with("text/") {
        return Err(DocumentError::NotText(mime_type));
    }

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| DocumentError::Decode(e.to_string()))?
    } else {
        // Malformed escapes pass through as literal text.
        percent_decode_str(payload).collect::<Vec<u8>>()
    };

    let text = String::from_utf8(bytes).map_err(|e| DocumentError::Decode(e.to_string()))?;
    let text = text.trim_start_matches('\u{feff}').trim().to_string();
    if text.is_empty() {
        return Err(DocumentError::Empty);
    }

    Ok(TextDocument { mime_type, text })
}

/// Builds a base64 data URI, used for multipart uploads.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type.trim(), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_base64_round_trip() {
        let uri = to_data_uri("text/plain", "Jane Doe\nRust developer".as_bytes());
        let doc = extract_text(&uri).unwrap();
        assert_eq!(doc.mime_type, "text/plain");
        assert_eq!(doc.text, "Jane Doe\nRust developer");
    }

    #[test]
    fn test_every_unsupported_type_is_rejected() {
        for &(mime, label) in UNSUPPORTED_DOCUMENT_TYPES {
            let uri = format!("data:{mime};base64,JVBERi0xLjQK");
            let err = extract_text(&uri).unwrap_err();
            assert_eq!(
                err,
                DocumentError::UnsupportedType {
                    mime_type: mime.to_string(),
                    label
                }
            );
            assert!(err.to_string().starts_with(label));
        }
    }

    #[test]
    fn test_unsupported_check_ignores_case() {
        assert_eq!(unsupported_label("Application/PDF"), Some("PDF"));
        assert_eq!(unsupported_label("text/plain"), None);
    }

    #[test]
    fn test_unsupported_rejected_even_with_garbage_payload() {
        let err = extract_text("data:application/pdf;base64,!!!not base64!!!").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType { .. }));
    }

    #[test]
    fn test_image_is_not_text() {
        let err = extract_text("data:image/png;base64,iVBORw0KGgo=").unwrap_err();
        assert_eq!(err, DocumentError::NotText("image/png".to_string()));
    }

    #[test]
    fn test_mime_parameters_and_percent_encoding() {
        let doc = extract_text("data:text/markdown;charset=utf-8,%23%20Senior%20Engineer").unwrap();
        assert_eq!(doc.mime_type, "text/markdown");
        assert_eq!(doc.text, "# Senior Engineer");
    }

    #[test]
    fn test_percent_encoded_multibyte_text() {
        let doc = extract_text("data:text/plain,Caf%C3%A9%20lead%20%E2%80%93%20Lyon").unwrap();
        assert_eq!(doc.text, "Café lead – Lyon");
    }

    #[test]
    fn test_stray_percent_kept_literally() {
        let doc = extract_text("data:,Equity%20up%20to%2010%").unwrap();
        assert_eq!(doc.text, "Equity up to 10%");
        let doc = extract_text("data:,50%é").unwrap();
        assert_eq!(doc.text, "50%é");
    }

    #[test]
    fn test_percent_encoded_invalid_utf8_rejected() {
        assert!(matches!(
            extract_text("data:text/plain,%FF%FEabc"),
            Err(DocumentError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_mime_defaults_to_text() {
        let doc = extract_text("data:,hello").unwrap();
        assert_eq!(doc.mime_type, "text/plain");
    }

    #[test]
    fn test_malformed_uris() {
        assert_eq!(extract_text("hello world"), Err(DocumentError::MalformedUri));
        assert_eq!(extract_text("data:text/plain"), Err(DocumentError::MalformedUri));
    }

    #[test]
    fn test_whitespace_only_document_is_empty() {
        let uri = to_data_uri("text/plain", b"  \n\t ");
        assert_eq!(extract_text(&uri), Err(DocumentError::Empty));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let uri = to_data_uri("text/plain", &[0xff, 0xfe, 0x00, 0x41]);
        assert!(matches!(extract_text(&uri), Err(DocumentError::Decode(_))));
    }
}
