//! MIME type module
//!
//! Content types the server emits, upload type classification, and
//! extension-based detection for static files.

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";
pub const TEXT_CSV_UTF8: &str = "text/csv; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Modern (Office Open XML) workbook
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Legacy binary workbook
pub const XLS: &str = "application/vnd.ms-excel";

/// How an uploaded file is treated, judged only by its declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Spreadsheet,
    Unsupported,
}

impl UploadKind {
    /// Classify a declared content type (parameters such as `charset` are ignored)
    pub fn classify(content_type: Option<&str>) -> Self {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match essence.as_deref() {
            Some(TEXT_PLAIN) => Self::Text,
            Some(XLSX | XLS) => Self::Spreadsheet,
            _ => Self::Unsupported,
        }
    }
}

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html" | "htm") => TEXT_HTML_UTF8,
        Some("css") => "text/css",
        Some("txt" | "md") => TEXT_PLAIN_UTF8,
        Some("csv") => TEXT_CSV_UTF8,
        Some("js" | "mjs") => "application/javascript",
        Some("json") => APPLICATION_JSON,
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        Some("xlsx") => XLSX,
        Some("xls") => XLS,
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_uploads() {
        assert_eq!(UploadKind::classify(Some("text/plain")), UploadKind::Text);
        assert_eq!(
            UploadKind::classify(Some("text/plain; charset=utf-8")),
            UploadKind::Text
        );
        assert_eq!(UploadKind::classify(Some(XLSX)), UploadKind::Spreadsheet);
        assert_eq!(UploadKind::classify(Some(XLS)), UploadKind::Spreadsheet);
        assert_eq!(UploadKind::classify(Some("image/png")), UploadKind::Unsupported);
        assert_eq!(UploadKind::classify(None), UploadKind::Unsupported);
    }

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), TEXT_HTML_UTF8);
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("csv")), TEXT_CSV_UTF8);
        assert_eq!(get_content_type(Some("xyz")), OCTET_STREAM);
        assert_eq!(get_content_type(None), OCTET_STREAM);
    }
}
