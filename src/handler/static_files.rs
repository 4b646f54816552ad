//! Static file serving module
//!
//! Paths no route claims are looked up in the static directory, which is
//! mounted at `/`. Responses carry an `ETag` and honor `If-None-Match`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::http::{self, mime, HttpResponse};
use crate::logger;

/// Serve `request_path` from `static_dir`, or 404
pub async fn serve(
    static_dir: &Path,
    request_path: &str,
    if_none_match: Option<&str>,
) -> HttpResponse {
    match load_from_directory(static_dir, request_path).await {
        Some((content, content_type)) => {
            let etag = generate_etag(&content);
            if check_etag_match(if_none_match, &etag) {
                return http::build_304_response(&etag);
            }
            http::build_cached_response(Bytes::from(content), content_type, &etag)
        }
        None => http::build_404_response(),
    }
}

/// Load a file from the static directory; `None` for anything missing,
/// unreadable, or resolving outside the directory
async fn load_from_directory(
    static_dir: &Path,
    request_path: &str,
) -> Option<(Vec<u8>, &'static str)> {
    let relative = relative_path(request_path)?;

    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_debug(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let file_path = fs::canonicalize(static_dir.join(&relative)).await.ok()?;
    if !file_path.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            file_path.display()
        ));
        return None;
    }
    if !fs::metadata(&file_path).await.ok()?.is_file() {
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Decode the URL path and keep it only if every component is a plain name
fn relative_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let trimmed = decoded.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.contains('\0') {
        return None;
    }

    let path = PathBuf::from(trimmed);
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then_some(path)
}

/// Quoted hash of the content, e.g. `"9f2c1a"`
fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether an `If-None-Match` value (single, list, or `*`) covers `etag`
fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client| {
        client
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{CONTENT_TYPE, ETAG};
    use hyper::StatusCode;

    fn static_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body {}").unwrap();
        std::fs::write(dir.path().join("a b.txt"), "spaced").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_serves_file_with_etag() {
        let dir = static_dir();
        let response = serve(dir.path(), "/css/site.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css");

        let etag = response.headers()[ETAG].to_str().unwrap().to_string();
        let response = serve(dir.path(), "/css/site.css", Some(&etag)).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = static_dir();
        let response = serve(dir.path(), "/a%20b.txt", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_and_directories_are_404() {
        let dir = static_dir();
        for path in ["/missing.txt", "/css", "/", "/css/"] {
            let response = serve(dir.path(), path, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_traversal_is_404() {
        let dir = static_dir();
        let inner = dir.path().join("public");
        std::fs::create_dir(&inner).unwrap();
        for path in ["/../css/site.css", "/%2e%2e/css/site.css", "/./x"] {
            let response = serve(&inner, path, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[test]
    fn test_etag_helpers() {
        let etag = generate_etag(b"hello world");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag, generate_etag(b"hello world"));
        assert_ne!(etag, generate_etag(b"hello there"));

        assert!(check_etag_match(Some("\"x\", \"abc\""), "\"abc\""));
        assert!(check_etag_match(Some("*"), "\"abc\""));
        assert!(!check_etag_match(Some("\"x\""), "\"abc\""));
        assert!(!check_etag_match(None, "\"abc\""));
    }
}
