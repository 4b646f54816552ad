//! `multipart/form-data` upload extraction
//!
//! The request body is already buffered, so it is fed to `multer` as a
//! single-chunk stream.

use std::convert::Infallible;

use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;

/// One uploaded file, scoped to the request that carried it
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    /// Content type declared by the client for this part, if any
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Find the form field `field_name` in a multipart body and return its contents.
///
/// Returns `Ok(None)` when the body is valid multipart but the field is absent.
pub async fn read_file_field(
    headers: &HeaderMap,
    body: Bytes,
    field_name: &str,
) -> Result<Option<UploadedFile>, multer::Error> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let boundary = multer::parse_boundary(content_type)?;

    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await?;
        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}

/// Build a single-file multipart body; shared by handler tests
#[cfg(test)]
pub fn encode_single_file(
    field_name: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> (String, Bytes) {
    const BOUNDARY: &str = "webdemo-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        Bytes::from(body),
    )
}
