//! Stored CSV downloads

use super::error::{HandlerError, HandlerResult};
use super::router::RequestContext;
use crate::config::AppState;
use crate::http::{self, mime};

/// Send a stored conversion back as `result.csv`.
///
/// Names that are not a plain file inside the downloads directory are
/// treated like missing files.
pub async fn download(ctx: &RequestContext, state: &AppState) -> HandlerResult {
    let filename = ctx.params.get("filename").ok_or(HandlerError::NotFound)?;
    let data = state.storage.read_download(filename).await?;
    Ok(http::build_attachment_response(
        data,
        mime::TEXT_CSV_UTF8,
        "result.csv",
    ))
}
