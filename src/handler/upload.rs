//! Upload inspection and spreadsheet conversion
//!
//! Workbook parsing is CPU-bound and runs on the blocking pool.

use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;

use super::error::{HandlerError, HandlerResult};
use super::router::RequestContext;
use crate::config::AppState;
use crate::http::mime::{self, UploadKind};
use crate::http::multipart::{self, UploadedFile};
use crate::http;
use crate::spreadsheet::Table;

/// Multipart field every upload form uses
const FILE_FIELD: &str = "file";
/// Name offered to the client for converted files
const CSV_DOWNLOAD_NAME: &str = "result.csv";

#[derive(Serialize)]
struct DownloadPage<'a> {
    filename: &'a str,
}

/// Echo a text upload, or render a spreadsheet upload as an HTML table
pub async fn file_upload(ctx: &RequestContext) -> HandlerResult {
    let file = read_upload(ctx).await?;

    match UploadKind::classify(file.content_type.as_deref()) {
        UploadKind::Text => {
            let text = String::from_utf8(file.data.to_vec())
                .map_err(|_| HandlerError::bad_request("text file is not valid UTF-8"))?;
            Ok(http::build_text_response(StatusCode::OK, text))
        }
        UploadKind::Spreadsheet => {
            let table = parse_table(file.data).await?;
            Ok(http::build_html_response(table.to_html()))
        }
        UploadKind::Unsupported => Err(HandlerError::UnsupportedMediaType),
    }
}

/// Convert a spreadsheet upload to CSV and send it straight back
pub async fn convert_csv(ctx: &RequestContext) -> HandlerResult {
    let file = read_upload(ctx).await?;
    let csv = to_csv(file.data).await?;
    Ok(http::build_attachment_response(
        csv,
        mime::TEXT_CSV_UTF8,
        CSV_DOWNLOAD_NAME,
    ))
}

/// Convert a spreadsheet upload to CSV, store it, and link to the download
pub async fn convert_csv_two(ctx: &RequestContext, state: &AppState) -> HandlerResult {
    let file = read_upload(ctx).await?;
    let csv = to_csv(file.data).await?;

    let filename = state.storage.save_download(&csv).await?;
    crate::logger::log_debug(&format!("Stored converted upload as {filename}"));

    let html = state.templates.render(
        "download.html",
        DownloadPage {
            filename: &filename,
        },
    )?;
    Ok(http::build_html_response(html))
}

async fn read_upload(ctx: &RequestContext) -> Result<UploadedFile, HandlerError> {
    multipart::read_file_field(&ctx.headers, ctx.body.clone(), FILE_FIELD)
        .await?
        .ok_or_else(|| HandlerError::bad_request(format!("missing file field `{FILE_FIELD}`")))
}

async fn parse_table(data: Bytes) -> Result<Table, HandlerError> {
    Ok(tokio::task::spawn_blocking(move || Table::from_workbook_bytes(&data)).await??)
}

async fn to_csv(data: Bytes) -> Result<Vec<u8>, HandlerError> {
    Ok(tokio::task::spawn_blocking(move || Table::from_workbook_bytes(&data)?.to_csv()).await??)
}
