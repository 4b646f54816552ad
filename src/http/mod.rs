//! HTTP protocol layer module
//!
//! Request decoding and response building shared by all handlers,
//! decoupled from what any particular route does.

pub mod form;
pub mod mime;
pub mod multipart;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_attachment_response, build_cached_response, build_empty_response,
    build_html_response, build_json_response, build_options_response,
    build_redirect_response, build_text_response, into_head_response, HttpResponse,
};
