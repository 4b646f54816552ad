//! Request handler module
//!
//! Request dispatch plus one module per group of routes. Handlers are
//! stateless functions over the buffered request and the shared `AppState`.

pub mod error;
pub mod router;
pub mod static_files;

mod demo;
mod download;
mod echo;
mod login;
mod pages;
mod upload;

// Re-export main entry points
pub use router::{dispatch, handle_request};
