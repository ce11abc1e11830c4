//! Dropserve Static File Server Module
//!
//! - Static file serving with index files, directory listings and byte ranges
//! - Download classification by MIME type
//! - Style injection for directory responses

pub mod classify;
mod file_server;
pub mod mime;
pub mod style;

pub use classify::{RequestClass, classify, content_disposition};
pub use file_server::{FileBody, FileServer, FileServerConfig, Served, ServedBody, ServedFile};
pub use style::{STYLE, StyledBody};
