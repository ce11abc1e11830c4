//! Request classification
//!
//! Decides, from the request path alone, whether a request targets a
//! directory and whether the file it names should be downloaded rather
//! than rendered.

use http::HeaderValue;

use crate::mime::is_download_extension;

/// Outcome of [`classify`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestClass {
    /// The path ends with `/`
    pub is_directory: bool,
    /// The final segment's type is in the download table
    pub forces_download: bool,
}

/// Classify a decoded request path.
pub fn classify(path: &str) -> RequestClass {
    if path.ends_with('/') {
        return RequestClass {
            is_directory: true,
            forces_download: false,
        };
    }

    let forces_download = extension(basename(path))
        .map(is_download_extension)
        .unwrap_or(false);

    RequestClass {
        is_directory: false,
        forces_download,
    }
}

/// Final segment of a path (everything after the last `/`)
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Text after the last `.` of a file name.
///
/// `.pdf` has extension `pdf`; `README` has none.
fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Build `attachment; filename="<name>"` for a file name.
///
/// `\` and `"` are escaped as quoted pairs. Control characters cannot
/// appear in a header at all and become `_`. Non-ASCII names are kept as
/// raw UTF-8.
pub fn content_disposition(filename: &str) -> HeaderValue {
    let mut value = String::with_capacity(filename.len() + 24);
    value.push_str("attachment; filename=\"");
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                value.push('\\');
                value.push(c);
            }
            c if c.is_ascii_control() => value.push('_'),
            c => value.push(c),
        }
    }
    value.push('"');

    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
