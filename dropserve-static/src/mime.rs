//! MIME type handling

use std::path::Path;

/// MIME types whose files are served as attachments instead of inline.
pub const DOWNLOAD_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/mpeg",
    "video/webm",
    "video/quicktime",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/midi",
    "application/ogg",
    "application/x-7z-compressed",
    "application/zip",
    "application/x-rar-compressed",
    "application/x-tar",
    "application/x-bzip2",
    "application/x-gzip",
    "application/x-zip-compressed",
    "application/x-tar-gz",
    "application/x-compressed-tar",
    // Registered aliases of the formats above
    "application/gzip",
    "application/x-compressed",
    "application/vnd.rar",
    "audio/x-wav",
    "audio/wave",
    "audio/mid",
];

/// Get MIME type for a file path
pub fn guess_mime_type(path: impl AsRef<Path>) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

/// Check whether any MIME type known for `ext` is in [`DOWNLOAD_TYPES`]
pub fn is_download_extension(ext: &str) -> bool {
    mime_guess::from_ext(ext)
        .iter_raw()
        .any(|mime| DOWNLOAD_TYPES.contains(&mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(guess_mime_type("index.html"), "text/html");
        assert_eq!(guess_mime_type("style.css"), "text/css");
        assert_eq!(guess_mime_type("report.pdf"), "application/pdf");
        assert_eq!(guess_mime_type("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_download_extensions() {
        for ext in ["pdf", "jpg", "jpeg", "png", "gif", "mp4", "webm", "mov", "docx", "xlsx", "pptx", "zip", "tar", "gz", "7z"] {
            assert!(is_download_extension(ext), "{ext} should force a download");
        }
    }

    #[test]
    fn test_download_extensions_case_insensitive() {
        assert!(is_download_extension("PDF"));
        assert!(is_download_extension("Jpg"));
    }

    #[test]
    fn test_inline_extensions() {
        for ext in ["txt", "html", "css", "js", "json", "md", "definitely-not-a-type", ""] {
            assert!(!is_download_extension(ext), "{ext} should render inline");
        }
    }
}
