//! Error types for Dropserve

use thiserror::Error;

/// Result type for Dropserve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Dropserve
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server error (bind, accept loop)
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status a request-level failure maps to
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => 404,
                std::io::ErrorKind::PermissionDenied => 403,
                _ => 500,
            },
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_status_codes() {
        let not_found = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(not_found.status_code(), 404);

        let denied = Error::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(denied.status_code(), 403);

        let other = Error::from(std::io::Error::other("disk on fire"));
        assert_eq!(other.status_code(), 500);

        assert_eq!(Error::Server("bind".to_string()).status_code(), 500);
    }
}
