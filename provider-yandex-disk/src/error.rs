//! Error types for the Yandex Disk provider

use thiserror::Error;

/// Yandex Disk provider errors
#[derive(Error, Debug)]
pub enum YandexDiskError {
    /// Credential rejected by the remote service (401)
    #[error("Authorization rejected by remote service")]
    Auth,

    /// Unexpected status code or malformed payload
    #[error("Unexpected response from remote service (status {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    /// The server reported success but omitted the download link
    #[error("Download link missing in response for {path}")]
    MissingDownloadLink { path: String },

    /// Network-level failure reaching the remote service
    #[error("Network error: {0}")]
    Transport(String),
}

/// Result type for Yandex Disk operations
pub type Result<T> = std::result::Result<T, YandexDiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = YandexDiskError::InvalidResponse {
            status: 503,
            message: "service unavailable".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Unexpected response from remote service (status 503): service unavailable"
        );
    }

    #[test]
    fn test_missing_link_names_the_path() {
        let error = YandexDiskError::MissingDownloadLink {
            path: "/docs/report.pdf".to_string(),
        };

        assert!(error.to_string().contains("/docs/report.pdf"));
    }
}
