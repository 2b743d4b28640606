use core_mirror::MirrorError;
use provider_yandex_disk::YandexDiskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Provider error: {0}")]
    Provider(#[from] YandexDiskError),

    #[error("Store error: {0}")]
    Store(#[from] MirrorError),

    #[error("Failed to resolve download link for {path}: {source}")]
    DownloadLink {
        path: String,
        source: YandexDiskError,
    },

    #[error("Synchronization cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
