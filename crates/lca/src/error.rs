use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write key `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("failed to encode value for key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage is unavailable")]
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to start compression: {0}")]
    Encoder(#[source] io::Error),

    #[error("failed to add `{entry}` to archive: {source}")]
    Entry {
        entry: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to finish archive: {0}")]
    Finish(#[source] io::Error),
}

/// Reasons the browser playground refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("localStorage is not available")]
    StorageUnavailable,

    #[error("cannot listen for sandbox messages: {0}")]
    MessageListener(String),
}
