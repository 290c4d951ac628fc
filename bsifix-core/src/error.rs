use crate::container::chunk::ChunkId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("missing required chunk '{0}'")]
    MissingRequiredChunk(ChunkId),

    #[error("unsupported format tag 0x{0:04X} (only linear PCM is accepted)")]
    UnsupportedFormat(u16),

    #[error("{tool} failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error("'{0}' not found. Please install it (e.g. brew install ffmpeg)")]
    ToolNotFound(String),

    #[error("worker pool: {0}")]
    Pool(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, FixError>;
