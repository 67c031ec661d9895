use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("frame of kind '{kind}' has unexpected shape: {source}")]
    InvalidShape {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode outbound request: {0}")]
    Encode(#[from] serde_json::Error),
}
