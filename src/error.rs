use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Cooperative cancellation observed at a poll point.
    /// This is the one condition re-raised through chunk-level code so the
    /// orchestrator can distinguish "skip this chunk" from "stop now".
    #[error("Processing cancelled by user")]
    Cancelled,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure modes of a single model-gateway invocation.
/// The retry loop inspects variants instead of catching exceptions.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Cancellation observed before or during the request.
    #[error("Call cancelled by user")]
    Cancelled,

    /// The model returned no content. Retryable.
    #[error("Model returned empty response")]
    EmptyResponse,

    /// Transport or API failure. Retryable.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded. Retryable.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// All attempts failed. Terminal for the chunk, not for the pipeline.
    #[error("All {attempts} gateway attempts failed: {last}")]
    ExhaustedRetries { attempts: u32, last: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
