/// Why one source contributed its fallback instead of fresh rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("API is not reachable at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Transport(String),

    #[error("API returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Source did not settle before the deadline")]
    Timeout,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}
