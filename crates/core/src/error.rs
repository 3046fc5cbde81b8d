use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding model load failed: {0}")]
    ModelLoad(String),

    #[error("embedding failed: {0}")]
    Inference(String),

    #[error("embedding model returned {returned} vectors for {expected} inputs")]
    MissingVectors { expected: usize, returned: usize },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("index request failed: {0}")]
    Request(String),
}

impl IndexError {
    /// True for failures that mean the index service itself was unreachable,
    /// as opposed to a rejected or malformed request.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Http(error) if error.is_connect() || error.is_timeout())
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("api key is empty")]
    MissingApiKey,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat completion returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("chat completion response had no choices")]
    EmptyResponse,
}

/// Request-path error: everything that can go wrong between receiving a
/// question and returning an answer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
