use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Transient failure of the external embedding provider. The engine never
    /// retries; `operation` names the call and the chunks it covered.
    #[error("Embedding provider failed during {operation}: {source}")]
    EmbeddingProvider {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("Vector store failed during {operation}: {source}")]
    VectorStore {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("retrieve called before index: no index has been built")]
    NotIndexed,
}

impl Error {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn embedding<S: Into<String>>(operation: S, source: anyhow::Error) -> Self {
        Self::EmbeddingProvider { operation: operation.into(), source: source.into() }
    }

    pub fn vector_store<S: Into<String>>(operation: S, source: anyhow::Error) -> Self {
        Self::VectorStore { operation: operation.into(), source: source.into() }
    }

    /// Errors a caller may reasonably retry with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::EmbeddingProvider { .. } | Self::VectorStore { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
