use crate::error::{CompletionError, IndexError};
use crate::models::{Chunk, ScoredChunk};
use async_trait::async_trait;

#[async_trait]
pub trait VectorIndex {
    /// Replace the collection contents with exactly the given chunk sequence.
    /// `embeddings[i]` is the vector for `chunks[i]`.
    async fn rebuild(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<(), IndexError>;

    /// Nearest-neighbor search, ordered by decreasing similarity.
    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError>;
}

#[async_trait]
pub trait CompletionClient {
    /// Ask the hosted model to answer `question` grounded in `context`.
    async fn complete(&self, question: &str, context: &str) -> Result<String, CompletionError>;
}
