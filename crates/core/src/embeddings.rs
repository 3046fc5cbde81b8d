use crate::error::EmbedError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Output width of `all-MiniLM-L6-v2`, and therefore of every vector the
/// index is configured for.
pub const EMBEDDING_DIMENSIONS: usize = 384;

pub trait Embedder {
    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Pretrained sentence-embedding model, loaded once per process and reused
/// for chunk and query embeddings so both live in the same vector space.
pub struct MiniLmEmbedder {
    model: TextEmbedding,
}

impl MiniLmEmbedder {
    pub fn try_new() -> Result<Self, EmbedError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|error| EmbedError::ModelLoad(error.to_string()))?;

        Ok(Self { model })
    }
}

impl Embedder for MiniLmEmbedder {
    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self
            .model
            .embed(vec![text], None)
            .map_err(|error| EmbedError::Inference(error.to_string()))?;

        vectors.pop().ok_or(EmbedError::MissingVectors {
            expected: 1,
            returned: 0,
        })
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self
            .model
            .embed(inputs, None)
            .map_err(|error| EmbedError::Inference(error.to_string()))?;

        if vectors.len() != texts.len() {
            return Err(EmbedError::MissingVectors {
                expected: texts.len(),
                returned: vectors.len(),
            });
        }

        Ok(vectors)
    }
}
