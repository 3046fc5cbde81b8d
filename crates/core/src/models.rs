use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single source document, loaded once at startup. The text blob is
/// immutable for the process lifetime; editing the PDF on disk has no effect
/// until the next restart.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source_path: String,
    pub checksum: String,
    pub text: String,
    pub loaded_at: DateTime<Utc>,
}

/// One retrieval unit. `index` is the chunk's position in the split sequence
/// and doubles as its point id in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub index: u64,
    pub source_path: String,
    pub content: String,
}

/// A search hit carrying the payload stored alongside the vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: u64,
    pub score: f64,
    pub source_path: String,
    pub content: String,
}

/// The response to one question: the generated answer plus the retrieved
/// chunk texts that grounded it, in descending similarity order.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub response: String,
    pub context: Vec<String>,
}
