pub mod chunking;
pub mod completion;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod models;
pub mod orchestrator;
pub mod stores;
pub mod traits;

pub use chunking::{build_chunks, split_text, ChunkingConfig};
pub use completion::{OpenAiChatClient, DEFAULT_CHAT_MODEL, DEFAULT_OPENAI_BASE_URL};
pub use embeddings::{Embedder, MiniLmEmbedder, EMBEDDING_DIMENSIONS};
pub use error::{CompletionError, EmbedError, EngineError, IndexError, IngestError};
pub use extractor::{extract_document_text, load_document, PageText, PdfExtractor};
pub use models::{Answer, Chunk, LoadedDocument, ScoredChunk};
pub use orchestrator::{QaEngine, DEFAULT_TOP_K};
pub use stores::QdrantStore;
pub use traits::{CompletionClient, VectorIndex};
