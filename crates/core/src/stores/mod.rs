mod qdrant;

pub use qdrant::{QdrantStore, UPLOAD_BATCH_SIZE};
