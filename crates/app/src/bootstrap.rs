use crate::retry::{retry_async, RetryPolicy};
use crate::Cli;
use anyhow::{bail, Context, Result};
use budget_qa_core::{
    build_chunks, load_document, ChunkingConfig, Embedder, IndexError, MiniLmEmbedder,
    OpenAiChatClient, QaEngine, QdrantStore, VectorIndex,
};
use std::time::Duration;
use tracing::info;

pub type AppEngine = QaEngine<MiniLmEmbedder, QdrantStore, OpenAiChatClient>;

/// One-shot startup sequence: load the PDF, chunk it, embed the chunks once,
/// and rebuild the vector collection before the server accepts traffic.
/// Only connectivity-class rebuild failures are retried; everything else is
/// fatal immediately.
pub async fn initialize(cli: &Cli) -> Result<AppEngine> {
    let document = load_document(&cli.pdf_path)
        .with_context(|| format!("failed to load pdf {}", cli.pdf_path.display()))?;
    info!(
        source = %document.source_path,
        checksum = %document.checksum,
        chars = document.text.len(),
        "document loaded"
    );

    let chunk_config = ChunkingConfig::new(cli.chunk_size, cli.chunk_overlap)?;
    let chunks = build_chunks(&document, chunk_config);
    info!(chunk_count = chunks.len(), "document chunked");

    let embedder = MiniLmEmbedder::try_new().context("failed to load the embedding model")?;
    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
    let embeddings = embedder
        .embed_batch(&texts)
        .context("failed to embed document chunks")?;

    let store = QdrantStore::new(&cli.qdrant_url, &cli.collection, embedder.dimensions());
    let policy = RetryPolicy::new(
        cli.startup_attempts,
        Duration::from_secs(cli.startup_retry_secs),
    );

    let rebuilt = retry_async(policy, IndexError::is_connectivity, || {
        store.rebuild(&chunks, &embeddings)
    })
    .await;

    if let Err(error) = rebuilt {
        if error.is_connectivity() {
            bail!(
                "could not connect to the vector store at {} after {} attempts: {error}",
                cli.qdrant_url,
                cli.startup_attempts
            );
        }
        return Err(error).context("failed to rebuild the vector index");
    }
    info!(
        collection = %cli.collection,
        points = chunks.len(),
        "vector index rebuilt"
    );

    let completion = OpenAiChatClient::new(
        &cli.openai_api_key,
        &cli.openai_model,
        &cli.openai_base_url,
    )?;

    Ok(QaEngine::new(embedder, store, completion, cli.top_k))
}
