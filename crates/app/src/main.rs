use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod bootstrap;
mod retry;
mod server;

#[derive(Parser)]
#[command(name = "budget-qa-server", version)]
pub(crate) struct Cli {
    /// PDF indexed at startup.
    #[arg(long, env = "BUDGET_PDF_PATH", default_value = "Budget_Speech.pdf")]
    pub(crate) pdf_path: PathBuf,

    /// Qdrant base URL.
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    pub(crate) qdrant_url: String,

    /// Qdrant collection holding the chunk vectors.
    #[arg(long, default_value = "qa_index")]
    pub(crate) collection: String,

    /// API key for the chat-completion service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub(crate) openai_api_key: String,

    /// Chat-completion model.
    #[arg(long, env = "OPENAI_MODEL", default_value = budget_qa_core::DEFAULT_CHAT_MODEL)]
    pub(crate) openai_model: String,

    /// Base URL for OpenAI-compatible endpoints.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = budget_qa_core::DEFAULT_OPENAI_BASE_URL)]
    pub(crate) openai_base_url: String,

    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "BUDGET_QA_BIND", default_value = "127.0.0.1:8000")]
    pub(crate) bind: String,

    /// Landing page served at /.
    #[arg(long, default_value = "static/index.html")]
    pub(crate) index_page: PathBuf,

    /// Maximum characters per chunk.
    #[arg(long, default_value_t = 500)]
    pub(crate) chunk_size: usize,

    /// Characters shared between adjacent chunks.
    #[arg(long, default_value_t = 50)]
    pub(crate) chunk_overlap: usize,

    /// Chunks retrieved per question.
    #[arg(long, default_value_t = budget_qa_core::DEFAULT_TOP_K)]
    pub(crate) top_k: usize,

    /// Attempts to reach the vector store at startup.
    #[arg(long, default_value_t = 3)]
    pub(crate) startup_attempts: u32,

    /// Seconds between startup attempts.
    #[arg(long, default_value_t = 5)]
    pub(crate) startup_retry_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "budget-qa boot"
    );

    let engine = bootstrap::initialize(&cli).await?;

    let state = server::AppState {
        engine: Arc::new(engine),
        index_page: cli.index_page.clone(),
    };
    let app = server::router(state);

    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "serving");
    axum::serve(listener, app).await.context("server shutdown")?;

    Ok(())
}
