use crate::embeddings::Embedder;
use crate::error::EngineError;
use crate::models::{Answer, ScoredChunk};
use crate::traits::{CompletionClient, VectorIndex};

pub const DEFAULT_TOP_K: usize = 5;

/// Per-request coordinator over the process-wide shared clients: one
/// embedder, one vector index handle, one completion client, all injected at
/// construction and reused for every request.
pub struct QaEngine<E, V, C>
where
    E: Embedder,
    V: VectorIndex,
    C: CompletionClient,
{
    embedder: E,
    index: V,
    completion: C,
    top_k: usize,
}

impl<E, V, C> QaEngine<E, V, C>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    C: CompletionClient + Send + Sync,
{
    pub fn new(embedder: E, index: V, completion: C, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            completion,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the question and return the nearest chunks, best match first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, EngineError> {
        if question.trim().is_empty() {
            return Err(EngineError::EmptyQuestion);
        }

        let query_vector = self.embedder.embed(question)?;
        let hits = self.index.search(&query_vector, self.top_k).await?;
        Ok(hits)
    }

    /// Answer a question grounded in the retrieved chunks. The context handed
    /// to the model is the chunk contents joined by blank lines, in search
    /// order; the same contents are returned to the caller verbatim.
    pub async fn answer(&self, question: &str) -> Result<Answer, EngineError> {
        let hits = self.retrieve(question).await?;
        let context_chunks: Vec<String> = hits.into_iter().map(|hit| hit.content).collect();
        let context = context_chunks.join("\n\n");

        let response = self.completion.complete(question, &context).await?;

        Ok(Answer {
            response,
            context: context_chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{QaEngine, DEFAULT_TOP_K};
    use crate::embeddings::Embedder;
    use crate::error::{CompletionError, EmbedError, EngineError, IndexError};
    use crate::models::ScoredChunk;
    use crate::traits::{CompletionClient, VectorIndex};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeEmbedder;

    impl Embedder for FakeEmbedder {
        fn dimensions(&self) -> usize {
            4
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![0.1, 0.2, 0.3, 0.4])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3, 0.4]).collect())
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        hits: Vec<ScoredChunk>,
        fail_search: bool,
        requested_top_k: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn rebuild(
            &self,
            _chunks: &[crate::Chunk],
            _embeddings: &[Vec<f32>],
        ) -> Result<(), IndexError> {
            Ok(())
        }

        async fn search(
            &self,
            _query_vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<ScoredChunk>, IndexError> {
            *self.requested_top_k.lock().unwrap() = Some(top_k);
            if self.fail_search {
                return Err(IndexError::Request("search rejected".to_string()));
            }
            Ok(self.hits.iter().take(top_k).cloned().collect())
        }
    }

    struct EchoCompletion;

    #[async_trait]
    impl CompletionClient for EchoCompletion {
        async fn complete(
            &self,
            _question: &str,
            context: &str,
        ) -> Result<String, CompletionError> {
            Ok(context.to_string())
        }
    }

    fn hit(id: u64, score: f64, content: &str) -> ScoredChunk {
        ScoredChunk {
            id,
            score,
            source_path: "Budget_Speech.pdf".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn answer_joins_context_in_search_order() {
        let index = FakeIndex {
            hits: vec![hit(2, 0.9, "first"), hit(0, 0.8, "second")],
            ..Default::default()
        };
        let engine = QaEngine::new(FakeEmbedder, index, EchoCompletion, DEFAULT_TOP_K);

        let answer = engine.answer("What is the deficit?").await.unwrap();
        assert_eq!(answer.response, "first\n\nsecond");
        assert_eq!(answer.context, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn configured_top_k_is_forwarded_to_the_index() {
        let index = FakeIndex {
            hits: vec![hit(0, 0.9, "a"), hit(1, 0.8, "b"), hit(2, 0.7, "c")],
            ..Default::default()
        };
        let engine = QaEngine::new(FakeEmbedder, index, EchoCompletion, 2);

        let answer = engine.answer("anything").await.unwrap();
        assert_eq!(answer.context.len(), 2);
        assert_eq!(
            *engine.index.requested_top_k.lock().unwrap(),
            Some(2)
        );
    }

    #[tokio::test]
    async fn empty_question_is_rejected_before_any_downstream_call() {
        let engine = QaEngine::new(
            FakeEmbedder,
            FakeIndex::default(),
            EchoCompletion,
            DEFAULT_TOP_K,
        );

        let result = engine.answer("   ").await;
        assert!(matches!(result, Err(EngineError::EmptyQuestion)));
        assert!(engine.index.requested_top_k.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn search_failures_propagate() {
        let index = FakeIndex {
            fail_search: true,
            ..Default::default()
        };
        let engine = QaEngine::new(FakeEmbedder, index, EchoCompletion, DEFAULT_TOP_K);

        let result = engine.answer("What is the deficit?").await;
        assert!(matches!(result, Err(EngineError::Index(_))));
    }
}
