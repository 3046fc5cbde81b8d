use crate::error::IndexError;
use crate::models::{Chunk, ScoredChunk};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Points uploaded per request during a rebuild.
pub const UPLOAD_BATCH_SIZE: usize = 256;

pub struct QdrantStore {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(
        endpoint: impl Into<String>,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Drop the collection if it exists. A missing collection is not an
    /// error; any other failure aborts the rebuild.
    async fn delete_collection(&self) -> Result<(), IndexError> {
        let response = self
            .client
            .delete(format!("{}/collections/{}", self.endpoint, self.collection))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: format!("delete collection returned {status}"),
            });
        }

        Ok(())
    }

    async fn create_collection(&self) -> Result<(), IndexError> {
        let response = self
            .client
            .put(format!("{}/collections/{}", self.endpoint, self.collection))
            .json(&json!({
                "vectors": { "size": self.vector_size, "distance": "Cosine" },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: format!("create collection returned {}", response.status()),
            });
        }

        Ok(())
    }

    async fn upload_points(&self, points: &[Value]) -> Result<(), IndexError> {
        let response = self
            .client
            .put(format!(
                "{}/collections/{}/points?wait=true",
                self.endpoint, self.collection
            ))
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: format!("upsert points returned {}", response.status()),
            });
        }

        Ok(())
    }
}

fn chunk_point(chunk: &Chunk, embedding: &[f32]) -> Value {
    json!({
        "id": chunk.index,
        "vector": embedding,
        "payload": {
            "source": chunk.source_path,
            "content": chunk.content,
        },
    })
}

fn parse_search_hits(body: &Value) -> Vec<ScoredChunk> {
    let hits = body
        .pointer("/result")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut result = Vec::new();
    for hit in hits {
        let id = hit.pointer("/id").and_then(Value::as_u64).unwrap_or_default();
        let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
        let source_path = hit
            .pointer("/payload/source")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let content = hit
            .pointer("/payload/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        result.push(ScoredChunk {
            id,
            score,
            source_path,
            content,
        });
    }

    result
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn rebuild(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<(), IndexError> {
        if chunks.len() != embeddings.len() {
            return Err(IndexError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let points = chunks
            .iter()
            .zip(embeddings.iter())
            .map(|(chunk, embedding)| {
                if embedding.len() != self.vector_size {
                    return Err(IndexError::Request(format!(
                        "embedding dimension {} != {}",
                        embedding.len(),
                        self.vector_size
                    )));
                }
                Ok(chunk_point(chunk, embedding))
            })
            .collect::<Result<Vec<_>, IndexError>>()?;

        self.delete_collection().await?;
        self.create_collection().await?;

        for batch in points.chunks(UPLOAD_BATCH_SIZE) {
            self.upload_points(batch).await?;
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError> {
        if query_vector.len() != self.vector_size {
            return Err(IndexError::Request(format!(
                "query vector dim {} is not {}",
                query_vector.len(),
                self.vector_size
            )));
        }

        let response = self
            .client
            .post(format!(
                "{}/collections/{}/points/search",
                self.endpoint, self.collection
            ))
            .json(&json!({
                "vector": query_vector,
                "limit": top_k,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        Ok(parse_search_hits(&parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::{chunk_point, parse_search_hits};
    use crate::models::Chunk;
    use serde_json::json;

    #[test]
    fn points_carry_positional_id_and_payload() {
        let chunk = Chunk {
            index: 7,
            source_path: "Budget_Speech.pdf".to_string(),
            content: "The fiscal deficit target is 4.5 percent.".to_string(),
        };

        let point = chunk_point(&chunk, &[0.1, 0.2]);
        assert_eq!(point.pointer("/id").and_then(|v| v.as_u64()), Some(7));
        assert_eq!(
            point.pointer("/payload/source").and_then(|v| v.as_str()),
            Some("Budget_Speech.pdf")
        );
        assert_eq!(
            point.pointer("/payload/content").and_then(|v| v.as_str()),
            Some("The fiscal deficit target is 4.5 percent.")
        );
    }

    #[test]
    fn search_hits_preserve_order_and_payload() {
        let body = json!({
            "result": [
                { "id": 3, "score": 0.92, "payload": { "source": "a.pdf", "content": "first" } },
                { "id": 1, "score": 0.85, "payload": { "source": "a.pdf", "content": "second" } },
            ],
        });

        let hits = parse_search_hits(&body);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 3);
        assert_eq!(hits[0].content, "first");
        assert!(hits[0].score > hits[1].score);
        assert_eq!(hits[1].content, "second");
    }

    #[test]
    fn missing_result_array_parses_to_no_hits() {
        let hits = parse_search_hits(&json!({ "status": "ok" }));
        assert!(hits.is_empty());
    }
}
