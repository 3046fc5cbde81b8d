use crate::error::IngestError;
use crate::models::{Chunk, LoadedDocument};
use std::collections::VecDeque;

/// Boundary preference for the recursive splitter: paragraphs, then lines,
/// then words, then raw character cuts.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IngestError> {
        if chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk size must be positive".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into chunks of at most `config.chunk_size` characters,
/// preferring the largest boundary that occurs in the text and sharing up to
/// `config.chunk_overlap` trailing characters between adjacent chunks.
pub fn split_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    split_recursive(text, &SEPARATORS, config)
}

pub fn build_chunks(document: &LoadedDocument, config: ChunkingConfig) -> Vec<Chunk> {
    split_text(&document.text, config)
        .into_iter()
        .enumerate()
        .map(|(index, content)| Chunk {
            index: index as u64,
            source_path: document.source_path.clone(),
            content,
        })
        .collect()
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (position, candidate) in separators.iter().enumerate() {
        if candidate.is_empty() || text.contains(candidate) {
            return (candidate, &separators[position + 1..]);
        }
    }
    ("", &[])
}

fn split_recursive(text: &str, separators: &[&str], config: ChunkingConfig) -> Vec<String> {
    let (separator, remaining) = pick_separator(text, separators);

    let splits: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut good: Vec<String> = Vec::new();

    for split in splits {
        if char_len(&split) < config.chunk_size {
            good.push(split);
            continue;
        }

        if !good.is_empty() {
            chunks.extend(merge_splits(&good, separator, config));
            good.clear();
        }

        if remaining.is_empty() {
            chunks.push(split);
        } else {
            chunks.extend(split_recursive(&split, remaining, config));
        }
    }

    if !good.is_empty() {
        chunks.extend(merge_splits(&good, separator, config));
    }

    chunks
}

/// Greedily pack pieces into chunks up to the size limit. When a chunk is
/// emitted, pieces are dropped from the front of the window until at most
/// `chunk_overlap` characters remain; those start the next chunk.
fn merge_splits(splits: &[String], separator: &str, config: ChunkingConfig) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut merged = Vec::new();
    let mut window: VecDeque<&String> = VecDeque::new();
    let mut total = 0usize;

    for split in splits {
        let split_len = char_len(split);
        let join_len = if window.is_empty() { 0 } else { separator_len };

        if total + split_len + join_len > config.chunk_size && !window.is_empty() {
            if let Some(chunk) = join_window(&window, separator) {
                merged.push(chunk);
            }

            loop {
                let join_len = if window.is_empty() { 0 } else { separator_len };
                let over_limit = total + split_len + join_len > config.chunk_size && total > 0;
                if !(total > config.chunk_overlap || over_limit) {
                    break;
                }
                let Some(front) = window.pop_front() else {
                    break;
                };
                total -= char_len(front) + if window.is_empty() { 0 } else { separator_len };
            }
        }

        total += split_len + if window.is_empty() { 0 } else { separator_len };
        window.push_back(split);
    }

    if let Some(chunk) = join_window(&window, separator) {
        merged.push(chunk);
    }

    merged
}

fn join_window(window: &VecDeque<&String>, separator: &str) -> Option<String> {
    let joined = window
        .iter()
        .map(|piece| piece.as_str())
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::{build_chunks, char_len, split_text, ChunkingConfig};
    use crate::models::LoadedDocument;
    use chrono::Utc;

    fn document(text: &str) -> LoadedDocument {
        LoadedDocument {
            source_path: "Budget_Speech.pdf".to_string(),
            checksum: "checksum".to_string(),
            text: text.to_string(),
            loaded_at: Utc::now(),
        }
    }

    fn speech_text() -> String {
        (0..40)
            .map(|paragraph| {
                format!("Paragraph {paragraph} of the speech covers allocations and revised estimates for the year.")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn config_rejects_overlap_not_smaller_than_size() {
        assert!(ChunkingConfig::new(500, 50).is_ok());
        assert!(ChunkingConfig::new(50, 50).is_err());
        assert!(ChunkingConfig::new(0, 0).is_err());
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = speech_text();
        let config = ChunkingConfig::default();

        let first = split_text(&text, config);
        let second = split_text(&text, config);
        assert_eq!(first, second);
    }

    #[test]
    fn no_chunk_exceeds_the_configured_size() {
        let text = speech_text();
        let config = ChunkingConfig::default();

        let chunks = split_text(&text, config);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= config.chunk_size, "oversized: {chunk}");
        }
    }

    #[test]
    fn short_input_yields_a_single_chunk() {
        let chunks = split_text("A short speech.", ChunkingConfig::default());
        assert_eq!(chunks, vec!["A short speech.".to_string()]);
    }

    #[test]
    fn unbroken_text_falls_back_to_character_cuts_with_overlap() {
        let text: String = "0123456789".repeat(20);
        let config = ChunkingConfig::new(100, 10).unwrap();

        let chunks = split_text(&text, config);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let previous: Vec<char> = pair[0].chars().collect();
            let tail: String = previous[previous.len() - config.chunk_overlap..]
                .iter()
                .collect();
            assert!(
                pair[1].starts_with(&tail),
                "expected {:?} to start with {tail:?}",
                pair[1]
            );
        }
    }

    #[test]
    fn paragraph_boundaries_are_preferred_over_raw_cuts() {
        let text = speech_text();
        let chunks = split_text(&text, ChunkingConfig::default());

        for chunk in &chunks {
            assert!(chunk.starts_with("Paragraph"));
            assert!(chunk.ends_with("year."));
        }
    }

    #[test]
    fn every_paragraph_is_covered_by_some_chunk() {
        let text = speech_text();
        let chunks = split_text(&text, ChunkingConfig::default());

        for paragraph in text.split("\n\n") {
            assert!(
                chunks.iter().any(|chunk| chunk.contains(paragraph)),
                "missing paragraph: {paragraph}"
            );
        }
    }

    #[test]
    fn chunks_carry_positional_ids_and_source_path() {
        let document = document(&speech_text());
        let chunks = build_chunks(&document, ChunkingConfig::default());

        assert!(!chunks.is_empty());
        for (position, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, position as u64);
            assert_eq!(chunk.source_path, "Budget_Speech.pdf");
        }
    }
}
