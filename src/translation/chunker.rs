/*!
 * Splitting of long input into units the translation model can handle.
 *
 * Sentences end after `.`, `!` or `?` followed by whitespace. This rule
 * mis-splits abbreviations such as "e.g. this" and is kept that way on
 * purpose so behaviour stays predictable.
 *
 * A single very long sentence (typically OCR output without punctuation) is
 * cut into fixed word windows instead. Otherwise consecutive sentences are
 * grouped a few at a time so the model gets some context per call.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::ChunkingConfig;

static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"));

/// One ordered piece of a larger text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the original text
    pub index: usize,
    /// Chunk content
    pub text: String,
}

/// Splits normalized text into bounded chunks
#[derive(Debug, Clone)]
pub struct TextChunker {
    sentences_per_chunk: usize,
    word_window: usize,
    long_sentence_words: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl TextChunker {
    /// Create a chunker from configuration; zero sizes are treated as one
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self {
            sentences_per_chunk: config.sentences_per_chunk.max(1),
            word_window: config.word_window.max(1),
            long_sentence_words: config.long_sentence_words,
        }
    }

    /// Split text into sentences on terminal punctuation followed by whitespace
    pub fn split_sentences(text: &str) -> Vec<&str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in SENTENCE_BOUNDARY.find_iter(text) {
            // The terminator is ASCII, so one byte past the match start is a char boundary
            let end = boundary.start() + 1;
            sentences.push(text[start..end].trim());
            start = boundary.end();
        }
        sentences.push(text[start..].trim());

        sentences.retain(|s| !s.is_empty());
        sentences
    }

    /// Split text into ordered chunks
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let sentences = Self::split_sentences(text);

        let pieces: Vec<String> = match sentences.as_slice() {
            [only] if only.split_whitespace().count() > self.long_sentence_words => {
                let words: Vec<&str> = only.split_whitespace().collect();
                words.chunks(self.word_window).map(|w| w.join(" ")).collect()
            }
            _ => sentences
                .chunks(self.sentences_per_chunk)
                .map(|group| group.join(" "))
                .collect(),
        };

        pieces
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .enumerate()
            .map(|(index, text)| TextChunk { index, text })
            .collect()
    }
}
