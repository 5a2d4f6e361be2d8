//! Splitting page text into model-sized chunks.
//!
//! Token counts are estimated from words (one word ≈ 4/3 tokens). Chunks are
//! word windows of at most `token_threshold` estimated tokens; each chunk after
//! the first repeats the last `overlap_rate × window` words of its predecessor.
//! Line breaks inside a chunk are preserved.

use crate::types::config::ChunkingConfig;

/// Estimated tokens per whitespace-separated word, as a ratio.
const TOKENS_PER_WORD: (usize, usize) = (4, 3);

/// One piece of page text sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position.
    pub index: usize,
    /// Number of chunks the page was cut into.
    pub total: usize,
    pub text: String,
}

/// Estimated token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    let (tokens, words) = TOKENS_PER_WORD;
    (text.split_whitespace().count() * tokens).div_ceil(words)
}

/// Words per chunk for a config (at least one).
pub fn window_words(config: &ChunkingConfig) -> usize {
    let (tokens, words) = TOKENS_PER_WORD;
    (config.token_threshold.saturating_mul(words) / tokens).max(1)
}

/// Words repeated between consecutive chunks (always less than the window).
pub fn overlap_words(config: &ChunkingConfig) -> usize {
    let window = window_words(config);
    let overlap = (window as f32 * config.overlap_rate.max(0.0)).floor() as usize;
    overlap.min(window - 1)
}

/// Drop blank-line separated blocks shorter than `min_words` words.
pub fn filter_blocks(text: &str, min_words: usize) -> String {
    if min_words <= 1 {
        return text.trim().to_string();
    }

    text.split("\n\n")
        .map(str::trim)
        .filter(|block| block.split_whitespace().count() >= min_words)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Cut `text` into chunks.
///
/// Empty text yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let words = words_with_breaks(text);
    if words.is_empty() {
        return Vec::new();
    }

    let window = window_words(config);
    let step = window - overlap_words(config);

    let mut pieces = Vec::new();
    let mut start: usize = 0;
    loop {
        let end = start.saturating_add(window).min(words.len());
        pieces.push(join_words(&words[start..end]));
        if end == words.len() {
            break;
        }
        start += step;
    }

    let total = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, total, text })
        .collect()
}

/// Each word with whether a line break preceded it.
fn words_with_breaks(text: &str) -> Vec<(bool, &str)> {
    let mut words = Vec::new();
    for line in text.lines() {
        let mut first = true;
        for word in line.split_whitespace() {
            words.push((first, word));
            first = false;
        }
    }
    words
}

fn join_words(words: &[(bool, &str)]) -> String {
    let mut out = String::new();
    for (i, (line_start, word)) in words.iter().enumerate() {
        if i > 0 {
            out.push(if *line_start { '\n' } else { ' ' });
        }
        out.push_str(word);
    }
    out
}
