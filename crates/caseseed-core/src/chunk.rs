//! Greedy paragraph packer.
//!
//! Packs an ordered list of normalized paragraphs into chunks bounded by a
//! character budget, ready to be embedded one at a time.
//!
//! # Algorithm
//!
//! 1. Keep a buffer of paragraphs and a running length counter, where each
//!    buffered paragraph contributes `len + 1` (its separator).
//! 2. Before buffering a paragraph, if the buffer is non-empty and the
//!    counter plus `len + 1` would exceed `max_chars`, flush the buffer.
//!    A flushed chunk is kept only if it is at least `min_chars` long.
//! 3. Stop as soon as `max_chunks` chunks have been kept.
//! 4. Flush whatever is left at the end under the same rule.
//!
//! A paragraph longer than `max_chars` is never split. It lands in an empty
//! buffer and goes out as an oversized chunk of its own.
//!
//! Lengths are counted in `char`s, not bytes.
//!
//! # Example
//!
//! ```rust
//! use caseseed_core::chunk::build_chunks;
//!
//! let paragraphs = vec!["A".repeat(50), "B".repeat(50)];
//! let chunks = build_chunks(&paragraphs, 120, 10, 10);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chars().count(), 101);
//! ```

/// Pack `paragraphs` into chunks of at most `max_chars` characters.
///
/// Chunks shorter than `min_chars` are dropped, never merged with a
/// neighbour. At most `max_chunks` chunks are returned; once the cap is
/// reached the remaining paragraphs are discarded.
///
/// `min_chars <= max_chars` is the caller's responsibility. An empty
/// result is a valid outcome.
pub fn build_chunks<S: AsRef<str>>(
    paragraphs: &[S],
    max_chars: usize,
    min_chars: usize,
    max_chunks: usize,
) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_len = 0usize;

    for paragraph in paragraphs {
        let paragraph = paragraph.as_ref();
        let para_len = paragraph.chars().count();

        if !buffer.is_empty() && buffer_len + para_len + 1 > max_chars {
            flush(&mut buffer, min_chars, &mut chunks);
            buffer_len = 0;
            if chunks.len() >= max_chunks {
                break;
            }
        }

        buffer.push(paragraph);
        buffer_len += para_len + 1;
    }

    if !buffer.is_empty() && chunks.len() < max_chunks {
        flush(&mut buffer, min_chars, &mut chunks);
    }

    chunks.truncate(max_chunks);
    chunks
}

/// Join the buffer into one chunk, keep it if long enough, and clear the buffer.
fn flush(buffer: &mut Vec<&str>, min_chars: usize, chunks: &mut Vec<String>) {
    let joined = buffer.join(" ");
    let chunk = joined.trim();
    if chunk.chars().count() >= min_chars {
        chunks.push(chunk.to_string());
    }
    buffer.clear();
}
