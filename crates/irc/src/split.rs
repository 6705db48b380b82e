//! Splitting text into chunks that each fit on one protocol line.

use crate::error::{Error, Result};

/// Whitespace the splitter prefers to break after.
const BREAK_CHARS: [char; 2] = [' ', '\t'];

/// Split `text` into chunks of at most `max_bytes` UTF-8 bytes.
///
/// Chunks end right after the last space or tab that fits, so words stay
/// whole; a run without whitespace is hard-cut at the budget. Cuts always
/// land on `char` boundaries and the chunks concatenate back to `text`.
///
/// Empty text yields no chunks. A zero budget, or one too small for the
/// next character, is [`Error::InvalidBudget`].
pub fn split_message(text: &str, max_bytes: usize) -> Result<Vec<&str>> {
    if max_bytes == 0 {
        return Err(Error::InvalidBudget { max_bytes });
    }

    if text.len() <= max_bytes {
        return Ok(if text.is_empty() {
            Vec::new()
        } else {
            vec![text]
        });
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_bytes {
            chunks.push(remaining);
            break;
        }

        let window_end = remaining.floor_char_boundary(max_bytes);
        if window_end == 0 {
            return Err(Error::InvalidBudget { max_bytes });
        }

        let window = &remaining[..window_end];
        let split_at = window
            .rfind(BREAK_CHARS)
            .map_or(window_end, |ws| ws + 1);

        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk);
        remaining = rest;
    }

    Ok(chunks)
}
