//! Text cleanup applied before chunking and again before indexing.

/// Control characters that are replaced by a space. Tab, line feed, carriage
/// return and NEL (`\u{85}`) are whitespace and handled by the collapse step.
fn is_stripped_control(c: char) -> bool {
    matches!(c,
        '\u{00}'..='\u{08}'
        | '\u{0b}'
        | '\u{0c}'
        | '\u{0e}'..='\u{1f}'
        | '\u{7f}'..='\u{84}'
        | '\u{86}'..='\u{9f}')
}

/// Replace control characters with spaces, collapse whitespace runs to a
/// single space and trim both ends.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() || is_stripped_control(c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Salvage text from bytes that may not be valid UTF-8.
///
/// Invalid sequences, including encoded lone surrogates, are dropped rather
/// than replaced, then the result goes through [`sanitize`].
pub fn sanitize_bytes(bytes: &[u8]) -> String {
    let mut valid = String::with_capacity(bytes.len());
    let mut dropped = 0usize;
    for chunk in bytes.utf8_chunks() {
        valid.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    if dropped > 0 {
        tracing::warn!(dropped_bytes = dropped, "dropped invalid UTF-8 while salvaging text");
    }
    sanitize(&valid)
}
