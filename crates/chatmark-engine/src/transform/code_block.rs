//! Fenced code block isolation.
//!
//! Splits text into alternating text and code segments so the line-break,
//! link and emoji passes never touch code. A code segment absorbs the
//! whitespace on both sides of its fences; this is part of the stored
//! message format and must not change.

use std::ops::Range;

use crate::scan::is_word_byte;

/// Fenced code block type with owned delimiter constant.
pub struct CodeFence;

impl CodeFence {
    /// The fence that opens and closes a code block.
    pub const FENCE: &'static str = "```";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Code,
}

/// A slice of the isolator's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    /// Byte range in the input.
    pub range: Range<usize>,
    pub text: &'a str,
}

impl Segment<'_> {
    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }
}

/// Splits `text` into text and code segments whose concatenation is `text`.
///
/// A code segment runs from the whitespace before an opening fence through
/// the next fence and the whitespace after it. An unterminated fence makes
/// the rest of the text code.
pub fn isolate<'a>(text: &'a str) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let push = |out: &mut Vec<Segment<'a>>, kind, range: Range<usize>| {
        if !range.is_empty() {
            out.push(Segment {
                kind,
                text: &text[range.clone()],
                range,
            });
        }
    };

    let mut pos = 0;
    while let Some(rel) = text[pos..].find(CodeFence::FENCE) {
        let open = pos + rel;
        let start = pos + text[pos..open].trim_end().len();
        let body = open + CodeFence::FENCE.len();
        let end = match text[body..].find(CodeFence::FENCE) {
            Some(close_rel) => {
                let close_end = body + close_rel + CodeFence::FENCE.len();
                let tail = &text[close_end..];
                close_end + (tail.len() - tail.trim_start().len())
            }
            None => text.len(),
        };
        push(&mut out, SegmentKind::Text, pos..start);
        push(&mut out, SegmentKind::Code, start..end);
        pos = end;
    }
    push(&mut out, SegmentKind::Text, pos..text.len());
    out
}

/// Byte ranges of the fenced blocks in `text`.
pub fn code_spans(text: &str) -> Vec<Range<usize>> {
    isolate(text)
        .into_iter()
        .filter(Segment::is_code)
        .map(|s| s.range)
        .collect()
}

/// Forces fences onto their own lines before a message is sent.
///
/// Spaces between a fence and a following word become a newline (a newline
/// is inserted when there are none), and a fence glued to a preceding word
/// gets a newline before it.
pub fn pad_fences(text: &str) -> String {
    let after = break_after_fences(text);
    break_before_fences(&after)
}

fn break_after_fences(text: &str) -> String {
    let bytes = text.as_bytes();
    let fence = CodeFence::FENCE.as_bytes();
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;
    let mut i = fence.len();
    while i <= bytes.len() {
        if &bytes[i - fence.len()..i] == fence {
            let mut j = i;
            while j < bytes.len() && bytes[j] == b' ' {
                j += 1;
            }
            if j < bytes.len() && is_word_byte(bytes[j]) {
                out.push_str(&text[last..i]);
                out.push('\n');
                last = j;
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&text[last..]);
    out
}

fn break_before_fences(text: &str) -> String {
    let bytes = text.as_bytes();
    let fence = CodeFence::FENCE.as_bytes();
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;
    for p in 1..bytes.len() {
        if bytes[p..].starts_with(fence) && is_word_byte(bytes[p - 1]) {
            out.push_str(&text[last..p]);
            out.push('\n');
            last = p;
        }
    }
    out.push_str(&text[last..]);
    out
}
