//! Compose-side sanitizers, applied only on the send path.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use unicode_segmentation::UnicodeSegmentation;

use crate::markdown::kinds::Link;
use crate::registry::EmojiRegistry;
use crate::scan::Cursor;
use crate::transform::code_block::isolate;

/// Explicit line break understood by the display lexer.
pub const NEWLINE_TAG: &str = "<br>";

/// Characters stripped from the visible text of markdown links.
pub const LINK_TEXT_STRIPPED: &[char] = &['*', '_', '`', '~'];

fn markdown_link_lazy() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("Invalid markdown link regex"))
}

/// Removes spaces at the start of every line. Only backtick fences mark
/// code, so indentation carries no meaning.
pub fn strip_leading_blanks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        out.push_str(line.trim_start_matches(' '));
    }
    out
}

/// Strips emphasis and code markers from the visible text of markdown links,
/// so a link renders as one plain run.
pub fn clean_link_text(text: &str) -> String {
    markdown_link_lazy()
        .replace_all(text, |caps: &Captures<'_>| {
            let label: String = caps[1]
                .chars()
                .filter(|c| !LINK_TEXT_STRIPPED.contains(c))
                .collect();
            format!("[{label}]({})", &caps[2])
        })
        .into_owned()
}

/// Turns typed emoji into `:shortcode:` form, one grapheme cluster at a time.
pub fn unemojify(text: &str, registry: &dyn EmojiRegistry) -> String {
    let mut out = String::with_capacity(text.len());
    for grapheme in text.graphemes(true) {
        if grapheme.is_ascii() {
            out.push_str(grapheme);
            continue;
        }
        match registry.shortcode_for(grapheme) {
            Some(code) => {
                out.push(':');
                out.push_str(&code);
                out.push(':');
            }
            None => out.push_str(grapheme),
        }
    }
    out
}

/// [`unemojify`] applied outside markdown links, so link labels and mention
/// names keep the glyphs the sender typed.
///
/// One forward pass; each `[` looks ahead at most the longest label and
/// destination a link may have.
pub fn unemojify_outside_links(text: &str, registry: &dyn EmojiRegistry) -> String {
    let mut out = String::with_capacity(text.len());
    let mut plain = 0;
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(char::from(Link::OPEN)) {
        let open = pos + rel;
        match link_end(text, open) {
            Some(end) => {
                out.push_str(&unemojify(&text[plain..open], registry));
                out.push_str(&text[open..end]);
                plain = end;
                pos = end;
            }
            None => pos = open + 1,
        }
    }
    out.push_str(&unemojify(&text[plain..], registry));
    out
}

/// End of a `[label](dest)` link opening at `open`. Label and destination
/// are non-empty and within [`Link::MAX_LABEL_LEN`] and
/// [`Link::MAX_DEST_LEN`].
fn link_end(text: &str, open: usize) -> Option<usize> {
    let b = text.as_bytes();
    let label = open + 1;
    let label_len = position_within(&b[label..], Link::CLOSE, Link::MAX_LABEL_LEN)?;
    let paren = label + label_len + 1;
    if label_len == 0 || b.get(paren) != Some(&Link::DEST_OPEN) {
        return None;
    }
    let dest = paren + 1;
    let dest_len = position_within(&b[dest..], Link::DEST_CLOSE, Link::MAX_DEST_LEN)?;
    (dest_len > 0).then_some(dest + dest_len + 1)
}

fn position_within(b: &[u8], needle: u8, limit: usize) -> Option<usize> {
    b.iter().take(limit + 1).position(|c| *c == needle)
}

/// Replaces newlines with [`NEWLINE_TAG`] outside fenced blocks and inline
/// code spans, so the display lexer keeps every line the user typed.
pub fn newlines_to_tags(text: &str) -> String {
    replace_outside_code(text, "\n", NEWLINE_TAG)
}

/// Reverses [`newlines_to_tags`] for text loaded back into the composer.
pub fn tags_to_newlines(text: &str) -> String {
    replace_outside_code(text, NEWLINE_TAG, "\n")
}

fn replace_outside_code(text: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for segment in isolate(text) {
        if segment.is_code() {
            out.push_str(segment.text);
        } else {
            replace_outside_spans(segment.text, from, to, &mut out);
        }
    }
    out
}

fn replace_outside_spans(text: &str, from: &str, to: &str, out: &mut String) {
    let first = from.as_bytes()[0];
    let mut cur = Cursor::new(text);
    let mut last = 0;
    while !cur.eof() {
        match cur.peek() {
            Some(b'`') => {
                let n = cur.run_len(b'`');
                let open_end = cur.pos() + n;
                match find_closing_run(text, open_end, n) {
                    Some(close_end) => cur = Cursor::at(text, close_end),
                    None => cur.bump_n(n),
                }
            }
            Some(b) if b == first && text[cur.pos()..].starts_with(from) => {
                out.push_str(&text[last..cur.pos()]);
                out.push_str(to);
                cur.bump_n(from.len());
                last = cur.pos();
            }
            _ => {
                cur.bump_char();
            }
        }
    }
    out.push_str(&text[last..]);
}

/// End of the first backtick run of exactly `n` at or after `from`.
pub(crate) fn find_closing_run(text: &str, from: usize, n: usize) -> Option<usize> {
    let b = text.as_bytes();
    let mut i = from;
    while i < b.len() {
        if b[i] == b'`' {
            let run = b[i..].iter().take_while(|c| **c == b'`').count();
            if run == n {
                return Some(i + run);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}
