//! Block lexer.
//!
//! Chat messages only know paragraphs, blank-line gaps and code blocks.
//! Headings, lists, quotes and rules are left to the paragraph text so the
//! sender's characters survive verbatim; reference definitions are dropped.

use std::sync::OnceLock;

use regex::Regex;

use super::LexOptions;
use super::inline::lex_inline;
use super::kinds::{Fence, IndentedCode};
use super::token::{MarkdownToken, TokenKind};

static DEFINITION: OnceLock<Regex> = OnceLock::new();

fn definition_regex() -> &'static Regex {
    DEFINITION.get_or_init(|| {
        Regex::new(
            r#"^ {0,3}\[(?:[^\]\\\n]|\\.)+\]:[ \t]*<?[^\s>]+>?(?:[ \t]+(?:"[^"\n]*"|'[^'\n]*'|\([^)\n]*\)))?[ \t]*$"#,
        )
        .expect("Invalid link definition regex")
    })
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    /// End of content, newline excluded.
    end: usize,
    /// End including the newline, if any.
    full_end: usize,
}

#[derive(Debug, Clone, Copy)]
struct OpenFence {
    ch: u8,
    len: usize,
    indent: usize,
}

/// Lexes `text` into block tokens whose inline content is already lexed.
pub fn lex(text: &str, options: LexOptions) -> Vec<MarkdownToken> {
    let lines = split_lines(text);
    let content = |idx: usize| &text[lines[idx].start..lines[idx].end];
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = content(i);

        if is_blank(line) {
            let start = lines[i].start;
            while i < lines.len() && is_blank(content(i)) {
                i += 1;
            }
            out.push(MarkdownToken::leaf(
                TokenKind::Space,
                &text[start..lines[i - 1].full_end],
                "",
            ));
            continue;
        }

        if let Some(fence) = open_fence(line) {
            let mut body = Vec::new();
            let mut j = i + 1;
            let mut closed = false;
            while j < lines.len() {
                let candidate = content(j);
                if closes_fence(candidate, fence) {
                    closed = true;
                    break;
                }
                body.push(strip_indent(candidate, fence.indent));
                j += 1;
            }
            let last = if closed { j } else { lines.len() - 1 };
            out.push(MarkdownToken::leaf(
                TokenKind::Code,
                &text[lines[i].start..lines[last].full_end],
                body.join("\n"),
            ));
            i = last + 1;
            continue;
        }

        if is_indented(line) {
            let start = i;
            let mut end = i;
            while i < lines.len() && (is_indented(content(i)) || is_blank(content(i))) {
                if !is_blank(content(i)) {
                    end = i;
                }
                i += 1;
            }
            i = end + 1;
            let body: Vec<&str> = (start..=end).map(|k| strip_code_indent(content(k))).collect();
            out.push(MarkdownToken::leaf(
                TokenKind::Code,
                &text[lines[start].start..lines[end].full_end],
                body.join("\n"),
            ));
            continue;
        }

        if definition_regex().is_match(line) {
            log::trace!("dropping link definition line {i}");
            i += 1;
            continue;
        }

        let start = i;
        i += 1;
        while i < lines.len() && !is_blank(content(i)) && open_fence(content(i)).is_none() {
            i += 1;
        }
        let body = &text[lines[start].start..lines[i - 1].end];
        out.push(MarkdownToken::container(
            TokenKind::Paragraph,
            &text[lines[start].start..lines[i - 1].full_end],
            body,
            lex_inline(body, options),
        ));
    }
    out
}

fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices('\n') {
        lines.push(Line {
            start,
            end: idx,
            full_end: idx + 1,
        });
        start = idx + 1;
    }
    if start < text.len() {
        lines.push(Line {
            start,
            end: text.len(),
            full_end: text.len(),
        });
    }
    lines
}

fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

fn is_indented(line: &str) -> bool {
    line.starts_with(IndentedCode::INDENT) || line.starts_with('\t')
}

fn strip_code_indent(line: &str) -> &str {
    line.strip_prefix(IndentedCode::INDENT)
        .or_else(|| line.strip_prefix('\t'))
        .unwrap_or_else(|| line.trim_start_matches(' '))
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

fn strip_indent(line: &str, indent: usize) -> &str {
    &line[leading_spaces(line).min(indent)..]
}

fn open_fence(line: &str) -> Option<OpenFence> {
    let indent = leading_spaces(line);
    if indent > Fence::MAX_INDENT {
        return None;
    }
    let rest = &line[indent..];
    let ch = rest.bytes().next()?;
    if ch != Fence::BACKTICK && ch != Fence::TILDE {
        return None;
    }
    let len = rest.bytes().take_while(|b| *b == ch).count();
    if len < Fence::MIN_LEN {
        return None;
    }
    // A backtick info string may not contain backticks.
    if ch == Fence::BACKTICK && rest[len..].contains('`') {
        return None;
    }
    Some(OpenFence { ch, len, indent })
}

fn closes_fence(line: &str, fence: OpenFence) -> bool {
    let indent = leading_spaces(line);
    if indent > Fence::MAX_INDENT {
        return false;
    }
    let rest = &line[indent..];
    let len = rest.bytes().take_while(|b| *b == fence.ch).count();
    len >= fence.len && is_blank(&rest[len..])
}
