//! Inline lexer.
//!
//! A single left-to-right pass collects atoms (code spans, links, autolinks,
//! `<br>` tags, escapes) and delimiter runs. Emphasis is then resolved with a
//! delimiter stack in the CommonMark manner: each closer searches backwards
//! for a compatible opener, and a per-kind lower bound remembers where a
//! failed search stopped, so matching stays linear even on adversarial input.

use std::collections::HashMap;
use std::ops::Range;

use super::LexOptions;
use super::kinds::{CodeSpan, Emphasis, LineBreak, Link, Strikethrough};
use super::token::{MarkdownToken, TokenKind, push_merged};
use crate::scan::url::UrlScanner;

/// Lexes inline markdown into a token list.
pub fn lex_inline(text: &str, options: LexOptions) -> Vec<MarkdownToken> {
    InlineLexer::new(text, options).parse(0, text.len(), false)
}

struct InlineLexer<'a> {
    s: &'a str,
    options: LexOptions,
    /// Autolink candidates in source order: (range, href).
    autolinks: Vec<(Range<usize>, String)>,
    /// Backtick run length → position from which no closing run exists.
    no_closer_from: HashMap<usize, usize>,
}

enum Step {
    Token(MarkdownToken, usize),
    Delim(DelimRun, usize),
    /// Literal text up to the given position.
    Skip(usize),
    None,
}

enum Piece {
    Token(MarkdownToken),
    Delim(usize),
}

#[derive(Debug)]
struct DelimRun {
    ch: u8,
    /// Unconsumed bytes are `lo..hi`.
    lo: usize,
    hi: usize,
    orig: usize,
    can_open: bool,
    can_close: bool,
    prev: Option<usize>,
    next: Option<usize>,
    opens: Vec<(TokenKind, Range<usize>)>,
    closes: Vec<(TokenKind, Range<usize>)>,
}

impl DelimRun {
    fn count(&self) -> usize {
        self.hi - self.lo
    }
}

struct Frame {
    kind: TokenKind,
    open: Range<usize>,
    children: Vec<MarkdownToken>,
    /// Past the nesting cap; delimiters are emitted as text.
    flat: bool,
}

impl<'a> InlineLexer<'a> {
    fn new(s: &'a str, options: LexOptions) -> Self {
        let autolinks = UrlScanner::standard()
            .find_links(s)
            .into_iter()
            .map(|m| {
                let href = m.href();
                (m.range, href)
            })
            .collect();
        Self {
            s,
            options,
            autolinks,
            no_closer_from: HashMap::new(),
        }
    }

    fn parse(&mut self, lo: usize, hi: usize, in_link: bool) -> Vec<MarkdownToken> {
        let b = self.s.as_bytes();
        let mut pieces: Vec<Piece> = Vec::new();
        let mut runs: Vec<DelimRun> = Vec::new();
        let mut text_start = lo;
        let mut i = lo;

        while i < hi {
            let mut step = match b[i] {
                b'\\' => self.escape_at(i, hi),
                CodeSpan::TICK => self.code_span_at(i, hi),
                b'<' => self.line_break_at(i, hi),
                Link::IMAGE if !in_link => self.image_at(i, hi),
                Link::OPEN if !in_link => match self.link_at(i, hi) {
                    Some((token, end)) => Step::Token(token, end),
                    None => Step::None,
                },
                Emphasis::STAR | Emphasis::UNDERSCORE | Strikethrough::TILDE => {
                    self.delim_at(i, lo, hi)
                }
                _ => Step::None,
            };
            if matches!(step, Step::None) && !in_link {
                step = self.autolink_at(i, hi);
            }

            match step {
                Step::Token(token, end) => {
                    flush_text(self.s, &mut pieces, text_start, i);
                    pieces.push(Piece::Token(token));
                    i = end;
                    text_start = end;
                }
                Step::Delim(run, end) => {
                    flush_text(self.s, &mut pieces, text_start, i);
                    pieces.push(Piece::Delim(runs.len()));
                    runs.push(run);
                    i = end;
                    text_start = end;
                }
                Step::Skip(end) => i = end,
                Step::None => i += char_len(self.s, i),
            }
        }
        flush_text(self.s, &mut pieces, text_start, hi);

        let len = runs.len();
        for (idx, run) in runs.iter_mut().enumerate() {
            run.prev = idx.checked_sub(1);
            run.next = (idx + 1 < len).then_some(idx + 1);
        }
        process_emphasis(&mut runs);
        self.assemble(pieces, &runs)
    }

    fn escape_at(&self, i: usize, hi: usize) -> Step {
        let b = self.s.as_bytes();
        if i + 1 >= hi || !b[i + 1].is_ascii_punctuation() {
            return Step::None;
        }
        if self.options.escapes {
            let token = MarkdownToken::leaf(
                TokenKind::Escape,
                &self.s[i..i + 2],
                &self.s[i + 1..i + 2],
            );
            Step::Token(token, i + 2)
        } else {
            Step::Skip(i + 2)
        }
    }

    fn code_span_at(&mut self, i: usize, hi: usize) -> Step {
        let n = run_len(self.s.as_bytes(), i, hi, CodeSpan::TICK);
        let Some(close) = self.closing_ticks(i + n, hi, n) else {
            return Step::Skip(i + n);
        };
        let inner = &self.s[i + n..close];
        let mut text = inner.replace('\n', " ");
        if text.len() >= 2
            && text.starts_with(' ')
            && text.ends_with(' ')
            && !text.bytes().all(|c| c == b' ')
        {
            text = text[1..text.len() - 1].to_string();
        }
        let end = close + n;
        Step::Token(
            MarkdownToken::leaf(TokenKind::Codespan, &self.s[i..end], text),
            end,
        )
    }

    /// Start of the first backtick run of exactly `n` in `from..hi`.
    fn closing_ticks(&mut self, from: usize, hi: usize, n: usize) -> Option<usize> {
        let whole = hi == self.s.len();
        if whole && self.no_closer_from.get(&n).is_some_and(|p| from >= *p) {
            return None;
        }
        let b = self.s.as_bytes();
        let mut j = from;
        while j < hi {
            if b[j] == CodeSpan::TICK {
                let run = run_len(b, j, hi, CodeSpan::TICK);
                if run == n {
                    return Some(j);
                }
                j += run;
            } else {
                j += 1;
            }
        }
        if whole {
            let entry = self.no_closer_from.entry(n).or_insert(from);
            *entry = (*entry).min(from);
        }
        None
    }

    fn line_break_at(&self, i: usize, hi: usize) -> Step {
        let rest = &self.s.as_bytes()[i..hi];
        LineBreak::TAGS
            .iter()
            .find(|tag| {
                rest.len() >= tag.len() && rest[..tag.len()].eq_ignore_ascii_case(tag.as_bytes())
            })
            .map_or(Step::None, |tag| {
                let end = i + tag.len();
                Step::Token(MarkdownToken::leaf(TokenKind::Br, &self.s[i..end], ""), end)
            })
    }

    /// Images are not rendered; their source stays literal text.
    fn image_at(&mut self, i: usize, hi: usize) -> Step {
        if i + 1 >= hi || self.s.as_bytes()[i + 1] != Link::OPEN {
            return Step::None;
        }
        match self.link_at(i + 1, hi) {
            Some((_, end)) => Step::Skip(end),
            None => Step::None,
        }
    }

    /// Parses `[label](destination "title")` starting at the `[` at `i`.
    fn link_at(&mut self, i: usize, hi: usize) -> Option<(MarkdownToken, usize)> {
        let b = self.s.as_bytes();
        let label_start = i + 1;
        let limit = hi.min(label_start + Link::MAX_LABEL_LEN);
        let mut j = label_start;
        let mut depth = 1usize;
        while j < limit {
            match b[j] {
                b'\\' => {
                    j += 2;
                    continue;
                }
                CodeSpan::TICK => {
                    let n = run_len(b, j, limit, CodeSpan::TICK);
                    j = match find_run(b, j + n, limit, n) {
                        Some(close) => close + n,
                        None => j + n,
                    };
                    continue;
                }
                Link::OPEN => depth += 1,
                Link::CLOSE => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            j += 1;
        }
        if depth != 0 || j >= limit {
            return None;
        }
        let label_end = j;

        j += 1;
        if j >= hi || b[j] != Link::DEST_OPEN {
            return None;
        }
        j = skip_ws(b, j + 1, hi);

        let dest = if j < hi && b[j] == b'<' {
            let start = j + 1;
            let limit = hi.min(start + Link::MAX_DEST_LEN + 1);
            let close = (start..limit).find(|&k| b[k] == b'>' || b[k] == b'\n')?;
            if b[close] != b'>' {
                return None;
            }
            j = close + 1;
            start..close
        } else {
            let start = j;
            let mut parens = 0usize;
            while j < hi {
                match b[j] {
                    b'\\' if j + 1 < hi => {
                        j += 2;
                        continue;
                    }
                    Link::DEST_OPEN => parens += 1,
                    Link::DEST_CLOSE if parens == 0 => break,
                    Link::DEST_CLOSE => parens -= 1,
                    c if c.is_ascii_whitespace() => break,
                    _ => {}
                }
                j += 1;
                if j - start > Link::MAX_DEST_LEN {
                    return None;
                }
            }
            if parens != 0 {
                return None;
            }
            start..j
        };

        let after_dest = j;
        j = skip_ws(b, j, hi);
        if j > after_dest && j < hi && matches!(b[j], b'"' | b'\'' | b'(') {
            let closer = if b[j] == b'(' { b')' } else { b[j] };
            let limit = hi.min(j + 1 + Link::MAX_TITLE_LEN + 1);
            let close = (j + 1..limit).find(|&k| b[k] == closer)?;
            j = skip_ws(b, close + 1, hi);
        }
        if j >= hi || b[j] != Link::DEST_CLOSE {
            return None;
        }
        let end = j + 1;

        let href = strip_quotes(&self.s[dest]).to_string();
        let children = self.parse(label_start, label_end, true);
        let token = MarkdownToken::container(
            TokenKind::Link,
            &self.s[i..end],
            &self.s[label_start..label_end],
            children,
        )
        .with_href(href);
        Some((token, end))
    }

    fn autolink_at(&self, i: usize, hi: usize) -> Step {
        let idx = self.autolinks.partition_point(|(r, _)| r.start < i);
        match self.autolinks.get(idx) {
            Some((r, href)) if r.start == i && r.end <= hi => {
                let value = &self.s[r.clone()];
                let token = MarkdownToken::container(
                    TokenKind::Link,
                    value,
                    value,
                    vec![MarkdownToken::text(value)],
                )
                .with_href(href.clone());
                Step::Token(token, r.end)
            }
            _ => Step::None,
        }
    }

    fn delim_at(&self, i: usize, lo: usize, hi: usize) -> Step {
        let b = self.s.as_bytes();
        let ch = b[i];
        let n = run_len(b, i, hi, ch);
        if ch == Strikethrough::TILDE && n > Strikethrough::MAX_RUN {
            return Step::Skip(i + n);
        }
        let before = (i > lo).then(|| self.s[..i].chars().next_back()).flatten();
        let after = (i + n < hi).then(|| self.s[i + n..].chars().next()).flatten();
        let (left, right) = flanking(before, after);
        let (can_open, can_close) = if ch == Emphasis::UNDERSCORE {
            (
                left && (!right || before.is_some_and(is_punct)),
                right && (!left || after.is_some_and(is_punct)),
            )
        } else {
            (left, right)
        };
        if !can_open && !can_close {
            return Step::Skip(i + n);
        }
        Step::Delim(
            DelimRun {
                ch,
                lo: i,
                hi: i + n,
                orig: n,
                can_open,
                can_close,
                prev: None,
                next: None,
                opens: Vec::new(),
                closes: Vec::new(),
            },
            i + n,
        )
    }

    /// Turns pieces and resolved delimiter runs into a token tree.
    fn assemble(&self, pieces: Vec<Piece>, runs: &[DelimRun]) -> Vec<MarkdownToken> {
        let mut root: Vec<MarkdownToken> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        for piece in pieces {
            match piece {
                Piece::Token(token) => push_merged(top(&mut root, &mut stack), token),
                Piece::Delim(idx) => {
                    let run = &runs[idx];
                    for (_, range) in &run.closes {
                        self.close_frame(&mut root, &mut stack, range.clone());
                    }
                    if run.lo < run.hi {
                        push_merged(
                            top(&mut root, &mut stack),
                            MarkdownToken::text(&self.s[run.lo..run.hi]),
                        );
                    }
                    for (kind, range) in run.opens.iter().rev() {
                        let open_frames = stack.iter().filter(|f| !f.flat).count();
                        stack.push(Frame {
                            kind: *kind,
                            open: range.clone(),
                            children: Vec::new(),
                            flat: open_frames >= Emphasis::MAX_NESTING,
                        });
                    }
                }
            }
        }
        while let Some(frame) = stack.pop() {
            let parent = top(&mut root, &mut stack);
            push_merged(parent, MarkdownToken::text(&self.s[frame.open]));
            for child in frame.children {
                push_merged(parent, child);
            }
        }
        root
    }

    fn close_frame(&self, root: &mut Vec<MarkdownToken>, stack: &mut Vec<Frame>, close: Range<usize>) {
        let Some(frame) = stack.pop() else {
            push_merged(root, MarkdownToken::text(&self.s[close]));
            return;
        };
        let parent = top(root, stack);
        if frame.flat {
            push_merged(parent, MarkdownToken::text(&self.s[frame.open]));
            for child in frame.children {
                push_merged(parent, child);
            }
            push_merged(parent, MarkdownToken::text(&self.s[close]));
            return;
        }
        parent.push(MarkdownToken::container(
            frame.kind,
            &self.s[frame.open.start..close.end],
            &self.s[frame.open.end..close.start],
            frame.children,
        ));
    }
}

fn top<'t>(root: &'t mut Vec<MarkdownToken>, stack: &'t mut [Frame]) -> &'t mut Vec<MarkdownToken> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Matches closers to openers. Runs are linked through `prev`/`next`;
/// runs between a matched pair are unlinked, as are exhausted runs.
fn process_emphasis(runs: &mut [DelimRun]) {
    let mut bottoms: HashMap<(u8, bool, usize), usize> = HashMap::new();
    let mut current = (!runs.is_empty()).then_some(0);

    while let Some(c) = current {
        if !runs[c].can_close || runs[c].count() == 0 {
            current = runs[c].next;
            continue;
        }
        let ch = runs[c].ch;
        let class = if ch == Strikethrough::TILDE {
            runs[c].count()
        } else {
            runs[c].orig % 3
        };
        let key = (ch, runs[c].can_open, class);
        let bottom = bottoms.get(&key).copied();

        let mut found = None;
        let mut cursor = runs[c].prev;
        while let Some(o) = cursor {
            if bottom.is_some_and(|b| o <= b) {
                break;
            }
            if can_pair(&runs[o], &runs[c]) {
                found = Some(o);
                break;
            }
            cursor = runs[o].prev;
        }

        let Some(o) = found else {
            if let Some(b) = c.checked_sub(1) {
                bottoms.insert(key, b);
            }
            let next = runs[c].next;
            if !runs[c].can_open {
                unlink(runs, c);
            }
            current = next;
            continue;
        };

        let used = if ch == Strikethrough::TILDE {
            runs[c].count()
        } else if runs[o].count() >= 2 && runs[c].count() >= 2 {
            2
        } else {
            1
        };
        let kind = match (ch, used) {
            (Strikethrough::TILDE, _) => TokenKind::Del,
            (_, 2) => TokenKind::Strong,
            _ => TokenKind::Em,
        };
        let open = runs[o].hi - used..runs[o].hi;
        runs[o].hi -= used;
        runs[o].opens.push((kind, open));
        let close = runs[c].lo..runs[c].lo + used;
        runs[c].lo += used;
        runs[c].closes.push((kind, close));

        runs[o].next = Some(c);
        runs[c].prev = Some(o);
        if runs[o].count() == 0 {
            unlink(runs, o);
        }
        if runs[c].count() == 0 {
            let next = runs[c].next;
            unlink(runs, c);
            current = next;
        }
    }
}

fn can_pair(opener: &DelimRun, closer: &DelimRun) -> bool {
    if opener.ch != closer.ch || !opener.can_open || opener.count() == 0 {
        return false;
    }
    if opener.ch == Strikethrough::TILDE {
        return opener.count() == closer.count();
    }
    let sum_is_multiple = (opener.orig + closer.orig) % 3 == 0;
    let both_multiples = opener.orig % 3 == 0 && closer.orig % 3 == 0;
    !((opener.can_close || closer.can_open) && sum_is_multiple && !both_multiples)
}

fn unlink(runs: &mut [DelimRun], idx: usize) {
    let (prev, next) = (runs[idx].prev, runs[idx].next);
    if let Some(p) = prev {
        runs[p].next = next;
    }
    if let Some(n) = next {
        runs[n].prev = prev;
    }
}

/// Left- and right-flanking per CommonMark.
fn flanking(before: Option<char>, after: Option<char>) -> (bool, bool) {
    let before_ws = before.is_none_or(char::is_whitespace);
    let after_ws = after.is_none_or(char::is_whitespace);
    let before_punct = before.is_some_and(is_punct);
    let after_punct = after.is_some_and(is_punct);
    let left = !after_ws && (!after_punct || before_ws || before_punct);
    let right = !before_ws && (!before_punct || after_ws || after_punct);
    (left, right)
}

fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace())
}

fn flush_text(s: &str, pieces: &mut Vec<Piece>, from: usize, to: usize) {
    if from < to {
        pieces.push(Piece::Token(MarkdownToken::text(&s[from..to])));
    }
}

fn run_len(b: &[u8], i: usize, hi: usize, ch: u8) -> usize {
    b[i..hi].iter().take_while(|c| **c == ch).count()
}

/// Start of the first backtick run of exactly `n` in `from..hi`.
fn find_run(b: &[u8], from: usize, hi: usize, n: usize) -> Option<usize> {
    let mut j = from;
    while j < hi {
        if b[j] == CodeSpan::TICK {
            let run = run_len(b, j, hi, CodeSpan::TICK);
            if run == n {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

fn skip_ws(b: &[u8], mut j: usize, hi: usize) -> usize {
    while j < hi && b[j].is_ascii_whitespace() {
        j += 1;
    }
    j
}

fn strip_quotes(dest: &str) -> &str {
    dest.strip_prefix('\'')
        .and_then(|d| d.strip_suffix('\''))
        .unwrap_or(dest)
}

fn char_len(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(1, char::len_utf8)
}
