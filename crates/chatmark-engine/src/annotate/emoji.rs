use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::registry::{EmojiEntry, EmojiRegistry};
use crate::span::{Span, ranges_overlap, utf16_len};
use crate::token::DisplayToken;

use super::Annotated;

fn emoji_matcher() -> &'static Regex {
    static EMOJI_MATCHER: OnceLock<Regex> = OnceLock::new();
    EMOJI_MATCHER
        .get_or_init(|| Regex::new(r":([a-zA-Z0-9_\-+]+):").expect("Invalid emoji regex"))
}

/// Replaces `:shortcode:` with the registry's emoji and emits a token per
/// replacement. Token starts are `start` plus the UTF-16 length of the
/// output built so far.
pub fn annotate(text: &str, start: u32, registry: &dyn EmojiRegistry) -> Annotated {
    annotate_excluding(text, start, registry, &[])
}

/// Turns `:shortcode:` of Unicode emoji into glyphs for text leaving the
/// app. Custom emoji have no glyph and keep their `:shortcode:` form, as do
/// unknown shortcodes.
pub fn emojify(text: &str, registry: &dyn EmojiRegistry) -> String {
    emoji_matcher()
        .replace_all(text, |caps: &Captures<'_>| match registry.lookup(&caps[1]) {
            Some(EmojiEntry::Unicode { glyph }) if !glyph.is_empty() => glyph,
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Like [`annotate`], but shortcodes overlapping a `protected` byte range
/// stay literal.
pub fn annotate_excluding(
    text: &str,
    start: u32,
    registry: &dyn EmojiRegistry,
    protected: &[Range<usize>],
) -> Annotated {
    let mut out = String::with_capacity(text.len());
    let mut tokens = Vec::new();
    let mut out_len = 0u32;
    let mut last = 0;

    for caps in emoji_matcher().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if protected.iter().any(|r| ranges_overlap(r, &whole.range())) {
            continue;
        }
        let name = &caps[1];
        let Some(entry) = registry.lookup(name) else {
            continue;
        };
        let emitted = match &entry {
            EmojiEntry::Unicode { glyph } => glyph.as_str(),
            EmojiEntry::Custom { .. } => name,
        };
        if emitted.is_empty() {
            continue;
        }

        let gap = &text[last..whole.start()];
        out.push_str(gap);
        out_len = out_len.saturating_add(utf16_len(gap));

        let length = utf16_len(emitted);
        tokens.push(DisplayToken::Emoji {
            span: Span::new(start.saturating_add(out_len), length),
            content: name.to_string(),
        });
        out.push_str(emitted);
        out_len = out_len.saturating_add(length);
        last = whole.end();
    }

    if tokens.is_empty() {
        return Annotated {
            text: text.to_string(),
            tokens,
        };
    }
    out.push_str(&text[last..]);
    Annotated { text: out, tokens }
}
