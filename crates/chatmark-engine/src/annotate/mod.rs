//! # Annotators
//!
//! Passes that run over final display text and emit [`DisplayToken`]s.
//!
//! ## Modules
//!
//! - **`emoji`**: `:shortcode:` substitution with `Emoji` tokens
//! - **`protocol`**: `PearLink` tokens for peer-to-peer protocol links
//!
//! [`annotate_fragment`] runs both and guarantees the combined token list is
//! in scan order and pairwise non-overlapping.

pub mod emoji;
pub mod protocol;

use std::ops::Range;

use crate::registry::EmojiRegistry;
use crate::scan::url::UrlScanner;
use crate::token::{DisplayToken, merge_non_overlapping};

/// Text after annotation plus the tokens pointing into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    pub text: String,
    pub tokens: Vec<DisplayToken>,
}

/// Runs emoji substitution, then protocol-link detection, over one fragment
/// whose first code unit sits at `start` in the final text.
///
/// Shortcodes inside a protocol link, up to the next whitespace, are left
/// literal so both the link text and a linkified target survive intact.
pub fn annotate_fragment(
    text: &str,
    start: u32,
    registry: &dyn EmojiRegistry,
    scanner: &UrlScanner,
) -> Annotated {
    let protected: Vec<Range<usize>> = scanner
        .find_protocol_links(text)
        .into_iter()
        .map(|m| m.range.start..run_end(text, m.range.start))
        .collect();
    let emoji = emoji::annotate_excluding(text, start, registry, &protected);
    let links = protocol::annotate(&emoji.text, start, scanner);
    let mut tokens = emoji.tokens;
    tokens.extend(links);
    Annotated {
        text: emoji.text,
        tokens: merge_non_overlapping(tokens),
    }
}

fn run_end(text: &str, from: usize) -> usize {
    text[from..]
        .find(char::is_whitespace)
        .map_or(text.len(), |rel| from + rel)
}
