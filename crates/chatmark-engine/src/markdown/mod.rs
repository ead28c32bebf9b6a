//! # Markdown
//!
//! A small chat-flavoured markdown lexer and the passes built on its tree.
//!
//! ## Modules
//!
//! - **`kinds`**: per-construct delimiter constants and limits
//! - **`token`**: [`MarkdownToken`] tree nodes
//! - **`block`**: paragraphs, blank gaps, fenced and indented code
//! - **`inline`**: emphasis, strike-through, code spans, links, autolinks, `<br>`
//! - **`plain`**: plain-text projection for notifications and previews
//! - **`display`**: display text plus style, mention and link tokens
//!
//! Only the constructs chat clients render are recognized. Everything else
//! (headings, lists, quotes, tables, raw HTML) stays literal paragraph text.

pub mod block;
pub mod display;
pub mod inline;
pub mod kinds;
pub mod plain;
pub mod token;

pub use inline::lex_inline;
pub use plain::{project, to_plain_text};
pub use token::{MarkdownToken, TokenKind};

/// Lexer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexOptions {
    /// Emit `Escape` tokens for backslash escapes. When off, an escaped
    /// character stays in the text with its backslash but still cannot open
    /// a construct.
    pub escapes: bool,
}

impl LexOptions {
    /// Options for building display text, where escapes stay visible.
    pub fn display() -> Self {
        Self { escapes: false }
    }

    /// Options for plain-text projection.
    pub fn plain() -> Self {
        Self { escapes: true }
    }
}
