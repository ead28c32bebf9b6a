//! Plain-text projection of a token tree, used for notifications and
//! previews.

use super::LexOptions;
use super::inline::lex_inline;
use super::token::{MarkdownToken, TokenKind};

type Render = fn(&MarkdownToken) -> String;

/// Per-kind renderers. Kinds missing from the table render their raw source.
const RENDERERS: &[(TokenKind, Render)] = &[
    // Styled runs currently project to nothing, content included.
    (TokenKind::Strong, |_| String::new()),
    (TokenKind::Em, |_| String::new()),
    (TokenKind::Del, |_| String::new()),
    (TokenKind::Text, |t| t.text.clone()),
    (TokenKind::Code, |t| t.text.clone()),
    (TokenKind::Codespan, |t| t.text.clone()),
    (TokenKind::Escape, |t| t.text.clone()),
    (TokenKind::Link, |t| project(&t.children)),
    (TokenKind::Paragraph, |t| project(&t.children)),
    (TokenKind::Br, |_| "\n".to_string()),
    (TokenKind::Space, |_| "\n".to_string()),
];

fn render(token: &MarkdownToken) -> String {
    RENDERERS
        .iter()
        .find(|(kind, _)| *kind == token.kind)
        .map_or_else(|| token.raw.clone(), |(_, render)| render(token))
}

/// Concatenates the rendering of every token.
pub fn project(tokens: &[MarkdownToken]) -> String {
    tokens.iter().map(render).collect()
}

/// Plain text of inline markdown: links reduce to their label, escapes to
/// the escaped character, `<br>` to a newline.
pub fn to_plain_text(markdown: &str) -> String {
    project(&lex_inline(markdown, LexOptions::plain()))
}
