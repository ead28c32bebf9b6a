//! Styled-fragment pass: flattens a lexed message into display text plus
//! per-leaf style tokens.
//!
//! Every leaf receives one token per enclosing style, outermost first, then
//! its own standalone token (code span, code block), then the emoji and
//! protocol-link tokens of its text.

use crate::annotate::{Annotated, annotate_fragment};
use crate::config::MENTION_SCHEME;
use crate::members::{MemberDirectory, MentionRef};
use crate::registry::EmojiRegistry;
use crate::scan::url::UrlScanner;
use crate::span::{Span, utf16_len};
use crate::token::{DisplayToken, DisplayType};
use crate::transform::mention::{convert_backslashes, parse_mention};

use super::LexOptions;
use super::block;
use super::token::{MarkdownToken, TokenKind};

const MAILTO: &str = "mailto:";

/// Style applied by an enclosing container.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Style {
    Generic(DisplayType),
    Link(String),
}

struct Builder<'a> {
    out: Annotated,
    len: u32,
    members: &'a dyn MemberDirectory,
    emoji: &'a dyn EmojiRegistry,
    scanner: &'a UrlScanner,
}

/// Builds display text and tokens for `markdown`.
///
/// Input that lexes to nothing visible (empty, or only link definitions)
/// is returned unchanged with no tokens.
pub fn build(
    markdown: &str,
    members: &dyn MemberDirectory,
    emoji: &dyn EmojiRegistry,
    scanner: &UrlScanner,
) -> Annotated {
    let blocks = block::lex(markdown, LexOptions::display());
    if blocks.iter().all(|b| b.kind == TokenKind::Space) {
        return Annotated {
            text: markdown.to_string(),
            tokens: Vec::new(),
        };
    }

    let mut builder = Builder {
        out: Annotated::default(),
        len: 0,
        members,
        emoji,
        scanner,
    };
    let mut previous = None;
    for token in &blocks {
        match token.kind {
            TokenKind::Space => builder.push_plain("\n\n"),
            TokenKind::Code => {
                if previous == Some(TokenKind::Paragraph) {
                    builder.push_plain("\n");
                }
                builder.push_code(&token.text, DisplayType::CodeBlock, &[]);
                builder.push_plain("\n");
            }
            _ => builder.walk(&token.children, &mut Vec::new()),
        }
        previous = Some(token.kind);
    }
    trim_newlines(builder.out)
}

impl Builder<'_> {
    fn walk(&mut self, tokens: &[MarkdownToken], styles: &mut Vec<Style>) {
        for token in tokens {
            match token.kind {
                TokenKind::Strong | TokenKind::Em | TokenKind::Del => {
                    let style = Style::Generic(match token.kind {
                        TokenKind::Strong => DisplayType::Bold,
                        TokenKind::Em => DisplayType::Italic,
                        _ => DisplayType::StrikeThrough,
                    });
                    self.nested(&token.children, styles, style);
                }
                TokenKind::Link => self.link(token, styles),
                TokenKind::Codespan => self.push_code(&token.text, DisplayType::Code, styles),
                TokenKind::Br => self.push_plain("\n"),
                TokenKind::Text => {
                    let text = html_escape::decode_html_entities(&token.text);
                    self.push_text(&text, styles);
                }
                _ if token.kind.is_container() => self.walk(&token.children, styles),
                _ => self.push_text(&token.text, styles),
            }
        }
    }

    /// Walks `children` with `style` added, unless an ancestor already has it.
    fn nested(&mut self, children: &[MarkdownToken], styles: &mut Vec<Style>, style: Style) {
        if styles.contains(&style) {
            self.walk(children, styles);
            return;
        }
        styles.push(style);
        self.walk(children, styles);
        styles.pop();
    }

    fn link(&mut self, token: &MarkdownToken, styles: &mut Vec<Style>) {
        let href = token.href.as_deref().unwrap_or_default();
        if href.starts_with(MAILTO) {
            self.walk(&token.children, styles);
            return;
        }
        let is_mention = href
            .strip_prefix(MENTION_SCHEME)
            .is_some_and(|rest| rest.starts_with("://"));
        if is_mention && let Some(mention) = parse_mention(&token.raw) {
            let name = self.mention_name(href, &mention.id, mention.role.as_deref(), &mention.label);
            let text = format!("@{name}");
            let start = self.len;
            let length = utf16_len(&text);
            self.push_styles(styles, start, length);
            self.push_token(DisplayToken::Mention {
                span: Span::new(start, length),
                member_id: mention.id,
            });
            self.append(&text);
            return;
        }
        self.nested(&token.children, styles, Style::Link(href.to_string()));
    }

    /// Live name for current mentions, else the stored label, else the id.
    fn mention_name(&self, href: &str, id: &str, role: Option<&str>, label: &str) -> String {
        let uri = role
            .and_then(|r| href.strip_suffix(r))
            .map_or(href, |u| u.trim_end_matches('/'));
        let mention = MentionRef {
            uri,
            member_id: id,
            role,
            label,
        };
        let live = (!self.members.is_legacy_mention(&mention))
            .then(|| self.members.display_name(id))
            .flatten();
        live.or_else(|| Some(convert_backslashes(label)).filter(|l| !l.is_empty()))
            .unwrap_or_else(|| id.to_string())
    }

    fn push_text(&mut self, text: &str, styles: &[Style]) {
        if text.is_empty() {
            return;
        }
        let start = self.len;
        let annotated = annotate_fragment(text, start, self.emoji, self.scanner);
        self.push_styles(styles, start, utf16_len(&annotated.text));
        for token in annotated.tokens {
            self.push_token(token);
        }
        self.append(&annotated.text);
    }

    fn push_code(&mut self, text: &str, kind: DisplayType, styles: &[Style]) {
        if text.is_empty() {
            return;
        }
        let start = self.len;
        let length = utf16_len(text);
        self.push_styles(styles, start, length);
        if let Some(token) = DisplayToken::style(kind, Span::new(start, length)) {
            self.push_token(token);
        }
        self.append(text);
    }

    fn push_plain(&mut self, text: &str) {
        self.append(text);
    }

    fn push_styles(&mut self, styles: &[Style], start: u32, length: u32) {
        let span = Span::new(start, length);
        for style in styles {
            let token = match style {
                Style::Generic(kind) => DisplayToken::style(*kind, span),
                Style::Link(href) => Some(DisplayToken::HttpLink {
                    span,
                    content: href.clone(),
                }),
            };
            if let Some(token) = token {
                self.push_token(token);
            }
        }
    }

    fn push_token(&mut self, token: DisplayToken) {
        if !token.span().is_empty() {
            self.out.tokens.push(token);
        }
    }

    fn append(&mut self, text: &str) {
        self.out.text.push_str(text);
        self.len = self.len.saturating_add(utf16_len(text));
    }
}

/// Drops leading and trailing newlines, moving and clipping tokens to match.
fn trim_newlines(mut out: Annotated) -> Annotated {
    let lead = out.text.len() - out.text.trim_start_matches('\n').len();
    if lead > 0 {
        let removed: String = out.text.drain(..lead).collect();
        let lead = utf16_len(&removed);
        out.tokens = out
            .tokens
            .into_iter()
            .filter_map(|t| {
                let span = t.span();
                let start = span.start.max(lead);
                (span.end() > start).then(|| t.with_span(Span::new(start - lead, span.end() - start)))
            })
            .collect();
    }
    let trimmed = out.text.trim_end_matches('\n').len();
    out.text.truncate(trimmed);
    let limit = utf16_len(&out.text);
    out.tokens = out
        .tokens
        .into_iter()
        .filter_map(|t| t.span().clipped(limit).map(|span| t.with_span(span)))
        .collect();
    out
}
