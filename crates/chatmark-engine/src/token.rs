//! Display tokens: the render hints shipped alongside message text.
//!
//! On the wire a token is a flat object `{type, start, length, content?,
//! memberId?}` where `type` is the numeric [`DisplayType`] id. In Rust it is a
//! tagged enum so that a mention can never lose its member id.

use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::span::Span;

/// Numeric display type ids shared with every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum DisplayType {
    Mention = 1,
    HttpLink = 2,
    PearLink = 3,
    Bold = 4,
    Italic = 5,
    Code = 6,
    Emoji = 7,
    CodeBlock = 8,
    StrikeThrough = 9,
}

impl DisplayType {
    /// Style kinds carry no payload and are represented by [`DisplayToken::Generic`].
    pub fn is_style(self) -> bool {
        matches!(
            self,
            Self::Bold | Self::Italic | Self::Code | Self::CodeBlock | Self::StrikeThrough
        )
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

impl From<DisplayType> for u8 {
    fn from(kind: DisplayType) -> Self {
        kind.id()
    }
}

impl TryFrom<u8> for DisplayType {
    type Error = TokenError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            1 => Self::Mention,
            2 => Self::HttpLink,
            3 => Self::PearLink,
            4 => Self::Bold,
            5 => Self::Italic,
            6 => Self::Code,
            7 => Self::Emoji,
            8 => Self::CodeBlock,
            9 => Self::StrikeThrough,
            other => return Err(TokenError::UnknownType(other)),
        })
    }
}

/// A position-indexed semantic annotation over the final display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "WireToken", try_from = "WireToken")]
pub enum DisplayToken {
    Mention { span: Span, member_id: String },
    HttpLink { span: Span, content: String },
    /// `content` is the shortcode name, never the glyph.
    Emoji { span: Span, content: String },
    PearLink { span: Span, content: String },
    /// Bold, italic, code, code block or strike-through.
    Generic { span: Span, kind: DisplayType },
}

impl DisplayToken {
    /// Builds a style token. Payload-carrying kinds are rejected so a
    /// `Generic` never stands in for a mention or link.
    pub fn style(kind: DisplayType, span: Span) -> Option<Self> {
        kind.is_style().then_some(Self::Generic { span, kind })
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Mention { span, .. }
            | Self::HttpLink { span, .. }
            | Self::Emoji { span, .. }
            | Self::PearLink { span, .. }
            | Self::Generic { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> DisplayType {
        match self {
            Self::Mention { .. } => DisplayType::Mention,
            Self::HttpLink { .. } => DisplayType::HttpLink,
            Self::Emoji { .. } => DisplayType::Emoji,
            Self::PearLink { .. } => DisplayType::PearLink,
            Self::Generic { kind, .. } => *kind,
        }
    }

    /// Link target, shortcode or member id, depending on the kind.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Mention { member_id, .. } => Some(member_id),
            Self::HttpLink { content, .. }
            | Self::Emoji { content, .. }
            | Self::PearLink { content, .. } => Some(content),
            Self::Generic { .. } => None,
        }
    }

    /// Returns the same token over a different span.
    #[must_use]
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Self::Mention { span, .. }
            | Self::HttpLink { span, .. }
            | Self::Emoji { span, .. }
            | Self::PearLink { span, .. }
            | Self::Generic { span, .. } => *span = new_span,
        }
        self
    }
}

/// Flat wire representation of a [`DisplayToken`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToken {
    #[serde(rename = "type")]
    pub kind: u8,
    pub start: u32,
    pub length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

impl From<DisplayToken> for WireToken {
    fn from(token: DisplayToken) -> Self {
        let span = token.span();
        let kind = token.kind().id();
        let (content, member_id) = match token {
            DisplayToken::Mention { member_id, .. } => (None, Some(member_id)),
            DisplayToken::HttpLink { content, .. }
            | DisplayToken::Emoji { content, .. }
            | DisplayToken::PearLink { content, .. } => (Some(content), None),
            DisplayToken::Generic { .. } => (None, None),
        };
        Self {
            kind,
            start: span.start,
            length: span.length,
            content,
            member_id,
        }
    }
}

impl TryFrom<WireToken> for DisplayToken {
    type Error = TokenError;

    fn try_from(wire: WireToken) -> Result<Self, Self::Error> {
        let kind = DisplayType::try_from(wire.kind)?;
        let span = Span::new(wire.start, wire.length);
        let content = |field| {
            wire.content.clone().ok_or(TokenError::MissingField {
                kind: wire.kind,
                field,
            })
        };
        Ok(match kind {
            DisplayType::Mention => Self::Mention {
                span,
                member_id: wire.member_id.clone().ok_or(TokenError::MissingField {
                    kind: wire.kind,
                    field: "memberId",
                })?,
            },
            DisplayType::HttpLink => Self::HttpLink {
                span,
                content: content("content")?,
            },
            DisplayType::Emoji => Self::Emoji {
                span,
                content: content("content")?,
            },
            DisplayType::PearLink => Self::PearLink {
                span,
                content: content("content")?,
            },
            style => Self::Generic { span, kind: style },
        })
    }
}

/// Sorts tokens by start and drops any token that overlaps one kept before
/// it. Used to merge annotator outputs into one non-overlapping list.
pub(crate) fn merge_non_overlapping(mut tokens: Vec<DisplayToken>) -> Vec<DisplayToken> {
    tokens.sort_by_key(|t| t.span().start);
    let mut out: Vec<DisplayToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let clear = out
            .last()
            .is_none_or(|prev| prev.span().end() <= token.span().start);
        if clear {
            out.push(token);
        }
    }
    out
}
