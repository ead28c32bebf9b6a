//! Receive and send pipelines.
//!
//! [`Pipeline`] owns the write-once [`PipelineConfig`]; the member directory
//! and emoji registry are borrowed per call through a [`PipelineContext`].
//!
//! ## Receive
//!
//! ```text
//! clamp quotes → normalize bullets → escape legacy mentions → isolate code
//!   text segments: linkify → encode line breaks
//!   code segments: untouched (newlines flattened in preview mode)
//! ```
//!
//! [`Pipeline::render_for_display`] then runs the emoji and protocol-link
//! annotators over the text segments of the result.
//!
//! ## Send
//!
//! ```text
//! strip leading blanks → pad fences → clean link text → clamp quotes
//!   → unemojify outside links → escape legacy mentions → newlines to <br>
//! ```
//!
//! [`Pipeline::prepare_outgoing`] adds the styled-fragment pass, producing
//! the text and display tokens the composer transmits.
//!
//! ## Copy and edit
//!
//! [`Pipeline::prepare_for_copy`] and [`Pipeline::prepare_for_edit`] turn a
//! stored message back into what a person typed: mention links become
//! `@label`, Unicode shortcodes become glyphs, and for editing `<br>` tags
//! become newlines again.

use serde::{Deserialize, Serialize};

use crate::annotate::{Annotated, annotate_fragment, emoji};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::markdown::{display, plain};
use crate::members::MemberDirectory;
use crate::registry::EmojiRegistry;
use crate::span::utf16_len;
use crate::token::DisplayToken;
use crate::transform::{blockquote, code_block, compose, line_break, linkify, list, mention};

/// How received text is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Full message body. Lines are kept, blank lines become `⟶`.
    #[default]
    Message,
    /// Single-line preview after a username: line breaks become
    /// [`line_break::BREAK_LINE_TAG`], bullets become `●` and code blocks
    /// are flattened.
    Preview,
}

impl DisplayMode {
    fn marker(self) -> Option<&'static str> {
        match self {
            Self::Message => None,
            Self::Preview => Some(line_break::BREAK_LINE_TAG),
        }
    }

    fn is_preview(self) -> bool {
        self == Self::Preview
    }
}

/// Collaborators borrowed for one call.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    pub members: &'a dyn MemberDirectory,
    pub emoji: &'a dyn EmojiRegistry,
}

impl<'a> PipelineContext<'a> {
    pub fn new(members: &'a dyn MemberDirectory, emoji: &'a dyn EmojiRegistry) -> Self {
        Self { members, emoji }
    }
}

/// Encoded display text with its emoji and protocol-link tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub text: String,
    pub tokens: Vec<DisplayToken>,
}

/// What the composer transmits: the sanitized markdown plus the display
/// text and tokens derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Sanitized markdown, as stored.
    pub text: String,
    /// Display text with style, mention, link, emoji and protocol tokens.
    pub display: RenderedMessage,
}

impl From<Annotated> for RenderedMessage {
    fn from(annotated: Annotated) -> Self {
        Self {
            text: annotated.text,
            tokens: annotated.tokens,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn within_cap(&self, text: &str) -> bool {
        text.len() <= self.config.max_input_len()
    }

    /// Runs the receive pipeline. Text over the input cap is returned as is.
    pub fn process_markdown(&self, raw: &str, mode: DisplayMode, ctx: PipelineContext<'_>) -> String {
        if !self.within_cap(raw) {
            log::warn!(
                "message of {} bytes is over the {} byte cap, rendering unprocessed",
                raw.len(),
                self.config.max_input_len()
            );
            return raw.to_string();
        }

        let clamped = blockquote::clamp(raw, self.config.quote_depth());
        let listed = list::normalize(&clamped, mode.is_preview());
        let escaped = mention::escape_for_display(&listed, ctx.members);
        log::trace!("receive: {} bytes after mention escaping", escaped.len());

        let segments = code_block::isolate(&escaped);
        let linked = linkify::linkify_segments(
            segments.iter().map(|s| (s.is_code(), s.text)),
            self.config.scanner(),
        );

        let marker = mode.marker();
        let mut out = String::with_capacity(escaped.len() + 16);
        for (segment, text) in segments.iter().zip(&linked) {
            match (segment.is_code(), mode.is_preview()) {
                (true, true) => out.push_str(&text.replace('\n', " ")),
                (true, false) => out.push_str(text),
                (false, _) => out.push_str(&line_break::encode(text, marker)),
            }
        }
        out
    }

    /// Receive pipeline plus emoji and protocol-link annotation of the text
    /// segments. Over the input cap the text comes back unprocessed with no
    /// tokens.
    pub fn render_for_display(
        &self,
        raw: &str,
        mode: DisplayMode,
        ctx: PipelineContext<'_>,
    ) -> RenderedMessage {
        if !self.within_cap(raw) {
            return RenderedMessage {
                text: self.process_markdown(raw, mode, ctx),
                tokens: Vec::new(),
            };
        }

        let encoded = self.process_markdown(raw, mode, ctx);
        let mut rendered = RenderedMessage {
            text: String::with_capacity(encoded.len()),
            tokens: Vec::new(),
        };
        let mut offset = 0u32;
        for segment in code_block::isolate(&encoded) {
            let piece = if segment.is_code() {
                Annotated {
                    text: segment.text.to_string(),
                    tokens: Vec::new(),
                }
            } else {
                annotate_fragment(segment.text, offset, ctx.emoji, self.config.scanner())
            };
            offset = offset.saturating_add(utf16_len(&piece.text));
            rendered.text.push_str(&piece.text);
            rendered.tokens.extend(piece.tokens);
        }
        log::debug!(
            "rendered {} bytes into {} bytes with {} tokens",
            raw.len(),
            rendered.text.len(),
            rendered.tokens.len()
        );
        rendered
    }

    /// Runs the send pipeline over composed text.
    ///
    /// # Errors
    /// [`PipelineError::InputTooLarge`] when `composed` is over the input
    /// cap; unsanitized text must never be persisted.
    pub fn sanitize_for_send(
        &self,
        composed: &str,
        ctx: PipelineContext<'_>,
    ) -> Result<String, PipelineError> {
        if !self.within_cap(composed) {
            return Err(PipelineError::InputTooLarge {
                len: composed.len(),
                max: self.config.max_input_len(),
            });
        }

        let text = compose::strip_leading_blanks(composed);
        let text = code_block::pad_fences(&text);
        let text = compose::clean_link_text(&text);
        let text = blockquote::clamp(&text, self.config.quote_depth());
        let text = compose::unemojify_outside_links(&text, ctx.emoji);
        let text = mention::escape_for_send(&text, ctx.members);
        let text = compose::newlines_to_tags(&text);
        log::trace!("send: sanitized {} bytes into {}", composed.len(), text.len());
        Ok(text)
    }

    /// Sanitizes composed text and derives its display text and tokens.
    ///
    /// # Errors
    /// As [`Pipeline::sanitize_for_send`].
    pub fn prepare_outgoing(
        &self,
        composed: &str,
        ctx: PipelineContext<'_>,
    ) -> Result<OutgoingMessage, PipelineError> {
        let text = self.sanitize_for_send(composed, ctx)?;
        let display = display::build(&text, ctx.members, ctx.emoji, self.config.scanner());
        log::debug!(
            "outgoing message: {} display tokens",
            display.tokens.len()
        );
        Ok(OutgoingMessage {
            text,
            display: display.into(),
        })
    }

    /// Plain text for notifications and previews.
    pub fn to_plain_text(&self, markdown: &str) -> String {
        if !self.within_cap(markdown) {
            log::warn!("plain text requested for {} bytes over the cap", markdown.len());
            return markdown.to_string();
        }
        plain::to_plain_text(markdown)
    }

    /// Turns stored `⟶` markers back into newlines, for editing a message.
    pub fn restore_line_breaks(&self, text: &str) -> String {
        line_break::decode(text)
    }

    /// Clipboard text for a copied message: mention links become `@label`
    /// and Unicode shortcodes become glyphs. Custom emoji stay `:shortcode:`.
    pub fn prepare_for_copy(&self, text: &str, ctx: PipelineContext<'_>) -> String {
        if !self.within_cap(text) {
            log::warn!("copy requested for {} bytes over the cap", text.len());
            return text.to_string();
        }
        emoji::emojify(&mention::strip_mentions(text), ctx.emoji)
    }

    /// Composer text for editing a sent message. Like
    /// [`Pipeline::prepare_for_copy`], with `<br>` tags turned back into the
    /// newlines the sender typed, so sending it again gives the same text.
    pub fn prepare_for_edit(&self, stored: &str, ctx: PipelineContext<'_>) -> String {
        if !self.within_cap(stored) {
            log::warn!("edit requested for {} bytes over the cap", stored.len());
            return stored.to_string();
        }
        let text = compose::tags_to_newlines(stored);
        emoji::emojify(&mention::strip_mentions(&text), ctx.emoji)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::members::NoMembers;
    use crate::registry::{NoEmoji, StaticEmojiRegistry};
    use crate::span::Span;
    use pretty_assertions::assert_eq;

    fn ctx() -> PipelineContext<'static> {
        PipelineContext::new(&NoMembers, &NoEmoji)
    }

    #[test]
    fn receive_encodes_blank_lines() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.process_markdown("- 0\n\n\n- 1\n\n- 2", DisplayMode::Message, ctx()),
            "- 0⟶⟶\n- 1⟶\n- 2"
        );
    }

    #[test]
    fn receive_linkifies_outside_code() {
        let pipeline = Pipeline::default();
        let out = pipeline.process_markdown(
            "see www.a.com\n```\nwww.b.com\n```",
            DisplayMode::Message,
            ctx(),
        );
        assert_eq!(out, "see [www.a.com]('http://www.a.com')\n```\nwww.b.com\n```");
    }

    #[test]
    fn preview_flattens_lines_and_code() {
        let pipeline = Pipeline::default();
        let out = pipeline.process_markdown("a\n- b\n```\nx\ny\n```", DisplayMode::Preview, ctx());
        assert_eq!(out, "a<br/>● b ``` x y ```");
    }

    #[test]
    fn render_offsets_skip_code_segments() {
        let pipeline = Pipeline::default();
        let emoji = StaticEmojiRegistry::new().with_custom("party");
        let ctx = PipelineContext::new(&NoMembers, &emoji);
        let rendered = pipeline.render_for_display(
            "```\n:party:\n```\nhi :party:",
            DisplayMode::Message,
            ctx,
        );
        assert_eq!(rendered.text, "```\n:party:\n```\nhi party");
        assert_eq!(
            rendered.tokens,
            vec![DisplayToken::Emoji {
                span: Span::new(19, 5),
                content: "party".into()
            }]
        );
    }

    #[test]
    fn over_cap_render_is_unprocessed() {
        let config = PipelineConfig::builder().max_input_len(4).build().unwrap();
        let pipeline = Pipeline::new(config);
        let rendered = pipeline.render_for_display("a\n\nb c", DisplayMode::Message, ctx());
        assert_eq!(rendered.text, "a\n\nb c");
        assert!(rendered.tokens.is_empty());
    }

    #[test]
    fn over_cap_send_is_rejected() {
        let config = PipelineConfig::builder().max_input_len(4).build().unwrap();
        let pipeline = Pipeline::new(config);
        assert_eq!(
            pipeline.sanitize_for_send("hello", ctx()),
            Err(PipelineError::InputTooLarge { len: 5, max: 4 })
        );
    }

    const MEMBER: &str = "94dqka6etwq4xhsazq84dqfzap3ue9r7poq89aapcarg6a6wsaky";

    fn copy_emoji() -> StaticEmojiRegistry {
        StaticEmojiRegistry::new()
            .with_unicode("+1", "👍\u{fe0f}")
            .with_custom("keet_party")
    }

    #[test]
    fn copy_strips_mentions_and_emojifies() {
        let emoji = copy_emoji();
        let ctx = PipelineContext::new(&NoMembers, &emoji);
        let stored = format!("hi [@Nick](mention://user/{MEMBER}) :+1: :keet_party: :nope:");
        assert_eq!(
            Pipeline::default().prepare_for_copy(&stored, ctx),
            "hi @Nick 👍\u{fe0f} :keet_party: :nope:"
        );
    }

    #[test]
    fn edit_restores_typed_text() {
        let emoji = copy_emoji();
        let ctx = PipelineContext::new(&NoMembers, &emoji);
        let pipeline = Pipeline::default();
        let typed = "line 👍\u{fe0f}\nnext :keet_party:";
        let stored = pipeline.sanitize_for_send(typed, ctx).unwrap();
        assert_eq!(stored, "line :+1:<br>next :keet_party:");
        let edited = pipeline.prepare_for_edit(&stored, ctx);
        assert_eq!(edited, typed);
        assert_eq!(pipeline.sanitize_for_send(&edited, ctx).unwrap(), stored);
    }

    #[test]
    fn over_cap_copy_is_unchanged() {
        let config = PipelineConfig::builder().max_input_len(4).build().unwrap();
        let emoji = copy_emoji();
        let ctx = PipelineContext::new(&NoMembers, &emoji);
        assert_eq!(Pipeline::new(config).prepare_for_copy(":+1: x", ctx), ":+1: x");
    }

    #[test]
    fn restore_reverses_blank_line_markers() {
        let pipeline = Pipeline::default();
        let encoded = pipeline.process_markdown("a\n\nb", DisplayMode::Message, ctx());
        assert_eq!(pipeline.restore_line_breaks(&encoded), "a\n\nb");
    }
}
