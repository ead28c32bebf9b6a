//! UniFFI bindings for the chatmark pipelines.
//!
//! The mobile apps hold one [`ChatmarkHandle`] per process. It owns the
//! write-once pipeline configuration, the member and emoji tables the apps
//! keep up to date, and a cache of rendered messages.

use chatmark_engine::{
    DisplayCache, DisplayMode, DisplayToken, OutgoingMessage, Pipeline, PipelineConfig,
    PipelineContext, PipelineError, RenderedMessage, StaticEmojiRegistry, StaticMemberDirectory,
    WireToken,
};
use std::sync::{Mutex, MutexGuard};

uniffi::setup_scaffolding!();

// ============ Errors ============

/// Errors that can cross the FFI boundary
/// Note: Field is named `reason` not `message` to avoid conflict with Throwable.message in Kotlin
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("Input is {len} bytes, over the {max} byte limit")]
    InputTooLarge { len: u64, max: u64 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<PipelineError> for FfiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InputTooLarge { len, max } => Self::InputTooLarge {
                len: len as u64,
                max: max as u64,
            },
            PipelineError::InvalidScheme(_) => Self::InvalidConfig {
                reason: err.to_string(),
            },
        }
    }
}

// ============ Handle ============

struct Tables {
    members: StaticMemberDirectory,
    emoji: StaticEmojiRegistry,
}

#[derive(uniffi::Object)]
pub struct ChatmarkHandle {
    pipeline: Pipeline,
    tables: Mutex<Tables>,
    cache: DisplayCache,
}

impl ChatmarkHandle {
    fn with_config(config: PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            tables: Mutex::new(Tables {
                members: StaticMemberDirectory::new(),
                emoji: StaticEmojiRegistry::new(),
            }),
            cache: DisplayCache::default(),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Recover from poisoned mutex (another thread panicked while holding lock)
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies a table change. Cached renderings may name the old members
    /// or emoji, so they are dropped.
    fn update_tables(&self, change: impl FnOnce(&mut Tables)) {
        change(&mut self.tables());
        self.cache.clear();
    }
}

#[uniffi::export]
impl ChatmarkHandle {
    /// Handle with the default schemes, quote depth and input cap.
    #[uniffi::constructor]
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Handle with app-specific settings. Fails on a malformed scheme.
    #[uniffi::constructor]
    pub fn with_settings(settings: PipelineSettings) -> Result<Self, FfiError> {
        let config = PipelineConfig::builder()
            .pear_scheme(settings.pear_scheme)
            .custom_schemes(settings.custom_schemes)
            .quote_depth(settings.quote_depth as usize)
            .max_input_len(settings.max_input_len as usize)
            .build()?;
        Ok(Self::with_config(config))
    }

    pub fn set_member(&self, member_id: String, display_name: String) {
        self.update_tables(|t| t.members.insert(member_id, display_name));
    }

    /// Marks mentions of `member_id` as using the legacy shape.
    pub fn mark_legacy_member(&self, member_id: String) {
        self.update_tables(|t| t.members.insert_legacy(member_id));
    }

    pub fn add_unicode_emoji(&self, shortcode: String, glyph: String) {
        self.update_tables(|t| t.emoji.insert_unicode(shortcode, glyph));
    }

    pub fn add_custom_emoji(&self, shortcode: String) {
        self.update_tables(|t| t.emoji.insert_custom(shortcode));
    }

    /// Encoded display text and emoji/protocol-link tokens for a received
    /// message. Pass the message id to memoize by id and text.
    pub fn render_for_display(
        &self,
        message_id: Option<String>,
        text: String,
        mode: DisplayModeDto,
    ) -> RenderedDto {
        let mode = DisplayMode::from(mode);
        let tables = self.tables();
        let ctx = PipelineContext::new(&tables.members, &tables.emoji);
        let render = |text: &str| self.pipeline.render_for_display(text, mode, ctx);
        let rendered = match message_id {
            Some(id) => self.cache.get_or_render(&id, &text, mode, render),
            None => render(&text),
        };
        RenderedDto::from_engine(rendered)
    }

    /// Drops cached renderings of an edited or deleted message.
    pub fn invalidate_message(&self, message_id: String) {
        self.cache.invalidate(&message_id);
    }

    pub fn sanitize_for_send(&self, text: String) -> Result<String, FfiError> {
        let tables = self.tables();
        let ctx = PipelineContext::new(&tables.members, &tables.emoji);
        Ok(self.pipeline.sanitize_for_send(&text, ctx)?)
    }

    pub fn prepare_outgoing(&self, text: String) -> Result<OutgoingDto, FfiError> {
        let tables = self.tables();
        let ctx = PipelineContext::new(&tables.members, &tables.emoji);
        let outgoing = self.pipeline.prepare_outgoing(&text, ctx)?;
        log::debug!("prepared outgoing message of {} bytes", outgoing.text.len());
        Ok(OutgoingDto::from_engine(outgoing))
    }

    pub fn to_plain_text(&self, markdown: String) -> String {
        self.pipeline.to_plain_text(&markdown)
    }

    pub fn restore_line_breaks(&self, text: String) -> String {
        self.pipeline.restore_line_breaks(&text)
    }

    /// Clipboard text for a stored message.
    pub fn prepare_for_copy(&self, text: String) -> String {
        let tables = self.tables();
        let ctx = PipelineContext::new(&tables.members, &tables.emoji);
        self.pipeline.prepare_for_copy(&text, ctx)
    }

    /// Composer text for editing a stored message.
    pub fn prepare_for_edit(&self, text: String) -> String {
        let tables = self.tables();
        let ctx = PipelineContext::new(&tables.members, &tables.emoji);
        self.pipeline.prepare_for_edit(&text, ctx)
    }
}

impl Default for ChatmarkHandle {
    fn default() -> Self {
        Self::new()
    }
}

// ============ DTOs ============

#[derive(uniffi::Record)]
pub struct PipelineSettings {
    pub pear_scheme: String,
    pub custom_schemes: Vec<String>,
    pub quote_depth: u32,
    pub max_input_len: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum DisplayModeDto {
    Message,
    Preview,
}

impl From<DisplayModeDto> for DisplayMode {
    fn from(mode: DisplayModeDto) -> Self {
        match mode {
            DisplayModeDto::Message => DisplayMode::Message,
            DisplayModeDto::Preview => DisplayMode::Preview,
        }
    }
}

/// One display token in wire shape.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DisplayTokenDto {
    /// Numeric display type id (1 mention ... 9 strike-through)
    pub kind: u8,
    /// Start, in UTF-16 code units
    pub start: u32,
    /// Length, in UTF-16 code units
    pub length: u32,
    /// Link target or emoji shortcode
    pub content: Option<String>,
    pub member_id: Option<String>,
}

impl DisplayTokenDto {
    fn from_engine(token: DisplayToken) -> Self {
        let wire = WireToken::from(token);
        Self {
            kind: wire.kind,
            start: wire.start,
            length: wire.length,
            content: wire.content,
            member_id: wire.member_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct RenderedDto {
    pub text: String,
    pub tokens: Vec<DisplayTokenDto>,
}

impl RenderedDto {
    fn from_engine(rendered: RenderedMessage) -> Self {
        Self {
            text: rendered.text,
            tokens: rendered
                .tokens
                .into_iter()
                .map(DisplayTokenDto::from_engine)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct OutgoingDto {
    /// Sanitized markdown to store
    pub text: String,
    pub display: RenderedDto,
}

impl OutgoingDto {
    fn from_engine(outgoing: OutgoingMessage) -> Self {
        Self {
            text: outgoing.text,
            display: RenderedDto::from_engine(outgoing.display),
        }
    }
}
