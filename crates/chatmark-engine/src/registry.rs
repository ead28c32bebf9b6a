//! Emoji registry collaborator.

use std::collections::HashMap;

/// Variation selector 16, requests emoji presentation.
pub const EMOJI_PRESENTATION: char = '\u{fe0f}';

/// What a `:shortcode:` resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiEntry {
    /// A Unicode emoji; `glyph` is emitted into the text.
    Unicode { glyph: String },
    /// An app-specific emoji drawn from an asset; the shortcode name is
    /// emitted into the text and the renderer swaps in the image.
    Custom { id: String },
}

/// Maps shortcodes to emoji and back.
pub trait EmojiRegistry: Send + Sync {
    fn lookup(&self, shortcode: &str) -> Option<EmojiEntry>;

    /// Shortcode for a Unicode glyph (one grapheme cluster), used when
    /// composing to turn typed emoji back into `:shortcode:` form.
    fn shortcode_for(&self, glyph: &str) -> Option<String>;
}

/// A registry with no emoji. Every shortcode stays literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmoji;

impl EmojiRegistry for NoEmoji {
    fn lookup(&self, _shortcode: &str) -> Option<EmojiEntry> {
        None
    }

    fn shortcode_for(&self, _glyph: &str) -> Option<String> {
        None
    }
}

/// Table-backed registry.
///
/// Reverse lookups ignore U+FE0F so that `👍` and `👍️` resolve to the
/// same shortcode.
#[derive(Debug, Clone, Default)]
pub struct StaticEmojiRegistry {
    by_code: HashMap<String, EmojiEntry>,
    by_glyph: HashMap<String, String>,
}

impl StaticEmojiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unicode(mut self, shortcode: impl Into<String>, glyph: impl Into<String>) -> Self {
        self.insert_unicode(shortcode, glyph);
        self
    }

    pub fn with_custom(mut self, shortcode: impl Into<String>) -> Self {
        self.insert_custom(shortcode);
        self
    }

    /// Registers a Unicode emoji. The first shortcode registered for a glyph
    /// wins the reverse lookup.
    pub fn insert_unicode(&mut self, shortcode: impl Into<String>, glyph: impl Into<String>) {
        let shortcode = shortcode.into();
        let glyph = glyph.into();
        self.by_glyph
            .entry(glyph_key(&glyph))
            .or_insert_with(|| shortcode.clone());
        self.by_code.insert(shortcode, EmojiEntry::Unicode { glyph });
    }

    pub fn insert_custom(&mut self, shortcode: impl Into<String>) {
        let shortcode = shortcode.into();
        self.by_code.insert(
            shortcode.clone(),
            EmojiEntry::Custom { id: shortcode },
        );
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

fn glyph_key(glyph: &str) -> String {
    glyph.chars().filter(|c| *c != EMOJI_PRESENTATION).collect()
}

impl EmojiRegistry for StaticEmojiRegistry {
    fn lookup(&self, shortcode: &str) -> Option<EmojiEntry> {
        self.by_code.get(shortcode).cloned()
    }

    fn shortcode_for(&self, glyph: &str) -> Option<String> {
        let key = glyph_key(glyph);
        if key.is_empty() {
            return None;
        }
        self.by_glyph.get(&key).cloned()
    }
}
