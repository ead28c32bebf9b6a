//! Delimiter knowledge, owned by the construct it belongs to.

/// `*` and `_` emphasis.
pub struct Emphasis;

impl Emphasis {
    pub const STAR: u8 = b'*';
    pub const UNDERSCORE: u8 = b'_';
    /// Emphasis nested deeper than this is kept as literal text.
    pub const MAX_NESTING: usize = 32;
}

/// `~` and `~~` strike-through.
pub struct Strikethrough;

impl Strikethrough {
    pub const TILDE: u8 = b'~';
    /// Longer tilde runs are literal.
    pub const MAX_RUN: usize = 2;
}

/// Backtick code spans. No other inline parsing happens inside them.
pub struct CodeSpan;

impl CodeSpan {
    pub const TICK: u8 = b'`';
}

/// Inline links `[label](destination "title")`.
pub struct Link;

impl Link {
    pub const OPEN: u8 = b'[';
    pub const CLOSE: u8 = b']';
    pub const DEST_OPEN: u8 = b'(';
    pub const DEST_CLOSE: u8 = b')';
    pub const IMAGE: u8 = b'!';
    /// Longest label, in bytes, a link may have.
    pub const MAX_LABEL_LEN: usize = 1000;
    /// Longest destination, in bytes, a link may have.
    pub const MAX_DEST_LEN: usize = 4096;
    /// Longest title, in bytes, a link may have.
    pub const MAX_TITLE_LEN: usize = 1000;
}

/// Explicit line break tags.
pub struct LineBreak;

impl LineBreak {
    pub const TAGS: &'static [&'static str] = &["<br>", "<br/>", "<br />"];
}

/// Fenced code block fences.
pub struct Fence;

impl Fence {
    pub const BACKTICK: u8 = b'`';
    pub const TILDE: u8 = b'~';
    pub const MIN_LEN: usize = 3;
    /// Spaces allowed before a fence.
    pub const MAX_INDENT: usize = 3;
}

/// Indented code blocks.
pub struct IndentedCode;

impl IndentedCode {
    pub const INDENT: &'static str = "    ";
}
