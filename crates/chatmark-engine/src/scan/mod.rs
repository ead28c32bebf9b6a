//! # Scanning primitives
//!
//! ## Modules
//!
//! - **`cursor`**: `Cursor` for byte-wise scanning with char-aware stepping
//! - **`url`**: `UrlScanner`, the compiled URL/e-mail/protocol-link patterns

pub mod cursor;
pub mod url;

pub use cursor::Cursor;
pub use url::{UrlKind, UrlMatch, UrlScanner};

/// ASCII word character, as `\w` matches without Unicode mode.
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
