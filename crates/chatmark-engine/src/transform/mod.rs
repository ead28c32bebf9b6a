//! # Text transforms
//!
//! String-to-string rewrites the two pipelines chain together. Each returns
//! a new `String` and never panics on any input.
//!
//! ## Modules
//!
//! - **`code_block`**: fenced block isolation and compose-time fence padding
//! - **`line_break`**: blank-line encoding with the `⟶` marker
//! - **`blockquote`**: quote depth clamping
//! - **`list`**: bullet normalization
//! - **`mention`**: mention link escaping, parsing and stripping
//! - **`linkify`**: bare URL to markdown link rewriting
//! - **`compose`**: send-only sanitizers

pub mod blockquote;
pub mod code_block;
pub mod compose;
pub mod line_break;
pub mod linkify;
pub mod list;
pub mod mention;

pub use code_block::{Segment, SegmentKind, isolate};
pub use line_break::{BREAK_LINE_SYMBOL, decode as restore_line_breaks};
