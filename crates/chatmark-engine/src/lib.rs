//! # chatmark-engine
//!
//! Markdown and display-annotation pipeline for chat messages.
//!
//! Received text goes through the receive pipeline, which encodes it into a
//! single-paragraph-safe string and derives position-indexed tokens
//! (mentions, links, emoji, protocol links) for renderers. Composed text
//! goes through the send pipeline, which sanitizes it before it is stored.
//! Every offset handed out is in UTF-16 code units.
//!
//! ## Modules
//!
//! - **`pipeline`**: [`Pipeline`] with the receive and send entry points
//! - **`transform`**: the string rewrites both pipelines chain together
//! - **`annotate`**: emoji and protocol-link token annotators
//! - **`markdown`**: lexer, plain-text projection and styled-fragment pass
//! - **`scan`**: byte cursor and URL scanning shared by the passes
//! - **`span`**: UTF-16 span arithmetic
//! - **`token`**: [`DisplayToken`] and its wire format
//! - **`members`** / **`registry`**: collaborator traits and table-backed impls
//! - **`config`**: write-once [`PipelineConfig`]
//! - **`cache`**: [`DisplayCache`] memo keyed by message id and text
//! - **`invariants`**: token validity checks used by the test suites
//!
//! ## Example
//!
//! ```rust
//! use chatmark_engine::{DisplayMode, NoEmoji, NoMembers, Pipeline, PipelineContext};
//!
//! let pipeline = Pipeline::default();
//! let ctx = PipelineContext::new(&NoMembers, &NoEmoji);
//! let rendered = pipeline.render_for_display("hi\n\nthere", DisplayMode::Message, ctx);
//! assert_eq!(rendered.text, "hi⟶\nthere");
//!
//! let outgoing = pipeline.prepare_outgoing("**bold** move", ctx).unwrap();
//! assert_eq!(outgoing.display.text, "bold move");
//! ```

pub mod annotate;
pub mod cache;
pub mod config;
pub mod error;
pub mod invariants;
pub mod markdown;
pub mod members;
pub mod pipeline;
pub mod registry;
pub mod scan;
pub mod span;
pub mod token;
pub mod transform;

pub use cache::DisplayCache;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, TokenError};
pub use members::{MemberDirectory, MentionRef, NoMembers, StaticMemberDirectory};
pub use pipeline::{DisplayMode, OutgoingMessage, Pipeline, PipelineContext, RenderedMessage};
pub use registry::{EmojiEntry, EmojiRegistry, NoEmoji, StaticEmojiRegistry};
pub use span::Span;
pub use token::{DisplayToken, DisplayType, WireToken};
