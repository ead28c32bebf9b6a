//! Mention links: escaping, parsing and stripping.
//!
//! A mention is stored as `[@label](mention://user/<id>[/<role>])`. Legacy
//! mentions carry a literal display name that must not be read as markdown,
//! so their labels are escaped; current mentions are resolved from the id
//! at render time and pass through untouched.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::members::{MemberDirectory, MentionRef};

/// Characters escaped in legacy mention labels.
pub const MARKDOWN_SPECIALS: &[char] = &[
    '\\', '`', '*', '_', '[', ']', '{', '}', '(', ')', '#', '+', '-', '.', '!',
];

/// Carries a label's own backslashes through the send-side escaping.
pub const ESCAPE_REPLACEMENT_CHAR: char = '\u{fffd}';

fn mention_link() -> &'static Regex {
    static MENTION_LINK: OnceLock<Regex> = OnceLock::new();
    MENTION_LINK.get_or_init(|| {
        Regex::new(r"\[@(.+?)\]\((mention://user/([A-Za-z0-9_]{52}))/?([A-Za-z0-9_]+)?\)")
            .expect("Invalid mention regex")
    })
}

fn mention_parts() -> &'static Regex {
    static MENTION_PARTS: OnceLock<Regex> = OnceLock::new();
    MENTION_PARTS.get_or_init(|| {
        Regex::new(r"^\[@(.+?)?\]\(mention://(.+?)/(.+?)(?:/(.*?))?\)")
            .expect("Invalid mention parts regex")
    })
}

fn mention_preview() -> &'static Regex {
    static MENTION_PREVIEW: OnceLock<Regex> = OnceLock::new();
    MENTION_PREVIEW.get_or_init(|| {
        Regex::new(r"\[(@.+?)\]\(mention:[/:A-Za-z0-9_]+\)").expect("Invalid mention preview regex")
    })
}

/// Escapes legacy mention labels for display.
pub fn escape_for_display(text: &str, members: &dyn MemberDirectory) -> String {
    rewrite_legacy_labels(text, members, escape_name)
}

/// Escapes legacy mention labels before a message is sent.
pub fn escape_for_send(text: &str, members: &dyn MemberDirectory) -> String {
    rewrite_legacy_labels(text, members, escape_label_for_send)
}

fn rewrite_legacy_labels(
    text: &str,
    members: &dyn MemberDirectory,
    escape: fn(&str) -> String,
) -> String {
    mention_link()
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let label = &caps[1];
            let mention = MentionRef {
                uri: &caps[2],
                member_id: &caps[3],
                role: caps.get(4).map(|m| m.as_str()),
                label,
            };
            if !members.is_legacy_mention(&mention) {
                return whole.to_string();
            }
            let rest = &whole["[@".len() + label.len()..];
            format!("[@{}{}", escape(label), rest)
        })
        .into_owned()
}

/// Prefixes every markdown special character with a backslash.
pub fn escape_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    for ch in label.chars() {
        if MARKDOWN_SPECIALS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Like [`escape_name`], but literal backslashes become
/// [`ESCAPE_REPLACEMENT_CHAR`] first so [`convert_backslashes`] restores them.
pub fn escape_label_for_send(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    for ch in label.chars() {
        if ch == '\\' {
            out.push(ESCAPE_REPLACEMENT_CHAR);
            continue;
        }
        if MARKDOWN_SPECIALS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Drops escaping backslashes and turns [`ESCAPE_REPLACEMENT_CHAR`] back
/// into literal backslashes.
pub fn convert_backslashes(label: &str) -> String {
    label
        .chars()
        .filter(|c| *c != '\\')
        .map(|c| if c == ESCAPE_REPLACEMENT_CHAR { '\\' } else { c })
        .collect()
}

/// A parsed mention link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionLink {
    /// Empty for `[@](mention://user/u)`.
    pub label: String,
    /// The entity type, `user` for member mentions.
    pub kind: String,
    pub id: String,
    pub role: Option<String>,
}

/// Parses the raw source of a markdown link as a mention.
pub fn parse_mention(link_raw: &str) -> Option<MentionLink> {
    let caps = mention_parts().captures(link_raw)?;
    Some(MentionLink {
        label: caps.get(1).map_or("", |m| m.as_str()).to_string(),
        kind: caps[2].to_string(),
        id: caps[3].to_string(),
        role: caps.get(4).map(|m| m.as_str().to_string()),
    })
}

/// Replaces mention links with their `@label` text, for previews.
pub fn strip_mentions(text: &str) -> String {
    mention_preview().replace_all(text, "$1").into_owned()
}
