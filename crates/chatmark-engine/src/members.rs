//! Member directory collaborator.
//!
//! The engine never resolves members itself; the host app supplies a
//! [`MemberDirectory`] per call. [`StaticMemberDirectory`] is a table-backed
//! implementation for tests, the CLI and the FFI layer.

use std::collections::{HashMap, HashSet};

/// The parts of a mention link `[@label](mention://user/<id>[/<role>])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionRef<'a> {
    /// `mention://user/<id>` without the role suffix.
    pub uri: &'a str,
    pub member_id: &'a str,
    pub role: Option<&'a str>,
    pub label: &'a str,
}

/// Resolves member ids and classifies mention shapes.
pub trait MemberDirectory: Send + Sync {
    /// Live display name for a member, if known.
    fn display_name(&self, member_id: &str) -> Option<String>;

    /// True when the mention uses the deprecated URL shape whose embedded
    /// label must be treated as literal text.
    fn is_legacy_mention(&self, mention: &MentionRef<'_>) -> bool;
}

/// A directory that knows nobody. Every mention is current-shaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMembers;

impl MemberDirectory for NoMembers {
    fn display_name(&self, _member_id: &str) -> Option<String> {
        None
    }

    fn is_legacy_mention(&self, _mention: &MentionRef<'_>) -> bool {
        false
    }
}

/// Table-backed directory.
#[derive(Debug, Clone, Default)]
pub struct StaticMemberDirectory {
    names: HashMap<String, String>,
    legacy: HashSet<String>,
    all_legacy: bool,
}

impl StaticMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a display name for `member_id`.
    pub fn with_member(mut self, member_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(member_id.into(), name.into());
        self
    }

    /// Marks mentions of `member_id` as legacy-shaped.
    pub fn with_legacy(mut self, member_id: impl Into<String>) -> Self {
        self.legacy.insert(member_id.into());
        self
    }

    /// Treats every mention as legacy-shaped, as older clients did.
    pub fn all_legacy(mut self) -> Self {
        self.all_legacy = true;
        self
    }

    pub fn insert(&mut self, member_id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(member_id.into(), name.into());
    }

    pub fn insert_legacy(&mut self, member_id: impl Into<String>) {
        self.legacy.insert(member_id.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl MemberDirectory for StaticMemberDirectory {
    fn display_name(&self, member_id: &str) -> Option<String> {
        self.names.get(member_id).cloned()
    }

    fn is_legacy_mention(&self, mention: &MentionRef<'_>) -> bool {
        self.all_legacy || self.legacy.contains(mention.member_id)
    }
}
