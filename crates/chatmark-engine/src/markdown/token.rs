/// Kinds of [`MarkdownToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Block level
    Paragraph,
    /// One or more blank lines between blocks.
    Space,
    /// Fenced or indented code block.
    Code,
    // Inline
    Text,
    /// Backslash escape; `text` is the escaped character.
    Escape,
    Strong,
    Em,
    Del,
    Codespan,
    Link,
    /// An explicit `<br>` tag.
    Br,
}

impl TokenKind {
    /// Kinds whose content lives in `children`.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::Strong | Self::Em | Self::Del | Self::Link
        )
    }
}

/// A node of the lexed markdown tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownToken {
    pub kind: TokenKind,
    /// Exact source text of the token, delimiters included.
    pub raw: String,
    /// Content without delimiters. Code spans are normalized.
    pub text: String,
    /// Link target for `Link` tokens.
    pub href: Option<String>,
    pub children: Vec<MarkdownToken>,
}

impl MarkdownToken {
    pub fn leaf(kind: TokenKind, raw: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            text: text.into(),
            href: None,
            children: Vec::new(),
        }
    }

    pub fn text(s: &str) -> Self {
        Self::leaf(TokenKind::Text, s, s)
    }

    pub fn container(
        kind: TokenKind,
        raw: impl Into<String>,
        text: impl Into<String>,
        children: Vec<MarkdownToken>,
    ) -> Self {
        Self {
            kind,
            raw: raw.into(),
            text: text.into(),
            href: None,
            children,
        }
    }

    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Depth of the deepest descendant; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// Appends `token`, merging it into a preceding text token.
pub(crate) fn push_merged(out: &mut Vec<MarkdownToken>, token: MarkdownToken) {
    if token.kind == TokenKind::Text {
        if token.raw.is_empty() {
            return;
        }
        if let Some(last) = out.last_mut()
            && last.kind == TokenKind::Text
        {
            last.raw.push_str(&token.raw);
            last.text.push_str(&token.text);
            return;
        }
    }
    out.push(token);
}
