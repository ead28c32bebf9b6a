//! URL scan primitive shared by the linkifier, the protocol-link annotator
//! and the markdown autolinker.
//!
//! Patterns are compiled once per [`UrlScanner`] and run on the `regex`
//! crate's finite automata, so every scan is linear in the input.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Characters a URL body may contain.
const URL_BODY: &str = r#"[^\s<>{}|\\^`\[\]"]+"#;

const EMAIL: &str = r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}";

/// Schemes every scanner recognizes as web links.
pub const WEB_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Scheme of the default peer-to-peer protocol links.
pub const DEFAULT_PEAR_SCHEME: &str = "pear";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// `scheme://...` with a web or registered custom scheme.
    Scheme,
    /// A bare `www.` host.
    Www,
    /// A bare e-mail address.
    Email,
    /// A link in the configured peer-to-peer protocol scheme.
    Protocol,
}

/// One URL found in a scanned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch<'a> {
    /// Byte range of `value` in the scanned string.
    pub range: Range<usize>,
    pub value: &'a str,
    pub kind: UrlKind,
}

impl UrlMatch<'_> {
    /// The link target: `www.` hosts get `http://`, e-mail gets `mailto:`.
    pub fn href(&self) -> String {
        match self.kind {
            UrlKind::Www => format!("http://{}", self.value),
            UrlKind::Email => format!("mailto:{}", self.value),
            UrlKind::Scheme | UrlKind::Protocol => self.value.to_string(),
        }
    }

    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.value
            .split_once("://")
            .is_some_and(|(s, _)| s.eq_ignore_ascii_case(scheme))
    }
}

/// Compiled URL patterns for one scheme configuration.
#[derive(Debug, Clone)]
pub struct UrlScanner {
    links: Regex,
    protocol: Regex,
}

impl UrlScanner {
    /// Builds a scanner recognizing web schemes plus `custom_schemes`, and
    /// protocol links in `pear_scheme`.
    ///
    /// Schemes are escaped before they are spliced into the pattern, so any
    /// string yields a valid pattern; callers validate scheme syntax.
    pub fn new(custom_schemes: &[String], pear_scheme: &str) -> Self {
        let mut schemes: Vec<String> = WEB_SCHEMES.iter().map(|s| regex::escape(s)).collect();
        schemes.extend(custom_schemes.iter().map(|s| regex::escape(s)));
        let links = format!(
            r"(?i)\b(?:(?P<scheme>(?:{})://{URL_BODY})|(?P<www>www\.{URL_BODY})|(?P<email>{EMAIL}))",
            schemes.join("|"),
        );
        let protocol = format!(r"\b{}://\S+", regex::escape(pear_scheme));
        Self {
            links: Regex::new(&links).expect("Invalid URL regex"),
            protocol: Regex::new(&protocol).expect("Invalid protocol link regex"),
        }
    }

    /// Scanner with only the web schemes and the default protocol scheme,
    /// used for markdown autolinks.
    pub fn standard() -> &'static UrlScanner {
        static STANDARD: OnceLock<UrlScanner> = OnceLock::new();
        STANDARD.get_or_init(|| UrlScanner::new(&[], DEFAULT_PEAR_SCHEME))
    }

    /// Finds links in scan order. Trailing punctuation is not part of a link,
    /// and a closing paren is kept only when it balances one in the URL.
    pub fn find_links<'a>(&self, text: &'a str) -> Vec<UrlMatch<'a>> {
        let mut out = Vec::new();
        for caps in self.links.captures_iter(text) {
            let (m, kind) = if let Some(m) = caps.name("scheme") {
                (m, UrlKind::Scheme)
            } else if let Some(m) = caps.name("www") {
                (m, UrlKind::Www)
            } else if let Some(m) = caps.name("email") {
                (m, UrlKind::Email)
            } else {
                continue;
            };
            let value = trim_trailing(m.as_str());
            if !has_body(value, kind) {
                continue;
            }
            out.push(UrlMatch {
                range: m.start()..m.start() + value.len(),
                value,
                kind,
            });
        }
        out
    }

    /// Finds protocol links (`<pear-scheme>://` up to the next whitespace).
    /// The scheme is case-sensitive. A link that is the label of a markdown
    /// link, as the linkifier writes it, ends at the label.
    pub fn find_protocol_links<'a>(&self, text: &'a str) -> Vec<UrlMatch<'a>> {
        self.protocol
            .find_iter(text)
            .map(|m| {
                let mut value = m.as_str();
                if text[..m.start()].ends_with('[')
                    && let Some(label_end) = value.find("](")
                {
                    value = &value[..label_end];
                }
                UrlMatch {
                    range: m.start()..m.start() + value.len(),
                    value,
                    kind: UrlKind::Protocol,
                }
            })
            .collect()
    }
}

fn has_body(value: &str, kind: UrlKind) -> bool {
    match kind {
        UrlKind::Scheme | UrlKind::Protocol => value
            .split_once("://")
            .is_some_and(|(_, rest)| !rest.is_empty()),
        UrlKind::Www => value.len() > "www.".len(),
        UrlKind::Email => value.contains('@'),
    }
}

/// Strips trailing punctuation a sentence puts after a URL.
pub fn trim_trailing(value: &str) -> &str {
    let mut end = value.len();
    while let Some(last) = value[..end].chars().next_back() {
        match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '*' | '_' | '~' => end -= 1,
            ')' if unbalanced_close(&value[..end]) => end -= 1,
            _ => break,
        }
    }
    &value[..end]
}

fn unbalanced_close(s: &str) -> bool {
    let open = s.bytes().filter(|b| *b == b'(').count();
    let close = s.bytes().filter(|b| *b == b')').count();
    close > open
}
