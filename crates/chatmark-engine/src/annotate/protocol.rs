use crate::scan::url::UrlScanner;
use crate::span::span_of;
use crate::token::DisplayToken;

/// Emits a `PearLink` token for every protocol link in `text`. The text is
/// not changed; token starts are `start` plus the link's UTF-16 index.
pub fn annotate(text: &str, start: u32, scanner: &UrlScanner) -> Vec<DisplayToken> {
    scanner
        .find_protocol_links(text)
        .into_iter()
        .map(|m| DisplayToken::PearLink {
            span: span_of(text, m.range.clone(), start),
            content: m.value.to_string(),
        })
        .collect()
}
