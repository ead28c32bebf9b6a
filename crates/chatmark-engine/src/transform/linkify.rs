//! Bare URL → markdown link rewriting.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::MENTION_SCHEME;
use crate::scan::url::{UrlMatch, UrlScanner};
use crate::span::ranges_overlap;

fn markdown_link() -> &'static Regex {
    static MARKDOWN_LINK: OnceLock<Regex> = OnceLock::new();
    MARKDOWN_LINK.get_or_init(|| {
        Regex::new(r"\[[^\]]*\]\([^)]*\)").expect("Invalid markdown link regex")
    })
}

/// Rewrites bare URLs in a non-code segment as `[value]('href')`.
///
/// Mention URLs and URLs already inside a markdown link are left alone.
/// Backticks are removed from the value and the href.
pub fn linkify(segment: &str, scanner: &UrlScanner) -> String {
    let links = scanner.find_links(segment);
    if links.is_empty() {
        return segment.to_string();
    }
    let existing: Vec<Range<usize>> = markdown_link()
        .find_iter(segment)
        .map(|m| m.range())
        .collect();

    let mut out = String::with_capacity(segment.len() + links.len() * 8);
    let mut last = 0;
    for link in links
        .iter()
        .filter(|l| wants_rewrite(l, &existing))
    {
        out.push_str(&segment[last..link.range.start]);
        out.push('[');
        push_without_backticks(&mut out, link.value);
        out.push_str("]('");
        push_without_backticks(&mut out, &link.href());
        out.push_str("')");
        last = link.range.end;
    }
    out.push_str(&segment[last..]);
    out
}

/// Linkifies the text segments of an isolated message, leaving code alone.
pub fn linkify_segments<'a, I>(segments: I, scanner: &UrlScanner) -> Vec<String>
where
    I: IntoIterator<Item = (bool, &'a str)>,
{
    segments
        .into_iter()
        .map(|(is_code, text)| {
            if is_code {
                text.to_string()
            } else {
                linkify(text, scanner)
            }
        })
        .collect()
}

fn wants_rewrite(link: &UrlMatch<'_>, existing: &[Range<usize>]) -> bool {
    !link.has_scheme(MENTION_SCHEME)
        && !existing.iter().any(|r| ranges_overlap(r, &link.range))
}

fn push_without_backticks(out: &mut String, s: &str) {
    out.extend(s.chars().filter(|c| *c != '`'));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run(text: &str) -> String {
        linkify(text, PipelineConfig::default().scanner())
    }

    #[rstest]
    #[case("see https://example.com", "see [https://example.com]('https://example.com')")]
    #[case("www.google.com", "[www.google.com]('http://www.google.com')")]
    #[case("mail asd@asd.com", "mail [asd@asd.com]('mailto:asd@asd.com')")]
    #[case("open holepunch://abc.", "open [holepunch://abc]('holepunch://abc').")]
    #[case("no links here", "no links here")]
    fn rewrites_bare_urls(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(run(input), expected);
    }

    #[test]
    fn bare_mention_url_is_skipped() {
        let text = "mention://user/abc";
        assert_eq!(run(text), text);
    }

    #[test]
    fn protocol_links_are_linkified() {
        assert_eq!(
            run("join pear://room now"),
            "join [pear://room]('pear://room') now"
        );
    }

    #[test]
    fn existing_markdown_links_are_skipped() {
        let text = "[site](https://example.com) and https://other.org";
        assert_eq!(
            run(text),
            "[site](https://example.com) and [https://other.org]('https://other.org')"
        );
    }

    #[test]
    fn repeated_url_rewrites_each_occurrence() {
        assert_eq!(
            run("https://a.io https://a.io"),
            "[https://a.io]('https://a.io') [https://a.io]('https://a.io')"
        );
    }

    #[test]
    fn code_segments_pass_through() {
        let out = linkify_segments(
            [(false, "x https://a.io "), (true, "```https://a.io```")],
            PipelineConfig::default().scanner(),
        );
        assert_eq!(
            out,
            vec![
                "x [https://a.io]('https://a.io') ".to_string(),
                "```https://a.io```".to_string()
            ]
        );
    }
}
