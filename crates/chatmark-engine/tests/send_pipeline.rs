//! Compose path: sanitize, then derive the display text and tokens that are
//! transmitted with the message.

use chatmark_engine::{
    DisplayToken, NoMembers, Pipeline, PipelineContext, Span, StaticEmojiRegistry,
    StaticMemberDirectory, invariants,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const MEMBER: &str = "94dqka6etwq4xhsazq84dqfzap3ue9r7poq89aapcarg6a6wsaky";

fn emoji() -> StaticEmojiRegistry {
    StaticEmojiRegistry::new()
        .with_unicode("+1", "👍\u{fe0f}")
        .with_unicode("smile", "😄")
        .with_custom("bitcoin")
        .with_custom("keet_party")
}

/// `(type, start, length)` of each display token, in emission order.
fn shape(tokens: &[DisplayToken]) -> Vec<(u8, u32, u32)> {
    tokens
        .iter()
        .map(|t| (t.kind().id(), t.span().start, t.span().length))
        .collect()
}

fn outgoing(input: &str) -> (String, Vec<DisplayToken>) {
    let registry = emoji();
    let ctx = PipelineContext::new(&NoMembers, &registry);
    let message = Pipeline::default()
        .prepare_outgoing(input, ctx)
        .expect("input under the cap");
    invariants::check(&message.display.text, &message.display.tokens);
    (message.display.text, message.display.tokens)
}

#[rstest]
#[case::bold("**bold space**", "bold space", vec![(4, 0, 10)])]
#[case::bold_underscores("__bold space__", "bold space", vec![(4, 0, 10)])]
#[case::bold_after_text("text **bold space**", "text bold space", vec![(4, 5, 10)])]
#[case::italic("*italic space*", "italic space", vec![(5, 0, 12)])]
#[case::unclosed_italic("_italic space", "_italic space", vec![])]
#[case::strike("~~strike through~~", "strike through", vec![(9, 0, 14)])]
#[case::two_strikes(
    "~~strike one~~ and ~~strike two~~",
    "strike one and strike two",
    vec![(9, 0, 10), (9, 15, 10)]
)]
#[case::bold_in_italic(
    "_Italic with **bold** inside_",
    "Italic with bold inside",
    vec![(5, 0, 12), (5, 12, 4), (4, 12, 4), (5, 16, 7)]
)]
#[case::italic_in_bold(
    "**Bold with _italic_ inside**",
    "Bold with italic inside",
    vec![(4, 0, 10), (4, 10, 6), (5, 10, 6), (4, 16, 7)]
)]
#[case::bold_in_strike(
    "~~Strikethrough with **bold** inside~~",
    "Strikethrough with bold inside",
    vec![(9, 0, 19), (9, 19, 4), (4, 19, 4), (9, 23, 7)]
)]
#[case::italic_in_strike(
    "~~Strikethrough with _italic_ inside~~",
    "Strikethrough with italic inside",
    vec![(9, 0, 19), (9, 19, 6), (5, 19, 6), (9, 25, 7)]
)]
#[case::three_levels(
    "~~**Bold and _italic_ together**~~",
    "Bold and italic together",
    vec![(9, 0, 9), (4, 0, 9), (9, 9, 6), (4, 9, 6), (5, 9, 6), (9, 15, 9), (4, 15, 9)]
)]
#[case::italic_twice(
    "_Italic with **bold _nested italic_ inside**_",
    "Italic with bold nested italic inside",
    vec![(5, 0, 12), (5, 12, 5), (4, 12, 5), (5, 17, 13), (4, 17, 13), (5, 30, 7), (4, 30, 7)]
)]
#[case::strike_in_bold(
    "**Bold ~~strikethrough~~ text**",
    "Bold strikethrough text",
    vec![(4, 0, 5), (4, 5, 13), (9, 5, 13), (4, 18, 5)]
)]
fn emphasis(#[case] input: &str, #[case] text: &str, #[case] tokens: Vec<(u8, u32, u32)>) {
    let (out, display) = outgoing(input);
    assert_eq!(out, text);
    assert_eq!(shape(&display), tokens);
}

#[rstest]
#[case::span("`inline code`", "inline code", vec![(6, 0, 11)])]
#[case::unclosed("`inline code", "`inline code", vec![])]
#[case::padded("` inline code `", "inline code", vec![(6, 0, 11)])]
#[case::in_bold(
    "**bold `inline code` text**",
    "bold inline code text",
    vec![(4, 0, 5), (4, 5, 11), (6, 5, 11), (4, 16, 5)]
)]
#[case::inner_double_ticks("`inline1``inline2`", "inline1``inline2", vec![(6, 0, 16)])]
#[case::inner_single_ticks("``inline `nested` code``", "inline `nested` code", vec![(6, 0, 20)])]
#[case::mid_sentence("plain `inline code` text", "plain inline code text", vec![(6, 6, 11)])]
#[case::indented_block("    code\n    block", "code\nblock", vec![])]
#[case::fenced_block(
    "```\nCode\nBlock\n```\n\n\nAnother\n\nLine",
    "Code\nBlock\n\n\nAnother\n\nLine",
    vec![(8, 0, 10)]
)]
#[case::fence_glued_to_text("```Code\nBlock\n```", "Code\nBlock", vec![(8, 0, 10)])]
fn code(#[case] input: &str, #[case] text: &str, #[case] tokens: Vec<(u8, u32, u32)>) {
    let (out, display) = outgoing(input);
    assert_eq!(out, text);
    assert_eq!(shape(&display), tokens);
}

#[rstest]
#[case::plain("haha i'm sending")]
#[case::heading("### heading")]
#[case::definition("[Reference]: https://example.com")]
#[case::email("asd@asd.com")]
fn text_passes_through(#[case] input: &str) {
    let (out, display) = outgoing(input);
    assert_eq!(out, input);
    assert_eq!(display, vec![]);
}

#[test]
fn bare_www_becomes_http_link() {
    let (out, display) = outgoing("www.google.com");
    assert_eq!(out, "www.google.com");
    assert_eq!(
        display,
        vec![DisplayToken::HttpLink {
            span: Span::new(0, 14),
            content: "http://www.google.com".into()
        }]
    );
}

#[test]
fn link_label_styles_are_cleaned() {
    let (out, display) = outgoing("[**bold** link](https://example.com)");
    assert_eq!(out, "bold link");
    assert_eq!(
        display,
        vec![DisplayToken::HttpLink {
            span: Span::new(0, 9),
            content: "https://example.com".into()
        }]
    );
}

#[test]
fn link_label_that_looks_like_a_url() {
    let (out, display) = outgoing("[www.google.com](https://www.bbc.co.uk)");
    assert_eq!(out, "www.google.com");
    assert_eq!(
        display,
        vec![DisplayToken::HttpLink {
            span: Span::new(0, 14),
            content: "https://www.bbc.co.uk".into()
        }]
    );
}

#[test]
fn typed_emoji_round_trips_through_shortcode() {
    let (out, display) = outgoing("👍");
    assert_eq!(out, "👍\u{fe0f}");
    assert_eq!(
        display,
        vec![DisplayToken::Emoji {
            span: Span::new(0, 3),
            content: "+1".into()
        }]
    );
}

#[test]
fn mixed_custom_typed_and_unknown_emoji() {
    let (out, display) = outgoing(":keet_party:👍:keet_party::qweqweqwe: 123");
    assert_eq!(out, "keet_party👍\u{fe0f}keet_party:qweqweqwe: 123");
    assert_eq!(
        display,
        vec![
            DisplayToken::Emoji {
                span: Span::new(0, 10),
                content: "keet_party".into()
            },
            DisplayToken::Emoji {
                span: Span::new(10, 3),
                content: "+1".into()
            },
            DisplayToken::Emoji {
                span: Span::new(13, 10),
                content: "keet_party".into()
            },
        ]
    );
}

#[test]
fn custom_emoji_positions_across_lines() {
    let (out, display) = outgoing(
        "Qwe :bitcoin::bitcoin:\n\nAsd:bitcoin::bitcoin:\n\nZxc :bitcoin::bitcoin:",
    );
    assert_eq!(out, "Qwe bitcoinbitcoin\n\nAsdbitcoinbitcoin\n\nZxc bitcoinbitcoin");
    let starts: Vec<u32> = display.iter().map(|t| t.span().start).collect();
    assert_eq!(starts, vec![4, 11, 23, 30, 43, 50]);
    assert!(display.iter().all(|t| t.span().length == 7
        && t.content() == Some("bitcoin")));
}

#[test]
fn mention_keeps_label_and_emoji() {
    let input = format!("Hi [@Nick 😎 Android](mention://user/{MEMBER}) How");
    let (out, display) = outgoing(&input);
    assert_eq!(out, "Hi @Nick 😎 Android How");
    assert_eq!(
        display,
        vec![DisplayToken::Mention {
            span: Span::new(3, 16),
            member_id: MEMBER.into()
        }]
    );
}

#[test]
fn ordered_list_lines_survive() {
    let (out, display) = outgoing("Qwe *aaa*\n1. qwe\n2. qwe");
    assert_eq!(out, "Qwe aaa\n1. qwe\n2. qwe");
    assert_eq!(shape(&display), vec![(5, 4, 3)]);
}

#[test]
fn sanitized_text_is_what_gets_stored() {
    let registry = emoji();
    let members = StaticMemberDirectory::new().with_legacy(MEMBER);
    let ctx = PipelineContext::new(&members, &registry);
    let input = format!("  hi 😄\n>>> deep\n[@a.b](mention://user/{MEMBER})```x```");
    let sanitized = Pipeline::default().sanitize_for_send(&input, ctx).unwrap();
    assert_eq!(
        sanitized,
        format!("hi :smile:<br>> deep<br>[@a\\.b](mention://user/{MEMBER})\n```\nx\n```")
    );
}

#[test]
fn current_mention_label_is_not_escaped() {
    let registry = emoji();
    let ctx = PipelineContext::new(&NoMembers, &registry);
    let input = format!("[@a.b](mention://user/{MEMBER})");
    let sanitized = Pipeline::default().sanitize_for_send(&input, ctx).unwrap();
    assert_eq!(sanitized, input);
}

#[test]
fn newlines_inside_code_spans_are_kept() {
    let registry = emoji();
    let ctx = PipelineContext::new(&NoMembers, &registry);
    let sanitized = Pipeline::default()
        .sanitize_for_send("a\n`b\nc`\nd", ctx)
        .unwrap();
    assert_eq!(sanitized, "a<br>`b\nc`<br>d");
}
