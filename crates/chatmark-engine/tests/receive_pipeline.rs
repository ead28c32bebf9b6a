//! Receive path: stored message text to encoded display text plus emoji and
//! protocol-link tokens.

use chatmark_engine::{
    DisplayMode, DisplayToken, NoEmoji, NoMembers, Pipeline, PipelineConfig, PipelineContext,
    RenderedMessage, Span, StaticEmojiRegistry, StaticMemberDirectory, invariants,
};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;

const MEMBER: &str = "94dqka6etwq4xhsazq84dqfzap3ue9r7poq89aapcarg6a6wsaky";

fn emoji() -> StaticEmojiRegistry {
    StaticEmojiRegistry::new()
        .with_unicode("+1", "👍\u{fe0f}")
        .with_custom("keet_party")
}

fn render(raw: &str, mode: DisplayMode) -> RenderedMessage {
    let registry = emoji();
    let ctx = PipelineContext::new(&NoMembers, &registry);
    let rendered = Pipeline::default().render_for_display(raw, mode, ctx);
    invariants::check_annotations(&rendered.text, &rendered.tokens);
    rendered
}

/// `kind:content@start+length` per token.
fn dump(rendered: &RenderedMessage) -> String {
    rendered
        .tokens
        .iter()
        .map(|t| {
            format!(
                "{}:{}@{}+{}",
                t.kind().id(),
                t.content().unwrap_or("-"),
                t.span().start,
                t.span().length
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[rstest]
#[case::list_blank_lines("- 0\n\n\n- 1\n\n- 2", "- 0⟶⟶\n- 1⟶\n- 2")]
#[case::bullets_unified("* a\n+ b", "- a\n- b")]
#[case::tabs_collapse("a\t\tb", "a b")]
#[case::deep_quote(">>> deep", "> deep")]
#[case::spaced_quote("  > > > deep\ntext", "  > deep\ntext")]
#[case::quote_then_blank("> q\n\nnext", "> q\n \n\nnext")]
#[case::url_linkified("see https://x.io.", "see [https://x.io]('https://x.io').")]
#[case::custom_scheme("open punch://abc", "open [punch://abc]('punch://abc')")]
#[case::protocol_link("join pear://room", "join [pear://room]('pear://room')")]
#[case::code_untouched(
    "a\n\n```\nhttps://x.io\n\n```\nb",
    "a\n\n```\nhttps://x.io\n\n```\nb"
)]
fn message_mode(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(render(raw, DisplayMode::Message).text, expected);
}

#[rstest]
#[case::lines_joined("a\nb\n\nc", "a<br/>b<br/><br/>c")]
#[case::alt_bullets("Sam:\n- one\n- two", "Sam:<br/>● one<br/>● two")]
#[case::alt_bullet_after_blank("Sam: hi\n\n- one", "Sam: hi<br/>● one")]
#[case::code_flattened("x\n```\n1\n2\n```", "x ``` 1 2 ```")]
fn preview_mode(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(render(raw, DisplayMode::Preview).text, expected);
}

#[test]
fn blank_line_markers_decode_back() {
    let raw = "- 0\n\n\n- 1\n\n- 2";
    let pipeline = Pipeline::default();
    let rendered = render(raw, DisplayMode::Message);
    assert_eq!(pipeline.restore_line_breaks(&rendered.text), raw);
}

#[test]
fn emoji_tokens_point_into_output() {
    let rendered = render(
        ":keet_party::+1::keet_party::qweqweqwe: 123",
        DisplayMode::Message,
    );
    assert_eq!(
        rendered.text,
        "keet_party👍\u{fe0f}keet_party:qweqweqwe: 123"
    );
    assert_snapshot!(dump(&rendered), @"7:keet_party@0+10 7:+1@10+3 7:keet_party@13+10");
}

#[test]
fn typed_glyph_is_left_as_typed() {
    let rendered = render(
        ":keet_party:👍:keet_party::qweqweqwe: 123",
        DisplayMode::Message,
    );
    assert_eq!(rendered.text, "keet_party👍keet_party:qweqweqwe: 123");
    assert_snapshot!(dump(&rendered), @"7:keet_party@0+10 7:keet_party@12+10");
}

#[test]
fn code_blocks_are_not_annotated() {
    let rendered = render("```\n:+1:\n```\n:+1:", DisplayMode::Message);
    assert_eq!(rendered.text, "```\n:+1:\n```\n👍\u{fe0f}");
    assert_eq!(
        rendered.tokens,
        vec![DisplayToken::Emoji {
            span: Span::new(13, 3),
            content: "+1".into()
        }]
    );
}

#[test]
fn protocol_links_get_tokens_after_emoji_shift() {
    let rendered = render(":keet_party: pear://room/1 ok", DisplayMode::Message);
    assert_eq!(rendered.text, "keet_party [pear://room/1]('pear://room/1') ok");
    assert_snapshot!(dump(&rendered), @"7:keet_party@0+10 3:pear://room/1@12+13");
}

#[test]
fn configured_pear_scheme() {
    let config = PipelineConfig::builder().pear_scheme("keet").build().unwrap();
    let pipeline = Pipeline::new(config);
    let ctx = PipelineContext::new(&NoMembers, &NoEmoji);
    let rendered = pipeline.render_for_display("go keet://x pear://y", DisplayMode::Message, ctx);
    assert_eq!(rendered.tokens.len(), 1);
    assert_eq!(rendered.tokens[0].content(), Some("keet://x"));
}

#[test]
fn legacy_mention_label_is_escaped() {
    let members = StaticMemberDirectory::new().with_legacy(MEMBER);
    let ctx = PipelineContext::new(&members, &NoEmoji);
    let raw = format!("hi [@a*b](mention://user/{MEMBER})");
    let text = Pipeline::default().process_markdown(&raw, DisplayMode::Message, ctx);
    assert_eq!(text, format!("hi [@a\\*b](mention://user/{MEMBER})"));
}

#[test]
fn current_mention_is_untouched() {
    let ctx = PipelineContext::new(&NoMembers, &NoEmoji);
    let raw = format!("hi [@a*b](mention://user/{MEMBER})");
    let text = Pipeline::default().process_markdown(&raw, DisplayMode::Message, ctx);
    assert_eq!(text, raw);
}

#[test]
fn bare_mention_url_is_not_linkified() {
    let raw = format!("ping mention://user/{MEMBER} now");
    assert_eq!(render(&raw, DisplayMode::Message).text, raw);
}

#[test]
fn custom_quote_depth() {
    let config = PipelineConfig::builder().quote_depth(2).build().unwrap();
    let ctx = PipelineContext::new(&NoMembers, &NoEmoji);
    let text = Pipeline::new(config).process_markdown(">>>> x", DisplayMode::Message, ctx);
    assert_eq!(text, ">> x");
}

#[test]
fn plain_text_projection() {
    let pipeline = Pipeline::default();
    assert_eq!(
        pipeline.to_plain_text("see [docs](https://x.io)<br>now"),
        "see docs\nnow"
    );
}

#[test]
fn cache_renders_once_per_text() {
    use chatmark_engine::DisplayCache;
    use std::cell::Cell;

    let cache = DisplayCache::default();
    let calls = Cell::new(0);
    let render_counted = |text: &str| {
        calls.set(calls.get() + 1);
        render(text, DisplayMode::Message)
    };

    let first = cache.get_or_render("m1", ":+1: hi", DisplayMode::Message, render_counted);
    let again = cache.get_or_render("m1", ":+1: hi", DisplayMode::Message, render_counted);
    assert_eq!(first, again);
    assert_eq!(calls.get(), 1);

    cache.get_or_render("m1", ":+1: edited", DisplayMode::Message, render_counted);
    assert_eq!(calls.get(), 2);
}
