//! Adversarial input shapes. Each must finish, stay within the input cap
//! policy and produce valid tokens.

use chatmark_engine::{
    DisplayMode, NoEmoji, NoMembers, Pipeline, PipelineConfig, PipelineContext, PipelineError,
    invariants,
};
use rstest::rstest;

fn ctx() -> PipelineContext<'static> {
    PipelineContext::new(&NoMembers, &NoEmoji)
}

fn run_both(input: &str) {
    let pipeline = Pipeline::default();
    let rendered = pipeline.render_for_display(input, DisplayMode::Message, ctx());
    invariants::check_annotations(&rendered.text, &rendered.tokens);
    let outgoing = pipeline
        .prepare_outgoing(input, ctx())
        .expect("input under the cap");
    invariants::check(&outgoing.display.text, &outgoing.display.tokens);
    pipeline.to_plain_text(input);
}

#[rstest]
#[case::nested_emphasis("*a _b ".repeat(2_000))]
#[case::nested_strong(format!("{}x{}", "**".repeat(3_000), "**".repeat(3_000)))]
#[case::unclosed_stars("*".repeat(20_000))]
#[case::alternating_delims("*_~".repeat(5_000))]
#[case::open_brackets("[".repeat(10_000))]
#[case::bracket_pairs("[]".repeat(10_000))]
#[case::unclosed_links("[a](".repeat(5_000))]
#[case::image_brackets("![".repeat(30_000))]
#[case::unclosed_angle_dests("[a](<".repeat(12_000))]
#[case::unclosed_titles("[a](b (".repeat(9_000))]
#[case::backtick_ladder((1..200).map(|n| "`".repeat(n) + " ").collect::<String>())]
#[case::lone_backticks("` ".repeat(10_000))]
#[case::fence_storm("```\n".repeat(5_000))]
#[case::deep_quotes(">".repeat(30_000))]
#[case::blank_lines("\n".repeat(30_000))]
#[case::many_shortcodes(":x:".repeat(10_000))]
#[case::colon_run(":".repeat(30_000))]
#[case::url_like("http://".repeat(5_000))]
#[case::mention_like("[@".repeat(10_000))]
fn finishes_with_valid_tokens(#[case] input: String) {
    run_both(&input);
}

#[test]
fn deep_nesting_keeps_inner_text() {
    let depth = 200;
    let input = format!("{}core{}", "**".repeat(depth), "**".repeat(depth));
    let outgoing = Pipeline::default()
        .prepare_outgoing(&input, ctx())
        .expect("input under the cap");
    assert!(outgoing.display.text.contains("core"));
}

#[test]
fn oversized_input_is_bounded() {
    let config = PipelineConfig::builder().max_input_len(1_024).build().unwrap();
    let pipeline = Pipeline::new(config);
    let input = "**x** ".repeat(1_000);

    let rendered = pipeline.render_for_display(&input, DisplayMode::Message, ctx());
    assert_eq!(rendered.text, input);
    assert!(rendered.tokens.is_empty());

    assert_eq!(
        pipeline.prepare_outgoing(&input, ctx()),
        Err(PipelineError::InputTooLarge {
            len: input.len(),
            max: 1_024
        })
    );
}
