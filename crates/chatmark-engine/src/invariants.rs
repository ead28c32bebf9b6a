use crate::span::{slice, utf16_len};
use crate::token::DisplayToken;

/// Validates that display tokens point into `text`.
///
/// Asserts that:
/// - Every token covers at least one code unit
/// - Every token ends within the UTF-16 length of `text`
/// - Every token span lands on char boundaries of `text`
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(text: &str, tokens: &[DisplayToken]) {
    let n = utf16_len(text);
    for t in tokens {
        let span = t.span();
        assert!(span.length > 0, "empty token: {t:?}");
        assert!(
            span.end() <= n,
            "token out of bounds: {t:?} (text len: {n} code units)"
        );
        assert!(
            slice(text, span).is_some(),
            "token splits a character: {t:?} in {text:?}"
        );
    }
}

/// [`check`], plus scan order and pairwise disjointness, as promised by the
/// emoji and protocol-link annotators.
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check_annotations(text: &str, tokens: &[DisplayToken]) {
    check(text, tokens);
    for pair in tokens.windows(2) {
        let (a, b) = (pair[0].span(), pair[1].span());
        assert!(
            a.end() <= b.start,
            "tokens out of order or overlapping: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
}
