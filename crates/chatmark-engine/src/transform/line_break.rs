//! Line-break encoding.
//!
//! Renderers treat a message as a single paragraph, so blank lines are stored
//! as [`BREAK_LINE_SYMBOL`] and restored on the way back out. The symbol is a
//! stored wire format.

/// Stands in for one blank line. U+27F6.
pub const BREAK_LINE_SYMBOL: &str = "⟶";

/// Tag older clients inserted for explicit breaks.
pub const BREAK_LINE_TAG: &str = "<br/>";

/// A line holding only this entity counts as blank.
pub const NEW_LINE_CODE: &str = "&nbsp;";

/// Encodes line breaks.
///
/// Each line after the first is emitted as `marker + line`, or as the blank
/// marker when it is empty or `&nbsp;`. `marker` defaults to `\n` and the
/// blank marker to [`BREAK_LINE_SYMBOL`]; passing a marker (single-line
/// preview) uses it for both. A blank line that directly follows a line
/// containing `>` ends a quote paragraph and is emitted as
/// `marker + " " + marker` so the quote does not swallow the next line.
pub fn encode(text: &str, marker: Option<&str>) -> String {
    let prefix = marker.unwrap_or("\n");
    let blank = marker.unwrap_or(BREAK_LINE_SYMBOL);
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<&str> = None;
    for line in text.split('\n') {
        match prev {
            None => out.push_str(line),
            Some(before) if line.is_empty() && before.contains('>') => {
                out.push_str(prefix);
                out.push(' ');
                out.push_str(prefix);
            }
            Some(_) if line.is_empty() || line == NEW_LINE_CODE => out.push_str(blank),
            Some(_) => {
                out.push_str(prefix);
                out.push_str(line);
            }
        }
        prev = Some(line);
    }
    out
}

/// Turns every [`BREAK_LINE_SYMBOL`] back into a newline.
pub fn decode(text: &str) -> String {
    text.replace(BREAK_LINE_SYMBOL, "\n")
}
