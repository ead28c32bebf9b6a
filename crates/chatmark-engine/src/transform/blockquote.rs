//! Blockquote depth clamping.

/// Blockquote block type with owned delimiter constant.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: u8 = b'>';

    /// Measures the run of quote markers at the start of `line`.
    ///
    /// Markers may be separated by spaces or tabs, and the run may be
    /// indented by spaces or tabs. Returns `None` when the line does not
    /// start with a marker.
    pub fn marker_run(line: &str) -> Option<MarkerRun> {
        let b = line.as_bytes();
        let is_blank = |c: u8| c == b' ' || c == b'\t';
        let mut i = 0;
        while i < b.len() && is_blank(b[i]) {
            i += 1;
        }
        let indent = i;
        let mut depth = 0;
        let mut end = i;
        loop {
            if i < b.len() && b[i] == Self::PREFIX {
                depth += 1;
                i += 1;
                end = i;
                while i < b.len() && is_blank(b[i]) {
                    i += 1;
                }
            } else {
                break;
            }
        }
        (depth > 0).then_some(MarkerRun { indent, depth, end })
    }
}

/// A run of quote markers at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRun {
    /// Byte length of the leading spaces and tabs.
    pub indent: usize,
    /// Number of `>` markers.
    pub depth: usize,
    /// Byte index just past the last `>`.
    pub end: usize,
}

/// Clamps blockquote nesting to `max_depth` on every line.
///
/// A deeper run is rewritten to its indent followed by `max_depth` markers
/// with no spacing between them; the rest of the line is untouched. Runs at
/// or under the limit are left exactly as written.
pub fn clamp(text: &str, max_depth: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        match BlockQuote::marker_run(line) {
            Some(run) if run.depth > max_depth => {
                out.push_str(&line[..run.indent]);
                for _ in 0..max_depth {
                    out.push(BlockQuote::PREFIX as char);
                }
                out.push_str(&line[run.end..]);
            }
            _ => out.push_str(line),
        }
    }
    out
}
