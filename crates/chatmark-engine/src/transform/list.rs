//! Bullet list normalization.

/// List bullet markers.
pub struct ListBullet;

impl ListBullet {
    /// Bullets accepted from the composer.
    pub const MARKERS: &'static [u8] = b"*-+";
    /// The canonical bullet.
    pub const CANONICAL: char = '-';
    /// Bullet used when a list follows a username prefix on the same line.
    pub const ALT: char = '●';
}

/// Unifies bullet markers and collapses tab runs to a single space.
///
/// Default mode rewrites `[ \t]*[*+-][ \t]+content` lines to use `-`,
/// keeping the indent and the whitespace after the bullet. Alt mode only
/// rewrites bullets directly preceded by one or more newlines. The newline
/// run shrinks to one `\n`, and the bullet and the whitespace after it
/// become [`ListBullet::ALT`] plus one space.
pub fn normalize(text: &str, alt_bullet: bool) -> String {
    let out = if alt_bullet {
        alt_bullets(text)
    } else {
        canonical_bullets(text)
    };
    collapse_tabs(&out)
}

fn canonical_bullets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        match bullet_at(body) {
            Some(at) => {
                out.push_str(&line[..at]);
                out.push(ListBullet::CANONICAL);
                out.push_str(&line[at + 1..]);
            }
            None => out.push_str(line),
        }
    }
    out
}

fn alt_bullets(text: &str) -> String {
    let b = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while let Some(rel) = text[i..].find('\n') {
        let run = i + rel;
        out.push_str(&text[i..run]);
        let marker = run + b[run..].iter().take_while(|c| **c == b'\n').count();
        match alt_item_content(b, marker) {
            Some(content) => {
                let end = text[content..].find('\n').map_or(text.len(), |r| content + r);
                out.push('\n');
                out.push(ListBullet::ALT);
                out.push(' ');
                out.push_str(&text[content..end]);
                i = end;
            }
            None => {
                out.push_str(&text[run..marker]);
                i = marker;
            }
        }
    }
    out.push_str(&text[i..]);
    out
}

/// Start of the item content when a bullet sits at `marker`. The whitespace
/// after the bullet may span lines; content is at least one character of
/// the line it starts on.
fn alt_item_content(b: &[u8], marker: usize) -> Option<usize> {
    if !b.get(marker).is_some_and(|c| ListBullet::MARKERS.contains(c)) {
        return None;
    }
    let ws = marker + 1;
    let after = ws + b[ws..].iter().take_while(|c| c.is_ascii_whitespace()).count();
    if after == ws {
        return None;
    }
    if after < b.len() {
        return Some(after);
    }
    // Whitespace runs to the end: content is the last non-newline blank.
    (ws + 1..b.len()).rev().find(|&c| b[c] != b'\n')
}

/// Byte index of the bullet if `line` is a list item.
fn bullet_at(line: &str) -> Option<usize> {
    let b = line.as_bytes();
    let is_blank = |c: u8| c == b' ' || c == b'\t';
    let mut i = 0;
    while i < b.len() && is_blank(b[i]) {
        i += 1;
    }
    let at = i;
    if !b.get(at).is_some_and(|c| ListBullet::MARKERS.contains(c)) {
        return None;
    }
    i += 1;
    let ws_start = i;
    while i < b.len() && is_blank(b[i]) {
        i += 1;
    }
    (i > ws_start && i < b.len()).then_some(at)
}

fn collapse_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tabs = false;
    for ch in text.chars() {
        if ch == '\t' {
            if !in_tabs {
                out.push(' ');
            }
            in_tabs = true;
        } else {
            out.push(ch);
            in_tabs = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("* start\n- minus\n+ plus", "- start\n- minus\n- plus")]
    #[case("  *  indented", "  -  indented")]
    #[case("*bold*", "*bold*")]
    #[case("+1 great", "+1 great")]
    #[case("-", "-")]
    #[case("- ", "- ")]
    #[case("a\t\tb", "a b")]
    #[case("*\tTabbed", "- Tabbed")]
    fn default_mode(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input, false), expected);
    }

    #[rstest]
    #[case("alice: - List 1\n- List 2\n* List 3", "alice: - List 1\n● List 2\n● List 3")]
    #[case("- first line stays", "- first line stays")]
    #[case("x\n\n+ after blank", "x\n● after blank")]
    #[case("x\n-   spaced", "x\n● spaced")]
    #[case("x\n-\n\nnext line", "x\n● next line")]
    #[case("x\n- ", "x\n- ")]
    #[case("x\n-  ", "x\n●  ")]
    #[case("x\n  - indented", "x\n  - indented")]
    #[case("x\n-y", "x\n-y")]
    fn alt_mode(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input, true), expected);
    }
}
