/// A byte cursor over a string slice.
///
/// Delimiters the scanners look for are all ASCII, so byte positions at which
/// a delimiter matches are always char boundaries. Use [`Cursor::bump_char`]
/// to step over text that may contain multi-byte characters.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Creates a cursor positioned at byte `i`.
    pub fn at(s: &'a str, i: usize) -> Self {
        Self { s, i }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes. The caller guarantees a char boundary.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Advances over one whole character.
    pub fn bump_char(&mut self) -> Option<char> {
        let ch = self.s.get(self.i..)?.chars().next()?;
        self.i += ch.len_utf8();
        Some(ch)
    }

    /// Counts consecutive `b` bytes starting at the cursor, without advancing.
    pub fn run_len(&self, b: u8) -> usize {
        self.s.as_bytes()[self.i.min(self.s.len())..]
            .iter()
            .take_while(|c| **c == b)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello");
        assert_eq!(cur.pos(), 0);
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'h'));
        assert_eq!(cur.bump(), Some(b'h'));
        assert_eq!(cur.pos(), 1);
        cur.bump_n(4);
        assert!(cur.eof());
        assert_eq!(cur.bump(), None);
    }

    #[test]
    fn empty_string_input() {
        let cur = Cursor::new("");
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
    }

    #[test]
    fn bump_char_steps_over_multibyte() {
        let mut cur = Cursor::new("é`");
        assert_eq!(cur.bump_char(), Some('é'));
        assert_eq!(cur.pos(), 2);
        assert_eq!(cur.peek(), Some(b'`'));
    }

    #[test]
    fn run_len_counts_repeats() {
        let cur = Cursor::at("a```b", 1);
        assert_eq!(cur.run_len(b'`'), 3);
        assert_eq!(Cursor::at("a", 5).run_len(b'`'), 0);
    }
}
