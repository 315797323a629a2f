//! Character cursor used by the lexer.

use thiserror::Error;

/// Raised when the cursor is asked for a character past the end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("read past end of input at position {position}")]
pub struct OutOfBounds {
    /// Absolute character index that was requested.
    pub position: usize,
}

/// Forward-only lookahead over the characters of one input line.
///
/// Offsets passed to [`has`](Self::has) and [`peek`](Self::peek) are relative
/// to the current position. The position only ever moves forward.
#[derive(Debug, Clone)]
pub struct CharCursor {
    chars: Vec<char>,
    index: usize,
}

impl CharCursor {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
        }
    }

    /// Returns `true` when a character exists `offset` places ahead.
    pub fn has(&self, offset: usize) -> bool {
        self.index + offset < self.chars.len()
    }

    /// Returns the character `offset` places ahead.
    pub fn peek(&self, offset: usize) -> Result<char, OutOfBounds> {
        self.chars
            .get(self.index + offset)
            .copied()
            .ok_or(OutOfBounds {
                position: self.index + offset,
            })
    }

    /// Tests the character `offset` places ahead against `pred`, returning
    /// `false` past the end of input.
    pub fn check(&self, offset: usize, pred: impl Fn(char) -> bool) -> bool {
        self.peek(offset).is_ok_and(pred)
    }

    /// Moves the cursor forward by `n` characters, clamped to end of input.
    pub fn advance(&mut self, n: usize) {
        self.index = (self.index + n).min(self.chars.len());
    }

    /// Consumes the current character when it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.check(0, |c| c == expected) {
            self.advance(1);
            true
        } else {
            false
        }
    }

    /// Current absolute character index.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_at_end(&self) -> bool {
        !self.has(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_advance() {
        let mut cursor = CharCursor::new("ab");
        assert!(cursor.has(1));
        assert!(!cursor.has(2));
        assert_eq!(cursor.peek(1), Ok('b'));

        cursor.advance(1);
        assert_eq!(cursor.peek(0), Ok('b'));
        assert_eq!(cursor.peek(1), Err(OutOfBounds { position: 2 }));
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_advance_is_clamped() {
        let mut cursor = CharCursor::new("x");
        cursor.advance(10);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_eat_only_consumes_on_match() {
        let mut cursor = CharCursor::new("=1");
        assert!(!cursor.eat('1'));
        assert!(cursor.eat('='));
        assert_eq!(cursor.peek(0), Ok('1'));
    }

    #[test]
    fn test_positions_count_chars_not_bytes() {
        let mut cursor = CharCursor::new("\"é\"");
        cursor.advance(2);
        assert_eq!(cursor.peek(0), Ok('"'));
        assert_eq!(cursor.position(), 2);
    }
}
