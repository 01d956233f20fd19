use std::str::Chars;

use text_size::TextSize;

pub(crate) const EOF_CHAR: char = '\0';

/// Character cursor over the source text. Tracks how much of the current
/// token has been consumed.
pub(crate) struct Cursor<'a> {
    chars: Chars<'a>,
    token_start_remaining: TextSize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let chars = text.chars();
        Self { token_start_remaining: TextSize::of(chars.as_str()), chars }
    }

    /// Bytes left to lex.
    pub(crate) fn remaining(&self) -> TextSize {
        TextSize::of(self.chars.as_str())
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub(crate) fn pos_within_token(&self) -> TextSize {
        self.token_start_remaining - self.remaining()
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.token_start_remaining = self.remaining();
    }

    /// Next character without consuming it, `EOF_CHAR` at the end.
    pub(crate) fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        !self.is_eof() && self.first() == c
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Consumes `c` if it is next.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.matches(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool) {
        while !self.is_eof() && f(self.first()) {
            self.advance();
        }
    }
}
