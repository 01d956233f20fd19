//! Hand-written lexer producing tokens with kinds and ranges.
//!
//! Whitespace and comments are ordinary tokens here; the parser decides what
//! to do with them.

mod cursor;

use cursor::{Cursor, EOF_CHAR};
use text_size::{TextRange, TextSize};
use verdant_yellow::TokenKind::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

/// A malformed token. The token is still produced, so lexing never stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: &'static str,
    pub range: TextRange,
}

pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    errors: Vec<LexError>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: Cursor::new(text), errors: Vec::new() }
    }

    /// Errors found so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    fn offset(&self) -> TextSize {
        TextSize::of(self.text) - self.cursor.remaining()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.pos_within_token(), end)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    fn error(&mut self, message: &'static str) {
        let range = self.range();
        self.errors.push(LexError { message, range });
    }

    /// Lexes the next token. Returns an empty `EOF` token once the input is
    /// exhausted.
    pub fn next_token(&mut self) -> Token {
        self.cursor.reset_pos_within_token();
        let kind = self.kind();
        Token { kind, range: self.range() }
    }

    fn kind(&mut self) -> TokenKind {
        let Some(first_char) = self.cursor.advance() else {
            return EOF;
        };

        match first_char {
            c if c.is_whitespace() => {
                self.cursor.advance_while(char::is_whitespace);
                WHITESPACE
            }
            '/' => match self.cursor.first() {
                '/' => {
                    self.cursor.advance_while(|c| c != '\n');
                    LINE_COMMENT
                }
                '*' => self.block_comment(),
                _ => SLASH,
            },
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ',' => COMMA,
            ';' => SEMICOLON,
            ':' => COLON,
            '.' => DOT,
            '+' => PLUS,
            '-' => MINUS,
            '*' => STAR,
            '%' => PERCENT,
            '=' => self.with_eq(EQ_EQ, EQ),
            '!' => self.with_eq(BANG_EQ, BANG),
            '<' => self.with_eq(LT_EQ, LT),
            '>' => self.with_eq(GT_EQ, GT),
            '&' => self.doubled('&', AMP_AMP),
            '|' => self.doubled('|', PIPE_PIPE),
            '0'..='9' => self.number(),
            '\'' | '"' => self.string(first_char),
            c if is_ident_start(c) => {
                self.cursor.advance_while(is_ident_continue);
                TokenKind::from_keyword(self.text()).unwrap_or(IDENT)
            }
            _ => {
                self.error("unknown character");
                UNKNOWN
            }
        }
    }

    fn with_eq(&mut self, with: TokenKind, without: TokenKind) -> TokenKind {
        if self.cursor.eat('=') { with } else { without }
    }

    fn doubled(&mut self, c: char, kind: TokenKind) -> TokenKind {
        if self.cursor.eat(c) {
            kind
        } else {
            self.error("unknown character");
            UNKNOWN
        }
    }

    fn block_comment(&mut self) -> TokenKind {
        debug_assert!(self.cursor.matches('*'));
        self.cursor.advance();

        loop {
            match self.cursor.advance() {
                Some('*') if self.cursor.eat('/') => return BLOCK_COMMENT,
                Some(_) => {}
                None => {
                    self.error("unterminated block comment");
                    return BLOCK_COMMENT;
                }
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');

        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
            return FLOAT_NUMBER;
        }

        INT_NUMBER
    }

    fn string(&mut self, quote: char) -> TokenKind {
        loop {
            match self.cursor.first() {
                '\n' => break,
                EOF_CHAR if self.cursor.is_eof() => break,
                '\\' => {
                    self.cursor.advance();
                    if !self.cursor.matches('\n') {
                        self.cursor.advance();
                    }
                }
                c => {
                    self.cursor.advance();
                    if c == quote {
                        return STRING;
                    }
                }
            }
        }

        self.error("unterminated string");
        STRING
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Lexes all of `text`. The returned tokens end with a single `EOF` token and
/// their ranges tile the text without gaps.
pub fn tokenize(text: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::with_capacity(text.len() / 4 + 1);
    loop {
        let token = tokenizer.next_token();
        tokens.push(token);
        if token.kind == EOF {
            break;
        }
    }
    (tokens, tokenizer.into_errors())
}

/// Returns the kind of `text` if it lexes as exactly one well-formed token.
pub fn single_token(text: &str) -> Option<TokenKind> {
    let mut tokenizer = Tokenizer::new(text);
    let token = tokenizer.next_token();
    let rest = tokenizer.next_token();
    (token.kind != EOF && rest.kind == EOF && tokenizer.errors().is_empty()).then_some(token.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.range]
    }

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).0.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_number_literals() {
        let inputs = [
            ("123", INT_NUMBER),
            ("0", INT_NUMBER),
            ("123_456", INT_NUMBER),
            ("1.5", FLOAT_NUMBER),
            ("0.0", FLOAT_NUMBER),
        ];

        for (input, expected_kind) in inputs {
            let mut tokenizer = Tokenizer::new(input);
            let kind = tokenizer.next_token().kind;
            assert_eq!(kind, expected_kind, "Input: '{input}'");
            assert!(tokenizer.cursor.is_eof(), "Tokenizer did not consume all input for '{input}'");
        }
    }

    #[test]
    fn test_dot_after_number_is_member_access() {
        assert_eq!(kinds("1.x"), vec![INT_NUMBER, DOT, IDENT, EOF]);
    }

    #[test]
    fn test_var_declaration() {
        let text = "var x = y;";
        let mut tokenizer = Tokenizer::new(text);

        let token = tokenizer.next_token();
        assert_eq!(token.kind, VAR_KW);
        assert_eq!(token_text(&token, text), "var");

        assert_eq!(tokenizer.next_token().kind, WHITESPACE);

        let token = tokenizer.next_token();
        assert_eq!(token.kind, IDENT);
        assert_eq!(token_text(&token, text), "x");

        assert_eq!(tokenizer.next_token().kind, WHITESPACE);
        assert_eq!(tokenizer.next_token().kind, EQ);
        assert_eq!(tokenizer.next_token().kind, WHITESPACE);

        let token = tokenizer.next_token();
        assert_eq!(token.kind, IDENT);
        assert_eq!(token_text(&token, text), "y");

        assert_eq!(tokenizer.next_token().kind, SEMICOLON);
        assert_eq!(tokenizer.next_token().kind, EOF);
        assert_eq!(tokenizer.next_token().kind, EOF);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a==b!=c<=d>=e&&f||!g"),
            vec![
                IDENT, EQ_EQ, IDENT, BANG_EQ, IDENT, LT_EQ, IDENT, GT_EQ, IDENT, AMP_AMP, IDENT,
                PIPE_PIPE, BANG, IDENT, EOF
            ]
        );
    }

    #[test]
    fn test_comments_are_tokens() {
        let text = "x // note\n/* block */y";
        let (tokens, errors) = tokenize(text);
        let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();

        assert_eq!(
            kinds,
            vec![IDENT, WHITESPACE, LINE_COMMENT, WHITESPACE, BLOCK_COMMENT, IDENT, EOF]
        );
        assert_eq!(token_text(&tokens[2], text), "// note");
        assert_eq!(token_text(&tokens[4], text), "/* block */");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_strings() {
        let text = r#"'true' "a\"b""#;
        let (tokens, errors) = tokenize(text);

        assert_eq!(tokens[0].kind, STRING);
        assert_eq!(token_text(&tokens[0], text), "'true'");
        assert_eq!(tokens[2].kind, STRING);
        assert_eq!(token_text(&tokens[2], text), r#""a\"b""#);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_errors_do_not_stop_lexing() {
        let text = "'open\n# x /* tail";
        let (tokens, errors) = tokenize(text);
        let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();

        assert_eq!(
            kinds,
            vec![STRING, WHITESPACE, UNKNOWN, WHITESPACE, IDENT, WHITESPACE, BLOCK_COMMENT, EOF]
        );
        let messages: Vec<_> = errors.iter().map(|error| error.message).collect();
        assert_eq!(
            messages,
            vec!["unterminated string", "unknown character", "unterminated block comment"]
        );
        assert_eq!(token_text(&tokens[0], text), "'open");
    }

    #[test]
    fn test_ranges_tile_the_text() {
        let text = "function f(a, b) { return a.b[0] + 'é'; } // done";
        let (tokens, _) = tokenize(text);

        let mut offset = TextSize::new(0);
        for token in &tokens {
            assert_eq!(token.range.start(), offset);
            offset = token.range.end();
        }
        assert_eq!(offset, TextSize::of(text));
    }

    #[test]
    fn test_single_token() {
        assert_eq!(single_token("foo"), Some(IDENT));
        assert_eq!(single_token("var"), Some(VAR_KW));
        assert_eq!(single_token("// c"), Some(LINE_COMMENT));
        assert_eq!(single_token("a b"), None);
        assert_eq!(single_token("'open"), None);
        assert_eq!(single_token(""), None);
    }
}
