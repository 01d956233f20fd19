use drop_bomb::DropBomb;
use text_size::TextRange;
use verdant_tokenizer::Token;
use verdant_yellow::TokenKind::{self, *};
use verdant_yellow::{Event, SyntaxKind, TokenSet};

/// Recursive-descent parser state over a lexed token vector.
///
/// The grammar only ever sees significant tokens. Trivia is replayed into the
/// event stream right before the next significant token is consumed, and the
/// green builder later floats it to the right node.
pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    significant: Vec<u32>,
    cursor: usize,
    emitted: usize,
    events: Vec<Event>,
}

impl<'t> Parser<'t> {
    /// `tokens` must end with an `EOF` token.
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        debug_assert_eq!(tokens.last().map(|token| token.kind), Some(EOF));
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.kind.is_trivia())
            .map(|(index, _)| index as u32)
            .collect();
        Self { tokens, significant, cursor: 0, emitted: 0, events: Vec::with_capacity(tokens.len() * 2) }
    }

    fn current(&self) -> Token {
        match self.significant.get(self.cursor) {
            Some(&index) => self.tokens[index as usize],
            None => self.tokens[self.tokens.len() - 1],
        }
    }

    /// Kind of the `n`-th significant token ahead.
    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        self.significant
            .get(self.cursor + n)
            .map_or(EOF, |&index| self.tokens[index as usize].kind)
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.nth(0)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&self, set: TokenSet) -> bool {
        set.contains(self.peek_kind())
    }

    /// Range of the current significant token, used for error reporting.
    pub(crate) fn current_range(&self) -> TextRange {
        self.current().range
    }

    /// Consumes the current token along with any trivia in front of it.
    pub(crate) fn advance(&mut self) {
        if self.at(EOF) {
            return;
        }

        let index = self.significant[self.cursor] as usize;
        self.flush_trivia(index);
        self.push_token(index);
        self.emitted = index + 1;
        self.cursor += 1;
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {}", describe(kind)));
        false
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.events.push(Event::Error { message: message.into(), range });
    }

    /// Reports an error and wraps the current token in an `ERROR` node.
    /// Closing braces and the end of input are never consumed.
    pub(crate) fn err_recover(&mut self, message: &str, recovery: TokenSet) {
        self.error(message);
        let m = self.start();
        if self.at_set(recovery) || self.at(RIGHT_BRACE) || self.at(EOF) {
            m.abandon(self);
            return;
        }

        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Emits the trivia between the last consumed token and the end of input.
    pub(crate) fn flush_trailing_trivia(&mut self) {
        debug_assert!(self.at(EOF));
        let eof = self.tokens.len() - 1;
        self.flush_trivia(eof);
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn finish(self) -> Vec<Event> {
        self.events
    }

    fn flush_trivia(&mut self, until: usize) {
        for index in self.emitted..until {
            self.push_token(index);
        }
        self.emitted = self.emitted.max(until);
    }

    fn push_token(&mut self, index: usize) {
        let token = self.tokens[index];
        self.events.push(Event::Token { kind: token.kind, len: token.range.len() });
    }
}

/// Human-readable token name for "expected ..." messages.
pub(crate) fn describe(kind: TokenKind) -> &'static str {
    match kind {
        LEFT_PAREN => "`(`",
        RIGHT_PAREN => "`)`",
        LEFT_BRACKET => "`[`",
        RIGHT_BRACKET => "`]`",
        LEFT_BRACE => "`{`",
        RIGHT_BRACE => "`}`",
        COMMA => "`,`",
        SEMICOLON => "`;`",
        COLON => "`:`",
        DOT => "`.`",
        EQ => "`=`",
        IDENT => "an identifier",
        EOF => "end of file",
        _ => "a token",
    }
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position)
    }

    /// Drops the marker. Its slot stays a tombstone and is skipped by the
    /// builder.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();
        let idx = self.position as usize;
        if idx == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None }) => (),
                _ => unreachable!(),
            }
        }
    }
}

pub(crate) struct CompletedMarker {
    pos: u32,
}

impl CompletedMarker {
    fn new(pos: u32) -> Self {
        Self { pos }
    }

    /// Starts a node that will become the parent of this one.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
