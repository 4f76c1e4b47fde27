//! Tokenizer: a single forward scan over the buffer's logical byte stream.
//!
//! Every byte lands in exactly one token, so concatenating the spans in
//! order reconstructs the buffer. Unrecognized bytes become `Unknown`
//! tokens rather than aborting; editor input is arbitrary user text.

use cedit_core::GapBuffer;
use tracing::{debug, debug_span};

use crate::token::{Keyword, Punct, Token, TokenKind};

/// Tracks the `#include <...>` special case: tokens between the angle
/// brackets (inclusive) are rewritten to the string kind so angle-bracket
/// includes highlight like string literals.
#[derive(PartialEq)]
enum IncludeState {
    Idle,
    AfterInclude,
    InAngle,
}

struct Lexer<'a> {
    buf: &'a GapBuffer,
    pos: usize,
}

/// Scans the whole buffer into an ordered token sequence.
pub fn tokenize(buf: &GapBuffer) -> Vec<Token> {
    let span = debug_span!("tokenize", len = buf.len());
    let _guard = span.enter();

    let mut lexer = Lexer { buf, pos: 0 };
    let mut tokens = Vec::new();
    let mut include = IncludeState::Idle;

    while lexer.pos < buf.len() {
        let mut token = lexer.next_token();

        include = match include {
            IncludeState::Idle => match token.kind {
                TokenKind::Pound if lexer.directive_is(&token, "include") => {
                    IncludeState::AfterInclude
                }
                _ => IncludeState::Idle,
            },
            IncludeState::AfterInclude => match token.kind {
                TokenKind::Whitespace => IncludeState::AfterInclude,
                TokenKind::Punct(Punct::Lt) => {
                    token.kind = TokenKind::Str;
                    IncludeState::InAngle
                }
                TokenKind::Pound if lexer.directive_is(&token, "include") => {
                    IncludeState::AfterInclude
                }
                _ => IncludeState::Idle,
            },
            IncludeState::InAngle => match token.kind {
                TokenKind::Newline => IncludeState::Idle,
                TokenKind::Punct(Punct::Gt) => {
                    token.kind = TokenKind::Str;
                    IncludeState::Idle
                }
                _ => {
                    token.kind = TokenKind::Str;
                    IncludeState::InAngle
                }
            },
        };

        tokens.push(token);
    }

    debug!(token_count = tokens.len(), "tokenized buffer");
    tokens
}

impl<'a> Lexer<'a> {
    /// Current byte, or a NUL sentinel at the end of the buffer.
    fn peek(&self) -> u8 {
        self.buf.get(self.pos).unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.buf.get(self.pos + offset).unwrap_or(0)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// True if a pound token's directive name matches `name`.
    fn directive_is(&self, token: &Token, name: &str) -> bool {
        token.len == name.len() + 1
            && self
                .buf
                .slice(token.start + 1, token.end())
                .map(|text| text == name)
                .unwrap_or(false)
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let kind = match self.peek() {
            b' ' | b'\t' | b'\r' => {
                self.advance();
                TokenKind::Whitespace
            }
            b'\n' => {
                self.advance();
                TokenKind::Newline
            }
            b'"' => self.lex_quoted(b'"', TokenKind::Str),
            b'\'' => self.lex_quoted(b'\'', TokenKind::CharLit),
            b'0'..=b'9' => self.lex_number(),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.lex_ident(start),
            b'/' if self.peek_at(1) == b'/' => self.lex_line_comment(),
            b'/' if self.peek_at(1) == b'*' => self.lex_block_comment(),
            b'#' => self.lex_pound(),
            _ => match self.lex_punct() {
                Some(punct) => TokenKind::Punct(punct),
                None => {
                    self.advance();
                    TokenKind::Unknown
                }
            },
        };
        Token::new(kind, start, self.pos - start)
    }

    /// String or char literal: runs to the closing quote, an (unconsumed)
    /// newline, or the end of the buffer. A backslash always consumes the
    /// following byte as an escape, whatever it is.
    fn lex_quoted(&mut self, quote: u8, kind: TokenKind) -> TokenKind {
        self.advance();
        loop {
            match self.peek() {
                0 | b'\n' => break,
                b'\\' => {
                    self.advance();
                    if self.peek() != 0 {
                        self.advance();
                    }
                }
                b => {
                    self.advance();
                    if b == quote {
                        break;
                    }
                }
            }
        }
        kind
    }

    /// A digit run, with an optional `.` fraction. No exponents or
    /// suffixes.
    fn lex_number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == b'.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            TokenKind::Float
        } else {
            TokenKind::Int
        }
    }

    fn lex_ident(&mut self, start: usize) -> TokenKind {
        while is_ident_continue(self.peek()) {
            self.advance();
        }
        let text = self.buf.slice(start, self.pos).unwrap_or_default();
        match Keyword::from_ident(&text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Name,
        }
    }

    /// `//` to the end of the line; the newline stays its own token.
    fn lex_line_comment(&mut self) -> TokenKind {
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                0 | b'\n' => break,
                _ => self.advance(),
            }
        }
        TokenKind::Comment
    }

    /// `/*` to the next `*/`, nesting-unaware; unterminated comments
    /// consume to the end of the buffer.
    fn lex_block_comment(&mut self) -> TokenKind {
        self.advance();
        self.advance();
        loop {
            if self.peek() == 0 {
                break;
            }
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    /// `#` plus its identifier-like directive name as a single token.
    fn lex_pound(&mut self) -> TokenKind {
        self.advance();
        while is_ident_continue(self.peek()) {
            self.advance();
        }
        TokenKind::Pound
    }

    /// Longest-first operator match over the 3-, 2-, and 1-byte tables.
    fn lex_punct(&mut self) -> Option<Punct> {
        let (a, b, c) = (self.peek(), self.peek_at(1), self.peek_at(2));
        let (punct, len) = match (a, b, c) {
            (b'<', b'<', b'=') => (Punct::ShlEq, 3),
            (b'>', b'>', b'=') => (Punct::ShrEq, 3),
            (b'.', b'.', b'.') => (Punct::Ellipsis, 3),
            _ => match (a, b) {
                (b'-', b'>') => (Punct::Arrow, 2),
                (b'+', b'+') => (Punct::PlusPlus, 2),
                (b'-', b'-') => (Punct::MinusMinus, 2),
                (b'+', b'=') => (Punct::PlusEq, 2),
                (b'-', b'=') => (Punct::MinusEq, 2),
                (b'*', b'=') => (Punct::StarEq, 2),
                (b'/', b'=') => (Punct::SlashEq, 2),
                (b'%', b'=') => (Punct::PercentEq, 2),
                (b'&', b'&') => (Punct::AmpAmp, 2),
                (b'&', b'=') => (Punct::AmpEq, 2),
                (b'|', b'|') => (Punct::PipePipe, 2),
                (b'|', b'=') => (Punct::PipeEq, 2),
                (b'^', b'=') => (Punct::CaretEq, 2),
                (b'=', b'=') => (Punct::EqEq, 2),
                (b'!', b'=') => (Punct::BangEq, 2),
                (b'<', b'<') => (Punct::Shl, 2),
                (b'>', b'>') => (Punct::Shr, 2),
                (b'<', b'=') => (Punct::LtEq, 2),
                (b'>', b'=') => (Punct::GtEq, 2),
                _ => match a {
                    b'(' => (Punct::LParen, 1),
                    b')' => (Punct::RParen, 1),
                    b'{' => (Punct::LBrace, 1),
                    b'}' => (Punct::RBrace, 1),
                    b'[' => (Punct::LBracket, 1),
                    b']' => (Punct::RBracket, 1),
                    b',' => (Punct::Comma, 1),
                    b';' => (Punct::Semi, 1),
                    b':' => (Punct::Colon, 1),
                    b'?' => (Punct::Question, 1),
                    b'.' => (Punct::Dot, 1),
                    b'+' => (Punct::Plus, 1),
                    b'-' => (Punct::Minus, 1),
                    b'*' => (Punct::Star, 1),
                    b'/' => (Punct::Slash, 1),
                    b'%' => (Punct::Percent, 1),
                    b'&' => (Punct::Amp, 1),
                    b'|' => (Punct::Pipe, 1),
                    b'^' => (Punct::Caret, 1),
                    b'~' => (Punct::Tilde, 1),
                    b'!' => (Punct::Bang, 1),
                    b'=' => (Punct::Assign, 1),
                    b'<' => (Punct::Lt, 1),
                    b'>' => (Punct::Gt, 1),
                    _ => return None,
                },
            },
        };
        self.pos += len;
        Some(punct)
    }
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
