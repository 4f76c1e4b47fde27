//! Speculative declaration parser.
//!
//! A forward-only recursive descent over the token sequence that marks
//! identifiers with semantic roles for highlighting. The grammar covers
//! C-like declarations only; expressions, statements, and control flow are
//! absorbed by a one-token-at-a-time fallback, so the parser never raises
//! an error and always terminates.

use cedit_core::GapBuffer;
use tracing::{debug, debug_span};

use crate::symbols::{SymbolKind, SymbolTable};
use crate::token::{Keyword, Punct, Token, TokenKind, TokenRole};

/// Result of a parse pass: the role side table (one entry per token) and
/// the symbol table built while walking declarations.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub roles: Vec<TokenRole>,
    pub symbols: SymbolTable,
}

/// Parses the token sequence, assigning roles and collecting symbols.
pub fn parse(buf: &GapBuffer, tokens: &[Token]) -> Analysis {
    let span = debug_span!("parse", token_count = tokens.len());
    let _guard = span.enter();

    let mut parser = Parser {
        buf,
        tokens,
        roles: vec![TokenRole::None; tokens.len()],
        symbols: SymbolTable::new(),
        pos: 0,
    };

    while parser.pos < parser.tokens.len() {
        let save = parser.pos;
        if !parser.parse_decl() {
            // Rewind and absorb exactly one token; the token cursor always
            // advances, so the pass terminates on any input.
            parser.pos = save;
            parser.consume_fallback();
        }
    }

    debug!(symbol_count = parser.symbols.len(), "parsed declarations");
    Analysis {
        roles: parser.roles,
        symbols: parser.symbols,
    }
}

struct Parser<'a> {
    buf: &'a GapBuffer,
    tokens: &'a [Token],
    roles: Vec<TokenRole>,
    symbols: SymbolTable,
    pos: usize,
}

fn is_trivia(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Whitespace | TokenKind::Newline)
}

impl<'a> Parser<'a> {
    /// Index of the next non-trivia token at or after `from`. Grammar
    /// rules never see whitespace or newlines.
    fn next_code_index(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !is_trivia(self.tokens[i].kind))
    }

    /// Kind of the next non-trivia token.
    fn peek(&self) -> Option<TokenKind> {
        self.next_code_index(self.pos).map(|i| self.tokens[i].kind)
    }

    /// Advances past the next non-trivia token.
    fn bump(&mut self) {
        match self.next_code_index(self.pos) {
            Some(i) => self.pos = i + 1,
            None => self.pos = self.tokens.len(),
        }
    }

    /// Advances past the next non-trivia token only if it matches.
    fn accept(&mut self, kind: TokenKind) -> bool {
        match self.next_code_index(self.pos) {
            Some(i) if self.tokens[i].kind == kind => {
                self.pos = i + 1;
                true
            }
            _ => false,
        }
    }

    fn text(&self, index: usize) -> String {
        let token = &self.tokens[index];
        self.buf
            .slice(token.start, token.end())
            .unwrap_or_default()
    }

    /// True if a pound token's directive name matches `name`.
    fn directive_is(&self, index: usize, name: &str) -> bool {
        let token = &self.tokens[index];
        token.kind == TokenKind::Pound
            && token.len == name.len() + 1
            && self
                .buf
                .slice(token.start + 1, token.end())
                .map(|text| text == name)
                .unwrap_or(false)
    }

    /// The generic recovery path: resolves a plain name against the symbol
    /// table, handles `#define`, and advances exactly one raw token.
    fn consume_fallback(&mut self) {
        match self.tokens[self.pos].kind {
            TokenKind::Name => {
                let text = self.text(self.pos);
                match self.symbols.lookup(&text) {
                    Some(SymbolKind::Function) => self.roles[self.pos] = TokenRole::Function,
                    Some(SymbolKind::Type) => self.roles[self.pos] = TokenRole::Type,
                    Some(SymbolKind::Macro) => self.roles[self.pos] = TokenRole::Macro,
                    None => {}
                }
            }
            TokenKind::Pound if self.directive_is(self.pos, "define") => {
                if let Some(idx) = self.next_code_index(self.pos + 1) {
                    if self.tokens[idx].kind == TokenKind::Name {
                        let name = self.text(idx);
                        self.roles[idx] = TokenRole::Macro;
                        self.symbols.define(&name, SymbolKind::Macro);
                    }
                }
            }
            _ => {}
        }
        self.pos += 1;
    }

    /// Declaration: one or more specifiers, then a comma-separated list of
    /// init-declarators, then an optional `;`. Fails (for the caller to
    /// rewind) when no specifier is present or a struct/union/enum
    /// specifier is malformed.
    fn parse_decl(&mut self) -> bool {
        let mut typedef_ctx = false;
        let mut specifiers = 0usize;
        loop {
            let Some(idx) = self.next_code_index(self.pos) else {
                break;
            };
            match self.tokens[idx].kind {
                TokenKind::Keyword(Keyword::Typedef) => {
                    typedef_ctx = true;
                    self.pos = idx + 1;
                    specifiers += 1;
                }
                TokenKind::Keyword(kw)
                    if kw.is_storage_class() || kw.is_qualifier() || kw.is_type() =>
                {
                    self.pos = idx + 1;
                    specifiers += 1;
                }
                TokenKind::Keyword(Keyword::Struct) | TokenKind::Keyword(Keyword::Union) => {
                    if !self.parse_struct_specifier() {
                        return false;
                    }
                    specifiers += 1;
                }
                TokenKind::Keyword(Keyword::Enum) => {
                    if !self.parse_enum_specifier() {
                        return false;
                    }
                    specifiers += 1;
                }
                TokenKind::Name => {
                    let text = self.text(idx);
                    if self.symbols.lookup(&text) == Some(SymbolKind::Type) {
                        self.roles[idx] = TokenRole::Type;
                        self.pos = idx + 1;
                        specifiers += 1;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        if specifiers == 0 {
            return false;
        }

        loop {
            if !self.parse_declarator(typedef_ctx) {
                break;
            }
            if self.accept(TokenKind::Punct(Punct::Assign)) {
                // Initializer contents are skipped up to the terminating
                // `;`; commas inside it are not declarator separators.
                while let Some(idx) = self.next_code_index(self.pos) {
                    if self.tokens[idx].kind == TokenKind::Punct(Punct::Semi) {
                        break;
                    }
                    self.pos = idx + 1;
                }
            }
            if !self.accept(TokenKind::Punct(Punct::Comma)) {
                break;
            }
        }
        self.accept(TokenKind::Punct(Punct::Semi));
        true
    }

    /// Declarator: leading `*`s, a name or parenthesized declarator, then
    /// array or parameter-list suffixes. A parameter list outside typedef
    /// context registers the declared name as a function.
    fn parse_declarator(&mut self, typedef_ctx: bool) -> bool {
        while self.accept(TokenKind::Punct(Punct::Star)) {}
        let name_idx = match self.next_code_index(self.pos) {
            Some(idx) if self.tokens[idx].kind == TokenKind::Name => {
                self.pos = idx + 1;
                if typedef_ctx {
                    let name = self.text(idx);
                    self.roles[idx] = TokenRole::Type;
                    self.symbols.define(&name, SymbolKind::Type);
                }
                Some(idx)
            }
            Some(idx) if self.tokens[idx].kind == TokenKind::Punct(Punct::LParen) => {
                self.pos = idx + 1;
                if !self.parse_declarator(typedef_ctx) {
                    return false;
                }
                if !self.accept(TokenKind::Punct(Punct::RParen)) {
                    return false;
                }
                None
            }
            _ => return false,
        };
        loop {
            if self.accept(TokenKind::Punct(Punct::LBracket)) {
                self.match_brace(Punct::LBracket, Punct::RBracket);
            } else if self.accept(TokenKind::Punct(Punct::LParen)) {
                self.match_brace(Punct::LParen, Punct::RParen);
                if !typedef_ctx {
                    if let Some(idx) = name_idx {
                        let name = self.text(idx);
                        self.roles[idx] = TokenRole::Function;
                        self.symbols.define(&name, SymbolKind::Function);
                    }
                }
            } else {
                break;
            }
        }
        true
    }

    /// `struct`/`union` keyword, optional name (registered as a type),
    /// optional brace-skipped body. At least one of name and body must be
    /// present.
    fn parse_struct_specifier(&mut self) -> bool {
        self.bump();
        let mut ok = false;
        if let Some(idx) = self.next_code_index(self.pos) {
            if self.tokens[idx].kind == TokenKind::Name {
                let name = self.text(idx);
                self.roles[idx] = TokenRole::Type;
                self.symbols.define(&name, SymbolKind::Type);
                self.pos = idx + 1;
                ok = true;
            }
        }
        if self.accept(TokenKind::Punct(Punct::LBrace)) {
            self.match_brace(Punct::LBrace, Punct::RBrace);
            ok = true;
        }
        ok
    }

    /// `enum` keyword, optional name (registered as a type), optional
    /// body walked member by member. Members register nothing and get no
    /// role.
    fn parse_enum_specifier(&mut self) -> bool {
        self.bump();
        let mut ok = false;
        if let Some(idx) = self.next_code_index(self.pos) {
            if self.tokens[idx].kind == TokenKind::Name {
                let name = self.text(idx);
                self.roles[idx] = TokenRole::Type;
                self.symbols.define(&name, SymbolKind::Type);
                self.pos = idx + 1;
                ok = true;
            }
        }
        if self.accept(TokenKind::Punct(Punct::LBrace)) {
            loop {
                let Some(idx) = self.next_code_index(self.pos) else {
                    break;
                };
                if self.tokens[idx].kind != TokenKind::Name {
                    break;
                }
                self.pos = idx + 1;
                if self.accept(TokenKind::Punct(Punct::Assign)) {
                    while let Some(idx) = self.next_code_index(self.pos) {
                        match self.tokens[idx].kind {
                            TokenKind::Punct(Punct::Comma) | TokenKind::Punct(Punct::RBrace) => {
                                break
                            }
                            _ => self.pos = idx + 1,
                        }
                    }
                }
                if !self.accept(TokenKind::Punct(Punct::Comma)) {
                    break;
                }
            }
            if !self.accept(TokenKind::Punct(Punct::RBrace)) {
                self.match_brace(Punct::LBrace, Punct::RBrace);
            }
            ok = true;
        }
        ok
    }

    /// Depth-counting skip: consumes tokens until the brace matching the
    /// already-consumed opening one, or the end of the sequence.
    fn match_brace(&mut self, left: Punct, right: Punct) {
        let mut depth = 1usize;
        while self.pos < self.tokens.len() && depth > 0 {
            match self.tokens[self.pos].kind {
                TokenKind::Punct(p) if p == left => depth += 1,
                TokenKind::Punct(p) if p == right => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }
}
