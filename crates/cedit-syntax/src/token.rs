/// Token vocabulary shared by the tokenizer and the declaration parser.
use serde::{Deserialize, Serialize};

/// C keywords recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    Auto,
    Bool,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
}

impl Keyword {
    /// Looks up an identifier in the keyword table.
    pub fn from_ident(text: &str) -> Option<Keyword> {
        let kw = match text {
            "auto" => Keyword::Auto,
            "bool" => Keyword::Bool,
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "char" => Keyword::Char,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "default" => Keyword::Default,
            "do" => Keyword::Do,
            "double" => Keyword::Double,
            "else" => Keyword::Else,
            "enum" => Keyword::Enum,
            "extern" => Keyword::Extern,
            "float" => Keyword::Float,
            "for" => Keyword::For,
            "goto" => Keyword::Goto,
            "if" => Keyword::If,
            "inline" => Keyword::Inline,
            "int" => Keyword::Int,
            "long" => Keyword::Long,
            "register" => Keyword::Register,
            "return" => Keyword::Return,
            "short" => Keyword::Short,
            "signed" => Keyword::Signed,
            "sizeof" => Keyword::Sizeof,
            "static" => Keyword::Static,
            "struct" => Keyword::Struct,
            "switch" => Keyword::Switch,
            "typedef" => Keyword::Typedef,
            "union" => Keyword::Union,
            "unsigned" => Keyword::Unsigned,
            "void" => Keyword::Void,
            "volatile" => Keyword::Volatile,
            "while" => Keyword::While,
            _ => return None,
        };
        Some(kw)
    }

    /// True for the built-in type keywords.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Keyword::Void
                | Keyword::Bool
                | Keyword::Char
                | Keyword::Short
                | Keyword::Int
                | Keyword::Long
                | Keyword::Float
                | Keyword::Double
                | Keyword::Signed
                | Keyword::Unsigned
        )
    }

    /// True for storage-class specifiers.
    pub fn is_storage_class(&self) -> bool {
        matches!(
            self,
            Keyword::Auto
                | Keyword::Extern
                | Keyword::Inline
                | Keyword::Register
                | Keyword::Static
        )
    }

    /// True for type qualifiers.
    pub fn is_qualifier(&self) -> bool {
        matches!(self, Keyword::Const | Keyword::Volatile)
    }
}

/// Punctuation and operator tokens, one variant per 1-, 2-, or 3-byte
/// combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Punct {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Question,
    Dot,
    Ellipsis,
    Arrow,
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
    Tilde,
    Bang,
    BangEq,
    Assign,
    EqEq,
    Lt,
    LtEq,
    Shl,
    ShlEq,
    Gt,
    GtEq,
    Shr,
    ShrEq,
}

/// The kind of a token.
///
/// Every byte of the buffer belongs to exactly one token; whitespace and
/// newlines are tokens too, so consecutive spans tile the buffer with no
/// gaps. A byte no case recognizes becomes `Unknown` and scanning
/// continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// A single space, tab, or carriage return.
    Whitespace,
    Newline,
    /// String literal, or a span inside `#include <...>` angle brackets.
    Str,
    CharLit,
    Int,
    Float,
    /// Identifier that is not a keyword; eligible for role assignment.
    Name,
    Comment,
    /// `#` plus the directive name, e.g. `#include`.
    Pound,
    Keyword(Keyword),
    Punct(Punct),
    Unknown,
}

/// A span of the buffer classified by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Logical offset of the first byte.
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, len: usize) -> Self {
        Self { kind, start, len }
    }

    /// Logical offset just past the last byte.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Semantic role assigned to a token by the declaration parser.
///
/// Roles live in a parser-owned side table indexed by token position, not
/// in the token records themselves, so a renderer holding the token slice
/// never observes a half-updated token. `Argument` and `EnumMember` are
/// part of the vocabulary but the simplified declaration grammar does not
/// assign them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenRole {
    #[default]
    None,
    Type,
    Function,
    Argument,
    Macro,
    EnumMember,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::from_ident("int"), Some(Keyword::Int));
        assert_eq!(Keyword::from_ident("typedef"), Some(Keyword::Typedef));
        assert_eq!(Keyword::from_ident("main"), None);
        assert_eq!(Keyword::from_ident("Int"), None);
    }

    #[test]
    fn test_keyword_classes() {
        assert!(Keyword::Int.is_type());
        assert!(Keyword::Void.is_type());
        assert!(!Keyword::Typedef.is_type());
        assert!(Keyword::Static.is_storage_class());
        assert!(Keyword::Const.is_qualifier());
        assert!(!Keyword::Const.is_storage_class());
    }

    #[test]
    fn test_token_end() {
        let tok = Token::new(TokenKind::Name, 4, 3);
        assert_eq!(tok.end(), 7);
    }

    #[test]
    fn test_role_default_is_none() {
        assert_eq!(TokenRole::default(), TokenRole::None);
    }
}
