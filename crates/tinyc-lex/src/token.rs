//! Token categories and the keyword map.
//!
//! Grounded on `original_source/src/lexer/token.h` and spec §3 (Token).

use std::sync::OnceLock;

use tinyc_util::{FxHashMap, Span, Symbol};

/// Every lexical category the language produces.
///
/// Identifiers, numeric/string literals, the keyword set, the operator
/// set (including all six compound-assignment forms), punctuators, and
/// the three special kinds (`Eof`, `Error`, `Comment`, `Whitespace`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Int,
    Real,
    Str,

    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwDo,
    KwBreak,
    KwContinue,
    KwReturn,
    KwInt,
    KwFloat,
    KwBool,
    KwTrue,
    KwFalse,
    KwSwitch,
    KwCase,
    KwDefault,
    KwGoto,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Not,

    Semi,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Colon,

    Eof,
    Error,
    Comment,
    Whitespace,
}

impl TokenKind {
    /// True for the four kinds §4.3 suppresses by default.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// The keyword kind this token text maps to, if any, via the
    /// single-source-of-truth keyword map (§4.3 "Keyword classification").
    pub fn keyword_for(text: &str) -> Option<TokenKind> {
        keyword_map().get(text).copied()
    }
}

/// `(kind, lexeme, span)`. `span.line`/`span.column` are 1-based (§3).
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Symbol,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Symbol, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

/// Built once; every lexer instance shares the same map (§5 "the only
/// process-wide state needed is the keyword map, which is an immutable
/// constant").
fn keyword_map() -> &'static FxHashMap<&'static str, TokenKind> {
    static MAP: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut m = FxHashMap::default();
        m.insert("if", TokenKind::KwIf);
        m.insert("else", TokenKind::KwElse);
        m.insert("while", TokenKind::KwWhile);
        m.insert("for", TokenKind::KwFor);
        m.insert("do", TokenKind::KwDo);
        m.insert("break", TokenKind::KwBreak);
        m.insert("continue", TokenKind::KwContinue);
        m.insert("return", TokenKind::KwReturn);
        m.insert("int", TokenKind::KwInt);
        m.insert("float", TokenKind::KwFloat);
        m.insert("bool", TokenKind::KwBool);
        m.insert("true", TokenKind::KwTrue);
        m.insert("false", TokenKind::KwFalse);
        m.insert("switch", TokenKind::KwSwitch);
        m.insert("case", TokenKind::KwCase);
        m.insert("default", TokenKind::KwDefault);
        m.insert("goto", TokenKind::KwGoto);
        m
    })
}

/// The literal spelling of every keyword, in the order `tinyc-util`'s
/// interner pre-registers them — used by `DfaBuilder` to overlay
/// keyword paths onto the identifier automaton (§4.1).
pub const KEYWORD_SPELLINGS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::KwIf),
    ("else", TokenKind::KwElse),
    ("while", TokenKind::KwWhile),
    ("for", TokenKind::KwFor),
    ("do", TokenKind::KwDo),
    ("break", TokenKind::KwBreak),
    ("continue", TokenKind::KwContinue),
    ("return", TokenKind::KwReturn),
    ("int", TokenKind::KwInt),
    ("float", TokenKind::KwFloat),
    ("bool", TokenKind::KwBool),
    ("true", TokenKind::KwTrue),
    ("false", TokenKind::KwFalse),
    ("switch", TokenKind::KwSwitch),
    ("case", TokenKind::KwCase),
    ("default", TokenKind::KwDefault),
    ("goto", TokenKind::KwGoto),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_is_exact() {
        assert_eq!(TokenKind::keyword_for("if"), Some(TokenKind::KwIf));
        assert_eq!(TokenKind::keyword_for("iffy"), None);
        assert_eq!(TokenKind::keyword_for("return"), Some(TokenKind::KwReturn));
    }

    #[test]
    fn trivia_kinds() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Identifier.is_trivia());
    }
}
