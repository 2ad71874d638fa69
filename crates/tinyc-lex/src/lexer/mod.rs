//! Lexer driver (§4.3): streams source text into tokens.
//!
//! The composed `Dfa` (`crate::dfa`) shows the whole token set is
//! recognizable by a single automaton and backs the minimizer's
//! equivalence check; this driver is the pragmatic hand-dispatched
//! scanner §4.3 actually describes in production, split into one
//! sub-scanner module per lexical category the way
//! `original_source/src/lexer/{identifier,number,string,operator,comment}.cpp`
//! is split.

mod comment;
mod identifier;
mod number;
mod operator;
mod string;

use tinyc_util::{Category, Diagnostic, FxHashSet, Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// A lexical failure, reified rather than thrown (§7 "every stage is
/// total").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexError {
    UnterminatedString,
    UnexpectedCharacter(char),
}

impl LexError {
    pub fn message(self) -> String {
        match self {
            LexError::UnterminatedString => "unterminated string literal".to_string(),
            LexError::UnexpectedCharacter(c) => format!("Unexpected character: '{c}'"),
        }
    }
}

/// `{message, line, column}`, the record form errors accumulate into
/// on `LexicalResult` (§6).
#[derive(Clone, Debug, PartialEq)]
pub struct LexicalError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl LexicalError {
    /// Renders this error as a unified [`Diagnostic`] under
    /// `Category::Lexical` (§6). Byte offsets are unavailable this far
    /// from the cursor, so the span carries only the line/column the
    /// textual diagnostic format actually prints.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Category::Lexical, self.message.clone(), Span::new(0, 0, self.line, self.column))
    }
}

/// `{tokens, errors, success}` (§6).
#[derive(Clone, Debug, PartialEq)]
pub struct LexicalResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexicalError>,
    pub success: bool,
}

/// Streams a source buffer into tokens. Holds a byte cursor, the
/// current token's start position, and the set of kinds `analyze`
/// drops from its output (default: whitespace and comments).
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    suppressed: FxHashSet<TokenKind>,
    errors: Vec<LexicalError>,
    token_start_pos: usize,
    token_start_line: u32,
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut suppressed = FxHashSet::default();
        suppressed.insert(TokenKind::Whitespace);
        suppressed.insert(TokenKind::Comment);
        Self {
            cursor: Cursor::new(source),
            suppressed,
            errors: Vec::new(),
            token_start_pos: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Overrides the default suppression set (§4.3 "a set of token
    /// kinds to suppress").
    pub fn with_suppressed(source: &'a str, suppressed: FxHashSet<TokenKind>) -> Self {
        let mut lexer = Self::new(source);
        lexer.suppressed = suppressed;
        lexer
    }

    fn mark_token_start(&mut self) {
        self.token_start_pos = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();
    }

    fn span(&self) -> Span {
        Span::new(
            self.token_start_pos,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    fn emit(&self, kind: TokenKind, text: &str) -> Token {
        Token::new(kind, Symbol::intern(text), self.span())
    }

    fn report(&mut self, error: LexError) {
        self.errors.push(LexicalError {
            message: error.message(),
            line: self.token_start_line,
            column: self.token_start_column,
        });
    }

    /// Produces the next token, skipping leading whitespace first.
    /// Returns `TokenKind::Eof` at end of input and never advances
    /// past it on repeated calls.
    pub fn next_token(&mut self) -> Token {
        self.cursor.skip_whitespace();
        self.mark_token_start();

        if self.cursor.is_at_end() {
            return self.emit(TokenKind::Eof, "");
        }

        let c = self.cursor.current_char();
        if c.is_ascii_alphabetic() || c == '_' {
            return identifier::scan(self);
        }
        if c.is_ascii_digit() {
            return number::scan(self);
        }
        if c == '"' {
            return string::scan(self);
        }
        if c == '/' && self.cursor.peek_char(1) == '/' {
            return comment::scan(self);
        }
        if self.cursor.is_ascii() {
            if let Some(token) = operator::scan(self, c) {
                return token;
            }
        }

        // §4.1 edge policy: a byte outside ASCII is either a UTF-8
        // continuation of a character we have no recognizer for, or
        // the lead byte of one — either way it is unknown input here,
        // reported once per character and skipped so lexing always
        // makes progress.
        self.report(LexError::UnexpectedCharacter(c));
        self.cursor.advance();
        let text = self.cursor.slice_from(self.token_start_pos);
        self.emit(TokenKind::Error, text)
    }

    /// Runs to completion: `(tokens, errors, success)`. Total — never
    /// panics; always terminates with exactly one `Eof` (§8 "lexer
    /// totality").
    pub fn analyze(mut self) -> LexicalResult {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            if !self.suppressed.contains(&token.kind) {
                tokens.push(token);
            }
            if is_eof {
                break;
            }
        }
        let success = self.errors.is_empty();
        LexicalResult {
            tokens,
            errors: self.errors,
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .analyze()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn totality_always_ends_in_eof() {
        let result = Lexer::new("int x = 5;").analyze();
        assert_eq!(result.tokens.last().unwrap().kind, TokenKind::Eof);
        assert!(result.success);
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn whitespace_and_comments_are_suppressed_by_default() {
        let kinds = kinds("int x = 1; // trailing\n  ");
        assert!(!kinds.contains(&TokenKind::Whitespace));
        assert!(!kinds.contains(&TokenKind::Comment));
    }

    #[test]
    fn comments_survive_when_unsuppressed() {
        let result = Lexer::with_suppressed("// hi\nx", FxHashSet::default()).analyze();
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Comment));
    }

    #[test]
    fn position_is_one_based_and_monotonic() {
        let result = Lexer::new("int\nx").analyze();
        let mut prev = (0u32, 0u32);
        for token in &result.tokens {
            let cur = (token.span.line, token.span.column);
            assert!(prev <= cur);
            prev = cur;
        }
    }

    #[test]
    fn unknown_byte_reports_and_recovers() {
        let result = Lexer::new("x @ y").analyze();
        assert!(!result.success);
        assert_eq!(result.errors[0].message, "Unexpected character: '@'");
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn full_program_tokenizes_with_no_errors() {
        let source = "int main() {\n    int x = 1;\n    while (x < 10) { x = x + 1; }\n    return x;\n}\n";
        let result = Lexer::new(source).analyze();
        assert!(result.success);
        assert_eq!(result.tokens.last().unwrap().kind, TokenKind::Eof);
    }
}
