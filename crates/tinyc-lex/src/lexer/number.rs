//! Integer and real literal scanning (§4.3).
//!
//! Grounded on `original_source/src/lexer/number.cpp`. The numeral
//! grammar is deliberately small: digits, optionally followed by `.`
//! and more digits — no exponents, no radix prefixes (§9 non-goals).

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub fn scan(lexer: &mut Lexer<'_>) -> Token {
    while lexer.cursor.current_char().is_ascii_digit() {
        lexer.cursor.advance();
    }

    let mut kind = TokenKind::Int;
    if lexer.cursor.current_char() == '.' && lexer.cursor.peek_char(1).is_ascii_digit() {
        kind = TokenKind::Real;
        lexer.cursor.advance();
        while lexer.cursor.current_char().is_ascii_digit() {
            lexer.cursor.advance();
        }
    }

    let text = lexer.cursor.slice_from(lexer.token_start_pos);
    lexer.emit(kind, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one(source: &str) -> Token {
        let mut lexer = Lexer::new(source);
        super::scan(&mut lexer)
    }

    #[test]
    fn plain_integer() {
        let token = scan_one("42");
        assert_eq!(token.kind, TokenKind::Int);
        assert_eq!(token.lexeme.as_str(), "42");
    }

    #[test]
    fn real_literal() {
        let token = scan_one("3.14");
        assert_eq!(token.kind, TokenKind::Real);
        assert_eq!(token.lexeme.as_str(), "3.14");
    }

    #[test]
    fn dot_without_trailing_digit_is_not_part_of_the_number() {
        let mut lexer = Lexer::new("1.x");
        let token = super::scan(&mut lexer);
        assert_eq!(token.kind, TokenKind::Int);
        assert_eq!(token.lexeme.as_str(), "1");
    }
}
