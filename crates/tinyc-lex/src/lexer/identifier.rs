//! Identifier and keyword scanning (§4.3).
//!
//! Grounded on `original_source/src/lexer/identifier.cpp`: consume the
//! maximal identifier-continuation run, then classify the spelling
//! against the keyword map — the driver-level mirror of the DFA's
//! trie overlay in `crate::dfa`.

use crate::lexer::Lexer;
use crate::token::TokenKind;

pub fn scan(lexer: &mut Lexer<'_>) -> crate::token::Token {
    while lexer.cursor.current_char().is_ascii_alphanumeric() || lexer.cursor.current_char() == '_'
    {
        lexer.cursor.advance();
    }

    let text = lexer.cursor.slice_from(lexer.token_start_pos);
    let kind = TokenKind::keyword_for(text).unwrap_or(TokenKind::Identifier);
    lexer.emit(kind, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one(source: &str) -> crate::token::Token {
        let mut lexer = Lexer::new(source);
        super::scan(&mut lexer)
    }

    #[test]
    fn plain_identifier() {
        let token = scan_one("foo_bar123");
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme.as_str(), "foo_bar123");
    }

    #[test]
    fn keyword_is_classified() {
        assert_eq!(scan_one("return").kind, TokenKind::KwReturn);
        assert_eq!(scan_one("while").kind, TokenKind::KwWhile);
    }

    #[test]
    fn keyword_prefix_falls_through_to_identifier() {
        assert_eq!(scan_one("iffy").kind, TokenKind::Identifier);
        assert_eq!(scan_one("intake").kind, TokenKind::Identifier);
    }
}
