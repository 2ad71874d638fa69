//! String literal scanning (§4.3).
//!
//! Grounded on `original_source/src/lexer/string.cpp`. Double-quoted,
//! no newline inside; an unterminated literal (end of line or end of
//! input before the closing quote) is reported as
//! `LexError::UnterminatedString` at the opening quote.

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use crate::lexer::LexError;

pub fn scan(lexer: &mut Lexer<'_>) -> Token {
    lexer.cursor.advance(); // opening quote

    loop {
        if lexer.cursor.is_at_end() || lexer.cursor.current_char() == '\n' {
            lexer.report(LexError::UnterminatedString);
            let text = lexer.cursor.slice_from(lexer.token_start_pos);
            return lexer.emit(TokenKind::Error, text);
        }
        if lexer.cursor.current_char() == '"' {
            lexer.cursor.advance();
            break;
        }
        lexer.cursor.advance();
    }

    let text = lexer.cursor.slice_from(lexer.token_start_pos);
    lexer.emit(TokenKind::Str, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one(source: &str) -> (Token, bool) {
        let mut lexer = Lexer::new(source);
        let token = super::scan(&mut lexer);
        (token, lexer.errors.is_empty())
    }

    #[test]
    fn simple_string() {
        let (token, ok) = scan_one("\"hello\"");
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.lexeme.as_str(), "\"hello\"");
        assert!(ok);
    }

    #[test]
    fn unterminated_at_eof_reports_error() {
        let (token, ok) = scan_one("\"hello");
        assert_eq!(token.kind, TokenKind::Error);
        assert!(!ok);
    }

    #[test]
    fn unterminated_at_newline_reports_error() {
        let (token, ok) = scan_one("\"hello\nworld\"");
        assert_eq!(token.kind, TokenKind::Error);
        assert!(!ok);
    }
}
