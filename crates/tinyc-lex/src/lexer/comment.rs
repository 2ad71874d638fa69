//! Line comment scanning (§4.3).
//!
//! Grounded on `original_source/src/lexer/comment.cpp`, reduced to
//! this language's only comment form: `//` to end of line (no block
//! comments — §9 non-goals).

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub fn scan(lexer: &mut Lexer<'_>) -> Token {
    lexer.cursor.advance(); // first '/'
    lexer.cursor.advance(); // second '/'
    while !lexer.cursor.is_at_end() && lexer.cursor.current_char() != '\n' {
        lexer.cursor.advance();
    }
    let text = lexer.cursor.slice_from(lexer.token_start_pos);
    lexer.emit(TokenKind::Comment, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_runs_to_end_of_line() {
        let mut lexer = Lexer::new("// a comment\nint");
        let token = super::scan(&mut lexer);
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(token.lexeme.as_str(), "// a comment");
    }

    #[test]
    fn comment_runs_to_end_of_input() {
        let mut lexer = Lexer::new("// trailing, no newline");
        let token = super::scan(&mut lexer);
        assert_eq!(token.kind, TokenKind::Comment);
        assert!(lexer.cursor.is_at_end());
    }
}
