//! Operator and punctuator scanning (§4.3).
//!
//! Grounded on `original_source/src/lexer/operator.cpp`'s
//! disambiguation table: every operator that shares a leading
//! character with a longer one (`=`/`==`, `<`/`<=`, `&`/`&&`, ...) is
//! resolved by a single character of lookahead. `&` and `|` only exist
//! in this language as their doubled forms, so a lone `&` or `|` is
//! unrecognized here and the cursor is left untouched — the driver
//! reports it as an unknown byte. Returns `None` for any other byte
//! this scanner doesn't recognize, for the same reason.
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub fn scan(lexer: &mut Lexer<'_>, c: char) -> Option<Token> {
    let kind = match c {
        '+' => single_or_compound(lexer, TokenKind::Plus, TokenKind::PlusAssign),
        '-' => single_or_compound(lexer, TokenKind::Minus, TokenKind::MinusAssign),
        '*' => single_or_compound(lexer, TokenKind::Star, TokenKind::StarAssign),
        '/' => single_or_compound(lexer, TokenKind::Slash, TokenKind::SlashAssign),
        '%' => single_or_compound(lexer, TokenKind::Percent, TokenKind::PercentAssign),
        '=' => single_or_compound(lexer, TokenKind::Assign, TokenKind::Eq),
        '!' => single_or_compound(lexer, TokenKind::Not, TokenKind::NotEq),
        '<' => single_or_compound(lexer, TokenKind::Lt, TokenKind::LtEq),
        '>' => single_or_compound(lexer, TokenKind::Gt, TokenKind::GtEq),
        '&' => doubled_only(lexer, '&', TokenKind::AndAnd)?,
        '|' => doubled_only(lexer, '|', TokenKind::OrOr)?,
        ';' => single(lexer, TokenKind::Semi),
        ',' => single(lexer, TokenKind::Comma),
        '(' => single(lexer, TokenKind::LParen),
        ')' => single(lexer, TokenKind::RParen),
        '{' => single(lexer, TokenKind::LBrace),
        '}' => single(lexer, TokenKind::RBrace),
        '[' => single(lexer, TokenKind::LBracket),
        ']' => single(lexer, TokenKind::RBracket),
        '.' => single(lexer, TokenKind::Dot),
        ':' => single(lexer, TokenKind::Colon),
        _ => return None,
    };

    let text = lexer.cursor.slice_from(lexer.token_start_pos);
    Some(lexer.emit(kind, text))
}

/// Consumes the first character unconditionally, then `=` if present,
/// yielding `compound` instead of `single`. Covers `=`/`==` too: there
/// `single` is `Assign` and `compound` is `Eq`.
fn single_or_compound(lexer: &mut Lexer<'_>, single: TokenKind, compound: TokenKind) -> TokenKind {
    lexer.cursor.advance();
    if lexer.cursor.match_char('=') {
        compound
    } else {
        single
    }
}

/// Consumes `c` twice if doubled (`&&`, `||`); otherwise leaves the
/// cursor untouched and returns `None` — this language has no single
/// `&`/`|` operator.
fn doubled_only(lexer: &mut Lexer<'_>, c: char, kind: TokenKind) -> Option<TokenKind> {
    if lexer.cursor.peek_char(1) == c {
        lexer.cursor.advance();
        lexer.cursor.advance();
        Some(kind)
    } else {
        None
    }
}

fn single(lexer: &mut Lexer<'_>, kind: TokenKind) -> TokenKind {
    lexer.cursor.advance();
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one(source: &str) -> Token {
        let mut lexer = Lexer::new(source);
        let c = lexer.cursor.current_char();
        super::scan(&mut lexer, c).expect("recognized operator")
    }

    fn scan_opt(source: &str) -> Option<Token> {
        let mut lexer = Lexer::new(source);
        let c = lexer.cursor.current_char();
        super::scan(&mut lexer, c)
    }

    #[test]
    fn single_and_compound_assign() {
        assert_eq!(scan_one("+").kind, TokenKind::Plus);
        assert_eq!(scan_one("+=").kind, TokenKind::PlusAssign);
        assert_eq!(scan_one("-=").kind, TokenKind::MinusAssign);
        assert_eq!(scan_one("*=").kind, TokenKind::StarAssign);
        assert_eq!(scan_one("/=").kind, TokenKind::SlashAssign);
        assert_eq!(scan_one("%=").kind, TokenKind::PercentAssign);
    }

    #[test]
    fn relational_and_equality() {
        assert_eq!(scan_one("=").kind, TokenKind::Assign);
        assert_eq!(scan_one("==").kind, TokenKind::Eq);
        assert_eq!(scan_one("!").kind, TokenKind::Not);
        assert_eq!(scan_one("!=").kind, TokenKind::NotEq);
        assert_eq!(scan_one("<").kind, TokenKind::Lt);
        assert_eq!(scan_one("<=").kind, TokenKind::LtEq);
        assert_eq!(scan_one(">").kind, TokenKind::Gt);
        assert_eq!(scan_one(">=").kind, TokenKind::GtEq);
    }

    #[test]
    fn logical_and_or_require_doubling() {
        assert_eq!(scan_one("&&").kind, TokenKind::AndAnd);
        assert_eq!(scan_one("||").kind, TokenKind::OrOr);
    }

    #[test]
    fn lone_ampersand_is_unrecognized_and_cursor_is_untouched() {
        let mut lexer = Lexer::new("& x");
        let c = lexer.cursor.current_char();
        assert!(super::scan(&mut lexer, c).is_none());
        assert_eq!(lexer.cursor.position(), 0);
    }

    #[test]
    fn punctuators() {
        assert_eq!(scan_one(";").kind, TokenKind::Semi);
        assert_eq!(scan_one("(").kind, TokenKind::LParen);
        assert_eq!(scan_one("[").kind, TokenKind::LBracket);
        assert_eq!(scan_one(".").kind, TokenKind::Dot);
    }

    #[test]
    fn unrecognized_byte_returns_none() {
        assert!(scan_opt("@").is_none());
    }
}
