//! Lexer methods related to reading numbers.
//!
//! See https://tc39.github.io/ecma262/#sec-literals-numeric-literals

use super::{util::is_ident_start, LexResult, Lexer};
use crate::error::SyntaxError;

impl Lexer<'_> {
    /// Reads a numeric literal. The current char is a digit, or a `.`
    /// followed by a digit.
    pub(super) fn read_number(&mut self) -> LexResult<f64> {
        let radix = match (self.cur(), self.peek()) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let value = match radix {
            Some(radix) => {
                self.bump_n(2);
                self.read_int(radix)?
            }
            None => self.read_decimal()?,
        };

        if self
            .cur()
            .map_or(false, |c| is_ident_start(c) || c.is_ascii_digit())
        {
            return self.error(SyntaxError::IdentAfterNum);
        }

        Ok(value)
    }

    fn read_int(&mut self, radix: u32) -> LexResult<f64> {
        let mut value = 0f64;
        let mut digits = 0;
        while let Some(d) = self.cur().and_then(|c| c.to_digit(radix)) {
            value = value * radix as f64 + d as f64;
            digits += 1;
            self.bump();
        }
        if digits == 0 {
            return self.error(SyntaxError::InvalidNumber);
        }
        Ok(value)
    }

    fn read_decimal(&mut self) -> LexResult<f64> {
        let start = self.cur;
        self.skip_digits();
        if self.cur() == Some('.') {
            self.bump();
            self.skip_digits();
        }
        if let Some('e' | 'E') = self.cur() {
            self.bump();
            if let Some('+' | '-') = self.cur() {
                self.bump();
            }
            if !self.cur().map_or(false, |c| c.is_ascii_digit()) {
                return self.error(SyntaxError::InvalidNumber);
            }
            self.skip_digits();
        }

        let raw = &self.input[start..self.cur];
        match lexical::parse::<f64, _>(raw) {
            Ok(value) => Ok(value),
            Err(_) => self.error(SyntaxError::InvalidNumber),
        }
    }

    fn skip_digits(&mut self) {
        while self.cur().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn num(s: &str) -> f64 {
        match Lexer::new(s).tokenize().unwrap()[0].token {
            Token::Num(n) => n,
            ref t => panic!("expected a number, got {:?}", t),
        }
    }

    #[test]
    fn decimal() {
        assert_eq!(num("0"), 0.0);
        assert_eq!(num("123"), 123.0);
        assert_eq!(num("1.5"), 1.5);
        assert_eq!(num(".25"), 0.25);
        assert_eq!(num("1."), 1.0);
        assert_eq!(num("1e3"), 1000.0);
        assert_eq!(num("2.5E-1"), 0.25);
    }

    #[test]
    fn non_decimal() {
        assert_eq!(num("0x1F"), 31.0);
        assert_eq!(num("0o17"), 15.0);
        assert_eq!(num("0b101"), 5.0);
    }

    #[test]
    fn ident_after_number() {
        let err = Lexer::new("3in x").tokenize().unwrap_err();
        assert_eq!(err.kind, SyntaxError::IdentAfterNum);
    }

    #[test]
    fn missing_exponent() {
        let err = Lexer::new("1e").tokenize().unwrap_err();
        assert_eq!(err.kind, SyntaxError::InvalidNumber);
    }
}
