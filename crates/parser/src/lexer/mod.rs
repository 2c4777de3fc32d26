//! ECMAScript lexer.
//!
//! The whole input is tokenized up front. Whether a `/` starts a regular
//! expression is decided from the previous token, see
//! [`Token::before_expr`].

mod number;
mod util;

use crate::{
    error::{Error, Pos, SyntaxError},
    token::{Token, TokenAndPos, Word},
};
use ast::{AssignOp, BinaryOp};
use util::{is_ident_part, is_ident_start, is_line_break};

pub(crate) type LexResult<T> = Result<T, Error>;

pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset of the current char.
    cur: usize,
    line: u32,
    col: u32,
    had_line_break: bool,
    prev_before_expr: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            cur: 0,
            line: 1,
            col: 1,
            had_line_break: false,
            prev_before_expr: true,
        }
    }

    /// Tokenizes the whole input. The last token is always [`Token::Eof`].
    pub fn tokenize(mut self) -> LexResult<Vec<TokenAndPos>> {
        let mut tokens = Vec::new();
        loop {
            self.had_line_break = false;
            self.skip_space()?;

            let pos = self.pos();
            let token = match self.cur() {
                Some(_) => self.read_token()?,
                None => Token::Eof,
            };
            let done = token == Token::Eof;
            self.prev_before_expr = token.before_expr();
            tokens.push(TokenAndPos {
                token,
                had_line_break: self.had_line_break,
                pos,
            });
            if done {
                return Ok(tokens);
            }
        }
    }

    fn cur(&self) -> Option<char> {
        self.input[self.cur..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.cur..].chars();
        chars.next();
        chars.next()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.cur..]
    }

    fn bump(&mut self) {
        if let Some(c) = self.cur() {
            self.cur += c.len_utf8();
            // `\r\n` counts as a single line terminator.
            if is_line_break(c) && !(c == '\r' && self.cur() == Some('\n')) {
                self.line += 1;
                self.col = 1;
            } else if !is_line_break(c) {
                self.col += 1;
            }
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            col: self.col,
        }
    }

    fn error<T>(&self, kind: SyntaxError) -> LexResult<T> {
        Err(Error::new(self.pos(), kind))
    }

    fn skip_space(&mut self) -> LexResult<()> {
        loop {
            match self.cur() {
                Some(c) if is_line_break(c) => {
                    self.had_line_break = true;
                    self.bump();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => self.bump(),
                Some('/') if self.peek() == Some('/') => {
                    while let Some(c) = self.cur() {
                        if is_line_break(c) {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek() == Some('*') => {
                    let start = self.pos();
                    self.bump_n(2);
                    loop {
                        match self.cur() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump_n(2);
                                break;
                            }
                            Some(c) => {
                                if is_line_break(c) {
                                    self.had_line_break = true;
                                }
                                self.bump();
                            }
                            None => {
                                return Err(Error::new(
                                    start,
                                    SyntaxError::UnterminatedBlockComment,
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_token(&mut self) -> LexResult<Token> {
        let c = match self.cur() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '.' => {
                if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    return self.read_number().map(Token::Num);
                }
                self.bump();
                Ok(Token::Dot)
            }
            '0'..='9' => self.read_number().map(Token::Num),
            '"' | '\'' => self.read_str_lit(c),
            '/' if self.prev_before_expr => self.read_regexp(),
            c if is_ident_start(c) => Ok(Token::Word(self.read_word())),
            _ => match punctuator(self.rest()) {
                Some((len, token)) => {
                    self.bump_n(len);
                    Ok(token)
                }
                None => self.error(SyntaxError::UnexpectedChar(c)),
            },
        }
    }

    fn read_word(&mut self) -> Word {
        let start = self.cur;
        while let Some(c) = self.cur() {
            if !is_ident_part(c) {
                break;
            }
            self.bump();
        }
        Word::from(&self.input[start..self.cur])
    }

    fn read_str_lit(&mut self, quote: char) -> LexResult<Token> {
        let start = self.pos();
        self.bump();

        let mut out = String::new();
        loop {
            match self.cur() {
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(Token::Str(out.into()));
                }
                Some('\\') => {
                    self.bump();
                    if let Some(c) = self.read_escape()? {
                        out.push(c);
                    }
                }
                Some(c) if is_line_break(c) && c != '\u{2028}' && c != '\u{2029}' => {
                    return Err(Error::new(start, SyntaxError::UnterminatedStrLit));
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
                None => return Err(Error::new(start, SyntaxError::UnterminatedStrLit)),
            }
        }
    }

    /// Reads the escape sequence after a backslash. Returns `None` for a line
    /// continuation.
    fn read_escape(&mut self) -> LexResult<Option<char>> {
        let c = match self.cur() {
            Some(c) => c,
            None => return self.error(SyntaxError::UnterminatedStrLit),
        };
        self.bump();
        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{0008}',
            'f' => '\u{000c}',
            'v' => '\u{000b}',
            '0' if !self.cur().map_or(false, |c| c.is_ascii_digit()) => '\0',
            'x' => {
                let code = self.read_hex_digits(2)?;
                char::from_u32(code).ok_or_else(|| Error::new(self.pos(), SyntaxError::InvalidEscape))?
            }
            'u' => {
                let code = if self.cur() == Some('{') {
                    self.bump();
                    let mut code = 0u32;
                    let mut digits = 0;
                    while let Some(d) = self.cur().and_then(|c| c.to_digit(16)) {
                        code = code.saturating_mul(16).saturating_add(d);
                        digits += 1;
                        self.bump();
                    }
                    if digits == 0 || self.cur() != Some('}') {
                        return self.error(SyntaxError::InvalidEscape);
                    }
                    self.bump();
                    code
                } else {
                    self.read_hex_digits(4)?
                };
                // Lone surrogates can't be represented in a Rust string.
                char::from_u32(code).ok_or_else(|| Error::new(self.pos(), SyntaxError::InvalidEscape))?
            }
            '\r' => {
                if self.cur() == Some('\n') {
                    self.bump();
                }
                return Ok(None);
            }
            c if is_line_break(c) => return Ok(None),
            '1'..='9' => return self.error(SyntaxError::Unsupported("octal escape sequences")),
            c => c,
        };
        Ok(Some(escaped))
    }

    fn read_hex_digits(&mut self, count: usize) -> LexResult<u32> {
        let mut code = 0;
        for _ in 0..count {
            match self.cur().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    self.bump();
                }
                None => return self.error(SyntaxError::InvalidEscape),
            }
        }
        Ok(code)
    }

    fn read_regexp(&mut self) -> LexResult<Token> {
        let start = self.pos();
        self.bump();

        let body_start = self.cur;
        let mut in_class = false;
        loop {
            match self.cur() {
                Some(c) if is_line_break(c) => {
                    return Err(Error::new(start, SyntaxError::UnterminatedRegExp))
                }
                None => return Err(Error::new(start, SyntaxError::UnterminatedRegExp)),
                Some('\\') => {
                    self.bump();
                    match self.cur() {
                        Some(c) if !is_line_break(c) => self.bump(),
                        _ => return Err(Error::new(start, SyntaxError::UnterminatedRegExp)),
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.bump();
                }
                Some(']') => {
                    in_class = false;
                    self.bump();
                }
                Some('/') if !in_class => break,
                Some(_) => self.bump(),
            }
        }
        let exp = &self.input[body_start..self.cur];
        self.bump();

        let flags_start = self.cur;
        while let Some(c) = self.cur() {
            if !is_ident_part(c) {
                break;
            }
            self.bump();
        }
        let flags = &self.input[flags_start..self.cur];

        Ok(Token::Regex(exp.into(), flags.into()))
    }
}

/// Matches the longest punctuator at the start of `s`.
fn punctuator(s: &str) -> Option<(usize, Token)> {
    use AssignOp::*;
    use BinaryOp::*;

    const TABLE: &[(&str, Op)] = &[
        (">>>=", Op::Assign(ZeroFillRShiftAssign)),
        ("===", Op::Bin(EqEqEq)),
        ("!==", Op::Bin(NotEqEq)),
        (">>>", Op::Bin(ZeroFillRShift)),
        ("<<=", Op::Assign(LShiftAssign)),
        (">>=", Op::Assign(RShiftAssign)),
        ("==", Op::Bin(EqEq)),
        ("!=", Op::Bin(NotEq)),
        ("<=", Op::Bin(LtEq)),
        (">=", Op::Bin(GtEq)),
        ("<<", Op::Bin(LShift)),
        (">>", Op::Bin(RShift)),
        ("&&", Op::Bin(LogicalAnd)),
        ("||", Op::Bin(LogicalOr)),
        ("++", Op::PlusPlus),
        ("--", Op::MinusMinus),
        ("+=", Op::Assign(AddAssign)),
        ("-=", Op::Assign(SubAssign)),
        ("*=", Op::Assign(MulAssign)),
        ("/=", Op::Assign(DivAssign)),
        ("%=", Op::Assign(ModAssign)),
        ("&=", Op::Assign(BitAndAssign)),
        ("|=", Op::Assign(BitOrAssign)),
        ("^=", Op::Assign(BitXorAssign)),
        ("=", Op::Assign(Assign)),
        ("<", Op::Bin(Lt)),
        (">", Op::Bin(Gt)),
        ("+", Op::Bin(Add)),
        ("-", Op::Bin(Sub)),
        ("*", Op::Bin(Mul)),
        ("/", Op::Bin(Div)),
        ("%", Op::Bin(Mod)),
        ("&", Op::Bin(BitAnd)),
        ("|", Op::Bin(BitOr)),
        ("^", Op::Bin(BitXor)),
        ("!", Op::Bang),
        ("~", Op::Tilde),
        ("(", Op::LParen),
        (")", Op::RParen),
        ("[", Op::LBracket),
        ("]", Op::RBracket),
        ("{", Op::LBrace),
        ("}", Op::RBrace),
        (";", Op::Semi),
        (",", Op::Comma),
        (":", Op::Colon),
        ("?", Op::QuestionMark),
    ];

    TABLE
        .iter()
        .find(|(text, _)| s.starts_with(text))
        .map(|&(text, op)| (text.len(), op.into()))
}

/// Copyable mirror of the punctuator tokens, usable in a `const` table.
#[derive(Clone, Copy)]
enum Op {
    Bin(BinaryOp),
    Assign(AssignOp),
    PlusPlus,
    MinusMinus,
    Bang,
    Tilde,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semi,
    Comma,
    Colon,
    QuestionMark,
}

impl From<Op> for Token {
    fn from(op: Op) -> Self {
        match op {
            Op::Bin(op) => Token::BinOp(op),
            Op::Assign(op) => Token::AssignOp(op),
            Op::PlusPlus => Token::PlusPlus,
            Op::MinusMinus => Token::MinusMinus,
            Op::Bang => Token::Bang,
            Op::Tilde => Token::Tilde,
            Op::LParen => Token::LParen,
            Op::RParen => Token::RParen,
            Op::LBracket => Token::LBracket,
            Op::RBracket => Token::RBracket,
            Op::LBrace => Token::LBrace,
            Op::RBrace => Token::RBrace,
            Op::Semi => Token::Semi,
            Op::Comma => Token::Comma,
            Op::Colon => Token::Colon,
            Op::QuestionMark => Token::QuestionMark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;
    use pretty_assertions::assert_eq;

    fn lex(s: &str) -> Vec<Token> {
        Lexer::new(s)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn division_after_ident() {
        assert_eq!(
            lex("a / b"),
            vec![
                Token::Word(Word::Ident("a".into())),
                Token::BinOp(BinaryOp::Div),
                Token::Word(Word::Ident("b".into())),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn regexp_after_operator() {
        assert_eq!(
            lex("x = /a[/]b/gi"),
            vec![
                Token::Word(Word::Ident("x".into())),
                Token::AssignOp(AssignOp::Assign),
                Token::Regex("a[/]b".into(), "gi".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn regexp_after_return() {
        assert_eq!(
            lex("return /a/"),
            vec![
                Token::Word(Word::Keyword(Keyword::Return)),
                Token::Regex("a".into(), "".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn longest_punctuator_wins() {
        assert_eq!(
            lex("a >>>= b !== c"),
            vec![
                Token::Word(Word::Ident("a".into())),
                Token::AssignOp(AssignOp::ZeroFillRShiftAssign),
                Token::Word(Word::Ident("b".into())),
                Token::BinOp(BinaryOp::NotEqEq),
                Token::Word(Word::Ident("c".into())),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex(r#"'a\n\x41B\u{43}\'' "d\
e""#),
            vec![Token::Str("a\nABC'".into()), Token::Str("de".into()), Token::Eof]
        );
    }

    #[test]
    fn line_breaks_are_recorded() {
        let tokens = Lexer::new("a /* \n */ b\nc // x\n").tokenize().unwrap();
        let breaks: Vec<_> = tokens.iter().map(|t| t.had_line_break).collect();
        assert_eq!(breaks, vec![false, true, true, true]);
        assert_eq!(tokens[2].pos, Pos { line: 3, col: 1 });
    }

    #[test]
    fn unterminated_string() {
        let err = Lexer::new("'abc").tokenize().unwrap_err();
        assert_eq!(err.kind, SyntaxError::UnterminatedStrLit);
        assert_eq!(err.pos, Pos { line: 1, col: 1 });
    }

    #[test]
    fn unexpected_char() {
        let err = Lexer::new("a # b").tokenize().unwrap_err();
        assert_eq!(err.kind, SyntaxError::UnexpectedChar('#'));
    }
}
