use crate::{
    context::Context,
    error::{Error, Pos, SyntaxError},
    lexer::Lexer,
    token::{Keyword, Token, TokenAndPos, Word},
};
use ast::{Ident, NodeId, Program, ProgramData};
use atoms::JsWord;

mod expr;
mod stmt;
#[cfg(test)]
mod tests;

pub type PResult<T> = Result<T, Error>;

#[derive(Debug)]
struct Label {
    name: JsWord,
    is_loop: bool,
}

/// Recursive descent parser for the supported ECMAScript subset.
pub struct Parser<'a> {
    tokens: Vec<TokenAndPos>,
    idx: usize,
    program_data: &'a mut ProgramData,
    ctx: Context,
    /// Labels of the enclosing labeled statements within the current
    /// function.
    labels: Vec<Label>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &str, program_data: &'a mut ProgramData) -> PResult<Self> {
        let tokens = Lexer::new(src).tokenize()?;
        Ok(Parser {
            tokens,
            idx: 0,
            program_data,
            ctx: Context::empty(),
            labels: Vec::new(),
        })
    }

    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut body = Vec::new();
        while !self.is(&Token::Eof) {
            body.push(self.parse_stmt()?);
        }
        Ok(Program {
            node_id: self.id(),
            body,
        })
    }

    fn id(&mut self) -> NodeId {
        self.program_data.new_id()
    }

    fn cur(&self) -> &Token {
        &self.tokens[self.idx].token
    }

    fn peek(&self) -> &Token {
        let idx = (self.idx + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    /// Whether there was a line break before the current token.
    fn had_line_break(&self) -> bool {
        self.tokens[self.idx].had_line_break
    }

    fn pos(&self) -> Pos {
        self.tokens[self.idx].pos
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.idx].token.clone();
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
        token
    }

    fn is(&self, token: &Token) -> bool {
        self.cur() == token
    }

    fn is_kwd(&self, kwd: Keyword) -> bool {
        matches!(self.cur(), Token::Word(Word::Keyword(k)) if *k == kwd)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.is(token) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_kwd(&mut self, kwd: Keyword) -> bool {
        if self.is_kwd(kwd) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> PResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    fn expect_kwd(&mut self, kwd: Keyword, expected: &'static str) -> PResult<()> {
        if self.eat_kwd(kwd) {
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    /// Consumes a semicolon, or accepts an automatically inserted one.
    fn expect_semi(&mut self) -> PResult<()> {
        if self.eat(&Token::Semi)
            || self.is(&Token::RBrace)
            || self.is(&Token::Eof)
            || self.had_line_break()
        {
            return Ok(());
        }
        self.unexpected("`;`")
    }

    fn unexpected<T>(&self, expected: &'static str) -> PResult<T> {
        let kind = match self.cur() {
            Token::Eof => SyntaxError::Eof,
            got => SyntaxError::Unexpected {
                got: got.to_string(),
                expected,
            },
        };
        Err(self.error(kind))
    }

    fn error(&self, kind: SyntaxError) -> Error {
        Error::new(self.pos(), kind)
    }

    /// Runs `f` with `ctx` as the syntactic context.
    fn with_ctx<T>(&mut self, ctx: Context, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let old = self.ctx;
        self.ctx = ctx;
        let res = f(self);
        self.ctx = old;
        res
    }

    /// An identifier in a binding or reference position. Keywords are
    /// rejected.
    fn parse_ident(&mut self) -> PResult<Ident> {
        match self.cur() {
            Token::Word(Word::Ident(sym)) => {
                let sym = sym.clone();
                self.bump();
                Ok(Ident::new(sym, self.id()))
            }
            _ => self.unexpected("an identifier"),
        }
    }

    /// An `IdentifierName`, e.g. the property in `a.b`. Keywords are allowed.
    fn parse_ident_name(&mut self) -> PResult<Ident> {
        match self.cur() {
            Token::Word(w) => {
                let sym = JsWord::from(w.as_str());
                self.bump();
                Ok(Ident::new(sym, self.id()))
            }
            _ => self.unexpected("an identifier"),
        }
    }
}
