use super::{stmt::is_assign_target, PResult, Parser};
use crate::{
    context::Context,
    error::SyntaxError,
    token::{Keyword, Token, Word},
};
use ast::*;
use atoms::JsWord;

impl Parser<'_> {
    /// Runs `f` with `in` treated as a binary operator again.
    pub(super) fn include_in_expr<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let ctx = self.ctx - Context::EXCLUDE_IN;
        self.with_ctx(ctx, f)
    }

    /// Parses an expression, including sequence expressions.
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        let first = self.parse_assign_expr()?;
        if !self.is(&Token::Comma) {
            return Ok(first);
        }

        let mut exprs = vec![first];
        while self.eat(&Token::Comma) {
            exprs.push(self.parse_assign_expr()?);
        }
        Ok(Expr::Seq(SeqExpr {
            node_id: self.id(),
            exprs,
        }))
    }

    pub(super) fn parse_assign_expr(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        let left = self.parse_cond_expr()?;

        let op = match self.cur() {
            Token::AssignOp(op) => *op,
            _ => return Ok(left),
        };
        if !is_assign_target(&left) {
            return Err(crate::error::Error::new(pos, SyntaxError::InvalidAssignTarget));
        }
        self.bump();

        let right = self.parse_assign_expr()?;
        Ok(Expr::Assign(AssignExpr {
            node_id: self.id(),
            op,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_cond_expr(&mut self) -> PResult<Expr> {
        let test = self.parse_bin_expr(0)?;
        if !self.eat(&Token::QuestionMark) {
            return Ok(test);
        }

        let cons = self.include_in_expr(|p| p.parse_assign_expr())?;
        self.expect(&Token::Colon, "`:`")?;
        let alt = self.parse_assign_expr()?;
        Ok(Expr::Cond(CondExpr {
            node_id: self.id(),
            test: Box::new(test),
            cons: Box::new(cons),
            alt: Box::new(alt),
        }))
    }

    fn cur_bin_op(&self) -> Option<BinaryOp> {
        match self.cur() {
            Token::BinOp(op) => Some(*op),
            Token::Word(Word::Keyword(Keyword::In)) if !self.ctx.contains(Context::EXCLUDE_IN) => {
                Some(BinaryOp::In)
            }
            Token::Word(Word::Keyword(Keyword::InstanceOf)) => Some(BinaryOp::InstanceOf),
            _ => None,
        }
    }

    /// Precedence climbing over the binary operators binding tighter than
    /// `min_prec`. All binary operators are left associative.
    fn parse_bin_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.cur_bin_op() {
            if op.precedence() <= min_prec {
                break;
            }
            self.bump();
            let right = self.parse_bin_expr(op.precedence())?;
            left = Expr::Bin(BinExpr {
                node_id: self.id(),
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> PResult<Expr> {
        let op = match self.cur() {
            Token::Bang => UnaryOp::Bang,
            Token::Tilde => UnaryOp::Tilde,
            Token::BinOp(BinaryOp::Add) => UnaryOp::Plus,
            Token::BinOp(BinaryOp::Sub) => UnaryOp::Minus,
            Token::Word(Word::Keyword(Keyword::TypeOf)) => UnaryOp::TypeOf,
            Token::Word(Word::Keyword(Keyword::Void)) => UnaryOp::Void,
            Token::Word(Word::Keyword(Keyword::Delete)) => UnaryOp::Delete,
            Token::PlusPlus | Token::MinusMinus => {
                let op = if self.bump() == Token::PlusPlus {
                    UpdateOp::PlusPlus
                } else {
                    UpdateOp::MinusMinus
                };
                let pos = self.pos();
                let arg = self.parse_unary_expr()?;
                if !is_assign_target(&arg) {
                    return Err(crate::error::Error::new(pos, SyntaxError::InvalidAssignTarget));
                }
                return Ok(Expr::Update(UpdateExpr {
                    node_id: self.id(),
                    op,
                    prefix: true,
                    arg: Box::new(arg),
                }));
            }
            _ => return self.parse_postfix_expr(),
        };
        self.bump();

        let arg = self.parse_unary_expr()?;
        Ok(Expr::Unary(UnaryExpr {
            node_id: self.id(),
            op,
            arg: Box::new(arg),
        }))
    }

    fn parse_postfix_expr(&mut self) -> PResult<Expr> {
        let expr = self.parse_lhs_expr(true)?;

        let op = match self.cur() {
            Token::PlusPlus if !self.had_line_break() => UpdateOp::PlusPlus,
            Token::MinusMinus if !self.had_line_break() => UpdateOp::MinusMinus,
            _ => return Ok(expr),
        };
        if !is_assign_target(&expr) {
            return Err(self.error(SyntaxError::InvalidAssignTarget));
        }
        self.bump();

        Ok(Expr::Update(UpdateExpr {
            node_id: self.id(),
            op,
            prefix: false,
            arg: Box::new(expr),
        }))
    }

    /// Parses member, call and `new` expressions. Calls are not consumed when
    /// `allow_call` is false, so that `new a.b()` passes the arguments to
    /// `new`.
    fn parse_lhs_expr(&mut self, allow_call: bool) -> PResult<Expr> {
        let mut expr = if self.is_kwd(Keyword::New) {
            self.parse_new_expr()?
        } else {
            self.parse_primary_expr()?
        };

        loop {
            match self.cur() {
                Token::Dot => {
                    self.bump();
                    let prop = self.parse_ident_name()?;
                    expr = Expr::Member(MemberExpr {
                        node_id: self.id(),
                        obj: Box::new(expr),
                        prop: MemberProp::Ident(prop),
                    });
                }
                Token::LBracket => {
                    self.bump();
                    let prop = self.include_in_expr(|p| p.parse_expr())?;
                    self.expect(&Token::RBracket, "`]`")?;
                    expr = Expr::Member(MemberExpr {
                        node_id: self.id(),
                        obj: Box::new(expr),
                        prop: MemberProp::Computed(Box::new(prop)),
                    });
                }
                Token::LParen if allow_call => {
                    let args = self.parse_args()?;
                    expr = Expr::Call(CallExpr {
                        node_id: self.id(),
                        callee: Box::new(expr),
                        args,
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_new_expr(&mut self) -> PResult<Expr> {
        self.expect_kwd(Keyword::New, "`new`")?;
        let callee = self.parse_lhs_expr(false)?;
        let args = if self.is(&Token::LParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok(Expr::New(NewExpr {
            node_id: self.id(),
            callee: Box::new(callee),
            args,
        }))
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&Token::LParen, "`(`")?;
        let mut args = Vec::new();
        while !self.eat(&Token::RParen) {
            args.push(self.include_in_expr(|p| p.parse_assign_expr())?);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RParen, "`)`")?;
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        let token = self.cur().clone();
        let expr = match token {
            Token::LParen => {
                self.bump();
                let expr = self.include_in_expr(|p| p.parse_expr())?;
                self.expect(&Token::RParen, "`)`")?;
                return Ok(expr);
            }
            Token::LBracket => return self.parse_array_lit(),
            Token::LBrace => return self.parse_object_lit(),
            Token::Word(Word::Keyword(Keyword::Function)) => return self.parse_fn_expr(),
            Token::Word(Word::Keyword(Keyword::This)) => {
                self.bump();
                Expr::This(ThisExpr { node_id: self.id() })
            }
            Token::Word(Word::Ident(_)) => return Ok(Expr::Ident(self.parse_ident()?)),
            Token::Word(Word::Null) => {
                self.bump();
                Expr::Lit(Lit::Null(Null { node_id: self.id() }))
            }
            Token::Word(Word::True) | Token::Word(Word::False) => {
                self.bump();
                Expr::Lit(Lit::Bool(Bool {
                    node_id: self.id(),
                    value: token == Token::Word(Word::True),
                }))
            }
            Token::Num(value) => {
                self.bump();
                Expr::Lit(Lit::Num(Number {
                    node_id: self.id(),
                    value,
                }))
            }
            Token::Str(value) => {
                self.bump();
                Expr::Lit(Lit::Str(Str {
                    node_id: self.id(),
                    value,
                }))
            }
            Token::Regex(exp, flags) => {
                self.bump();
                Expr::Lit(Lit::Regex(Regex {
                    node_id: self.id(),
                    exp,
                    flags,
                }))
            }
            Token::Word(Word::Keyword(Keyword::Class)) => {
                return Err(self.error(SyntaxError::Unsupported("class expression")))
            }
            _ => return self.unexpected("an expression"),
        };
        Ok(expr)
    }

    fn parse_array_lit(&mut self) -> PResult<Expr> {
        self.bump();
        let mut elems = Vec::new();
        while !self.eat(&Token::RBracket) {
            if self.eat(&Token::Comma) {
                elems.push(None);
                continue;
            }
            elems.push(Some(self.include_in_expr(|p| p.parse_assign_expr())?));
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RBracket, "`]`")?;
                break;
            }
        }
        Ok(Expr::Array(ArrayLit {
            node_id: self.id(),
            elems,
        }))
    }

    fn parse_object_lit(&mut self) -> PResult<Expr> {
        self.bump();
        let mut props = Vec::new();
        while !self.eat(&Token::RBrace) {
            props.push(self.parse_prop()?);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RBrace, "`}`")?;
                break;
            }
        }
        Ok(Expr::Object(ObjectLit {
            node_id: self.id(),
            props,
        }))
    }

    fn parse_prop(&mut self) -> PResult<Prop> {
        let accessor = match self.cur() {
            Token::Word(Word::Ident(sym)) if &**sym == "get" || &**sym == "set" => {
                let is_key = matches!(
                    self.peek(),
                    Token::Colon | Token::LParen | Token::Comma | Token::RBrace
                );
                if is_key {
                    None
                } else {
                    Some(&**sym == "get")
                }
            }
            _ => None,
        };

        if let Some(is_getter) = accessor {
            self.bump();
            let key = self.parse_prop_name()?;
            let pos = self.pos();
            let function = self.parse_function_rest()?;
            return if is_getter {
                if !function.params.is_empty() {
                    return Err(crate::error::Error::new(pos, SyntaxError::GetterParam));
                }
                Ok(Prop::Getter(GetterProp {
                    node_id: self.id(),
                    key,
                    function,
                }))
            } else {
                if function.params.len() != 1 {
                    return Err(crate::error::Error::new(pos, SyntaxError::SetterParam));
                }
                Ok(Prop::Setter(SetterProp {
                    node_id: self.id(),
                    key,
                    function,
                }))
            };
        }

        let key = self.parse_prop_name()?;
        if self.is(&Token::LParen) {
            return Err(self.error(SyntaxError::Unsupported("method shorthand")));
        }
        self.expect(&Token::Colon, "`:`")?;
        let value = self.include_in_expr(|p| p.parse_assign_expr())?;
        Ok(Prop::KeyValue(KeyValueProp {
            node_id: self.id(),
            key,
            value: Box::new(value),
        }))
    }

    fn parse_prop_name(&mut self) -> PResult<PropName> {
        match self.cur().clone() {
            Token::Word(w) => {
                self.bump();
                Ok(PropName::Ident(Ident::new(
                    JsWord::from(w.as_str()),
                    self.id(),
                )))
            }
            Token::Str(value) => {
                self.bump();
                Ok(PropName::Str(Str {
                    node_id: self.id(),
                    value,
                }))
            }
            Token::Num(value) => {
                self.bump();
                Ok(PropName::Num(Number {
                    node_id: self.id(),
                    value,
                }))
            }
            Token::LBracket => {
                self.bump();
                let expr = self.include_in_expr(|p| p.parse_assign_expr())?;
                self.expect(&Token::RBracket, "`]`")?;
                Ok(PropName::Computed(Box::new(expr)))
            }
            _ => self.unexpected("a property name"),
        }
    }

    fn parse_fn_expr(&mut self) -> PResult<Expr> {
        self.bump();
        let ident = match self.cur() {
            Token::Word(Word::Ident(_)) => Some(self.parse_ident()?),
            _ => None,
        };
        let function = self.parse_function_rest()?;
        Ok(Expr::Fn(FnExpr {
            node_id: self.id(),
            ident,
            function,
        }))
    }
}
