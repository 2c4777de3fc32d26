use super::{Label, PResult, Parser};
use crate::{
    context::Context,
    error::SyntaxError,
    token::{Keyword, Token, Word},
};
use ast::*;

impl Parser<'_> {
    pub(super) fn parse_stmt(&mut self) -> PResult<Stmt> {
        let kwd = match self.cur() {
            Token::LBrace => return Ok(Stmt::Block(self.parse_block()?)),
            Token::Semi => {
                self.bump();
                return Ok(Stmt::Empty(EmptyStmt { node_id: self.id() }));
            }
            Token::Word(Word::Ident(_)) if self.peek() == &Token::Colon => {
                return self.parse_labeled_stmt();
            }
            Token::Word(Word::Keyword(k)) => *k,
            _ => return self.parse_expr_stmt(),
        };

        match kwd {
            Keyword::Var | Keyword::Let | Keyword::Const => {
                let decl = self.parse_var_decl()?;
                self.expect_semi()?;
                Ok(Stmt::Var(decl))
            }
            Keyword::Function => Ok(Stmt::Fn(self.parse_fn_decl()?)),
            Keyword::If => self.parse_if_stmt(),
            Keyword::For => self.parse_for_stmt(),
            Keyword::While => self.parse_while_stmt(),
            Keyword::Do => self.parse_do_while_stmt(),
            Keyword::Return => self.parse_return_stmt(),
            Keyword::Break | Keyword::Continue => self.parse_break_continue_stmt(kwd),
            Keyword::Throw => self.parse_throw_stmt(),
            Keyword::Try => self.parse_try_stmt(),
            Keyword::With => self.parse_with_stmt(),
            Keyword::Switch => Err(self.error(SyntaxError::Unsupported("switch statement"))),
            Keyword::Class => Err(self.error(SyntaxError::Unsupported("class declaration"))),
            Keyword::Debugger => Err(self.error(SyntaxError::Unsupported("debugger statement"))),
            Keyword::Import | Keyword::Export => {
                Err(self.error(SyntaxError::Unsupported("module syntax")))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    pub(super) fn parse_block(&mut self) -> PResult<BlockStmt> {
        self.expect(&Token::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.is(&Token::Eof) {
                return self.unexpected("`}`");
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(BlockStmt {
            node_id: self.id(),
            stmts,
        })
    }

    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let expr = self.include_in_expr(|p| p.parse_expr())?;
        self.expect_semi()?;
        Ok(Stmt::Expr(ExprStmt {
            node_id: self.id(),
            expr: Box::new(expr),
        }))
    }

    /// Parses `var a = 1, b` without the trailing semicolon.
    pub(super) fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let kind = match self.bump() {
            Token::Word(Word::Keyword(Keyword::Var)) => VarDeclKind::Var,
            Token::Word(Word::Keyword(Keyword::Let)) => VarDeclKind::Let,
            _ => VarDeclKind::Const,
        };

        let mut decls = Vec::new();
        loop {
            let name = self.parse_ident()?;
            let init = if self.eat(&Token::AssignOp(AssignOp::Assign)) {
                Some(Box::new(self.parse_assign_expr()?))
            } else {
                None
            };
            decls.push(VarDeclarator {
                node_id: self.id(),
                name,
                init,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(VarDecl {
            node_id: self.id(),
            kind,
            decls,
        })
    }

    fn parse_fn_decl(&mut self) -> PResult<FnDecl> {
        self.expect_kwd(Keyword::Function, "`function`")?;
        let ident = self.parse_ident()?;
        let function = self.parse_function_rest()?;
        Ok(FnDecl {
            node_id: self.id(),
            ident,
            function,
        })
    }

    /// Parses the parameter list and body of a function.
    pub(super) fn parse_function_rest(&mut self) -> PResult<Function> {
        self.expect(&Token::LParen, "`(`")?;
        let mut params = Vec::new();
        while !self.eat(&Token::RParen) {
            params.push(self.parse_ident()?);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RParen, "`)`")?;
                break;
            }
        }

        let labels = std::mem::take(&mut self.labels);
        let body = self.with_ctx(Context::IN_FUNCTION, |p| p.parse_block());
        self.labels = labels;

        Ok(Function {
            node_id: self.id(),
            params,
            body: body?,
        })
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        let test = self.parse_paren_expr()?;
        let cons = self.parse_stmt()?;
        let alt = if self.eat_kwd(Keyword::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            node_id: self.id(),
            test: Box::new(test),
            cons: Box::new(cons),
            alt,
        }))
    }

    fn parse_paren_expr(&mut self) -> PResult<Expr> {
        self.expect(&Token::LParen, "`(`")?;
        let expr = self.include_in_expr(|p| p.parse_expr())?;
        self.expect(&Token::RParen, "`)`")?;
        Ok(expr)
    }

    fn parse_loop_body(&mut self) -> PResult<Stmt> {
        let ctx = self.ctx | Context::IN_ITERATION;
        self.with_ctx(ctx, |p| p.parse_stmt())
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        self.expect(&Token::LParen, "`(`")?;

        let exclude_in = self.ctx | Context::EXCLUDE_IN;
        let init = if self.is(&Token::Semi) {
            None
        } else if self.is_kwd(Keyword::Var)
            || self.is_kwd(Keyword::Let)
            || self.is_kwd(Keyword::Const)
        {
            let decl = self.with_ctx(exclude_in, |p| p.parse_var_decl())?;
            if self.is_kwd(Keyword::In) {
                if decl.decls.len() != 1 || decl.decls[0].init.is_some() {
                    return Err(self.error(SyntaxError::InvalidForInLeft));
                }
                return self.parse_for_in_rest(ForHead::VarDecl(decl));
            }
            Some(VarDeclOrExpr::VarDecl(decl))
        } else {
            let expr = self.with_ctx(exclude_in, |p| p.parse_expr())?;
            if self.is_kwd(Keyword::In) {
                if !is_assign_target(&expr) {
                    return Err(self.error(SyntaxError::InvalidForInLeft));
                }
                return self.parse_for_in_rest(ForHead::Expr(Box::new(expr)));
            }
            Some(VarDeclOrExpr::Expr(Box::new(expr)))
        };

        self.expect(&Token::Semi, "`;`")?;
        let test = if self.is(&Token::Semi) {
            None
        } else {
            Some(Box::new(self.include_in_expr(|p| p.parse_expr())?))
        };
        self.expect(&Token::Semi, "`;`")?;
        let update = if self.is(&Token::RParen) {
            None
        } else {
            Some(Box::new(self.include_in_expr(|p| p.parse_expr())?))
        };
        self.expect(&Token::RParen, "`)`")?;

        let body = self.parse_loop_body()?;
        Ok(Stmt::For(ForStmt {
            node_id: self.id(),
            init,
            test,
            update,
            body: Box::new(body),
        }))
    }

    fn parse_for_in_rest(&mut self, left: ForHead) -> PResult<Stmt> {
        self.expect_kwd(Keyword::In, "`in`")?;
        let right = self.include_in_expr(|p| p.parse_expr())?;
        self.expect(&Token::RParen, "`)`")?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::ForIn(ForInStmt {
            node_id: self.id(),
            left,
            right: Box::new(right),
            body: Box::new(body),
        }))
    }

    fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        let test = self.parse_paren_expr()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::While(WhileStmt {
            node_id: self.id(),
            test: Box::new(test),
            body: Box::new(body),
        }))
    }

    fn parse_do_while_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        let body = self.parse_loop_body()?;
        self.expect_kwd(Keyword::While, "`while`")?;
        let test = self.parse_paren_expr()?;
        // A semicolon is always inserted after a do-while statement.
        self.eat(&Token::Semi);
        Ok(Stmt::DoWhile(DoWhileStmt {
            node_id: self.id(),
            test: Box::new(test),
            body: Box::new(body),
        }))
    }

    fn parse_return_stmt(&mut self) -> PResult<Stmt> {
        if !self.ctx.contains(Context::IN_FUNCTION) {
            return Err(self.error(SyntaxError::ReturnNotAllowed));
        }
        self.bump();
        let arg = if self.is(&Token::Semi)
            || self.is(&Token::RBrace)
            || self.is(&Token::Eof)
            || self.had_line_break()
        {
            None
        } else {
            Some(Box::new(self.include_in_expr(|p| p.parse_expr())?))
        };
        self.expect_semi()?;
        Ok(Stmt::Return(ReturnStmt {
            node_id: self.id(),
            arg,
        }))
    }

    fn parse_break_continue_stmt(&mut self, kwd: Keyword) -> PResult<Stmt> {
        let is_break = kwd == Keyword::Break;
        self.bump();

        let label = match self.cur() {
            Token::Word(Word::Ident(_)) if !self.had_line_break() => {
                let label = self.parse_ident()?;
                let target = self.labels.iter().find(|l| l.name == label.sym);
                match target {
                    Some(target) if is_break || target.is_loop => {}
                    _ => {
                        return Err(self.error(SyntaxError::UndefinedLabel(label.sym)));
                    }
                }
                Some(label)
            }
            _ => {
                if !self.ctx.contains(Context::IN_ITERATION) {
                    return Err(self.error(if is_break {
                        SyntaxError::IllegalBreak
                    } else {
                        SyntaxError::IllegalContinue
                    }));
                }
                None
            }
        };
        self.expect_semi()?;

        let node_id = self.id();
        Ok(if is_break {
            Stmt::Break(BreakStmt { node_id, label })
        } else {
            Stmt::Continue(ContinueStmt { node_id, label })
        })
    }

    fn parse_labeled_stmt(&mut self) -> PResult<Stmt> {
        let label = self.parse_ident()?;
        self.expect(&Token::Colon, "`:`")?;
        if self.labels.iter().any(|l| l.name == label.sym) {
            return Err(self.error(SyntaxError::DuplicateLabel(label.sym)));
        }

        let is_loop =
            self.is_kwd(Keyword::For) || self.is_kwd(Keyword::While) || self.is_kwd(Keyword::Do);
        self.labels.push(Label {
            name: label.sym.clone(),
            is_loop,
        });
        let body = self.parse_stmt();
        self.labels.pop();

        Ok(Stmt::Labeled(LabeledStmt {
            node_id: self.id(),
            label,
            body: Box::new(body?),
        }))
    }

    fn parse_throw_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        if self.had_line_break() {
            return Err(self.error(SyntaxError::LineBreakInThrow));
        }
        let arg = self.include_in_expr(|p| p.parse_expr())?;
        self.expect_semi()?;
        Ok(Stmt::Throw(ThrowStmt {
            node_id: self.id(),
            arg: Box::new(arg),
        }))
    }

    fn parse_try_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        let block = self.parse_block()?;

        let handler = if self.eat_kwd(Keyword::Catch) {
            let param = if self.eat(&Token::LParen) {
                let param = self.parse_ident()?;
                self.expect(&Token::RParen, "`)`")?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                node_id: self.id(),
                param,
                body,
            })
        } else {
            None
        };

        let finalizer = if self.eat_kwd(Keyword::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error(SyntaxError::TryWithoutHandler));
        }

        Ok(Stmt::Try(TryStmt {
            node_id: self.id(),
            block,
            handler,
            finalizer,
        }))
    }

    fn parse_with_stmt(&mut self) -> PResult<Stmt> {
        self.bump();
        let object = self.parse_paren_expr()?;
        let body = self.parse_stmt()?;
        Ok(Stmt::With(WithStmt {
            node_id: self.id(),
            object: Box::new(object),
            body: Box::new(body),
        }))
    }
}

pub(super) fn is_assign_target(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(_) | Expr::Member(_))
}
