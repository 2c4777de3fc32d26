//! Turns a syntax tree back into source text.

pub use self::{config::Config, text_writer::JsWriter};
use ast::*;
use std::fmt;
use util::ends_with_open_if;

#[macro_use]
mod macros;
mod config;
mod expr;
#[cfg(test)]
mod tests;
pub mod text_writer;
pub mod util;

pub type Result = fmt::Result;

pub struct Emitter<'a> {
    cfg: Config,
    wr: JsWriter<'a>,
    /// Set while printing the head of a `for` loop, where a bare `in` would
    /// be read as a `for-in`.
    no_in: bool,
}

pub fn print_program(program: &Program, cfg: Config) -> String {
    let mut buf = String::new();
    let mut emitter = Emitter::new(cfg, JsWriter::new("\n", &mut buf));
    // Writing to a `String` can't fail.
    let _ = emitter.emit_program(program);
    buf
}

impl<'a> Emitter<'a> {
    pub fn new(cfg: Config, wr: JsWriter<'a>) -> Self {
        Emitter {
            cfg,
            wr,
            no_in: false,
        }
    }

    pub fn emit_program(&mut self, node: &Program) -> Result {
        for stmt in &node.body {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    /// Emits a statement, ending the line after it.
    pub fn emit_stmt(&mut self, node: &Stmt) -> Result {
        match node {
            Stmt::Block(n) => self.emit_block_stmt(n)?,
            Stmt::Empty(_) => semi!(self),
            Stmt::Expr(n) => self.emit_expr_stmt(n)?,
            Stmt::Var(n) => {
                self.emit_var_decl(n)?;
                semi!(self);
            }
            Stmt::Fn(n) => self.emit_fn_decl(n)?,
            Stmt::If(n) => self.emit_if_stmt(n)?,
            Stmt::For(n) => self.emit_for_stmt(n)?,
            Stmt::ForIn(n) => self.emit_for_in_stmt(n)?,
            Stmt::While(n) => {
                keyword!(self, "while");
                formatting_space!(self);
                self.emit_paren_expr(&n.test)?;
                self.emit_body(&n.body, false)?;
            }
            Stmt::DoWhile(n) => {
                keyword!(self, "do");
                if self.emit_body(&n.body, false)? {
                    formatting_space!(self);
                }
                keyword!(self, "while");
                formatting_space!(self);
                self.emit_paren_expr(&n.test)?;
                semi!(self);
            }
            Stmt::Return(n) => {
                keyword!(self, "return");
                if let Some(arg) = &n.arg {
                    space!(self);
                    self.emit_expr(arg)?;
                }
                semi!(self);
            }
            Stmt::Break(n) => {
                keyword!(self, "break");
                if let Some(label) = &n.label {
                    space!(self);
                    self.emit_ident(label)?;
                }
                semi!(self);
            }
            Stmt::Continue(n) => {
                keyword!(self, "continue");
                if let Some(label) = &n.label {
                    space!(self);
                    self.emit_ident(label)?;
                }
                semi!(self);
            }
            Stmt::Labeled(n) => {
                self.emit_ident(&n.label)?;
                punct!(self, ":");
                formatting_space!(self);
                self.emit_stmt(&n.body)?;
            }
            Stmt::Throw(n) => {
                keyword!(self, "throw");
                space!(self);
                self.emit_expr(&n.arg)?;
                semi!(self);
            }
            Stmt::Try(n) => self.emit_try_stmt(n)?,
            Stmt::With(n) => {
                keyword!(self, "with");
                formatting_space!(self);
                self.emit_paren_expr(&n.object)?;
                self.emit_body(&n.body, false)?;
            }
        }
        formatting_newline!(self);
        Ok(())
    }

    /// Emits `{ ... }` without ending the line.
    pub fn emit_block_stmt(&mut self, node: &BlockStmt) -> Result {
        punct!(self, "{");
        if node.stmts.is_empty() {
            punct!(self, "}");
            return Ok(());
        }
        self.wr.increase_indent();
        formatting_newline!(self);
        for stmt in &node.stmts {
            self.emit_stmt(stmt)?;
        }
        self.wr.decrease_indent();
        punct!(self, "}");
        Ok(())
    }

    /// Emits the body of a compound statement. Returns whether the body was
    /// printed as a block, in which case the line is still open.
    fn emit_body(&mut self, body: &Stmt, force_block: bool) -> std::result::Result<bool, fmt::Error> {
        match body {
            Stmt::Block(b) => {
                formatting_space!(self);
                self.emit_block_stmt(b)?;
                Ok(true)
            }
            _ if force_block => {
                formatting_space!(self);
                punct!(self, "{");
                self.wr.increase_indent();
                formatting_newline!(self);
                self.emit_stmt(body)?;
                self.wr.decrease_indent();
                punct!(self, "}");
                Ok(true)
            }
            _ => {
                self.wr.increase_indent();
                formatting_newline!(self);
                self.emit_stmt(body)?;
                self.wr.decrease_indent();
                Ok(false)
            }
        }
    }

    fn emit_expr_stmt(&mut self, node: &ExprStmt) -> Result {
        if util::starts_with_fn_or_object(&node.expr) {
            punct!(self, "(");
            self.emit_expr(&node.expr)?;
            punct!(self, ")");
        } else {
            self.emit_expr(&node.expr)?;
        }
        semi!(self);
        Ok(())
    }

    fn emit_paren_expr(&mut self, node: &Expr) -> Result {
        punct!(self, "(");
        self.emit_expr(node)?;
        punct!(self, ")");
        Ok(())
    }

    /// Emits a declaration without the trailing semicolon.
    fn emit_var_decl(&mut self, node: &VarDecl) -> Result {
        keyword!(self, node.kind.as_str());
        space!(self);
        for (i, decl) in node.decls.iter().enumerate() {
            if i > 0 {
                punct!(self, ",");
                formatting_space!(self);
            }
            self.emit_ident(&decl.name)?;
            if let Some(init) = &decl.init {
                formatting_space!(self);
                operator!(self, "=");
                formatting_space!(self);
                self.emit_assign_operand(init)?;
            }
        }
        Ok(())
    }

    fn emit_fn_decl(&mut self, node: &FnDecl) -> Result {
        keyword!(self, "function");
        space!(self);
        self.emit_ident(&node.ident)?;
        self.emit_fn_trailing(&node.function)
    }

    /// Emits the parameter list and the body of a function.
    fn emit_fn_trailing(&mut self, node: &Function) -> Result {
        punct!(self, "(");
        for (i, param) in node.params.iter().enumerate() {
            if i > 0 {
                punct!(self, ",");
                formatting_space!(self);
            }
            self.emit_ident(param)?;
        }
        punct!(self, ")");
        formatting_space!(self);

        let old = self.no_in;
        self.no_in = false;
        let res = self.emit_block_stmt(&node.body);
        self.no_in = old;
        res
    }

    fn emit_if_stmt(&mut self, node: &IfStmt) -> Result {
        keyword!(self, "if");
        formatting_space!(self);
        self.emit_paren_expr(&node.test)?;

        let alt = match &node.alt {
            Some(alt) => alt,
            None => {
                self.emit_body(&node.cons, false)?;
                return Ok(());
            }
        };

        let cons_is_block = self.emit_body(&node.cons, ends_with_open_if(&node.cons))?;
        if cons_is_block {
            formatting_space!(self);
        }
        keyword!(self, "else");
        match &**alt {
            Stmt::If(alt) => {
                space!(self);
                self.emit_if_stmt(alt)
            }
            _ => {
                self.emit_body(alt, false)?;
                Ok(())
            }
        }
    }

    fn emit_for_stmt(&mut self, node: &ForStmt) -> Result {
        keyword!(self, "for");
        formatting_space!(self);
        punct!(self, "(");

        self.no_in = true;
        let init = match &node.init {
            Some(VarDeclOrExpr::VarDecl(d)) => self.emit_var_decl(d),
            Some(VarDeclOrExpr::Expr(e)) => self.emit_expr(e),
            None => Ok(()),
        };
        self.no_in = false;
        init?;
        semi!(self);

        if let Some(test) = &node.test {
            formatting_space!(self);
            self.emit_expr(test)?;
        }
        semi!(self);
        if let Some(update) = &node.update {
            formatting_space!(self);
            self.emit_expr(update)?;
        }
        punct!(self, ")");
        self.emit_body(&node.body, false)?;
        Ok(())
    }

    fn emit_for_in_stmt(&mut self, node: &ForInStmt) -> Result {
        keyword!(self, "for");
        formatting_space!(self);
        punct!(self, "(");

        self.no_in = true;
        let left = match &node.left {
            ForHead::VarDecl(d) => self.emit_var_decl(d),
            ForHead::Expr(e) => self.emit_expr(e),
        };
        self.no_in = false;
        left?;

        space!(self);
        keyword!(self, "in");
        space!(self);
        self.emit_expr(&node.right)?;
        punct!(self, ")");
        self.emit_body(&node.body, false)?;
        Ok(())
    }

    fn emit_try_stmt(&mut self, node: &TryStmt) -> Result {
        keyword!(self, "try");
        formatting_space!(self);
        self.emit_block_stmt(&node.block)?;

        if let Some(handler) = &node.handler {
            formatting_space!(self);
            keyword!(self, "catch");
            formatting_space!(self);
            if let Some(param) = &handler.param {
                punct!(self, "(");
                self.emit_ident(param)?;
                punct!(self, ")");
                formatting_space!(self);
            }
            self.emit_block_stmt(&handler.body)?;
        }

        if let Some(finalizer) = &node.finalizer {
            formatting_space!(self);
            keyword!(self, "finally");
            formatting_space!(self);
            self.emit_block_stmt(finalizer)?;
        }
        Ok(())
    }

    fn emit_ident(&mut self, node: &Ident) -> Result {
        self.wr.write_lit(&node.sym)
    }
}
