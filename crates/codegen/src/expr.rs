use super::{util, Emitter, Result};
use ast::*;

/// Binding strength of an expression, weakest first. An operand printed in a
/// position that requires a stronger expression gets parenthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Seq,
    Assign,
    Cond,
    /// Binary operators, by [`BinaryOp::precedence`].
    Bin(u8),
    Unary,
    Postfix,
    Call,
    Member,
    Primary,
}

fn expr_prec(expr: &Expr) -> Prec {
    match expr {
        Expr::Seq(_) => Prec::Seq,
        Expr::Assign(_) => Prec::Assign,
        Expr::Cond(_) => Prec::Cond,
        Expr::Bin(e) => Prec::Bin(e.op.precedence()),
        Expr::Unary(_) => Prec::Unary,
        Expr::Update(e) if e.prefix => Prec::Unary,
        Expr::Update(_) => Prec::Postfix,
        Expr::Call(_) => Prec::Call,
        // Arguments are always printed, so `new a()` is a member expression.
        Expr::New(_) | Expr::Member(_) => Prec::Member,
        Expr::This(_)
        | Expr::Array(_)
        | Expr::Object(_)
        | Expr::Fn(_)
        | Expr::Ident(_)
        | Expr::Lit(_)
        | Expr::Invalid(_) => Prec::Primary,
    }
}

/// Whether the member chain of a `new` callee contains a call, which would
/// take the arguments of the `new` if printed without parens.
fn contains_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call(_) => true,
        Expr::Member(m) => contains_call(&m.obj),
        _ => false,
    }
}

impl<'a> Emitter<'a> {
    pub fn emit_expr(&mut self, node: &Expr) -> Result {
        self.emit_expr_prec(node, Prec::Seq)
    }

    /// Emits an expression where a comma would end it, e.g. an argument.
    pub(crate) fn emit_assign_operand(&mut self, node: &Expr) -> Result {
        self.emit_expr_prec(node, Prec::Assign)
    }

    fn emit_expr_prec(&mut self, node: &Expr, min: Prec) -> Result {
        let is_in = matches!(node, Expr::Bin(BinExpr { op: BinaryOp::In, .. }));
        if expr_prec(node) < min || (self.no_in && is_in) {
            let old = self.no_in;
            self.no_in = false;
            punct!(self, "(");
            let res = self.emit_expr_inner(node);
            self.no_in = old;
            res?;
            punct!(self, ")");
            Ok(())
        } else {
            self.emit_expr_inner(node)
        }
    }

    fn emit_expr_inner(&mut self, node: &Expr) -> Result {
        match node {
            Expr::This(_) => keyword!(self, "this"),
            Expr::Array(n) => self.emit_array_lit(n)?,
            Expr::Object(n) => self.emit_object_lit(n)?,
            Expr::Fn(n) => {
                keyword!(self, "function");
                if let Some(ident) = &n.ident {
                    space!(self);
                    self.emit_ident(ident)?;
                }
                self.emit_fn_trailing(&n.function)?;
            }
            Expr::Unary(n) => {
                operator!(self, n.op.as_str());
                self.emit_expr_prec(&n.arg, Prec::Unary)?;
            }
            Expr::Update(n) => {
                if n.prefix {
                    operator!(self, n.op.as_str());
                    self.emit_expr_prec(&n.arg, Prec::Postfix)?;
                } else {
                    self.emit_expr_prec(&n.arg, Prec::Call)?;
                    operator!(self, n.op.as_str());
                }
            }
            Expr::Bin(n) => {
                let prec = n.op.precedence();
                self.emit_expr_prec(&n.left, Prec::Bin(prec))?;
                formatting_space!(self);
                operator!(self, n.op.as_str());
                formatting_space!(self);
                self.emit_expr_prec(&n.right, Prec::Bin(prec + 1))?;
            }
            Expr::Assign(n) => {
                self.emit_expr_prec(&n.left, Prec::Call)?;
                formatting_space!(self);
                operator!(self, n.op.as_str());
                formatting_space!(self);
                self.emit_expr_prec(&n.right, Prec::Assign)?;
            }
            Expr::Member(n) => {
                if matches!(&*n.obj, Expr::Lit(Lit::Num(_))) {
                    punct!(self, "(");
                    self.emit_expr_inner(&n.obj)?;
                    punct!(self, ")");
                } else {
                    self.emit_expr_prec(&n.obj, Prec::Call)?;
                }
                match &n.prop {
                    MemberProp::Ident(i) => {
                        punct!(self, ".");
                        self.emit_ident(i)?;
                    }
                    MemberProp::Computed(e) => {
                        punct!(self, "[");
                        let old = self.no_in;
                        self.no_in = false;
                        let res = self.emit_expr(e);
                        self.no_in = old;
                        res?;
                        punct!(self, "]");
                    }
                }
            }
            Expr::Cond(n) => {
                self.emit_expr_prec(&n.test, Prec::Bin(1))?;
                formatting_space!(self);
                operator!(self, "?");
                formatting_space!(self);
                self.emit_expr_prec(&n.cons, Prec::Assign)?;
                formatting_space!(self);
                operator!(self, ":");
                formatting_space!(self);
                self.emit_expr_prec(&n.alt, Prec::Assign)?;
            }
            Expr::Call(n) => {
                self.emit_expr_prec(&n.callee, Prec::Call)?;
                self.emit_args(&n.args)?;
            }
            Expr::New(n) => {
                keyword!(self, "new");
                space!(self);
                if contains_call(&n.callee) {
                    punct!(self, "(");
                    self.emit_expr(&n.callee)?;
                    punct!(self, ")");
                } else {
                    self.emit_expr_prec(&n.callee, Prec::Member)?;
                }
                self.emit_args(&n.args)?;
            }
            Expr::Seq(n) => {
                for (i, e) in n.exprs.iter().enumerate() {
                    if i > 0 {
                        punct!(self, ",");
                        formatting_space!(self);
                    }
                    self.emit_expr_prec(e, Prec::Assign)?;
                }
            }
            Expr::Ident(n) => self.emit_ident(n)?,
            Expr::Lit(n) => self.emit_lit(n)?,
            Expr::Invalid(_) => self.wr.write_lit("<invalid>")?,
        }
        Ok(())
    }

    fn emit_args(&mut self, args: &[Expr]) -> Result {
        let old = self.no_in;
        self.no_in = false;
        punct!(self, "(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                punct!(self, ",");
                formatting_space!(self);
            }
            self.emit_assign_operand(arg)?;
        }
        punct!(self, ")");
        self.no_in = old;
        Ok(())
    }

    fn emit_array_lit(&mut self, node: &ArrayLit) -> Result {
        let old = self.no_in;
        self.no_in = false;
        punct!(self, "[");
        for (i, elem) in node.elems.iter().enumerate() {
            if i > 0 {
                punct!(self, ",");
                if elem.is_some() {
                    formatting_space!(self);
                }
            }
            if let Some(elem) = elem {
                self.emit_assign_operand(elem)?;
            }
        }
        // A trailing hole needs its own comma.
        if matches!(node.elems.last(), Some(None)) {
            punct!(self, ",");
        }
        punct!(self, "]");
        self.no_in = old;
        Ok(())
    }

    fn emit_object_lit(&mut self, node: &ObjectLit) -> Result {
        punct!(self, "{");
        if node.props.is_empty() {
            punct!(self, "}");
            return Ok(());
        }
        let old = self.no_in;
        self.no_in = false;
        self.wr.increase_indent();
        formatting_newline!(self);
        for (i, prop) in node.props.iter().enumerate() {
            if i > 0 {
                punct!(self, ",");
                formatting_newline!(self);
            }
            match prop {
                Prop::KeyValue(p) => {
                    self.emit_prop_name(&p.key)?;
                    punct!(self, ":");
                    formatting_space!(self);
                    self.emit_assign_operand(&p.value)?;
                }
                Prop::Getter(p) => {
                    keyword!(self, "get");
                    space!(self);
                    self.emit_prop_name(&p.key)?;
                    self.emit_fn_trailing(&p.function)?;
                }
                Prop::Setter(p) => {
                    keyword!(self, "set");
                    space!(self);
                    self.emit_prop_name(&p.key)?;
                    self.emit_fn_trailing(&p.function)?;
                }
            }
        }
        self.wr.decrease_indent();
        formatting_newline!(self);
        punct!(self, "}");
        self.no_in = old;
        Ok(())
    }

    fn emit_prop_name(&mut self, node: &PropName) -> Result {
        match node {
            PropName::Ident(i) => self.emit_ident(i),
            PropName::Str(s) => self.wr.write_lit(&util::quote_str(&s.value)),
            PropName::Num(n) => self.wr.write_lit(&util::number_to_js_string(n.value)),
            PropName::Computed(e) => {
                punct!(self, "[");
                self.emit_assign_operand(e)?;
                punct!(self, "]");
                Ok(())
            }
        }
    }

    fn emit_lit(&mut self, node: &Lit) -> Result {
        match node {
            Lit::Str(s) => self.wr.write_lit(&util::quote_str(&s.value)),
            Lit::Bool(b) => self.wr.write_keyword(if b.value { "true" } else { "false" }),
            Lit::Null(_) => self.wr.write_keyword("null"),
            Lit::Num(n) => self.wr.write_lit(&util::number_to_js_string(n.value)),
            Lit::Regex(r) => self.wr.write_lit(&format!("/{}/{}", r.exp, r.flags)),
        }
    }
}
