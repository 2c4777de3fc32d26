//! Turns self-recursive tail calls into jumps.
//!
//! ```js
//! function f(n) { if (n === 0) return 0; return f(n - 1); }
//! ```
//!
//! becomes
//!
//! ```js
//! function f(n) { tail: while (true) { if (n === 0) return 0; n = n - 1; continue tail; } }
//! ```
//!
//! The body then runs several times in one activation, so it must not
//! depend on a fresh activation: no captured locals, no `var` without an
//! initializer, no function declarations, and no `try` whose `finally` would
//! see the call.

use super::{block, expr_stmt, undefined, PassContext};
use crate::{
    scope::{ScopeTree, VarId},
    utils::{collect_names, unique_name},
};
use ast::*;
use atoms::JsWord;
use ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use rustc_hash::FxHashSet;

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    let names = collect_names(&*program);
    let mut v = TailCalls {
        scopes: &cx.result.scopes,
        program_data,
        names,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

struct Target {
    name_var: VarId,
    params: Vec<VarId>,
    param_names: Vec<JsWord>,
}

impl Target {
    fn is_tail_call(&self, scopes: &ScopeTree, stmt: &Stmt) -> bool {
        let call = match stmt {
            Stmt::Return(ReturnStmt { arg: Some(arg), .. }) => match &**arg {
                Expr::Call(call) => call,
                _ => return false,
            },
            _ => return false,
        };
        call.args.len() <= self.params.len()
            && call.callee.as_ident().and_then(|i| scopes.var_of(i.node_id)) == Some(self.name_var)
    }
}

struct TailCalls<'a> {
    scopes: &'a ScopeTree,
    program_data: &'a mut ProgramData,
    names: FxHashSet<JsWord>,
    changed: bool,
}

impl TailCalls<'_> {
    fn target(&self, f: &Function) -> Option<Target> {
        let scopes = self.scopes;
        let info = scopes.function(f.node_id)?;
        if info.uses_arguments || info.uses_this {
            return None;
        }
        let name_var = info.name_var?;
        if scopes.var(name_var).writes.len() != 1 {
            return None;
        }
        if scopes
            .captured_vars()
            .any(|var| scopes.var(var).fn_scope == info.scope)
        {
            return None;
        }
        let param_names: Vec<JsWord> = f.params.iter().map(|p| p.sym.clone()).collect();
        let unique: FxHashSet<_> = param_names.iter().collect();
        if unique.len() != param_names.len() {
            return None;
        }

        let target = Target {
            name_var,
            params: info.params.clone(),
            param_names,
        };
        let mut check = BodyCheck {
            scopes,
            target: &target,
            tail_calls: 0,
            ok: true,
        };
        f.body.stmts.visit_with(&mut check);
        if !check.ok || check.tail_calls == 0 {
            return None;
        }
        Some(target)
    }

    fn rewrite(&mut self, f: &mut Function, target: &Target) {
        let label = unique_name("tail", &mut self.names);
        let mut stmts = std::mem::take(&mut f.body.stmts);
        stmts.visit_mut_with(&mut Rewriter {
            scopes: self.scopes,
            target,
            label: &label,
            names: &mut self.names,
            program_data: &mut *self.program_data,
        });
        if !stmts.iter().any(Stmt::is_abrupt_completion) {
            stmts.push(Stmt::Return(ReturnStmt {
                node_id: self.program_data.new_id(),
                arg: None,
            }));
        }
        let pd = &mut *self.program_data;
        let test = Expr::Lit(Lit::Bool(Bool {
            node_id: pd.new_id(),
            value: true,
        }));
        let body = block(stmts, pd);
        let looped = Stmt::While(WhileStmt {
            node_id: pd.new_id(),
            test: Box::new(test),
            body: Box::new(body),
        });
        f.body.stmts = vec![Stmt::Labeled(LabeledStmt {
            node_id: pd.new_id(),
            label: Ident::new(label, pd.new_id()),
            body: Box::new(looped),
        })];
    }
}

impl VisitMut for TailCalls<'_> {
    fn visit_mut_function(&mut self, f: &mut Function) {
        f.visit_mut_children_with(self);
        if let Some(target) = self.target(f) {
            self.rewrite(f, &target);
            self.changed = true;
        }
    }
}

/// Counts the tail calls of a body and rejects bodies that can't be looped.
struct BodyCheck<'a> {
    scopes: &'a ScopeTree,
    target: &'a Target,
    tail_calls: usize,
    ok: bool,
}

impl<'ast> Visit<'ast> for BodyCheck<'_> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if self.target.is_tail_call(self.scopes, stmt) {
            self.tail_calls += 1;
        }
        stmt.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, decl: &'ast VarDecl) {
        if decl.kind == VarDeclKind::Var && decl.decls.iter().any(|d| d.init.is_none()) {
            self.ok = false;
        }
        decl.visit_children_with(self);
    }

    fn visit_for_in_stmt(&mut self, s: &'ast ForInStmt) {
        s.right.visit_with(self);
        s.body.visit_with(self);
    }

    fn visit_try_stmt(&mut self, _: &'ast TryStmt) {
        self.ok = false;
    }

    fn visit_fn_decl(&mut self, _: &'ast FnDecl) {
        self.ok = false;
    }

    fn visit_function(&mut self, _: &'ast Function) {}
}

struct Rewriter<'a> {
    scopes: &'a ScopeTree,
    target: &'a Target,
    label: &'a JsWord,
    names: &'a mut FxHashSet<JsWord>,
    program_data: &'a mut ProgramData,
}

impl Rewriter<'_> {
    fn take_args(&self, stmt: &mut Stmt) -> Option<Vec<Expr>> {
        if !self.target.is_tail_call(self.scopes, stmt) {
            return None;
        }
        match stmt {
            Stmt::Return(ReturnStmt { arg: Some(arg), .. }) => match &mut **arg {
                Expr::Call(call) => Some(std::mem::take(&mut call.args)),
                _ => None,
            },
            _ => None,
        }
    }

    fn assign(&mut self, name: JsWord, value: Expr) -> Stmt {
        let left = Expr::Ident(Ident::new(name, self.program_data.new_id()));
        let assign = Expr::Assign(AssignExpr {
            node_id: self.program_data.new_id(),
            op: AssignOp::Assign,
            left: Box::new(left),
            right: Box::new(value),
        });
        expr_stmt(assign, self.program_data)
    }

    /// Parameter assignments and the jump replacing one tail call.
    fn replacement(&mut self, args: Vec<Expr>) -> Vec<Stmt> {
        let target = self.target;
        let reads: Vec<FxHashSet<VarId>> = args
            .iter()
            .map(|arg| {
                let mut v = VarReads {
                    scopes: self.scopes,
                    vars: Default::default(),
                };
                arg.visit_with(&mut v);
                v.vars
            })
            .collect();
        let arg_count = args.len();

        let mut stmts = vec![];
        let mut deferred = vec![];
        for (k, arg) in args.into_iter().enumerate() {
            let param = target.param_names[k].clone();
            // A later argument still needs the old value.
            let needs_temp = reads[k + 1..]
                .iter()
                .any(|vars| vars.contains(&target.params[k]));
            if needs_temp {
                let temp = unique_name(&format!("{}_", param), self.names);
                stmts.push(Stmt::Var(VarDecl {
                    node_id: self.program_data.new_id(),
                    kind: VarDeclKind::Var,
                    decls: vec![VarDeclarator {
                        node_id: self.program_data.new_id(),
                        name: Ident::new(temp.clone(), self.program_data.new_id()),
                        init: Some(Box::new(arg)),
                    }],
                }));
                deferred.push((param, temp));
                continue;
            }
            let unchanged = matches!(&arg, Expr::Ident(i)
                if self.scopes.var_of(i.node_id) == Some(target.params[k]));
            if !unchanged {
                stmts.push(self.assign(param, arg));
            }
        }
        for (param, temp) in deferred {
            let value = Expr::Ident(Ident::new(temp, self.program_data.new_id()));
            stmts.push(self.assign(param, value));
        }
        for param in &target.param_names[arg_count..] {
            let value = undefined(self.program_data);
            stmts.push(self.assign(param.clone(), value));
        }
        stmts.push(Stmt::Continue(ContinueStmt {
            node_id: self.program_data.new_id(),
            label: Some(Ident::new(self.label.clone(), self.program_data.new_id())),
        }));
        stmts
    }
}

impl VisitMut for Rewriter<'_> {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        for mut stmt in std::mem::take(stmts) {
            match self.take_args(&mut stmt) {
                Some(args) => {
                    let replacement = self.replacement(args);
                    stmts.extend(replacement);
                }
                None => {
                    stmt.visit_mut_with(self);
                    stmts.push(stmt);
                }
            }
        }
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        match self.take_args(stmt) {
            Some(args) => {
                let replacement = self.replacement(args);
                *stmt = block(replacement, self.program_data);
            }
            None => stmt.visit_mut_children_with(self),
        }
    }

    fn visit_mut_function(&mut self, _: &mut Function) {}
}

struct VarReads<'a> {
    scopes: &'a ScopeTree,
    vars: FxHashSet<VarId>,
}

impl<'ast> Visit<'ast> for VarReads<'_> {
    fn visit_ident(&mut self, i: &'ast Ident) {
        if let Some(var) = self.scopes.var_of(i.node_id) {
            self.vars.insert(var);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        options::{Options, PassConfig},
        testing::test_transform,
    };

    fn options() -> Options {
        Options {
            passes: PassConfig {
                tail_calls: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn countdown() {
        test_transform(
            options(),
            "function count(n) { if (n === 0) return 0; return count(n - 1); } count(10);",
            "function count(n) { tail: while (true) { if (n === 0) return 0; n = n - 1; continue tail; } } count(10);",
        );
    }

    #[test]
    fn later_arguments_see_old_values() {
        test_transform(
            options(),
            "function sum(n, acc) { if (n === 0) return acc; return sum(n - 1, acc + n); } foo(sum(3, 0));",
            "function sum(n, acc) { tail: while (true) { if (n === 0) return acc; var n_ = n - 1; acc = acc + n; n = n_; continue tail; } } foo(sum(3, 0));",
        );
    }

    #[test]
    fn missing_arguments_and_fallthrough() {
        test_transform(
            options(),
            "function f(a, b) { if (a) { return f(); } foo(b); } f(1, 2);",
            "function f(a, b) { tail: while (true) { if (a) { a = void 0; b = void 0; continue tail; } foo(b); return; } } f(1, 2);",
        );
    }

    #[test]
    fn label_does_not_clash() {
        test_transform(
            options(),
            "var tail = 1; function g(n) { if (n) return g(n - 1); return tail; } g(2);",
            "var tail = 1; function g(n) { tail1: while (true) { if (n) { n = n - 1; continue tail1; } return tail; } } g(2);",
        );
    }

    #[test]
    fn reassigned_function_is_untouched() {
        let src = "function f(n) { return f(n - 1); } f = foo;";
        test_transform(options(), src, src);
    }

    #[test]
    fn arguments_object_blocks_rewrite() {
        let src = "function f(n) { foo(arguments); return f(n - 1); } f(1);";
        test_transform(options(), src, src);
    }

    #[test]
    fn uninitialized_var_blocks_rewrite() {
        let src = "function f(n) { var x; foo(x); x = n; return f(n - 1); } f(1);";
        test_transform(options(), src, src);
    }

    #[test]
    fn function_expression_name() {
        test_transform(
            options(),
            "foo(function loop(i) { if (i > 3) return i; return loop(i + 1); });",
            "foo(function loop(i) { tail: while (true) { if (i > 3) return i; i = i + 1; continue tail; } });",
        );
    }
}
