//! Removes branches whose condition always has the same truthiness.
//!
//! `var` declarations in a removed branch still hoist, so their names are
//! kept in a bare `var` statement. A test with effects is kept as an
//! expression in front of the surviving branch.

use super::{block, empty, expr_stmt, var_decl, PassContext};
use crate::utils::{contains_fn_decl, var_declared_names};
use ast::*;
use ecma_visit::{VisitMut, VisitMutWith};

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    let mut v = DeadBranches {
        cx,
        program_data,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

struct DeadBranches<'a, 'b> {
    cx: &'a PassContext<'b>,
    program_data: &'a mut ProgramData,
    changed: bool,
}

impl DeadBranches<'_, '_> {
    /// Truthiness the node always has, and whether evaluating it is pure.
    fn known_truthiness(&self, node: NodeId) -> Option<(bool, bool)> {
        let facts = self.cx.result.facts_of(node)?;
        facts.value.truthiness().map(|t| (t, facts.pure))
    }

    /// `front`, then the names hoisted out of `removed`, then `kept`.
    fn assemble(&mut self, mut stmts: Vec<Stmt>, removed: Option<&Stmt>, kept: Vec<Stmt>) -> Stmt {
        let names = removed.map(var_declared_names).unwrap_or_default();
        if !names.is_empty() {
            stmts.push(var_decl(names, self.program_data));
        }
        stmts.extend(kept);
        match stmts.len() {
            0 => empty(self.program_data),
            1 => stmts.remove(0),
            _ => block(stmts, self.program_data),
        }
    }

    fn test_stmt(&mut self, pure: bool, test: &mut Expr) -> Vec<Stmt> {
        if pure {
            return vec![];
        }
        let test = test.take();
        vec![expr_stmt(test, self.program_data)]
    }

    fn fold_stmt(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
        match stmt {
            Stmt::If(s) => {
                let (truthy, pure) = self.known_truthiness(s.test.node_id())?;
                let removed = if truthy { s.alt.as_deref() } else { Some(&*s.cons) };
                if removed.map_or(false, contains_fn_decl) {
                    return None;
                }
                let removed = removed.cloned();
                let kept = if truthy {
                    Some(std::mem::replace(&mut *s.cons, empty(self.program_data)))
                } else {
                    s.alt.take().map(|alt| *alt)
                };
                let front = self.test_stmt(pure, &mut s.test);
                Some(self.assemble(front, removed.as_ref(), kept.into_iter().collect()))
            }
            Stmt::While(s) => {
                let (truthy, pure) = self.known_truthiness(s.test.node_id())?;
                if truthy || contains_fn_decl(&s.body) {
                    return None;
                }
                let front = self.test_stmt(pure, &mut s.test);
                let body = std::mem::replace(&mut *s.body, empty(self.program_data));
                Some(self.assemble(front, Some(&body), vec![]))
            }
            Stmt::For(s) => {
                let (truthy, pure) = self.known_truthiness(s.test.as_ref()?.node_id())?;
                if truthy || contains_fn_decl(&s.body) {
                    return None;
                }
                let mut front = match s.init.take() {
                    Some(VarDeclOrExpr::VarDecl(decl)) => vec![Stmt::Var(decl)],
                    Some(VarDeclOrExpr::Expr(e)) => vec![expr_stmt(*e, self.program_data)],
                    None => vec![],
                };
                if let Some(test) = &mut s.test {
                    front.extend(self.test_stmt(pure, test));
                }
                let body = std::mem::replace(&mut *s.body, empty(self.program_data));
                Some(self.assemble(front, Some(&body), vec![]))
            }
            _ => None,
        }
    }

    fn fold_expr(&mut self, expr: &mut Expr) -> Option<Expr> {
        let (test, taken) = match expr {
            Expr::Cond(e) => {
                let (truthy, pure) = self.known_truthiness(e.test.node_id())?;
                let branch = if truthy { e.cons.take() } else { e.alt.take() };
                ((!pure).then(|| e.test.take()), branch)
            }
            Expr::Bin(e) if e.op.is_logical() => {
                let (truthy, pure) = self.known_truthiness(e.left.node_id())?;
                let short_circuits = match e.op {
                    BinaryOp::LogicalAnd => !truthy,
                    _ => truthy,
                };
                if short_circuits {
                    return Some(e.left.take());
                }
                ((!pure).then(|| e.left.take()), e.right.take())
            }
            _ => return None,
        };
        Some(match test {
            Some(test) => Expr::Seq(SeqExpr {
                node_id: self.program_data.new_id(),
                exprs: vec![test, taken],
            }),
            None => taken,
        })
    }
}

impl VisitMut for DeadBranches<'_, '_> {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);
        if let Some(replacement) = self.fold_stmt(stmt) {
            *stmt = replacement;
            self.changed = true;
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        if let Some(replacement) = self.fold_expr(expr) {
            *expr = replacement;
            self.changed = true;
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
                dead_branches: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn true_if_keeps_consequent() {
        test_transform(
            options(),
            "if (true) { console.log(1); } else { console.log(2); }",
            "{ console.log(1); }",
        );
    }

    #[test]
    fn false_if_without_else_is_removed() {
        test_transform(options(), "if (0) { foo(); } bar();", "; bar();");
    }

    #[test]
    fn removed_branch_keeps_var_names() {
        test_transform(
            options(),
            "if (false) { var a = 1; } else { foo(a); }",
            "{ var a; { foo(a); } }",
        );
    }

    #[test]
    fn impure_test_is_kept() {
        test_transform(
            options(),
            "if ((bar(), true)) foo(); else baz();",
            "{ bar(), true; foo(); }",
        );
    }

    #[test]
    fn unknown_test_is_untouched() {
        test_transform(
            options(),
            "if (foo()) bar(); else baz();",
            "if (foo()) bar(); else baz();",
        );
    }

    #[test]
    fn function_declaration_in_removed_branch_blocks_removal() {
        test_transform(
            options(),
            "if (false) { function f() {} }",
            "if (false) { function f() {} }",
        );
    }

    #[test]
    fn conditional_and_logical_expressions() {
        test_transform(
            options(),
            "foo(true ? 1 : 2); foo(0 && bar()); foo(1 && bar()); foo('' || 3);",
            "foo(1); foo(0); foo(bar()); foo(3);",
        );
    }

    #[test]
    fn false_loops_are_removed() {
        test_transform(
            options(),
            "while (false) { foo(); } for (var i = 0; i < 0; i++) { var j; }",
            "; { var i = 0; var j; }",
        );
    }
}
