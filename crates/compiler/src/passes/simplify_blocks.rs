//! Cleans up statement lists: drops unreachable code, empty statements and
//! expression statements without effects, and flattens nested blocks.

use super::{var_decl, PassContext};
use crate::utils::{contains_fn_decl, var_declared_names};
use ast::*;
use ecma_visit::{VisitMut, VisitMutWith};
use std::mem;

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    let mut v = SimplifyBlocks {
        cx,
        program_data,
        in_body: false,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

struct SimplifyBlocks<'a, 'b> {
    cx: &'a PassContext<'b>,
    program_data: &'a mut ProgramData,
    /// The next statement list is a program or function body, which may
    /// start with directives.
    in_body: bool,
    changed: bool,
}

fn is_directive(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Expr(s) if matches!(&*s.expr, Expr::Lit(Lit::Str(_))))
}

fn is_hoisted_only(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Fn(_) => true,
        Stmt::Var(decl) => {
            decl.kind == VarDeclKind::Var && decl.decls.iter().all(|d| d.init.is_none())
        }
        _ => false,
    }
}

impl SimplifyBlocks<'_, '_> {
    /// Replaces the statements after an abrupt completion with the
    /// declarations they hoist.
    fn drop_unreachable(&mut self, stmts: &mut Vec<Stmt>) {
        let end = match stmts.iter().position(Stmt::is_abrupt_completion) {
            Some(i) => i + 1,
            None => return,
        };
        let rest = &stmts[end..];
        if rest.iter().all(is_hoisted_only) {
            return;
        }
        let blocks_removal = rest.iter().any(|stmt| match stmt {
            Stmt::Fn(_) => false,
            stmt => stmt.declares_block_scoped() || contains_fn_decl(stmt),
        });
        if blocks_removal {
            return;
        }

        let mut names = vec![];
        for stmt in stmts.split_off(end) {
            match stmt {
                Stmt::Fn(f) => stmts.push(Stmt::Fn(f)),
                stmt => names.extend(var_declared_names(&stmt)),
            }
        }
        if !names.is_empty() {
            stmts.push(var_decl(names, self.program_data));
        }
        self.changed = true;
    }
}

impl VisitMut for SimplifyBlocks<'_, '_> {
    fn visit_mut_program(&mut self, program: &mut Program) {
        self.in_body = true;
        program.visit_mut_children_with(self);
    }

    fn visit_mut_function(&mut self, f: &mut Function) {
        self.in_body = true;
        f.body.stmts.visit_mut_with(self);
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        let mut prologue = if mem::take(&mut self.in_body) {
            stmts.iter().take_while(|stmt| is_directive(stmt)).count()
        } else {
            0
        };
        stmts.visit_mut_children_with(self);
        self.drop_unreachable(stmts);

        let mut out = Vec::with_capacity(stmts.len());
        for stmt in mem::take(stmts) {
            if prologue > 0 {
                prologue -= 1;
                out.push(stmt);
                continue;
            }
            match stmt {
                Stmt::Empty(_) => self.changed = true,
                Stmt::Expr(s) if self.cx.is_pure(s.expr.node_id()) => self.changed = true,
                Stmt::Block(b) if !b.stmts.iter().any(Stmt::declares_block_scoped) => {
                    self.changed = true;
                    out.extend(b.stmts);
                }
                stmt => out.push(stmt),
            }
        }
        *stmts = out;
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
                simplify_blocks: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn unreachable_code() {
        test_transform(
            options(),
            "function f() { return 1; foo(); var a = 2; function g() {} } bar(f);",
            "function f() { return 1; function g() {} var a; } bar(f);",
        );
    }

    #[test]
    fn empty_and_pure_statements() {
        test_transform(options(), "; 1; foo(); { bar(); }", "foo(); bar();");
    }

    #[test]
    fn directives_are_kept() {
        test_transform(
            options(),
            "'use strict'; foo(); 'x'; function f() { 'use strict'; }",
            "'use strict'; foo(); function f() { 'use strict'; }",
        );
    }

    #[test]
    fn blocks_with_lexical_declarations_stay() {
        let src = "{ let x = foo(); bar(x); }";
        test_transform(options(), src, src);
    }

    #[test]
    fn labeled_blocks_stay() {
        let src = "l: { foo(); break l; }";
        test_transform(options(), src, src);
    }

    #[test]
    fn single_statement_bodies_are_not_unwrapped() {
        let src = "if (foo()) { if (bar()) baz(); } else qux();";
        test_transform(options(), src, src);
    }
}
