//! Unrolls `for-in` loops over objects whose keys are known.

use super::{block, expr_stmt, var_decl, PassContext};
use crate::utils::{contains_break_or_continue, contains_fn_decl};
use ast::*;
use atoms::JsWord;
use ecma_visit::{CloneNode, VisitMut, VisitMutWith};

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    let mut v = UnrollLoops {
        cx,
        program_data,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

struct UnrollLoops<'a, 'b> {
    cx: &'a PassContext<'b>,
    program_data: &'a mut ProgramData,
    changed: bool,
}

impl UnrollLoops<'_, '_> {
    fn unroll(&mut self, s: &ForInStmt) -> Option<Stmt> {
        let cx = self.cx;
        let keys = cx.result.for_in_keys.get(&s.node_id)?;
        if !cx.is_pure(s.right.node_id()) {
            return None;
        }
        if contains_break_or_continue(&s.body) || contains_fn_decl(&s.body) {
            return None;
        }
        let (name, declared) = match &s.left {
            ForHead::VarDecl(decl) if decl.kind == VarDeclKind::Var && decl.decls.len() == 1 => {
                (decl.decls[0].name.clone(), true)
            }
            ForHead::Expr(e) => (e.as_ident()?.clone(), false),
            _ => return None,
        };

        let mut stmts = vec![];
        if declared {
            stmts.push(var_decl(vec![name.clone()], self.program_data));
        }
        for key in keys {
            let iteration = self.iteration(&name.sym, key, &s.body);
            stmts.push(iteration);
        }
        Some(block(stmts, self.program_data))
    }

    /// `{ name = "key"; body }`
    fn iteration(&mut self, name: &JsWord, key: &JsWord, body: &Stmt) -> Stmt {
        let pd = &mut *self.program_data;
        let assign = Expr::Assign(AssignExpr {
            node_id: pd.new_id(),
            op: AssignOp::Assign,
            left: Box::new(Expr::Ident(Ident::new(name.clone(), pd.new_id()))),
            right: Box::new(Expr::Lit(Lit::Str(Str {
                node_id: pd.new_id(),
                value: key.clone(),
            }))),
        });
        let assign = expr_stmt(assign, pd);
        let body = body.clone_node(pd);
        block(vec![assign, body], pd)
    }
}

impl VisitMut for UnrollLoops<'_, '_> {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);
        if let Stmt::ForIn(s) = stmt {
            if let Some(unrolled) = self.unroll(s) {
                *stmt = unrolled;
                self.changed = true;
            }
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
                unroll_loops: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn known_keys() {
        test_transform(
            options(),
            "var o = { a: 1, b: 2 }; for (var k in o) { console.log(k); }",
            "var o = { a: 1, b: 2 }; { var k; { k = 'a'; { console.log(k); } } { k = 'b'; { console.log(k); } } }",
        );
    }

    #[test]
    fn identifier_head() {
        test_transform(
            options(),
            "var k; for (k in { x: 1 }) foo(k);",
            "var k; { { k = 'x'; foo(k); } }",
        );
    }

    #[test]
    fn empty_object() {
        test_transform(options(), "for (var k in {}) foo(k);", "{ var k; }");
    }

    #[test]
    fn break_blocks_unrolling() {
        let src = "var o = { a: 1 }; for (var k in o) { if (k) break; }";
        test_transform(options(), src, src);
    }

    #[test]
    fn escaped_object_is_not_unrolled() {
        let src = "var o = { a: 1 }; foo(o); for (var k in o) { bar(k); }";
        test_transform(options(), src, src);
    }

    #[test]
    fn object_changed_in_body_is_not_unrolled() {
        let src = "var o = { a: 1 }; for (var k in o) { o.b = 1; }";
        test_transform(options(), src, src);
    }
}
