//! Replaces expressions that always evaluate to the same primitive, without
//! effects, with that primitive's literal.

use super::{is_literal, literal, PassContext};
use crate::{scope::VarKind, value::Primitive};
use ast::*;
use ecma_visit::{VisitMut, VisitMutWith};

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    // `NaN` and `Infinity` are printed as identifiers.
    let shadowed = cx.result.scopes.vars().any(|(_, var)| {
        var.kind != VarKind::Implicit && (&*var.name == "NaN" || &*var.name == "Infinity")
    });
    let mut v = FoldConstants {
        cx,
        program_data,
        shadowed,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

struct FoldConstants<'a, 'b> {
    cx: &'a PassContext<'b>,
    program_data: &'a mut ProgramData,
    shadowed: bool,
    changed: bool,
}

impl FoldConstants<'_, '_> {
    fn fold(&mut self, expr: &mut Expr) {
        let p = match self.cx.pure_value(expr.node_id()).and_then(|v| v.as_primitive()) {
            Some(p) => p,
            None => return,
        };
        if is_literal(expr, p) {
            return;
        }
        if self.shadowed && matches!(p, Primitive::Number(n) if n.is_nan() || n.is_infinite()) {
            return;
        }
        *expr = literal(p, self.program_data);
        self.changed = true;
    }

    /// Assignment targets are visited for their operands only.
    fn visit_target(&mut self, target: &mut Expr) {
        if let Expr::Member(m) = target {
            m.visit_mut_children_with(self);
        }
    }
}

impl VisitMut for FoldConstants<'_, '_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Assign(e) => {
                self.visit_target(&mut e.left);
                e.right.visit_mut_with(self);
            }
            Expr::Update(e) => self.visit_target(&mut e.arg),
            Expr::Unary(e) if e.op == UnaryOp::Delete => self.visit_target(&mut e.arg),
            Expr::Call(CallExpr { callee, args, .. }) | Expr::New(NewExpr { callee, args, .. }) => {
                callee.visit_mut_children_with(self);
                for arg in args {
                    arg.visit_mut_with(self);
                }
                self.fold(expr);
            }
            _ => {
                expr.visit_mut_children_with(self);
                self.fold(expr);
            }
        }
    }

    fn visit_mut_for_in_stmt(&mut self, s: &mut ForInStmt) {
        s.right.visit_mut_with(self);
        s.body.visit_mut_with(self);
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
                fold_constants: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn variable_reads() {
        test_transform(options(), "var x = 1; console.log(x);", "var x = 1; console.log(1);");
    }

    #[test]
    fn arithmetic() {
        test_transform(
            options(),
            "foo(1 + 2 * 3, 'a' + 1, 1 / 0, 0 / 0, -(1 - 1), typeof 1);",
            "foo(7, 'a1', Infinity, NaN, -0, 'number');",
        );
    }

    #[test]
    fn assignment_targets_are_kept() {
        test_transform(
            options(),
            "var x = 1; x = x + 1; x++; foo(x);",
            "var x = 1; x = 2; x++; foo(3);",
        );
    }

    #[test]
    fn impure_expressions_are_kept() {
        test_transform(options(), "foo((bar(), 1));", "foo((bar(), 1));");
    }

    #[test]
    fn property_reads() {
        test_transform(
            options(),
            "var o = { x: 1 }; o.x = 2; console.log(o.x);",
            "var o = { x: 1 }; o.x = 2; console.log(2);",
        );
    }

    #[test]
    fn shadowed_nan_is_not_introduced() {
        test_transform(
            options(),
            "function f(NaN) { return NaN; } foo(0 / 0);",
            "function f(NaN) { return NaN; } foo(0 / 0);",
        );
    }

    #[test]
    fn undefined_becomes_void() {
        test_transform(options(), "var u; foo(u);", "var u; foo(void 0);");
    }
}
