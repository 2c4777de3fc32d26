//! Rewrites driven by the facts of a converged analysis.
//!
//! Every pass returns whether it changed the program. Nodes a pass creates
//! have no facts, so a pass never acts on its own output before the next
//! analysis.

use crate::{
    analysis::AnalysisResult,
    options::Options,
    registry::Registry,
    value::{Primitive, Value},
};
use ast::*;
use atoms::js_word;
use tracing::debug;

pub mod dead_branches;
pub mod fold_constants;
pub mod inline_functions;
pub mod remove_unused;
pub mod simplify_blocks;
pub mod tail_calls;
pub mod unroll_loops;

pub struct PassContext<'a> {
    pub options: &'a Options,
    pub result: &'a AnalysisResult,
    pub registry: &'a Registry,
}

impl PassContext<'_> {
    /// The value of an expression, if it was evaluated without effects.
    pub fn pure_value(&self, node: NodeId) -> Option<&Value> {
        self.result
            .facts_of(node)
            .filter(|facts| facts.pure)
            .map(|facts| &facts.value)
    }

    pub fn is_pure(&self, node: NodeId) -> bool {
        self.result.is_pure(node)
    }
}

type Pass = fn(&mut Program, &mut ProgramData, &PassContext<'_>) -> bool;

/// Runs the enabled passes in order, stopping after the first one that
/// changes the program. Returns its name.
pub fn run(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> Option<&'static str> {
    let config = cx.options.passes;
    let passes: [(&'static str, bool, Pass); 7] = [
        ("dead_branches", config.dead_branches, dead_branches::process),
        ("fold_constants", config.fold_constants, fold_constants::process),
        ("inline_functions", config.inline_functions, inline_functions::process),
        ("tail_calls", config.tail_calls, tail_calls::process),
        ("unroll_loops", config.unroll_loops, unroll_loops::process),
        ("remove_unused", config.remove_unused, remove_unused::process),
        ("simplify_blocks", config.simplify_blocks, simplify_blocks::process),
    ];
    for (name, enabled, pass) in passes {
        if enabled && pass(program, program_data, cx) {
            debug!("{} changed the program", name);
            return Some(name);
        }
    }
    None
}

fn number_lit(value: f64, program_data: &mut ProgramData) -> Expr {
    Expr::Lit(Lit::Num(Number {
        node_id: program_data.new_id(),
        value,
    }))
}

fn unary(op: UnaryOp, arg: Expr, program_data: &mut ProgramData) -> Expr {
    Expr::Unary(UnaryExpr {
        node_id: program_data.new_id(),
        op,
        arg: Box::new(arg),
    })
}

/// `void 0`
pub(crate) fn undefined(program_data: &mut ProgramData) -> Expr {
    let zero = number_lit(0.0, program_data);
    unary(UnaryOp::Void, zero, program_data)
}

/// The shortest expression that always evaluates to `p`.
pub(crate) fn literal(p: &Primitive, program_data: &mut ProgramData) -> Expr {
    match p {
        Primitive::Undefined => undefined(program_data),
        Primitive::Null => Expr::Lit(Lit::Null(Null {
            node_id: program_data.new_id(),
        })),
        Primitive::Bool(value) => Expr::Lit(Lit::Bool(Bool {
            node_id: program_data.new_id(),
            value: *value,
        })),
        Primitive::String(value) => Expr::Lit(Lit::Str(Str {
            node_id: program_data.new_id(),
            value: value.clone(),
        })),
        Primitive::Number(n) if n.is_nan() => Expr::Ident(Ident::new(js_word!("NaN"), program_data.new_id())),
        Primitive::Number(n) => {
            let magnitude = if n.is_infinite() {
                Expr::Ident(Ident::new(js_word!("Infinity"), program_data.new_id()))
            } else {
                number_lit(n.abs(), program_data)
            };
            if n.is_sign_negative() {
                unary(UnaryOp::Minus, magnitude, program_data)
            } else {
                magnitude
            }
        }
    }
}

/// Whether `expr` already is what [`literal`] produces for `p`.
pub(crate) fn is_literal(expr: &Expr, p: &Primitive) -> bool {
    match (expr, p) {
        (Expr::Unary(u), Primitive::Undefined) => {
            u.op == UnaryOp::Void && matches!(&*u.arg, Expr::Lit(Lit::Num(n)) if n.value == 0.0)
        }
        (Expr::Lit(Lit::Null(_)), Primitive::Null) => true,
        (Expr::Lit(Lit::Bool(b)), Primitive::Bool(value)) => b.value == *value,
        (Expr::Lit(Lit::Str(s)), Primitive::String(value)) => s.value == *value,
        (Expr::Ident(i), Primitive::Number(n)) if n.is_nan() => i.sym == js_word!("NaN"),
        (Expr::Ident(i), Primitive::Number(n)) if *n == f64::INFINITY => {
            i.sym == js_word!("Infinity")
        }
        (Expr::Lit(Lit::Num(lit)), Primitive::Number(n)) => {
            !n.is_sign_negative() && lit.value == *n
        }
        (Expr::Unary(u), Primitive::Number(n)) if u.op == UnaryOp::Minus && n.is_sign_negative() => {
            is_literal(&u.arg, &Primitive::Number(-n))
        }
        _ => false,
    }
}

/// `var a, b;`
pub(crate) fn var_decl(names: Vec<Ident>, program_data: &mut ProgramData) -> Stmt {
    Stmt::Var(VarDecl {
        node_id: program_data.new_id(),
        kind: VarDeclKind::Var,
        decls: names
            .into_iter()
            .map(|name| VarDeclarator {
                node_id: program_data.new_id(),
                name: Ident::new(name.sym, program_data.new_id()),
                init: None,
            })
            .collect(),
    })
}

pub(crate) fn expr_stmt(expr: Expr, program_data: &mut ProgramData) -> Stmt {
    Stmt::Expr(ExprStmt {
        node_id: program_data.new_id(),
        expr: Box::new(expr),
    })
}

pub(crate) fn block(stmts: Vec<Stmt>, program_data: &mut ProgramData) -> Stmt {
    Stmt::Block(BlockStmt {
        node_id: program_data.new_id(),
        stmts,
    })
}

pub(crate) fn empty(program_data: &mut ProgramData) -> Stmt {
    Stmt::Empty(EmptyStmt {
        node_id: program_data.new_id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_canonical() {
        let mut program_data = ProgramData::default();
        for p in [
            Primitive::Undefined,
            Primitive::Null,
            Primitive::Bool(false),
            Primitive::Number(1.5),
            Primitive::Number(-2.0),
            Primitive::Number(-0.0),
            Primitive::Number(f64::NAN),
            Primitive::Number(f64::NEG_INFINITY),
            Primitive::String("s".into()),
        ] {
            let expr = literal(&p, &mut program_data);
            assert!(is_literal(&expr, &p), "{:?}", p);
        }
    }

    #[test]
    fn zero_signs_differ() {
        let mut program_data = ProgramData::default();
        let zero = literal(&Primitive::Number(0.0), &mut program_data);
        assert!(!is_literal(&zero, &Primitive::Number(-0.0)));
        let neg = literal(&Primitive::Number(-0.0), &mut program_data);
        assert!(!is_literal(&neg, &Primitive::Number(0.0)));
    }
}
