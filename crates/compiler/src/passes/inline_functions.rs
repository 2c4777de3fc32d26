//! Inlines calls to user functions.
//!
//! A call whose result is always the same primitive is replaced by it. A call
//! to a function whose body is a single `return` of an expression over its
//! parameters is replaced by that expression with the arguments substituted.

use super::{literal, undefined, PassContext};
use crate::{
    scope::{ScopeTree, SiteKind, VarId},
    value::Value,
};
use ast::*;
use atoms::JsWord;
use ecma_visit::{CloneNode, Visit, VisitMut, VisitMutWith, VisitWith};
use rustc_hash::{FxHashMap, FxHashSet};

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    let mut finder = CandidateFinder {
        scopes: &cx.result.scopes,
        found: Default::default(),
    };
    program.visit_with(&mut finder);

    let mut v = InlineFunctions {
        cx,
        program_data,
        candidates: finder.found,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

/// A function whose calls can be replaced by its returned expression.
struct Candidate {
    params: Vec<JsWord>,
    body: Expr,
}

struct CandidateFinder<'a> {
    scopes: &'a ScopeTree,
    found: FxHashMap<NodeId, Candidate>,
}

impl<'ast> Visit<'ast> for CandidateFinder<'_> {
    fn visit_function(&mut self, f: &'ast Function) {
        if let Some(candidate) = candidate(self.scopes, f) {
            self.found.insert(f.node_id, candidate);
        }
        f.visit_children_with(self);
    }
}

fn candidate(scopes: &ScopeTree, f: &Function) -> Option<Candidate> {
    let info = scopes.function(f.node_id)?;
    if info.uses_arguments || info.uses_this {
        return None;
    }
    let body = match f.body.stmts.as_slice() {
        [Stmt::Return(ReturnStmt { arg: Some(arg), .. })] => arg,
        _ => return None,
    };
    let params: Vec<JsWord> = f.params.iter().map(|p| p.sym.clone()).collect();
    let unique: FxHashSet<_> = params.iter().collect();
    if unique.len() != params.len() {
        return None;
    }

    let mut uses = ParamUses {
        scopes,
        params: &info.params,
        counts: vec![0; info.params.len()],
        ok: true,
    };
    body.visit_with(&mut uses);
    if !uses.ok || uses.counts.iter().any(|&count| count > 1) {
        return None;
    }
    Some(Candidate {
        params,
        body: (**body).clone(),
    })
}

/// Counts reads of each parameter. Anything else that refers to a variable
/// disqualifies the expression.
struct ParamUses<'a> {
    scopes: &'a ScopeTree,
    params: &'a [VarId],
    counts: Vec<usize>,
    ok: bool,
}

impl<'ast> Visit<'ast> for ParamUses<'_> {
    fn visit_ident(&mut self, i: &'ast Ident) {
        let param = self
            .scopes
            .var_of(i.node_id)
            .and_then(|var| self.params.iter().position(|p| *p == var));
        match param {
            Some(index) if self.scopes.site_kind(i.node_id) == Some(SiteKind::Read) => {
                self.counts[index] += 1
            }
            _ => self.ok = false,
        }
    }

    fn visit_function(&mut self, _: &'ast Function) {
        self.ok = false;
    }
}

struct InlineFunctions<'a, 'b> {
    cx: &'a PassContext<'b>,
    program_data: &'a mut ProgramData,
    candidates: FxHashMap<NodeId, Candidate>,
    changed: bool,
}

impl InlineFunctions<'_, '_> {
    fn inline(&mut self, expr: &mut Expr) -> Option<Expr> {
        let call = match expr {
            Expr::Call(call) => call,
            _ => return None,
        };
        let callee = self.cx.pure_value(call.callee.node_id())?.as_reference()?;
        let function = self.cx.registry.function_node(callee)?;

        if let Some(p) = self.cx.pure_value(call.node_id).and_then(Value::as_primitive) {
            return Some(literal(p, self.program_data));
        }

        if call.callee.as_ident().is_none() {
            return None;
        }
        let candidate = self.candidates.get(&function)?;
        if call.args.len() > candidate.params.len()
            || !call.args.iter().all(|arg| self.cx.is_pure(arg.node_id()))
        {
            return None;
        }
        let pure = self
            .cx
            .result
            .facts
            .summaries
            .get(&function)
            .map_or(false, |summary| summary.pure);
        // Effects of the body would now come before the arguments are read.
        if !pure && !call.args.iter().all(|arg| matches!(arg, Expr::Lit(_))) {
            return None;
        }

        let args = candidate
            .params
            .iter()
            .cloned()
            .zip(call.args.drain(..))
            .collect();
        let mut body = candidate.body.clone_node(self.program_data);
        body.visit_mut_with(&mut Substitute {
            params: &candidate.params,
            args,
            program_data: &mut *self.program_data,
        });
        Some(body)
    }
}

impl VisitMut for InlineFunctions<'_, '_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        if let Some(inlined) = self.inline(expr) {
            *expr = inlined;
            self.changed = true;
        }
    }
}

struct Substitute<'a> {
    params: &'a [JsWord],
    args: FxHashMap<JsWord, Expr>,
    program_data: &'a mut ProgramData,
}

impl VisitMut for Substitute<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        let name = match expr {
            Expr::Ident(i) if self.params.contains(&i.sym) => i.sym.clone(),
            _ => return expr.visit_mut_children_with(self),
        };
        *expr = match self.args.remove(&name) {
            Some(arg) => arg,
            None => undefined(self.program_data),
        };
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
                inline_functions: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn constant_result() {
        test_transform(
            options(),
            "function f(a) { return a + 1; } foo(f(1));",
            "function f(a) { return a + 1; } foo(2);",
        );
    }

    #[test]
    fn substitutes_arguments() {
        test_transform(
            options(),
            "var x = foo() ? 1 : 2; function f(a, b) { return a * b; } foo(f(x, 2));",
            "var x = foo() ? 1 : 2; function f(a, b) { return a * b; } foo(x * 2);",
        );
    }

    #[test]
    fn missing_arguments_are_undefined() {
        test_transform(
            options(),
            "var x = foo() ? 1 : 2; function f(a, b) { return [a, b]; } foo(f(x));",
            "var x = foo() ? 1 : 2; function f(a, b) { return [a, b]; } foo([x, void 0]);",
        );
    }

    #[test]
    fn free_variables_block_substitution() {
        let src = "var z = foo(); function f(a) { return a + z; } var x = foo() ? 1 : 2; foo(f(x));";
        test_transform(options(), src, src);
    }

    #[test]
    fn parameters_used_twice_block_substitution() {
        let src = "function sq(a) { return a * a; } var x = foo() ? 1 : 2; foo(sq(x));";
        test_transform(options(), src, src);
    }
}
