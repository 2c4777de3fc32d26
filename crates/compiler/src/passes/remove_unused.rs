//! Removes variables that are never read, along with the stores into them.
//!
//! Stores into properties of an unused variable's objects go too, as long as
//! every object the variable ever held is a fresh literal, so that no setter
//! can observe the store.

use super::{block, empty, expr_stmt, PassContext};
use crate::scope::{SiteKind, VarId, VarKind};
use ast::*;
use atoms::js_word;
use ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use rustc_hash::FxHashSet;
use std::mem;

pub fn process(program: &mut Program, program_data: &mut ProgramData, cx: &PassContext<'_>) -> bool {
    let scopes = &cx.result.scopes;
    let candidates: FxHashSet<VarId> = scopes
        .vars()
        .filter(|(id, var)| {
            if matches!(var.kind, VarKind::Param | VarKind::CatchParam | VarKind::FnExprName) {
                return false;
            }
            if var.global && !cx.options.no_global_property_reads {
                return false;
            }
            // An assignment may throw before or after initialization.
            if var.block_scoped && var.writes.iter().any(|site| site.kind != SiteKind::Init) {
                return false;
            }
            scopes.is_unused(*id)
        })
        .map(|(id, _)| id)
        .collect();
    if candidates.is_empty() {
        return false;
    }

    let fresh: FxHashSet<VarId> = if cx.options.no_native_overwrites {
        let mut scan = FreshScan {
            cx,
            candidates: &candidates,
            stale: Default::default(),
        };
        program.visit_with(&mut scan);
        candidates.difference(&scan.stale).copied().collect()
    } else {
        FxHashSet::default()
    };
    // Property stores keep the variable alive unless they can go too.
    let unused = candidates
        .into_iter()
        .filter(|var| scopes.var(*var).reads.is_empty() || fresh.contains(var))
        .collect();

    let mut v = RemoveUnused {
        cx,
        program_data,
        unused,
        fresh,
        changed: false,
    };
    program.visit_mut_with(&mut v);
    v.changed
}

/// An object literal, array literal or function: an object nothing else can
/// have a reference to, without accessors on its prototype chain.
fn is_fresh_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Array(_) | Expr::Fn(_) => true,
        Expr::Object(o) => o.props.iter().all(|prop| match prop {
            Prop::KeyValue(p) => !matches!(
                &p.key,
                PropName::Ident(Ident { sym, .. }) | PropName::Str(Str { value: sym, .. })
                    if *sym == js_word!("__proto__")
            ),
            _ => false,
        }),
        _ => false,
    }
}

/// For a property store into a variable holding fresh objects: the key
/// expression, if it has to be kept. `None` if the store can't be removed.
fn removable_store(cx: &PassContext<'_>, obj: &Ident, prop: &MemberProp) -> Option<Option<NodeId>> {
    // The store throws if the variable doesn't hold an object yet.
    let holds_objects = cx
        .result
        .facts_of(obj.node_id)?
        .value
        .singles()
        .map_or(false, |singles| singles.iter().all(|s| s.as_reference().is_some()));
    if !holds_objects {
        return None;
    }
    match prop {
        MemberProp::Ident(_) => Some(None),
        MemberProp::Computed(key) => {
            let facts = cx.result.facts_of(key.node_id())?;
            if !facts.value.is_primitive() {
                return None;
            }
            Some((!facts.pure).then(|| key.node_id()))
        }
    }
}

/// Finds candidates that are assigned something other than a fresh literal,
/// or whose property stores can't all be removed.
struct FreshScan<'a, 'b> {
    cx: &'a PassContext<'b>,
    candidates: &'a FxHashSet<VarId>,
    stale: FxHashSet<VarId>,
}

impl FreshScan<'_, '_> {
    fn store(&mut self, ident: &Ident, value: Option<&Expr>) {
        if let Some(var) = self.cx.result.scopes.var_of(ident.node_id) {
            if self.candidates.contains(&var) && !value.map_or(false, is_fresh_literal) {
                self.stale.insert(var);
            }
        }
    }

    /// A store that stays would outlive the declaration it needs.
    fn property_store(&mut self, obj: &Ident, prop: &MemberProp) {
        if let Some(var) = self.cx.result.scopes.var_of(obj.node_id) {
            if self.candidates.contains(&var) && removable_store(self.cx, obj, prop).is_none() {
                self.stale.insert(var);
            }
        }
    }
}

impl<'ast> Visit<'ast> for FreshScan<'_, '_> {
    fn visit_var_declarator(&mut self, d: &'ast VarDeclarator) {
        if let Some(init) = &d.init {
            self.store(&d.name, Some(init));
        }
        d.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, e: &'ast AssignExpr) {
        match &*e.left {
            Expr::Ident(i) => self.store(i, Some(&e.right)),
            Expr::Member(m) if e.op == AssignOp::Assign => {
                if let Expr::Ident(obj) = &*m.obj {
                    self.property_store(obj, &m.prop);
                }
            }
            _ => {}
        }
        e.visit_children_with(self);
    }
}

struct RemoveUnused<'a, 'b> {
    cx: &'a PassContext<'b>,
    program_data: &'a mut ProgramData,
    unused: FxHashSet<VarId>,
    fresh: FxHashSet<VarId>,
    changed: bool,
}

impl RemoveUnused<'_, '_> {
    fn is_unused(&self, ident: &Ident) -> bool {
        self.cx
            .result
            .scopes
            .var_of(ident.node_id)
            .map_or(false, |var| self.unused.contains(&var))
    }

    /// For `x.p = e` where `x` only ever holds fresh literals: the key
    /// expression, if it has to be kept.
    fn dead_property_store(&self, m: &MemberExpr) -> Option<Option<NodeId>> {
        let obj = m.obj.as_ident()?;
        let var = self.cx.result.scopes.var_of(obj.node_id)?;
        if !self.fresh.contains(&var) {
            return None;
        }
        removable_store(self.cx, obj, &m.prop)
    }

    /// A statement that only stores into an unused variable.
    fn is_dead_store(&self, expr: &Expr) -> bool {
        let e = match expr {
            Expr::Assign(e) if e.op == AssignOp::Assign => e,
            _ => return false,
        };
        if !self.cx.is_pure(e.right.node_id()) {
            return false;
        }
        match &*e.left {
            Expr::Ident(i) => self.is_unused(i),
            Expr::Member(m) => self.dead_property_store(m) == Some(None),
            _ => false,
        }
    }

    fn split_var_decl(&mut self, decl: VarDecl) -> Vec<Stmt> {
        let VarDecl { kind, decls, .. } = decl;
        let mut out = vec![];
        let mut kept = vec![];
        for d in decls {
            if !self.is_unused(&d.name) {
                kept.push(d);
                continue;
            }
            match d.init {
                Some(init) if !self.cx.is_pure(init.node_id()) => {
                    if !kept.is_empty() {
                        out.push(Stmt::Var(VarDecl {
                            node_id: self.program_data.new_id(),
                            kind: kind.clone(),
                            decls: mem::take(&mut kept),
                        }));
                    }
                    out.push(expr_stmt(*init, self.program_data));
                }
                _ => {}
            }
        }
        if !kept.is_empty() {
            out.push(Stmt::Var(VarDecl {
                node_id: self.program_data.new_id(),
                kind,
                decls: kept,
            }));
        }
        out
    }

    /// The statements replacing `stmt`.
    fn rewrite_stmt(&mut self, stmt: Stmt) -> Vec<Stmt> {
        match stmt {
            Stmt::Fn(f) if self.is_unused(&f.ident) => {}
            Stmt::Var(decl) if decl.decls.iter().any(|d| self.is_unused(&d.name)) => {
                self.changed = true;
                return self.split_var_decl(decl);
            }
            Stmt::Expr(s) if self.is_dead_store(&s.expr) => {}
            stmt => return vec![stmt],
        }
        self.changed = true;
        vec![]
    }
}

impl VisitMut for RemoveUnused<'_, '_> {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        for stmt in mem::take(stmts) {
            for mut stmt in self.rewrite_stmt(stmt) {
                stmt.visit_mut_children_with(self);
                stmts.push(stmt);
            }
        }
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        let taken = mem::replace(stmt, empty(self.program_data));
        let mut out = self.rewrite_stmt(taken);
        *stmt = match out.len() {
            0 => empty(self.program_data),
            1 => out.remove(0),
            _ => block(out, self.program_data),
        };
        stmt.visit_mut_children_with(self);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        let e = match expr {
            Expr::Assign(e) if e.op == AssignOp::Assign => e,
            _ => return,
        };
        let replacement = match &mut *e.left {
            Expr::Ident(i) if self.is_unused(i) => e.right.take(),
            Expr::Member(m) => match self.dead_property_store(m) {
                Some(None) => e.right.take(),
                Some(Some(_)) => {
                    let key = match &mut m.prop {
                        MemberProp::Computed(key) => key.take(),
                        MemberProp::Ident(_) => return,
                    };
                    Expr::Seq(SeqExpr {
                        node_id: self.program_data.new_id(),
                        exprs: vec![key, e.right.take()],
                    })
                }
                None => return,
            },
            _ => return,
        };
        *expr = replacement;
        self.changed = true;
    }

    fn visit_mut_for_stmt(&mut self, s: &mut ForStmt) {
        match &mut s.init {
            Some(VarDeclOrExpr::VarDecl(decl)) => {
                for d in &mut decl.decls {
                    if let Some(init) = &mut d.init {
                        init.visit_mut_with(self);
                    }
                }
            }
            Some(VarDeclOrExpr::Expr(e)) => e.visit_mut_with(self),
            None => {}
        }
        if let Some(test) = &mut s.test {
            test.visit_mut_with(self);
        }
        if let Some(update) = &mut s.update {
            update.visit_mut_with(self);
        }
        s.body.visit_mut_with(self);
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
                remove_unused: true,
                ..PassConfig::none()
            },
            ..Options::trusting()
        }
    }

    #[test]
    fn unused_declarations() {
        test_transform(
            options(),
            "var a = 1, b = foo(), c = 2; function f() {} bar(c);",
            "foo(); var c = 2; bar(c);",
        );
    }

    #[test]
    fn dead_assignments() {
        test_transform(options(), "var x; x = 1; foo(x = bar());", "foo(bar());");
    }

    #[test]
    fn property_stores_into_fresh_objects() {
        test_transform(
            options(),
            "var o = {}; o.a = 1; o['b'] = foo();",
            "foo();",
        );
    }

    #[test]
    fn unremovable_store_keeps_the_declaration() {
        // The store in `g` isn't known to hit an object, so it stays and
        // `o` has to stay declared.
        let src = "var o = {}; function g() { o.x = 5; } g();";
        test_transform(options(), src, src);
    }

    #[test]
    fn property_stores_into_other_objects_are_kept() {
        let src = "var o = foo(); o.a = 1;";
        test_transform(options(), src, src);
    }

    #[test]
    fn globals_need_trust() {
        let src = "var a = 1;";
        test_transform(
            Options {
                no_global_property_reads: false,
                ..options()
            },
            src,
            src,
        );
    }

    #[test]
    fn locals_are_removed_without_trust() {
        test_transform(
            Options {
                passes: options().passes,
                ..Options::default()
            },
            "function f() { var a = 1; return 2; } foo(f);",
            "function f() { return 2; } foo(f);",
        );
    }

    #[test]
    fn loop_heads_are_kept() {
        let src = "for (var i = 0; foo(); ) {} for (var k in bar()) {}";
        test_transform(options(), src, src);
    }

    #[test]
    fn reassigned_const_is_kept() {
        let src = "function f() { const c = 1; c = 2; } foo(f);";
        test_transform(options(), src, src);
    }
}
