use super::Keys;
use crate::{
    analysis::{Analysis, NodeRef},
    state::State,
    utils::is_loop,
    value::{Primitive, Single, Value},
};
use ast::*;
use rustc_hash::FxHashSet;

impl<'a> Analysis<'a> {
    pub(crate) fn track_stmt(&mut self, state: &mut State<'_>, stmt: &Stmt) {
        if state.is_dead() {
            return;
        }
        match stmt {
            Stmt::Block(b) => self.track_block(state, b),
            Stmt::Empty(_) | Stmt::Fn(_) => {}
            Stmt::Expr(s) => {
                self.track_expr(state, &s.expr);
            }
            Stmt::Var(decl) => self.track_var_decl(state, decl),
            Stmt::If(s) => {
                let test = self.track_expr(state, &s.test);
                match test.value.truthiness() {
                    Some(true) => self.track_stmt(state, &s.cons),
                    Some(false) => {
                        if let Some(alt) = &s.alt {
                            self.track_stmt(state, alt);
                        }
                    }
                    None => {
                        let mut cons = state.child();
                        self.track_stmt(&mut cons, &s.cons);
                        let cons = cons.into_delta();
                        match &s.alt {
                            Some(alt) => {
                                let mut other = state.child();
                                self.track_stmt(&mut other, alt);
                                let other = other.into_delta();
                                state.merge_or(self, cons, other);
                            }
                            None => state.merge_maybe(self, cons),
                        }
                    }
                }
            }
            Stmt::While(s) => {
                let test = self.track_expr(state, &s.test);
                if test.value.truthiness() != Some(false) {
                    let written = self.scopes.written_in_stmt(stmt);
                    state.track_as_unsure(self, written, true, |cx, st| {
                        cx.track_expr(st, &s.test);
                        cx.track_unsure_body(st, &s.body);
                    });
                }
            }
            Stmt::DoWhile(s) => {
                let written = self.scopes.written_in_stmt(stmt);
                state.track_as_unsure(self, written, true, |cx, st| {
                    cx.track_unsure_body(st, &s.body);
                    cx.track_expr(st, &s.test);
                });
            }
            Stmt::For(s) => self.track_for(state, stmt, s),
            Stmt::ForIn(s) => self.track_for_in(state, stmt, s),
            Stmt::Labeled(s) => {
                if is_loop(&s.body) {
                    self.track_stmt(state, &s.body);
                } else {
                    self.track_unsure_body(state, &s.body);
                }
            }
            Stmt::Try(s) => {
                state.track_as_unsure(self, FxHashSet::default(), false, |cx, st| {
                    cx.track_block(st, &s.block);
                });
                if let Some(handler) = &s.handler {
                    state.track_as_unsure(self, FxHashSet::default(), false, |cx, st| {
                        cx.track_catch(st, handler);
                    });
                }
                if let Some(finalizer) = &s.finalizer {
                    self.track_block(state, finalizer);
                }
            }
            Stmt::Return(s) => {
                let value = match &s.arg {
                    Some(arg) => self.track_expr(state, arg).value,
                    None => Value::UNDEFINED,
                };
                // The caller may do anything with the result.
                self.escaped.extend(value.references());
                let returns = match self.frame_mut().returns.take() {
                    Some(old) => self.join(&old, &value),
                    None => value,
                };
                self.frame_mut().returns = Some(returns);
                state.mark_dead();
            }
            Stmt::Throw(s) => {
                let value = self.track_expr(state, &s.arg).value;
                self.escaped.extend(value.references());
                self.frame_mut().effects = true;
                state.mark_dead();
            }
            Stmt::Break(_) | Stmt::Continue(_) => state.mark_dead(),
            Stmt::With(s) => {
                let object = self.track_expr(state, &s.object);
                let roots: Vec<_> = object.value.references().collect();
                self.unknown_call(state, roots);
                self.track_unsure_body(state, &s.body);
            }
        }
        self.notify(NodeRef::Stmt(stmt), state);
    }

    /// A block gets its own child state so that its block scoped variables
    /// can be dropped at the end.
    pub(crate) fn track_block(&mut self, state: &mut State<'_>, block: &BlockStmt) {
        let scope = self.scopes.scope_of(block.node_id);
        let mut child = state.child();
        if let Some(scope) = scope {
            self.enter_scope(&mut child, scope);
        }
        for stmt in &block.stmts {
            self.track_stmt(&mut child, stmt);
        }
        let delta = child.into_delta();
        state.merge_back(self, delta, scope);
    }

    /// A statement that may be left part-way by `break` or `continue`.
    fn track_unsure_body(&mut self, state: &mut State<'_>, body: &Stmt) {
        state.track_as_unsure(self, FxHashSet::default(), false, |cx, st| {
            cx.track_stmt(st, body);
        });
    }

    fn track_catch(&mut self, state: &mut State<'_>, handler: &CatchClause) {
        let scope = self.scopes.scope_of(handler.node_id);
        let mut child = state.child();
        if let Some(scope) = scope {
            self.enter_scope(&mut child, scope);
        }
        if let Some(param) = &handler.param {
            if let Some(var) = self.scopes.var_of(param.node_id) {
                child.set_value(self, var, Value::Unknown);
            }
        }
        self.track_block(&mut child, &handler.body);
        let delta = child.into_delta();
        state.merge_back(self, delta, scope);
    }

    fn track_var_decl(&mut self, state: &mut State<'_>, decl: &VarDecl) {
        for d in &decl.decls {
            let value = match &d.init {
                Some(init) => self.track_expr(state, init).value,
                // `var x;` leaves `x` alone.
                None if decl.kind == VarDeclKind::Var => continue,
                None => Value::UNDEFINED,
            };
            if let Some(var) = self.scopes.var_of(d.name.node_id) {
                state.set_value(self, var, value);
            }
        }
    }

    fn track_for(&mut self, state: &mut State<'_>, stmt: &Stmt, s: &ForStmt) {
        let scope = self.scopes.scope_of(s.node_id);
        let mut child = state.child();
        if let Some(scope) = scope {
            self.enter_scope(&mut child, scope);
        }
        match &s.init {
            Some(VarDeclOrExpr::VarDecl(decl)) => self.track_var_decl(&mut child, decl),
            Some(VarDeclOrExpr::Expr(e)) => {
                self.track_expr(&mut child, e);
            }
            None => {}
        }
        let enters = match &s.test {
            Some(test) => self.track_expr(&mut child, test).value.truthiness() != Some(false),
            None => true,
        };
        if enters {
            let written = self.scopes.written_in_stmt(stmt);
            child.track_as_unsure(self, written, true, |cx, st| {
                if let Some(test) = &s.test {
                    cx.track_expr(st, test);
                }
                cx.track_unsure_body(st, &s.body);
                if let Some(update) = &s.update {
                    cx.track_expr(st, update);
                }
            });
        }
        let delta = child.into_delta();
        state.merge_back(self, delta, scope);
    }

    fn assign_for_head(&mut self, state: &mut State<'_>, head: &ForHead, key: Value) {
        match head {
            ForHead::VarDecl(decl) => {
                for d in &decl.decls {
                    if let Some(var) = self.scopes.var_of(d.name.node_id) {
                        state.set_value(self, var, key.clone());
                    }
                }
            }
            ForHead::Expr(e) => match &**e {
                Expr::Ident(i) => self.assign_ident(state, i, key),
                Expr::Member(m) => {
                    let (obj, prop, _) = self.track_member_operands(state, m);
                    self.write_property(state, &obj, &prop, &key);
                }
                e => {
                    self.track_expr(state, e);
                    self.frame_mut().effects = true;
                }
            },
        }
    }

    fn track_for_in(&mut self, state: &mut State<'_>, stmt: &Stmt, s: &ForInStmt) {
        let scope = self.scopes.scope_of(s.node_id);
        let mut child = state.child();
        if let Some(scope) = scope {
            self.enter_scope(&mut child, scope);
        }
        let right = self.track_expr(&mut child, &s.right);

        let (key, known) = match self.enumerate(&child, &right.value) {
            Keys::Empty => {
                self.record_for_in(s.node_id, Some(vec![]));
                let delta = child.into_delta();
                state.merge_back(self, delta, scope);
                return;
            }
            Keys::Known(r, keys) => {
                let key = Value::from_singles(
                    keys.iter()
                        .map(|k| Single::Primitive(Primitive::String(k.clone()))),
                );
                (key, Some((r, keys)))
            }
            Keys::Unknown => (Value::Unknown, None),
        };

        let written = self.scopes.written_in_stmt(stmt);
        child.track_as_unsure(self, written, true, |cx, st| {
            cx.assign_for_head(st, &s.left, key.clone());
            cx.track_unsure_body(st, &s.body);
        });

        // The keys are only reliable if the loop left the object alone.
        let recorded = known.and_then(|(r, keys)| match self.enumerate(&child, &right.value) {
            Keys::Known(after, after_keys) if after == r && after_keys == keys => Some(keys),
            _ => None,
        });
        self.record_for_in(s.node_id, recorded);

        let delta = child.into_delta();
        state.merge_back(self, delta, scope);
    }
}
