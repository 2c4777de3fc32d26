use ast::*;
use ecma_visit::{Visit, VisitWith};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::BuildHasherDefault;

pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

pub fn is_loop(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::For(_) | Stmt::ForIn(_) | Stmt::While(_) | Stmt::DoWhile(_)
    )
}

/// Every identifier name used anywhere in `node`, including labels and
/// property names. Used to pick names that can't clash with anything.
pub fn collect_names<'ast, N>(node: &'ast N) -> FxHashSet<atoms::JsWord>
where
    N: VisitWith<'ast, NameCollector>,
{
    let mut v = NameCollector::default();
    node.visit_with(&mut v);
    v.names
}

#[derive(Default)]
pub struct NameCollector {
    names: FxHashSet<atoms::JsWord>,
}

impl<'ast> Visit<'ast> for NameCollector {
    fn visit_ident(&mut self, n: &'ast Ident) {
        self.names.insert(n.sym.clone());
    }

    fn visit_labeled_stmt(&mut self, n: &'ast LabeledStmt) {
        self.names.insert(n.label.sym.clone());
        n.body.visit_with(self);
    }

    fn visit_member_expr(&mut self, n: &'ast MemberExpr) {
        if let MemberProp::Ident(i) = &n.prop {
            self.names.insert(i.sym.clone());
        }
        n.visit_children_with(self);
    }
}

/// Returns a name starting with `base` that isn't in `taken`, and marks it
/// as taken.
pub fn unique_name(base: &str, taken: &mut FxHashSet<atoms::JsWord>) -> atoms::JsWord {
    let mut name: atoms::JsWord = base.into();
    let mut i = 1;
    while taken.contains(&name) {
        name = format!("{}{}", base, i).into();
        i += 1;
    }
    taken.insert(name.clone());
    name
}

/// Whether `node` contains a `break` or `continue`, not counting those
/// inside nested functions.
pub fn contains_break_or_continue(stmt: &Stmt) -> bool {
    struct Finder {
        found: bool,
    }

    impl<'ast> Visit<'ast> for Finder {
        fn visit_break_stmt(&mut self, _: &'ast BreakStmt) {
            self.found = true;
        }

        fn visit_continue_stmt(&mut self, _: &'ast ContinueStmt) {
            self.found = true;
        }

        fn visit_function(&mut self, _: &'ast Function) {}
    }

    let mut finder = Finder { found: false };
    stmt.visit_with(&mut finder);
    finder.found
}

/// Names declared with `var` in `stmts`, not counting nested functions.
pub fn var_declared_names(stmt: &Stmt) -> Vec<Ident> {
    struct Finder {
        names: Vec<Ident>,
    }

    impl<'ast> Visit<'ast> for Finder {
        fn visit_var_decl(&mut self, n: &'ast VarDecl) {
            if n.kind == VarDeclKind::Var {
                for decl in &n.decls {
                    self.names.push(decl.name.clone());
                }
            }
            n.visit_children_with(self);
        }

        fn visit_function(&mut self, _: &'ast Function) {}
    }

    let mut finder = Finder { names: vec![] };
    stmt.visit_with(&mut finder);
    finder.names
}

pub fn contains_fn_decl(stmt: &Stmt) -> bool {
    struct Finder {
        found: bool,
    }

    impl<'ast> Visit<'ast> for Finder {
        fn visit_fn_decl(&mut self, _: &'ast FnDecl) {
            self.found = true;
        }

        fn visit_function(&mut self, _: &'ast Function) {}
    }

    let mut finder = Finder { found: false };
    stmt.visit_with(&mut finder);
    finder.found
}
