//! Static binding structure: scopes, variables and every site where a
//! variable is read or written.
//!
//! Built by a single walk over the program. Declarations are hoisted when a
//! function (or the program) is entered, `let`/`const` when their block is
//! entered, and every identifier occurrence is then resolved against the
//! scope chain. Names that resolve nowhere become implicit globals of the
//! root scope.

use crate::{registry::Registry, value::Value};
use ast::*;
use atoms::{js_word, JsWord};
use ecma_visit::{Visit, VisitWith};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Function,
    Param,
    CatchParam,
    FnExprName,
    /// Assigned or read without being declared.
    Implicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Read,
    /// `x` in `x.p = v` or `x[k] = v`.
    PropWriteObject,
    /// `x` in `x(...)`.
    Callee,
    /// A declaration with a value: an initialized declarator, a function
    /// declaration, a parameter or a catch binding.
    Init,
    /// `x = v`
    Assign,
    /// `x += v`, `x++`, ...
    Compound,
    /// The variable of a `for-in` loop.
    ForIn,
}

impl SiteKind {
    pub fn is_write(self) -> bool {
        matches!(
            self,
            SiteKind::Init | SiteKind::Assign | SiteKind::Compound | SiteKind::ForIn
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub ident: NodeId,
    /// The function (or program) scope the site is in.
    pub fn_scope: ScopeId,
    pub kind: SiteKind,
}

/// Names a variable in a way that stays valid across analysis passes, which
/// rebuild the scope tree and so renumber variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// The first declaring identifier.
    Decl(NodeId),
    Global(JsWord),
}

#[derive(Debug)]
pub struct Variable {
    pub name: JsWord,
    pub kind: VarKind,
    pub global: bool,
    pub block_scoped: bool,
    pub scope: ScopeId,
    pub fn_scope: ScopeId,
    pub decl: Option<NodeId>,
    pub reads: Vec<Site>,
    pub writes: Vec<Site>,
}

impl Variable {
    pub fn key(&self) -> VarKey {
        match self.decl {
            Some(id) => VarKey::Decl(id),
            None => VarKey::Global(self.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function(NodeId),
    Block(NodeId),
    Catch(NodeId),
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub fn_scope: ScopeId,
    pub vars: FxHashMap<JsWord, VarId>,
    /// Values variables have before any code of the scope runs.
    pub initial_values: FxHashMap<VarId, Value>,
    /// Function declarations hoisted to this scope, with their `Function`
    /// nodes.
    pub hoisted_fns: Vec<(VarId, NodeId)>,
}

#[derive(Debug)]
pub struct FunctionInfo {
    pub scope: ScopeId,
    pub params: Vec<VarId>,
    pub uses_arguments: bool,
    pub uses_this: bool,
    /// The variable holding a declared function, or a function expression's
    /// own name.
    pub name_var: Option<VarId>,
    pub is_decl: bool,
}

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    vars: Vec<Variable>,
    ident_to_var: FxHashMap<NodeId, VarId>,
    sites: FxHashMap<NodeId, SiteKind>,
    node_scopes: FxHashMap<NodeId, ScopeId>,
    functions: FxHashMap<NodeId, FunctionInfo>,
    captured: FxHashSet<VarId>,
    /// Globals referenced from inside a function.
    shared_globals: FxHashSet<VarId>,
    /// The program uses `with` or calls `eval` directly, so names can't be
    /// resolved statically.
    pub has_with_or_eval: bool,
}

impl ScopeTree {
    pub fn build(program: &Program, registry: &mut Registry) -> ScopeTree {
        let root = Scope {
            parent: None,
            kind: ScopeKind::Program,
            fn_scope: ScopeId(0),
            vars: Default::default(),
            initial_values: Default::default(),
            hoisted_fns: vec![],
        };
        let mut builder = Builder {
            tree: ScopeTree {
                scopes: vec![root],
                vars: vec![],
                ident_to_var: Default::default(),
                sites: Default::default(),
                node_scopes: Default::default(),
                functions: Default::default(),
                captured: Default::default(),
                shared_globals: Default::default(),
                has_with_or_eval: false,
            },
            registry,
            current: ScopeId(0),
            functions: vec![],
            pending_name: None,
        };
        builder.tree.node_scopes.insert(program.node_id, ScopeId(0));
        builder.hoist(&program.body);
        builder.declare_lexical(&program.body);
        program.body.visit_with(&mut builder);
        builder.tree
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.0 as usize]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn vars(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, var)| (VarId(i as u32), var))
    }

    /// The variable an identifier occurrence refers to.
    pub fn var_of(&self, ident: NodeId) -> Option<VarId> {
        self.ident_to_var.get(&ident).copied()
    }

    pub fn site_kind(&self, ident: NodeId) -> Option<SiteKind> {
        self.sites.get(&ident).copied()
    }

    /// The scope created by a function, block, catch clause or loop head.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Keyed by the `Function` node.
    pub fn function(&self, node: NodeId) -> Option<&FunctionInfo> {
        self.functions.get(&node)
    }

    pub fn lookup(&self, scope: ScopeId, name: &JsWord) -> Option<VarId> {
        let mut scope = Some(scope);
        while let Some(id) = scope {
            let s = self.scope(id);
            if let Some(var) = s.vars.get(name) {
                return Some(*var);
            }
            scope = s.parent;
        }
        None
    }

    /// The value a variable has before its scope's code runs, if known.
    pub fn initial_value(&self, var: VarId) -> Option<&Value> {
        self.scope(self.var(var).scope).initial_values.get(&var)
    }

    /// Written from a function other than the one declaring it, so its value
    /// can't be followed flow-sensitively.
    pub fn has_foreign_writes(&self, var: VarId) -> bool {
        let var = self.var(var);
        var.writes.iter().any(|site| site.fn_scope != var.fn_scope)
    }

    pub fn is_captured(&self, var: VarId) -> bool {
        self.captured.contains(&var)
    }

    pub fn captured_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.captured.iter().copied()
    }

    /// Globals that some function of the program reads or writes, so calling
    /// that function may change them or the objects they hold.
    pub fn shared_global_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.shared_globals.iter().copied()
    }

    pub fn global_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.scope(self.root()).vars.values().copied()
    }

    /// A built-in global the program never assigns.
    pub fn is_pristine_builtin(&self, var: VarId) -> bool {
        let v = self.var(var);
        v.kind == VarKind::Implicit && v.writes.is_empty() && self.initial_value(var).is_some()
    }

    /// Never read, except as the object of property writes. Such variables
    /// and the objects they hold can be removed.
    pub fn is_unused(&self, var: VarId) -> bool {
        let v = self.var(var);
        v.reads
            .iter()
            .all(|site| site.kind == SiteKind::PropWriteObject)
            && v.writes
                .iter()
                .all(|site| matches!(site.kind, SiteKind::Init | SiteKind::Assign))
    }

    /// The variables assigned anywhere inside `stmt`.
    pub fn written_in_stmt(&self, stmt: &Stmt) -> FxHashSet<VarId> {
        let mut v = WrittenVars {
            tree: self,
            vars: Default::default(),
        };
        stmt.visit_with(&mut v);
        v.vars
    }
}

struct WrittenVars<'a> {
    tree: &'a ScopeTree,
    vars: FxHashSet<VarId>,
}

impl<'ast> Visit<'ast> for WrittenVars<'_> {
    fn visit_ident(&mut self, n: &'ast Ident) {
        if self.tree.site_kind(n.node_id).map_or(false, SiteKind::is_write) {
            if let Some(var) = self.tree.var_of(n.node_id) {
                self.vars.insert(var);
            }
        }
    }
}

struct Builder<'r> {
    tree: ScopeTree,
    registry: &'r mut Registry,
    current: ScopeId,
    /// Enclosing `Function` nodes, innermost last.
    functions: Vec<NodeId>,
    /// The name binding for the function about to be entered.
    pending_name: Option<(Ident, bool)>,
}

impl Builder<'_> {
    fn fn_scope(&self) -> ScopeId {
        self.tree.scope(self.current).fn_scope
    }

    fn push_scope(&mut self, kind: ScopeKind, node: NodeId) -> ScopeId {
        let id = ScopeId(self.tree.scopes.len() as u32);
        let fn_scope = match kind {
            ScopeKind::Function(_) | ScopeKind::Program => id,
            _ => self.fn_scope(),
        };
        self.tree.scopes.push(Scope {
            parent: Some(self.current),
            kind,
            fn_scope,
            vars: Default::default(),
            initial_values: Default::default(),
            hoisted_fns: vec![],
        });
        self.tree.node_scopes.insert(node, id);
        self.current = id;
        id
    }

    fn declare_in(&mut self, scope: ScopeId, ident: &Ident, kind: VarKind) -> VarId {
        if let Some(var) = self.tree.scope(scope).vars.get(&ident.sym).copied() {
            self.tree.ident_to_var.insert(ident.node_id, var);
            return var;
        }
        let var = self.new_var(scope, ident.sym.clone(), kind, Some(ident.node_id));
        self.tree.ident_to_var.insert(ident.node_id, var);
        if kind == VarKind::Var {
            self.tree.scopes[scope.0 as usize]
                .initial_values
                .insert(var, Value::UNDEFINED);
        }
        var
    }

    fn new_var(&mut self, scope: ScopeId, name: JsWord, kind: VarKind, decl: Option<NodeId>) -> VarId {
        let id = VarId(self.tree.vars.len() as u32);
        let s = &mut self.tree.scopes[scope.0 as usize];
        s.vars.insert(name.clone(), id);
        let fn_scope = s.fn_scope;
        self.tree.vars.push(Variable {
            name,
            kind,
            global: scope == ScopeId(0),
            block_scoped: matches!(kind, VarKind::Let | VarKind::Const),
            scope,
            fn_scope,
            decl,
            reads: vec![],
            writes: vec![],
        });
        id
    }

    /// Declares the `var`s and function declarations of a function body.
    fn hoist(&mut self, stmts: &[Stmt]) {
        let mut hoister = Hoister {
            vars: vec![],
            fns: vec![],
        };
        for stmt in stmts {
            stmt.visit_with(&mut hoister);
        }
        let scope = self.fn_scope();
        for ident in hoister.vars {
            self.declare_in(scope, &ident, VarKind::Var);
        }
        for (ident, function) in hoister.fns {
            let var = self.declare_in(scope, &ident, VarKind::Function);
            self.tree.scopes[scope.0 as usize]
                .hoisted_fns
                .push((var, function));
        }
    }

    /// Declares the `let`s and `const`s directly inside a block.
    fn declare_lexical(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::Var(decl) = stmt {
                self.declare_lexical_decl(decl);
            }
        }
    }

    fn declare_lexical_decl(&mut self, decl: &VarDecl) {
        let kind = match decl.kind {
            VarDeclKind::Var => return,
            VarDeclKind::Let => VarKind::Let,
            VarDeclKind::Const => VarKind::Const,
        };
        for d in &decl.decls {
            self.declare_in(self.current, &d.name, kind);
        }
    }

    fn resolve(&mut self, ident: &Ident) -> Option<VarId> {
        if let Some(var) = self.tree.lookup(self.current, &ident.sym) {
            return Some(var);
        }
        if ident.sym == js_word!("arguments") {
            if let Some(function) = self.functions.last() {
                if let Some(info) = self.tree.functions.get_mut(function) {
                    info.uses_arguments = true;
                }
                return None;
            }
        }
        let var = self.new_var(ScopeId(0), ident.sym.clone(), VarKind::Implicit, None);
        if let Some(value) = self.registry.global_value(&ident.sym) {
            self.tree.scopes[0].initial_values.insert(var, value);
        }
        Some(var)
    }

    fn add_site(&mut self, ident: &Ident, kind: SiteKind) -> Option<VarId> {
        let var = self.resolve(ident)?;
        let site = Site {
            ident: ident.node_id,
            fn_scope: self.fn_scope(),
            kind,
        };
        self.tree.ident_to_var.insert(ident.node_id, var);
        self.tree.sites.insert(ident.node_id, kind);
        let v = &mut self.tree.vars[var.0 as usize];
        if v.fn_scope != site.fn_scope {
            if v.global {
                self.tree.shared_globals.insert(var);
            } else {
                self.tree.captured.insert(var);
            }
        }
        if kind.is_write() {
            v.writes.push(site);
        } else {
            v.reads.push(site);
        }
        Some(var)
    }
}

impl<'ast> Visit<'ast> for Builder<'_> {
    fn visit_ident(&mut self, n: &'ast Ident) {
        self.add_site(n, SiteKind::Read);
    }

    fn visit_this_expr(&mut self, _: &'ast ThisExpr) {
        if let Some(function) = self.functions.last() {
            if let Some(info) = self.tree.functions.get_mut(function) {
                info.uses_this = true;
            }
        }
    }

    fn visit_block_stmt(&mut self, n: &'ast BlockStmt) {
        let parent = self.current;
        self.push_scope(ScopeKind::Block(n.node_id), n.node_id);
        self.declare_lexical(&n.stmts);
        n.visit_children_with(self);
        self.current = parent;
    }

    fn visit_function(&mut self, n: &'ast Function) {
        let parent = self.current;
        let scope = self.push_scope(ScopeKind::Function(n.node_id), n.node_id);
        self.tree.node_scopes.insert(n.body.node_id, scope);
        self.functions.push(n.node_id);

        let pending = self.pending_name.take();
        let mut params = vec![];
        for param in &n.params {
            let var = self.declare_in(scope, param, VarKind::Param);
            params.push(var);
            self.add_site(param, SiteKind::Init);
        }
        self.tree.functions.insert(
            n.node_id,
            FunctionInfo {
                scope,
                params,
                uses_arguments: false,
                uses_this: false,
                name_var: None,
                is_decl: false,
            },
        );

        self.hoist(&n.body.stmts);
        self.declare_lexical(&n.body.stmts);

        let is_decl = matches!(pending, Some((_, true)));
        let name_var = match pending {
            Some((ident, true)) => self.tree.var_of(ident.node_id),
            // Parameters and declarations in the body shadow the name.
            Some((ident, false)) if self.tree.scope(scope).vars.contains_key(&ident.sym) => None,
            Some((ident, false)) => {
                let var = self.declare_in(scope, &ident, VarKind::FnExprName);
                self.add_site(&ident, SiteKind::Init);
                Some(var)
            }
            None => None,
        };
        if let Some(info) = self.tree.functions.get_mut(&n.node_id) {
            info.name_var = name_var;
            info.is_decl = is_decl;
        }

        n.body.stmts.visit_with(self);

        self.functions.pop();
        self.current = parent;
    }

    fn visit_fn_decl(&mut self, n: &'ast FnDecl) {
        self.add_site(&n.ident, SiteKind::Init);
        self.pending_name = Some((n.ident.clone(), true));
        self.visit_function(&n.function);
    }

    fn visit_fn_expr(&mut self, n: &'ast FnExpr) {
        self.pending_name = n.ident.clone().map(|ident| (ident, false));
        self.visit_function(&n.function);
    }

    fn visit_var_declarator(&mut self, n: &'ast VarDeclarator) {
        match &n.init {
            Some(init) => {
                self.add_site(&n.name, SiteKind::Init);
                init.visit_with(self);
            }
            None => {
                if let Some(var) = self.tree.lookup(self.current, &n.name.sym) {
                    self.tree.ident_to_var.insert(n.name.node_id, var);
                }
            }
        }
    }

    fn visit_catch_clause(&mut self, n: &'ast CatchClause) {
        let parent = self.current;
        let scope = self.push_scope(ScopeKind::Catch(n.node_id), n.node_id);
        if let Some(param) = &n.param {
            self.declare_in(scope, param, VarKind::CatchParam);
            self.add_site(param, SiteKind::Init);
        }
        n.body.visit_with(self);
        self.current = parent;
    }

    fn visit_for_stmt(&mut self, n: &'ast ForStmt) {
        let parent = self.current;
        if let Some(VarDeclOrExpr::VarDecl(decl)) = &n.init {
            if decl.kind != VarDeclKind::Var {
                self.push_scope(ScopeKind::Block(n.node_id), n.node_id);
                self.declare_lexical_decl(decl);
            }
        }
        n.visit_children_with(self);
        self.current = parent;
    }

    fn visit_for_in_stmt(&mut self, n: &'ast ForInStmt) {
        let parent = self.current;
        match &n.left {
            ForHead::VarDecl(decl) => {
                if decl.kind != VarDeclKind::Var {
                    self.push_scope(ScopeKind::Block(n.node_id), n.node_id);
                    self.declare_lexical_decl(decl);
                }
                for d in &decl.decls {
                    self.add_site(&d.name, SiteKind::ForIn);
                }
            }
            ForHead::Expr(e) => match &**e {
                Expr::Ident(i) => {
                    self.add_site(i, SiteKind::ForIn);
                }
                e => e.visit_with(self),
            },
        }
        n.right.visit_with(self);
        n.body.visit_with(self);
        self.current = parent;
    }

    fn visit_assign_expr(&mut self, n: &'ast AssignExpr) {
        match &*n.left {
            Expr::Ident(i) => {
                let kind = if n.op == AssignOp::Assign {
                    SiteKind::Assign
                } else {
                    SiteKind::Compound
                };
                self.add_site(i, kind);
            }
            Expr::Member(m) => match (&*m.obj, n.op) {
                (Expr::Ident(obj), AssignOp::Assign) => {
                    self.add_site(obj, SiteKind::PropWriteObject);
                    if let MemberProp::Computed(prop) = &m.prop {
                        prop.visit_with(self);
                    }
                }
                _ => m.visit_with(self),
            },
            left => left.visit_with(self),
        }
        n.right.visit_with(self);
    }

    fn visit_update_expr(&mut self, n: &'ast UpdateExpr) {
        match &*n.arg {
            Expr::Ident(i) => {
                self.add_site(i, SiteKind::Compound);
            }
            arg => arg.visit_with(self),
        }
    }

    fn visit_call_expr(&mut self, n: &'ast CallExpr) {
        match &*n.callee {
            Expr::Ident(callee) => {
                let var = self.add_site(callee, SiteKind::Callee);
                if callee.sym == js_word!("eval")
                    && var.map_or(false, |var| self.tree.var(var).kind == VarKind::Implicit)
                {
                    self.tree.has_with_or_eval = true;
                }
            }
            callee => callee.visit_with(self),
        }
        n.args.iter().for_each(|arg| arg.visit_with(self));
    }

    fn visit_with_stmt(&mut self, n: &'ast WithStmt) {
        self.tree.has_with_or_eval = true;
        n.visit_children_with(self);
    }
}

/// Collects the names a function body hoists: `var` declarations and
/// function declarations outside nested functions.
struct Hoister {
    vars: Vec<Ident>,
    fns: Vec<(Ident, NodeId)>,
}

impl<'ast> Visit<'ast> for Hoister {
    fn visit_var_decl(&mut self, n: &'ast VarDecl) {
        if n.kind == VarDeclKind::Var {
            self.vars.extend(n.decls.iter().map(|d| d.name.clone()));
        }
        n.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, n: &'ast FnDecl) {
        self.fns.push((n.ident.clone(), n.function.node_id));
    }

    fn visit_function(&mut self, _: &'ast Function) {}
}

#[cfg(test)]
mod tests;
