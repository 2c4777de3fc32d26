//! Visitors for the syntax tree.
//!
//! Every `visit_*` method defaults to walking the node's children, so
//! implementors override only the nodes they care about and call
//! `node.visit_children_with(self)` to keep descending.
//!
//! [`Ident`]s are only visited where they bind or reference a variable:
//! labels, non-computed member properties (`a.b`) and non-computed property
//! names in object literals are *not* passed to `visit_ident`.

use ast::*;

pub use self::clone::CloneNode;

mod clone;

macro_rules! visit_methods {
    ($($name:ident: $ty:ty => $walk:ident,)*) => {
        pub trait Visit<'ast> {
            $(
                fn $name(&mut self, node: &'ast $ty) {
                    $walk(self, node)
                }
            )*
        }
    };
}

macro_rules! visit_mut_methods {
    ($($name:ident: $ty:ty => $walk:ident,)*) => {
        pub trait VisitMut {
            $(
                fn $name(&mut self, node: &mut $ty) {
                    $walk(self, node)
                }
            )*
        }
    };
}

visit_methods!(
    visit_program: Program => walk_program,
    visit_stmts: [Stmt] => walk_stmts,
    visit_stmt: Stmt => walk_stmt,
    visit_block_stmt: BlockStmt => walk_block_stmt,
    visit_expr_stmt: ExprStmt => walk_expr_stmt,
    visit_var_decl: VarDecl => walk_var_decl,
    visit_var_declarator: VarDeclarator => walk_var_declarator,
    visit_fn_decl: FnDecl => walk_fn_decl,
    visit_function: Function => walk_function,
    visit_if_stmt: IfStmt => walk_if_stmt,
    visit_for_stmt: ForStmt => walk_for_stmt,
    visit_for_in_stmt: ForInStmt => walk_for_in_stmt,
    visit_while_stmt: WhileStmt => walk_while_stmt,
    visit_do_while_stmt: DoWhileStmt => walk_do_while_stmt,
    visit_return_stmt: ReturnStmt => walk_return_stmt,
    visit_break_stmt: BreakStmt => walk_noop,
    visit_continue_stmt: ContinueStmt => walk_noop,
    visit_labeled_stmt: LabeledStmt => walk_labeled_stmt,
    visit_throw_stmt: ThrowStmt => walk_throw_stmt,
    visit_with_stmt: WithStmt => walk_with_stmt,
    visit_try_stmt: TryStmt => walk_try_stmt,
    visit_catch_clause: CatchClause => walk_catch_clause,
    visit_expr: Expr => walk_expr,
    visit_ident: Ident => walk_noop,
    visit_lit: Lit => walk_noop,
    visit_this_expr: ThisExpr => walk_noop,
    visit_array_lit: ArrayLit => walk_array_lit,
    visit_object_lit: ObjectLit => walk_object_lit,
    visit_prop: Prop => walk_prop,
    visit_prop_name: PropName => walk_prop_name,
    visit_fn_expr: FnExpr => walk_fn_expr,
    visit_unary_expr: UnaryExpr => walk_unary_expr,
    visit_update_expr: UpdateExpr => walk_update_expr,
    visit_bin_expr: BinExpr => walk_bin_expr,
    visit_assign_expr: AssignExpr => walk_assign_expr,
    visit_member_expr: MemberExpr => walk_member_expr,
    visit_cond_expr: CondExpr => walk_cond_expr,
    visit_call_expr: CallExpr => walk_call_expr,
    visit_new_expr: NewExpr => walk_new_expr,
    visit_seq_expr: SeqExpr => walk_seq_expr,
);

visit_mut_methods!(
    visit_mut_program: Program => walk_mut_program,
    visit_mut_stmts: Vec<Stmt> => walk_mut_stmts,
    visit_mut_stmt: Stmt => walk_mut_stmt,
    visit_mut_block_stmt: BlockStmt => walk_mut_block_stmt,
    visit_mut_expr_stmt: ExprStmt => walk_mut_expr_stmt,
    visit_mut_var_decl: VarDecl => walk_mut_var_decl,
    visit_mut_var_declarator: VarDeclarator => walk_mut_var_declarator,
    visit_mut_fn_decl: FnDecl => walk_mut_fn_decl,
    visit_mut_function: Function => walk_mut_function,
    visit_mut_if_stmt: IfStmt => walk_mut_if_stmt,
    visit_mut_for_stmt: ForStmt => walk_mut_for_stmt,
    visit_mut_for_in_stmt: ForInStmt => walk_mut_for_in_stmt,
    visit_mut_while_stmt: WhileStmt => walk_mut_while_stmt,
    visit_mut_do_while_stmt: DoWhileStmt => walk_mut_do_while_stmt,
    visit_mut_return_stmt: ReturnStmt => walk_mut_return_stmt,
    visit_mut_break_stmt: BreakStmt => walk_mut_noop,
    visit_mut_continue_stmt: ContinueStmt => walk_mut_noop,
    visit_mut_labeled_stmt: LabeledStmt => walk_mut_labeled_stmt,
    visit_mut_throw_stmt: ThrowStmt => walk_mut_throw_stmt,
    visit_mut_with_stmt: WithStmt => walk_mut_with_stmt,
    visit_mut_try_stmt: TryStmt => walk_mut_try_stmt,
    visit_mut_catch_clause: CatchClause => walk_mut_catch_clause,
    visit_mut_expr: Expr => walk_mut_expr,
    visit_mut_ident: Ident => walk_mut_noop,
    visit_mut_lit: Lit => walk_mut_noop,
    visit_mut_this_expr: ThisExpr => walk_mut_noop,
    visit_mut_array_lit: ArrayLit => walk_mut_array_lit,
    visit_mut_object_lit: ObjectLit => walk_mut_object_lit,
    visit_mut_prop: Prop => walk_mut_prop,
    visit_mut_prop_name: PropName => walk_mut_prop_name,
    visit_mut_fn_expr: FnExpr => walk_mut_fn_expr,
    visit_mut_unary_expr: UnaryExpr => walk_mut_unary_expr,
    visit_mut_update_expr: UpdateExpr => walk_mut_update_expr,
    visit_mut_bin_expr: BinExpr => walk_mut_bin_expr,
    visit_mut_assign_expr: AssignExpr => walk_mut_assign_expr,
    visit_mut_member_expr: MemberExpr => walk_mut_member_expr,
    visit_mut_cond_expr: CondExpr => walk_mut_cond_expr,
    visit_mut_call_expr: CallExpr => walk_mut_call_expr,
    visit_mut_new_expr: NewExpr => walk_mut_new_expr,
    visit_mut_seq_expr: SeqExpr => walk_mut_seq_expr,
);

/// Implemented by nodes that can be passed to a [`Visit`]or.
pub trait VisitWith<'ast, V: ?Sized + Visit<'ast>> {
    /// Calls the visitor's method for this node.
    fn visit_with(&'ast self, v: &mut V);

    /// Visits the children of this node, without calling the visitor's
    /// method for the node itself.
    fn visit_children_with(&'ast self, v: &mut V);
}

/// Implemented by nodes that can be passed to a [`VisitMut`]ator.
pub trait VisitMutWith<V: ?Sized + VisitMut> {
    fn visit_mut_with(&mut self, v: &mut V);

    fn visit_mut_children_with(&mut self, v: &mut V);
}

macro_rules! impl_with {
    ($($ty:ty => $name:ident, $walk:ident, $name_mut:ident, $walk_mut:ident;)*) => {
        $(
            impl<'ast, V: ?Sized + Visit<'ast>> VisitWith<'ast, V> for $ty {
                fn visit_with(&'ast self, v: &mut V) {
                    v.$name(self)
                }

                fn visit_children_with(&'ast self, v: &mut V) {
                    $walk(v, self)
                }
            }

            impl<V: ?Sized + VisitMut> VisitMutWith<V> for $ty {
                fn visit_mut_with(&mut self, v: &mut V) {
                    v.$name_mut(self)
                }

                fn visit_mut_children_with(&mut self, v: &mut V) {
                    $walk_mut(v, self)
                }
            }
        )*
    };
}

impl_with!(
    Program => visit_program, walk_program, visit_mut_program, walk_mut_program;
    Stmt => visit_stmt, walk_stmt, visit_mut_stmt, walk_mut_stmt;
    BlockStmt => visit_block_stmt, walk_block_stmt, visit_mut_block_stmt, walk_mut_block_stmt;
    VarDecl => visit_var_decl, walk_var_decl, visit_mut_var_decl, walk_mut_var_decl;
    Function => visit_function, walk_function, visit_mut_function, walk_mut_function;
    Expr => visit_expr, walk_expr, visit_mut_expr, walk_mut_expr;
    Ident => visit_ident, walk_noop, visit_mut_ident, walk_mut_noop;
    CatchClause => visit_catch_clause, walk_catch_clause, visit_mut_catch_clause, walk_mut_catch_clause;
    ExprStmt => visit_expr_stmt, walk_expr_stmt, visit_mut_expr_stmt, walk_mut_expr_stmt;
    VarDeclarator => visit_var_declarator, walk_var_declarator, visit_mut_var_declarator, walk_mut_var_declarator;
    FnDecl => visit_fn_decl, walk_fn_decl, visit_mut_fn_decl, walk_mut_fn_decl;
    IfStmt => visit_if_stmt, walk_if_stmt, visit_mut_if_stmt, walk_mut_if_stmt;
    ForStmt => visit_for_stmt, walk_for_stmt, visit_mut_for_stmt, walk_mut_for_stmt;
    ForInStmt => visit_for_in_stmt, walk_for_in_stmt, visit_mut_for_in_stmt, walk_mut_for_in_stmt;
    WhileStmt => visit_while_stmt, walk_while_stmt, visit_mut_while_stmt, walk_mut_while_stmt;
    DoWhileStmt => visit_do_while_stmt, walk_do_while_stmt, visit_mut_do_while_stmt, walk_mut_do_while_stmt;
    ReturnStmt => visit_return_stmt, walk_return_stmt, visit_mut_return_stmt, walk_mut_return_stmt;
    LabeledStmt => visit_labeled_stmt, walk_labeled_stmt, visit_mut_labeled_stmt, walk_mut_labeled_stmt;
    ThrowStmt => visit_throw_stmt, walk_throw_stmt, visit_mut_throw_stmt, walk_mut_throw_stmt;
    TryStmt => visit_try_stmt, walk_try_stmt, visit_mut_try_stmt, walk_mut_try_stmt;
    WithStmt => visit_with_stmt, walk_with_stmt, visit_mut_with_stmt, walk_mut_with_stmt;
    ArrayLit => visit_array_lit, walk_array_lit, visit_mut_array_lit, walk_mut_array_lit;
    ObjectLit => visit_object_lit, walk_object_lit, visit_mut_object_lit, walk_mut_object_lit;
    Prop => visit_prop, walk_prop, visit_mut_prop, walk_mut_prop;
    FnExpr => visit_fn_expr, walk_fn_expr, visit_mut_fn_expr, walk_mut_fn_expr;
    UnaryExpr => visit_unary_expr, walk_unary_expr, visit_mut_unary_expr, walk_mut_unary_expr;
    UpdateExpr => visit_update_expr, walk_update_expr, visit_mut_update_expr, walk_mut_update_expr;
    BinExpr => visit_bin_expr, walk_bin_expr, visit_mut_bin_expr, walk_mut_bin_expr;
    AssignExpr => visit_assign_expr, walk_assign_expr, visit_mut_assign_expr, walk_mut_assign_expr;
    MemberExpr => visit_member_expr, walk_member_expr, visit_mut_member_expr, walk_mut_member_expr;
    CondExpr => visit_cond_expr, walk_cond_expr, visit_mut_cond_expr, walk_mut_cond_expr;
    CallExpr => visit_call_expr, walk_call_expr, visit_mut_call_expr, walk_mut_call_expr;
    NewExpr => visit_new_expr, walk_new_expr, visit_mut_new_expr, walk_mut_new_expr;
    SeqExpr => visit_seq_expr, walk_seq_expr, visit_mut_seq_expr, walk_mut_seq_expr;
);

impl<'ast, V: ?Sized + Visit<'ast>> VisitWith<'ast, V> for Vec<Stmt> {
    fn visit_with(&'ast self, v: &mut V) {
        v.visit_stmts(self)
    }

    fn visit_children_with(&'ast self, v: &mut V) {
        walk_stmts(v, self)
    }
}

impl<V: ?Sized + VisitMut> VisitMutWith<V> for Vec<Stmt> {
    fn visit_mut_with(&mut self, v: &mut V) {
        v.visit_mut_stmts(self)
    }

    fn visit_mut_children_with(&mut self, v: &mut V) {
        walk_mut_stmts(v, self)
    }
}

impl<V: ?Sized + VisitMut> VisitMutWith<V> for Box<Expr> {
    fn visit_mut_with(&mut self, v: &mut V) {
        v.visit_mut_expr(self)
    }

    fn visit_mut_children_with(&mut self, v: &mut V) {
        walk_mut_expr(v, self)
    }
}

fn walk_noop<'ast, V: ?Sized + Visit<'ast>, T: ?Sized>(_: &mut V, _: &'ast T) {}

fn walk_program<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast Program) {
    v.visit_stmts(&n.body);
}

fn walk_stmts<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast [Stmt]) {
    for stmt in n {
        v.visit_stmt(stmt);
    }
}

fn walk_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast Stmt) {
    match n {
        Stmt::Block(n) => v.visit_block_stmt(n),
        Stmt::Empty(_) => {}
        Stmt::Expr(n) => v.visit_expr_stmt(n),
        Stmt::Var(n) => v.visit_var_decl(n),
        Stmt::Fn(n) => v.visit_fn_decl(n),
        Stmt::If(n) => v.visit_if_stmt(n),
        Stmt::For(n) => v.visit_for_stmt(n),
        Stmt::ForIn(n) => v.visit_for_in_stmt(n),
        Stmt::While(n) => v.visit_while_stmt(n),
        Stmt::DoWhile(n) => v.visit_do_while_stmt(n),
        Stmt::Return(n) => v.visit_return_stmt(n),
        Stmt::Break(n) => v.visit_break_stmt(n),
        Stmt::Continue(n) => v.visit_continue_stmt(n),
        Stmt::Labeled(n) => v.visit_labeled_stmt(n),
        Stmt::Throw(n) => v.visit_throw_stmt(n),
        Stmt::With(n) => v.visit_with_stmt(n),
        Stmt::Try(n) => v.visit_try_stmt(n),
    }
}

fn walk_block_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast BlockStmt) {
    v.visit_stmts(&n.stmts);
}

fn walk_expr_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ExprStmt) {
    v.visit_expr(&n.expr);
}

fn walk_var_decl<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast VarDecl) {
    for decl in &n.decls {
        v.visit_var_declarator(decl);
    }
}

fn walk_var_declarator<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast VarDeclarator) {
    v.visit_ident(&n.name);
    if let Some(init) = &n.init {
        v.visit_expr(init);
    }
}

fn walk_fn_decl<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast FnDecl) {
    v.visit_ident(&n.ident);
    v.visit_function(&n.function);
}

fn walk_function<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast Function) {
    for param in &n.params {
        v.visit_ident(param);
    }
    v.visit_block_stmt(&n.body);
}

fn walk_if_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast IfStmt) {
    v.visit_expr(&n.test);
    v.visit_stmt(&n.cons);
    if let Some(alt) = &n.alt {
        v.visit_stmt(alt);
    }
}

fn walk_for_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ForStmt) {
    match &n.init {
        Some(VarDeclOrExpr::VarDecl(d)) => v.visit_var_decl(d),
        Some(VarDeclOrExpr::Expr(e)) => v.visit_expr(e),
        None => {}
    }
    if let Some(test) = &n.test {
        v.visit_expr(test);
    }
    if let Some(update) = &n.update {
        v.visit_expr(update);
    }
    v.visit_stmt(&n.body);
}

fn walk_for_in_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ForInStmt) {
    match &n.left {
        ForHead::VarDecl(d) => v.visit_var_decl(d),
        ForHead::Expr(e) => v.visit_expr(e),
    }
    v.visit_expr(&n.right);
    v.visit_stmt(&n.body);
}

fn walk_while_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast WhileStmt) {
    v.visit_expr(&n.test);
    v.visit_stmt(&n.body);
}

fn walk_do_while_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast DoWhileStmt) {
    v.visit_stmt(&n.body);
    v.visit_expr(&n.test);
}

fn walk_return_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ReturnStmt) {
    if let Some(arg) = &n.arg {
        v.visit_expr(arg);
    }
}

fn walk_labeled_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast LabeledStmt) {
    v.visit_stmt(&n.body);
}

fn walk_throw_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ThrowStmt) {
    v.visit_expr(&n.arg);
}

fn walk_with_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast WithStmt) {
    v.visit_expr(&n.object);
    v.visit_stmt(&n.body);
}

fn walk_try_stmt<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast TryStmt) {
    v.visit_block_stmt(&n.block);
    if let Some(handler) = &n.handler {
        v.visit_catch_clause(handler);
    }
    if let Some(finalizer) = &n.finalizer {
        v.visit_block_stmt(finalizer);
    }
}

fn walk_catch_clause<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast CatchClause) {
    if let Some(param) = &n.param {
        v.visit_ident(param);
    }
    v.visit_block_stmt(&n.body);
}

fn walk_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast Expr) {
    match n {
        Expr::This(n) => v.visit_this_expr(n),
        Expr::Array(n) => v.visit_array_lit(n),
        Expr::Object(n) => v.visit_object_lit(n),
        Expr::Fn(n) => v.visit_fn_expr(n),
        Expr::Unary(n) => v.visit_unary_expr(n),
        Expr::Update(n) => v.visit_update_expr(n),
        Expr::Bin(n) => v.visit_bin_expr(n),
        Expr::Assign(n) => v.visit_assign_expr(n),
        Expr::Member(n) => v.visit_member_expr(n),
        Expr::Cond(n) => v.visit_cond_expr(n),
        Expr::Call(n) => v.visit_call_expr(n),
        Expr::New(n) => v.visit_new_expr(n),
        Expr::Seq(n) => v.visit_seq_expr(n),
        Expr::Ident(n) => v.visit_ident(n),
        Expr::Lit(n) => v.visit_lit(n),
        Expr::Invalid(_) => {}
    }
}

fn walk_array_lit<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ArrayLit) {
    for elem in n.elems.iter().flatten() {
        v.visit_expr(elem);
    }
}

fn walk_object_lit<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast ObjectLit) {
    for prop in &n.props {
        v.visit_prop(prop);
    }
}

fn walk_prop<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast Prop) {
    match n {
        Prop::KeyValue(p) => {
            v.visit_prop_name(&p.key);
            v.visit_expr(&p.value);
        }
        Prop::Getter(p) => {
            v.visit_prop_name(&p.key);
            v.visit_function(&p.function);
        }
        Prop::Setter(p) => {
            v.visit_prop_name(&p.key);
            v.visit_function(&p.function);
        }
    }
}

fn walk_prop_name<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast PropName) {
    if let PropName::Computed(e) = n {
        v.visit_expr(e);
    }
}

fn walk_fn_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast FnExpr) {
    if let Some(ident) = &n.ident {
        v.visit_ident(ident);
    }
    v.visit_function(&n.function);
}

fn walk_unary_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast UnaryExpr) {
    v.visit_expr(&n.arg);
}

fn walk_update_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast UpdateExpr) {
    v.visit_expr(&n.arg);
}

fn walk_bin_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast BinExpr) {
    v.visit_expr(&n.left);
    v.visit_expr(&n.right);
}

fn walk_assign_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast AssignExpr) {
    v.visit_expr(&n.left);
    v.visit_expr(&n.right);
}

fn walk_member_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast MemberExpr) {
    v.visit_expr(&n.obj);
    if let MemberProp::Computed(prop) = &n.prop {
        v.visit_expr(prop);
    }
}

fn walk_cond_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast CondExpr) {
    v.visit_expr(&n.test);
    v.visit_expr(&n.cons);
    v.visit_expr(&n.alt);
}

fn walk_call_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast CallExpr) {
    v.visit_expr(&n.callee);
    for arg in &n.args {
        v.visit_expr(arg);
    }
}

fn walk_new_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast NewExpr) {
    v.visit_expr(&n.callee);
    for arg in &n.args {
        v.visit_expr(arg);
    }
}

fn walk_seq_expr<'ast, V: ?Sized + Visit<'ast>>(v: &mut V, n: &'ast SeqExpr) {
    for expr in &n.exprs {
        v.visit_expr(expr);
    }
}

fn walk_mut_noop<V: ?Sized + VisitMut, T: ?Sized>(_: &mut V, _: &mut T) {}

fn walk_mut_program<V: ?Sized + VisitMut>(v: &mut V, n: &mut Program) {
    v.visit_mut_stmts(&mut n.body);
}

fn walk_mut_stmts<V: ?Sized + VisitMut>(v: &mut V, n: &mut Vec<Stmt>) {
    for stmt in n {
        v.visit_mut_stmt(stmt);
    }
}

fn walk_mut_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut Stmt) {
    match n {
        Stmt::Block(n) => v.visit_mut_block_stmt(n),
        Stmt::Empty(_) => {}
        Stmt::Expr(n) => v.visit_mut_expr_stmt(n),
        Stmt::Var(n) => v.visit_mut_var_decl(n),
        Stmt::Fn(n) => v.visit_mut_fn_decl(n),
        Stmt::If(n) => v.visit_mut_if_stmt(n),
        Stmt::For(n) => v.visit_mut_for_stmt(n),
        Stmt::ForIn(n) => v.visit_mut_for_in_stmt(n),
        Stmt::While(n) => v.visit_mut_while_stmt(n),
        Stmt::DoWhile(n) => v.visit_mut_do_while_stmt(n),
        Stmt::Return(n) => v.visit_mut_return_stmt(n),
        Stmt::Break(n) => v.visit_mut_break_stmt(n),
        Stmt::Continue(n) => v.visit_mut_continue_stmt(n),
        Stmt::Labeled(n) => v.visit_mut_labeled_stmt(n),
        Stmt::Throw(n) => v.visit_mut_throw_stmt(n),
        Stmt::With(n) => v.visit_mut_with_stmt(n),
        Stmt::Try(n) => v.visit_mut_try_stmt(n),
    }
}

fn walk_mut_block_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut BlockStmt) {
    v.visit_mut_stmts(&mut n.stmts);
}

fn walk_mut_expr_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut ExprStmt) {
    v.visit_mut_expr(&mut n.expr);
}

fn walk_mut_var_decl<V: ?Sized + VisitMut>(v: &mut V, n: &mut VarDecl) {
    for decl in &mut n.decls {
        v.visit_mut_var_declarator(decl);
    }
}

fn walk_mut_var_declarator<V: ?Sized + VisitMut>(v: &mut V, n: &mut VarDeclarator) {
    v.visit_mut_ident(&mut n.name);
    if let Some(init) = &mut n.init {
        v.visit_mut_expr(init);
    }
}

fn walk_mut_fn_decl<V: ?Sized + VisitMut>(v: &mut V, n: &mut FnDecl) {
    v.visit_mut_ident(&mut n.ident);
    v.visit_mut_function(&mut n.function);
}

fn walk_mut_function<V: ?Sized + VisitMut>(v: &mut V, n: &mut Function) {
    for param in &mut n.params {
        v.visit_mut_ident(param);
    }
    v.visit_mut_block_stmt(&mut n.body);
}

fn walk_mut_if_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut IfStmt) {
    v.visit_mut_expr(&mut n.test);
    v.visit_mut_stmt(&mut n.cons);
    if let Some(alt) = &mut n.alt {
        v.visit_mut_stmt(alt);
    }
}

fn walk_mut_for_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut ForStmt) {
    match &mut n.init {
        Some(VarDeclOrExpr::VarDecl(d)) => v.visit_mut_var_decl(d),
        Some(VarDeclOrExpr::Expr(e)) => v.visit_mut_expr(e),
        None => {}
    }
    if let Some(test) = &mut n.test {
        v.visit_mut_expr(test);
    }
    if let Some(update) = &mut n.update {
        v.visit_mut_expr(update);
    }
    v.visit_mut_stmt(&mut n.body);
}

fn walk_mut_for_in_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut ForInStmt) {
    match &mut n.left {
        ForHead::VarDecl(d) => v.visit_mut_var_decl(d),
        ForHead::Expr(e) => v.visit_mut_expr(e),
    }
    v.visit_mut_expr(&mut n.right);
    v.visit_mut_stmt(&mut n.body);
}

fn walk_mut_while_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut WhileStmt) {
    v.visit_mut_expr(&mut n.test);
    v.visit_mut_stmt(&mut n.body);
}

fn walk_mut_do_while_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut DoWhileStmt) {
    v.visit_mut_stmt(&mut n.body);
    v.visit_mut_expr(&mut n.test);
}

fn walk_mut_return_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut ReturnStmt) {
    if let Some(arg) = &mut n.arg {
        v.visit_mut_expr(arg);
    }
}

fn walk_mut_labeled_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut LabeledStmt) {
    v.visit_mut_stmt(&mut n.body);
}

fn walk_mut_throw_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut ThrowStmt) {
    v.visit_mut_expr(&mut n.arg);
}

fn walk_mut_with_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut WithStmt) {
    v.visit_mut_expr(&mut n.object);
    v.visit_mut_stmt(&mut n.body);
}

fn walk_mut_try_stmt<V: ?Sized + VisitMut>(v: &mut V, n: &mut TryStmt) {
    v.visit_mut_block_stmt(&mut n.block);
    if let Some(handler) = &mut n.handler {
        v.visit_mut_catch_clause(handler);
    }
    if let Some(finalizer) = &mut n.finalizer {
        v.visit_mut_block_stmt(finalizer);
    }
}

fn walk_mut_catch_clause<V: ?Sized + VisitMut>(v: &mut V, n: &mut CatchClause) {
    if let Some(param) = &mut n.param {
        v.visit_mut_ident(param);
    }
    v.visit_mut_block_stmt(&mut n.body);
}

fn walk_mut_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut Expr) {
    match n {
        Expr::This(n) => v.visit_mut_this_expr(n),
        Expr::Array(n) => v.visit_mut_array_lit(n),
        Expr::Object(n) => v.visit_mut_object_lit(n),
        Expr::Fn(n) => v.visit_mut_fn_expr(n),
        Expr::Unary(n) => v.visit_mut_unary_expr(n),
        Expr::Update(n) => v.visit_mut_update_expr(n),
        Expr::Bin(n) => v.visit_mut_bin_expr(n),
        Expr::Assign(n) => v.visit_mut_assign_expr(n),
        Expr::Member(n) => v.visit_mut_member_expr(n),
        Expr::Cond(n) => v.visit_mut_cond_expr(n),
        Expr::Call(n) => v.visit_mut_call_expr(n),
        Expr::New(n) => v.visit_mut_new_expr(n),
        Expr::Seq(n) => v.visit_mut_seq_expr(n),
        Expr::Ident(n) => v.visit_mut_ident(n),
        Expr::Lit(n) => v.visit_mut_lit(n),
        Expr::Invalid(_) => {}
    }
}

fn walk_mut_array_lit<V: ?Sized + VisitMut>(v: &mut V, n: &mut ArrayLit) {
    for elem in n.elems.iter_mut().flatten() {
        v.visit_mut_expr(elem);
    }
}

fn walk_mut_object_lit<V: ?Sized + VisitMut>(v: &mut V, n: &mut ObjectLit) {
    for prop in &mut n.props {
        v.visit_mut_prop(prop);
    }
}

fn walk_mut_prop<V: ?Sized + VisitMut>(v: &mut V, n: &mut Prop) {
    match n {
        Prop::KeyValue(p) => {
            v.visit_mut_prop_name(&mut p.key);
            v.visit_mut_expr(&mut p.value);
        }
        Prop::Getter(p) => {
            v.visit_mut_prop_name(&mut p.key);
            v.visit_mut_function(&mut p.function);
        }
        Prop::Setter(p) => {
            v.visit_mut_prop_name(&mut p.key);
            v.visit_mut_function(&mut p.function);
        }
    }
}

fn walk_mut_prop_name<V: ?Sized + VisitMut>(v: &mut V, n: &mut PropName) {
    if let PropName::Computed(e) = n {
        v.visit_mut_expr(e);
    }
}

fn walk_mut_fn_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut FnExpr) {
    if let Some(ident) = &mut n.ident {
        v.visit_mut_ident(ident);
    }
    v.visit_mut_function(&mut n.function);
}

fn walk_mut_unary_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut UnaryExpr) {
    v.visit_mut_expr(&mut n.arg);
}

fn walk_mut_update_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut UpdateExpr) {
    v.visit_mut_expr(&mut n.arg);
}

fn walk_mut_bin_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut BinExpr) {
    v.visit_mut_expr(&mut n.left);
    v.visit_mut_expr(&mut n.right);
}

fn walk_mut_assign_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut AssignExpr) {
    v.visit_mut_expr(&mut n.left);
    v.visit_mut_expr(&mut n.right);
}

fn walk_mut_member_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut MemberExpr) {
    v.visit_mut_expr(&mut n.obj);
    if let MemberProp::Computed(prop) = &mut n.prop {
        v.visit_mut_expr(prop);
    }
}

fn walk_mut_cond_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut CondExpr) {
    v.visit_mut_expr(&mut n.test);
    v.visit_mut_expr(&mut n.cons);
    v.visit_mut_expr(&mut n.alt);
}

fn walk_mut_call_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut CallExpr) {
    v.visit_mut_expr(&mut n.callee);
    for arg in &mut n.args {
        v.visit_mut_expr(arg);
    }
}

fn walk_mut_new_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut NewExpr) {
    v.visit_mut_expr(&mut n.callee);
    for arg in &mut n.args {
        v.visit_mut_expr(arg);
    }
}

fn walk_mut_seq_expr<V: ?Sized + VisitMut>(v: &mut V, n: &mut SeqExpr) {
    for expr in &mut n.exprs {
        v.visit_mut_expr(expr);
    }
}
