use crate::{VisitMut, VisitMutWith};
use ast::*;

/// Deep clone that gives every node of the copy a fresh [`NodeId`].
///
/// Facts are keyed by node id, so a plain `clone` of a subtree that is then
/// inserted elsewhere would make two places in the program share facts.
pub trait CloneNode {
    fn clone_node(&self, program_data: &mut ProgramData) -> Self;
}

macro_rules! impl_clone_node {
    ($($ty:ty),*) => {
        $(
            impl CloneNode for $ty {
                fn clone_node(&self, program_data: &mut ProgramData) -> Self {
                    let mut cloned = self.clone();
                    cloned.visit_mut_with(&mut Renumberer { program_data });
                    cloned
                }
            }
        )*
    };
}

impl_clone_node!(Expr, Stmt, BlockStmt, Function);

impl CloneNode for Vec<Stmt> {
    fn clone_node(&self, program_data: &mut ProgramData) -> Self {
        let mut cloned = self.clone();
        cloned.visit_mut_with(&mut Renumberer { program_data });
        cloned
    }
}

struct Renumberer<'a> {
    program_data: &'a mut ProgramData,
}

impl Renumberer<'_> {
    fn id(&mut self) -> NodeId {
        self.program_data.new_id()
    }

    fn renumber_prop_name(&mut self, name: &mut PropName) {
        match name {
            PropName::Ident(i) => i.node_id = self.id(),
            PropName::Str(s) => s.node_id = self.id(),
            PropName::Num(n) => n.node_id = self.id(),
            PropName::Computed(e) => self.visit_mut_expr(e),
        }
    }
}

macro_rules! renumber {
    ($($name:ident: $ty:ty => $walk:ident),* $(,)?) => {
        $(
            fn $name(&mut self, node: &mut $ty) {
                node.node_id = self.id();
                crate::$walk(self, node);
            }
        )*
    };
}

impl VisitMut for Renumberer<'_> {
    renumber!(
        visit_mut_program: Program => walk_mut_program,
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
        visit_mut_throw_stmt: ThrowStmt => walk_mut_throw_stmt,
        visit_mut_with_stmt: WithStmt => walk_mut_with_stmt,
        visit_mut_try_stmt: TryStmt => walk_mut_try_stmt,
        visit_mut_catch_clause: CatchClause => walk_mut_catch_clause,
        visit_mut_array_lit: ArrayLit => walk_mut_array_lit,
        visit_mut_object_lit: ObjectLit => walk_mut_object_lit,
        visit_mut_fn_expr: FnExpr => walk_mut_fn_expr,
        visit_mut_unary_expr: UnaryExpr => walk_mut_unary_expr,
        visit_mut_update_expr: UpdateExpr => walk_mut_update_expr,
        visit_mut_bin_expr: BinExpr => walk_mut_bin_expr,
        visit_mut_assign_expr: AssignExpr => walk_mut_assign_expr,
        visit_mut_cond_expr: CondExpr => walk_mut_cond_expr,
        visit_mut_call_expr: CallExpr => walk_mut_call_expr,
        visit_mut_new_expr: NewExpr => walk_mut_new_expr,
        visit_mut_seq_expr: SeqExpr => walk_mut_seq_expr,
    );

    fn visit_mut_stmt(&mut self, node: &mut Stmt) {
        if let Stmt::Empty(e) = node {
            e.node_id = self.id();
            return;
        }
        crate::walk_mut_stmt(self, node);
    }

    fn visit_mut_break_stmt(&mut self, node: &mut BreakStmt) {
        node.node_id = self.id();
        if let Some(label) = &mut node.label {
            label.node_id = self.id();
        }
    }

    fn visit_mut_continue_stmt(&mut self, node: &mut ContinueStmt) {
        node.node_id = self.id();
        if let Some(label) = &mut node.label {
            label.node_id = self.id();
        }
    }

    fn visit_mut_labeled_stmt(&mut self, node: &mut LabeledStmt) {
        node.node_id = self.id();
        node.label.node_id = self.id();
        self.visit_mut_stmt(&mut node.body);
    }

    fn visit_mut_expr(&mut self, node: &mut Expr) {
        if let Expr::Invalid(i) = node {
            i.node_id = self.id();
            return;
        }
        crate::walk_mut_expr(self, node);
    }

    fn visit_mut_ident(&mut self, node: &mut Ident) {
        node.node_id = self.id();
    }

    fn visit_mut_this_expr(&mut self, node: &mut ThisExpr) {
        node.node_id = self.id();
    }

    fn visit_mut_lit(&mut self, node: &mut Lit) {
        match node {
            Lit::Str(n) => n.node_id = self.id(),
            Lit::Bool(n) => n.node_id = self.id(),
            Lit::Null(n) => n.node_id = self.id(),
            Lit::Num(n) => n.node_id = self.id(),
            Lit::Regex(n) => n.node_id = self.id(),
        }
    }

    fn visit_mut_member_expr(&mut self, node: &mut MemberExpr) {
        node.node_id = self.id();
        self.visit_mut_expr(&mut node.obj);
        match &mut node.prop {
            MemberProp::Ident(i) => i.node_id = self.id(),
            MemberProp::Computed(e) => self.visit_mut_expr(e),
        }
    }

    fn visit_mut_prop(&mut self, node: &mut Prop) {
        match node {
            Prop::KeyValue(p) => {
                p.node_id = self.id();
                self.renumber_prop_name(&mut p.key);
                self.visit_mut_expr(&mut p.value);
            }
            Prop::Getter(p) => {
                p.node_id = self.id();
                self.renumber_prop_name(&mut p.key);
                self.visit_mut_function(&mut p.function);
            }
            Prop::Setter(p) => {
                p.node_id = self.id();
                self.renumber_prop_name(&mut p.key);
                self.visit_mut_function(&mut p.function);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Visit;
    use atoms::js_word;
    use rustc_hash::FxHashSet;

    struct CollectIds(FxHashSet<NodeId>);

    impl<'ast> Visit<'ast> for CollectIds {
        fn visit_ident(&mut self, node: &'ast Ident) {
            self.0.insert(node.node_id);
        }

        fn visit_call_expr(&mut self, node: &'ast CallExpr) {
            self.0.insert(node.node_id);
            crate::walk_call_expr(self, node);
        }
    }

    #[test]
    fn cloned_nodes_get_fresh_ids() {
        let mut program_data = ProgramData::default();
        let callee = Ident::new(js_word!("log"), program_data.new_id());
        let arg = Ident::new(js_word!("length"), program_data.new_id());
        let call = Expr::Call(CallExpr {
            node_id: program_data.new_id(),
            callee: Box::new(Expr::Ident(callee)),
            args: vec![Expr::Ident(arg)],
        });

        let cloned = call.clone_node(&mut program_data);

        let mut original_ids = CollectIds(FxHashSet::default());
        original_ids.visit_expr(&call);
        let mut cloned_ids = CollectIds(FxHashSet::default());
        cloned_ids.visit_expr(&cloned);

        assert_eq!(original_ids.0.len(), 3);
        assert_eq!(cloned_ids.0.len(), 3);
        assert!(original_ids.0.is_disjoint(&cloned_ids.0));
        assert_eq!(program_data.len(), 6);
    }
}
