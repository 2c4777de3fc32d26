use crate::{expr::Expr, function::FnDecl, ident::Ident, GetNodeId, NodeId};

/// Use when only block statements are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub node_id: NodeId,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(BlockStmt),

    Empty(EmptyStmt),

    Expr(ExprStmt),

    Var(VarDecl),

    Fn(FnDecl),

    If(IfStmt),

    For(ForStmt),

    ForIn(ForInStmt),

    While(WhileStmt),

    DoWhile(DoWhileStmt),

    Return(ReturnStmt),

    Break(BreakStmt),

    Continue(ContinueStmt),

    Labeled(LabeledStmt),

    Throw(ThrowStmt),

    /// `with (obj) body`. Parsed so that programs using it can be printed
    /// back unchanged; the optimizer refuses to touch such programs.
    With(WithStmt),

    /// A try statement. If handler is `None` then finalizer must be `Some`.
    Try(TryStmt),
}

impl GetNodeId for Stmt {
    fn node_id(&self) -> NodeId {
        match self {
            Stmt::Block(s) => s.node_id,
            Stmt::Empty(s) => s.node_id,
            Stmt::Expr(s) => s.node_id,
            Stmt::Var(s) => s.node_id,
            Stmt::Fn(s) => s.node_id,
            Stmt::If(s) => s.node_id,
            Stmt::For(s) => s.node_id,
            Stmt::ForIn(s) => s.node_id,
            Stmt::While(s) => s.node_id,
            Stmt::DoWhile(s) => s.node_id,
            Stmt::Return(s) => s.node_id,
            Stmt::Break(s) => s.node_id,
            Stmt::Continue(s) => s.node_id,
            Stmt::Labeled(s) => s.node_id,
            Stmt::Throw(s) => s.node_id,
            Stmt::With(s) => s.node_id,
            Stmt::Try(s) => s.node_id,
        }
    }
}

impl Stmt {
    /// Whether the statement ends abruptly on every path, so that the
    /// statements after it in the same list are unreachable.
    pub fn is_abrupt_completion(&self) -> bool {
        match self {
            Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Throw(_) => true,
            Stmt::Block(b) => b.stmts.iter().any(Stmt::is_abrupt_completion),
            Stmt::If(s) => match &s.alt {
                Some(alt) => s.cons.is_abrupt_completion() && alt.is_abrupt_completion(),
                None => false,
            },
            _ => false,
        }
    }

    /// Whether the statement declares a block scoped name (`let`, `const` or
    /// a function declaration), which prevents it from being hoisted out of
    /// its block.
    pub fn declares_block_scoped(&self) -> bool {
        match self {
            Stmt::Var(v) => v.kind != VarDeclKind::Var,
            Stmt::Fn(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    pub node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub node_id: NodeId,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarDeclKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

impl VarDeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarDeclKind::Var => "var",
            VarDeclKind::Let => "let",
            VarDeclKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub node_id: NodeId,
    pub kind: VarDeclKind,
    pub decls: Vec<VarDeclarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub node_id: NodeId,
    pub name: Ident,
    /// Initialization expression.
    pub init: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub node_id: NodeId,
    pub test: Box<Expr>,

    pub cons: Box<Stmt>,

    pub alt: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VarDeclOrExpr {
    VarDecl(VarDecl),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub node_id: NodeId,

    pub init: Option<VarDeclOrExpr>,

    pub test: Option<Box<Expr>>,

    pub update: Option<Box<Expr>>,

    pub body: Box<Stmt>,
}

/// The left hand side of a `for-in` loop: a declaration with exactly one
/// declarator and no initializer, or an assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    VarDecl(VarDecl),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub node_id: NodeId,
    pub left: ForHead,
    pub right: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub node_id: NodeId,
    pub test: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub node_id: NodeId,
    pub test: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub node_id: NodeId,
    pub arg: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub node_id: NodeId,
    pub label: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub node_id: NodeId,
    pub label: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub node_id: NodeId,
    pub label: Ident,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub node_id: NodeId,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithStmt {
    pub node_id: NodeId,
    pub object: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub node_id: NodeId,

    pub block: BlockStmt,

    pub handler: Option<CatchClause>,

    pub finalizer: Option<BlockStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub node_id: NodeId,
    /// es2019
    ///
    /// The param is null if the catch binding is omitted. E.g., try { foo() }
    /// catch { bar() }
    pub param: Option<Ident>,

    pub body: BlockStmt,
}
