#![deny(unreachable_patterns)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

pub use self::{
    expr::{
        ArrayLit, AssignExpr, BinExpr, CallExpr, CondExpr, Expr, FnExpr, Invalid, MemberExpr,
        MemberProp, NewExpr, ObjectLit, SeqExpr, ThisExpr, UnaryExpr, UpdateExpr,
    },
    function::{FnDecl, Function},
    ident::Ident,
    lit::{Bool, Lit, Null, Number, Regex, Str},
    operators::{AssignOp, BinaryOp, UnaryOp, UpdateOp},
    prop::{GetterProp, KeyValueProp, Prop, PropName, SetterProp},
    stmt::{
        BlockStmt, BreakStmt, CatchClause, ContinueStmt, DoWhileStmt, EmptyStmt, ExprStmt,
        ForHead, ForInStmt, ForStmt, IfStmt, LabeledStmt, ReturnStmt, Stmt, ThrowStmt, TryStmt,
        VarDecl, VarDeclKind, VarDeclOrExpr, VarDeclarator, WhileStmt, WithStmt,
    },
};

mod expr;
mod function;
mod ident;
mod lit;
mod operators;
mod prop;
mod stmt;

/// Identifies a node of the tree. Ids are unique within a [`ProgramData`] and
/// survive rewrites of unrelated parts of the tree, which is what lets facts
/// computed for a node be looked up again in a later pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        NodeId(value)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

pub trait GetNodeId {
    fn node_id(&self) -> NodeId;
}

impl<T> GetNodeId for &T
where
    T: GetNodeId,
{
    fn node_id(&self) -> NodeId {
        (*self).node_id()
    }
}

impl<T> GetNodeId for Box<T>
where
    T: GetNodeId,
{
    fn node_id(&self) -> NodeId {
        self.as_ref().node_id()
    }
}

/// Per-program side data. Hands out fresh [`NodeId`]s to the parser and to
/// passes that synthesize new nodes.
#[derive(Debug, Default)]
pub struct ProgramData {
    next_id: u32,
}

impl ProgramData {
    pub fn new_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn len(&self) -> usize {
        self.next_id as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub node_id: NodeId,
    pub body: Vec<Stmt>,
}

macro_rules! impl_get_node_id {
    ($($t:ty),* $(,)?) => {
        $(
            impl GetNodeId for $t {
                #[inline]
                fn node_id(&self) -> NodeId {
                    self.node_id
                }
            }
        )*
    };
}

impl_get_node_id!(
    Program,
    Ident,
    Number,
    Str,
    Bool,
    Null,
    Regex,
    ThisExpr,
    Invalid,
    ArrayLit,
    ObjectLit,
    FnExpr,
    UnaryExpr,
    UpdateExpr,
    BinExpr,
    AssignExpr,
    MemberExpr,
    CondExpr,
    CallExpr,
    NewExpr,
    SeqExpr,
    Function,
    FnDecl,
    KeyValueProp,
    GetterProp,
    SetterProp,
    BlockStmt,
    EmptyStmt,
    ExprStmt,
    VarDecl,
    VarDeclarator,
    IfStmt,
    ForStmt,
    ForInStmt,
    WhileStmt,
    DoWhileStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    LabeledStmt,
    ThrowStmt,
    WithStmt,
    TryStmt,
    CatchClause,
);
