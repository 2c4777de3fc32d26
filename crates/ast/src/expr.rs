use crate::{
    function::Function,
    ident::Ident,
    lit::Lit,
    operators::{AssignOp, BinaryOp, UnaryOp, UpdateOp},
    prop::Prop,
    GetNodeId, NodeId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    This(ThisExpr),
    Array(ArrayLit),
    Object(ObjectLit),
    Fn(FnExpr),
    Unary(UnaryExpr),
    /// `++v`, `--v`, `v++`, `v--`
    Update(UpdateExpr),
    /// Binary and logical operators.
    Bin(BinExpr),
    Assign(AssignExpr),
    /// `a.b` or `a[b]`
    Member(MemberExpr),
    /// `true ? 'a' : 'b'`
    Cond(CondExpr),
    Call(CallExpr),
    /// `new Cat()`
    New(NewExpr),
    Seq(SeqExpr),
    Ident(Ident),
    Lit(Lit),
    /// Placeholder left behind while a pass has moved the real expression
    /// out. Never survives a pass.
    Invalid(Invalid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub node_id: NodeId,
}

impl Expr {
    /// Takes the expression out, leaving an [`Expr::Invalid`] placeholder.
    pub fn take(&mut self) -> Expr {
        std::mem::replace(
            self,
            Expr::Invalid(Invalid {
                node_id: NodeId::DUMMY,
            }),
        )
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Expr::Invalid(_))
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(i) => Some(i),
            _ => None,
        }
    }
}

impl GetNodeId for Expr {
    fn node_id(&self) -> NodeId {
        match self {
            Expr::This(n) => n.node_id,
            Expr::Array(n) => n.node_id,
            Expr::Object(n) => n.node_id,
            Expr::Fn(n) => n.node_id,
            Expr::Unary(n) => n.node_id,
            Expr::Update(n) => n.node_id,
            Expr::Bin(n) => n.node_id,
            Expr::Assign(n) => n.node_id,
            Expr::Member(n) => n.node_id,
            Expr::Cond(n) => n.node_id,
            Expr::Call(n) => n.node_id,
            Expr::New(n) => n.node_id,
            Expr::Seq(n) => n.node_id,
            Expr::Ident(n) => n.node_id(),
            Expr::Lit(n) => n.node_id(),
            Expr::Invalid(n) => n.node_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpr {
    pub node_id: NodeId,
}

/// Array literal. `None` elements are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub node_id: NodeId,
    pub elems: Vec<Option<Expr>>,
}

/// Object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub node_id: NodeId,
    pub props: Vec<Prop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnExpr {
    pub node_id: NodeId,
    pub ident: Option<Ident>,
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub node_id: NodeId,
    pub op: UnaryOp,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpr {
    pub node_id: NodeId,
    pub op: UpdateOp,
    pub prefix: bool,
    pub arg: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinExpr {
    pub node_id: NodeId,
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// `left` is always an [`Expr::Ident`] or an [`Expr::Member`]; the parser
/// rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub node_id: NodeId,
    pub op: AssignOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub node_id: NodeId,
    pub obj: Box<Expr>,
    pub prop: MemberProp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    /// `a.b`
    Ident(Ident),
    /// `a[b]`
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondExpr {
    pub node_id: NodeId,
    pub test: Box<Expr>,
    pub cons: Box<Expr>,
    pub alt: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub node_id: NodeId,
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub node_id: NodeId,
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeqExpr {
    pub node_id: NodeId,
    pub exprs: Vec<Expr>,
}
