use crate::{GetNodeId, NodeId};
use atoms::JsWord;

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Str(Str),

    Bool(Bool),

    Null(Null),

    Num(Number),

    Regex(Regex),
}

impl GetNodeId for Lit {
    fn node_id(&self) -> NodeId {
        match self {
            Lit::Str(n) => n.node_id,
            Lit::Bool(n) => n.node_id,
            Lit::Null(n) => n.node_id,
            Lit::Num(n) => n.node_id,
            Lit::Regex(n) => n.node_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Str {
    pub node_id: NodeId,

    pub value: JsWord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bool {
    pub node_id: NodeId,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Null {
    pub node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Regex {
    pub node_id: NodeId,

    pub exp: JsWord,

    pub flags: JsWord,
}

/// A numeric literal. Negative numbers are represented as
/// `UnaryExpr { op: Minus, arg: Number }`, so `value` is never negative
/// (except for NaN, which is not a literal either and never reaches here).
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub node_id: NodeId,
    pub value: f64,
}
