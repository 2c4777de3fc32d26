use crate::{ident::Ident, stmt::BlockStmt, NodeId};

/// Common parts of function declarations, function expressions and
/// accessors in object literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub node_id: NodeId,
    pub params: Vec<Ident>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub node_id: NodeId,
    pub ident: Ident,
    pub function: Function,
}
