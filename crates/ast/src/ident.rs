use crate::NodeId;
use atoms::JsWord;

/// An identifier occurrence: a binding, a reference, a label or a
/// non-computed property name.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub node_id: NodeId,
    pub sym: JsWord,
}

impl Ident {
    pub const fn new(sym: JsWord, node_id: NodeId) -> Self {
        Self { node_id, sym }
    }
}
