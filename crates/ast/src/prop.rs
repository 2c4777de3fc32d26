use crate::{
    expr::Expr,
    function::Function,
    ident::Ident,
    lit::{Number, Str},
    GetNodeId, NodeId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// `key: value`
    KeyValue(KeyValueProp),
    /// `get key() {}`
    Getter(GetterProp),
    /// `set key(v) {}`
    Setter(SetterProp),
}

impl GetNodeId for Prop {
    fn node_id(&self) -> NodeId {
        match self {
            Prop::KeyValue(p) => p.node_id,
            Prop::Getter(p) => p.node_id,
            Prop::Setter(p) => p.node_id,
        }
    }
}

impl Prop {
    pub fn key(&self) -> &PropName {
        match self {
            Prop::KeyValue(p) => &p.key,
            Prop::Getter(p) => &p.key,
            Prop::Setter(p) => &p.key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueProp {
    pub node_id: NodeId,
    pub key: PropName,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetterProp {
    pub node_id: NodeId,
    pub key: PropName,
    /// Always has zero params.
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetterProp {
    pub node_id: NodeId,
    pub key: PropName,
    /// Always has exactly one param.
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropName {
    Ident(Ident),
    Str(Str),
    Num(Number),
    /// `[expr]`
    Computed(Box<Expr>),
}
