//! Interns allocation sites to [`Reference`]s and holds the initial heap of
//! built-in objects.
//!
//! One registry lives for a whole optimization session, so a reference
//! names the same allocation site in every analysis pass and facts holding
//! references can be compared between passes.

use crate::{
    builtins::{self, Attr, HostId, HostValue},
    heap::{HeapObject, ObjectClass, PropertyDescriptor},
    utils::FxIndexSet,
    value::{Reference, Value},
};
use ast::NodeId;
use rustc_hash::FxHashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocSite {
    /// An object allocated by evaluating a node. Some nodes allocate more
    /// than one object (a function and its `prototype`), told apart by the
    /// slot.
    Node(NodeId, u8),
    Host(HostId),
}

/// Slot of a function's `prototype` object.
pub const PROTOTYPE_SLOT: u8 = 1;

#[derive(Debug)]
pub struct Registry {
    sites: FxIndexSet<AllocSite>,
    classes: Vec<ObjectClass>,
    initial_heap: FxHashMap<Reference, Rc<HeapObject>>,
    dirty: Rc<HeapObject>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry {
            sites: Default::default(),
            classes: vec![],
            initial_heap: Default::default(),
            dirty: Rc::new(HeapObject::dirty()),
        }
    }
}

impl Registry {
    /// The reference for `site`, registering it on first use.
    pub fn reference(&mut self, site: AllocSite, class: ObjectClass) -> Reference {
        let (index, inserted) = self.sites.insert_full(site);
        if inserted {
            self.classes.push(class);
        }
        Reference::from_index(index)
    }

    pub fn class_of(&self, r: Reference) -> ObjectClass {
        self.classes[r.index()]
    }

    pub fn site_of(&self, r: Reference) -> Option<AllocSite> {
        self.sites.get_index(r.index()).copied()
    }

    /// The user function a reference was allocated for.
    pub fn function_node(&self, r: Reference) -> Option<NodeId> {
        match self.class_of(r) {
            ObjectClass::Function(Some(crate::heap::FunctionLink::Node(id))) => Some(id),
            _ => None,
        }
    }

    /// The reference of a built-in object, materializing it and the objects
    /// it refers to into the initial heap.
    pub fn resolve_host(&mut self, host: HostId) -> Reference {
        let site = AllocSite::Host(host);
        if let Some(index) = self.sites.get_index_of(&site) {
            return Reference::from_index(index);
        }

        let desc = builtins::host_object(host);
        let r = self.reference(site, desc.class);
        let proto = desc.proto.map(|proto| self.resolve_host(proto));

        let mut obj = HeapObject::new(proto, desc.knowledge);
        obj.true_value = Some(host);
        for (name, value, attr) in desc.properties {
            let value = self.host_value(value);
            let prop = match attr {
                Attr::Method => PropertyDescriptor::hidden(value),
                Attr::Constant => PropertyDescriptor::frozen(value),
            };
            obj.insert(name.into(), prop);
        }
        self.initial_heap.insert(r, Rc::new(obj));
        r
    }

    fn host_value(&mut self, value: HostValue) -> Value {
        match value {
            HostValue::Primitive(p) => p.into(),
            HostValue::Host(host) => self.resolve_host(host).into(),
        }
    }

    /// The initial value of an allow-listed global binding.
    pub fn global_value(&mut self, name: &str) -> Option<Value> {
        builtins::global(name).map(|value| self.host_value(value))
    }

    pub fn initial_object(&self, r: Reference) -> Option<Rc<HeapObject>> {
        self.initial_heap.get(&r).cloned()
    }

    pub fn is_host(&self, r: Reference) -> bool {
        matches!(self.site_of(r), Some(AllocSite::Host(_)))
    }

    pub fn dirty(&self) -> Rc<HeapObject> {
        self.dirty.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builtins::NativeFn,
        heap::{FunctionLink, PropertyKind},
    };

    #[test]
    fn sites_are_interned() {
        let mut registry = Registry::default();
        let a = registry.reference(AllocSite::Node(NodeId::from_u32(1), 0), ObjectClass::Object);
        let b = registry.reference(AllocSite::Node(NodeId::from_u32(1), 1), ObjectClass::Object);
        let c = registry.reference(AllocSite::Node(NodeId::from_u32(1), 0), ObjectClass::Object);
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn host_objects_are_materialized_once() {
        let mut registry = Registry::default();
        let math = registry.resolve_host(HostId::Math);
        assert_eq!(registry.resolve_host(HostId::Math), math);

        let obj = registry.initial_object(math).unwrap();
        assert_eq!(obj.true_value, Some(HostId::Math));
        let abs = match &obj.properties[&atoms::JsWord::from("abs")].kind {
            PropertyKind::Data(v) => v.as_reference().unwrap(),
            _ => unreachable!(),
        };
        assert_eq!(
            registry.class_of(abs),
            ObjectClass::Function(Some(FunctionLink::Native(NativeFn::MathAbs)))
        );
        assert!(registry.initial_object(abs).is_some());
        assert!(registry.is_host(abs));
    }

    #[test]
    fn globals() {
        let mut registry = Registry::default();
        assert_eq!(registry.global_value("undefined"), Some(Value::UNDEFINED));
        let math = registry.global_value("Math").unwrap().as_reference().unwrap();
        assert_eq!(math, registry.resolve_host(HostId::Math));
        assert_eq!(registry.global_value("document"), None);
    }
}
