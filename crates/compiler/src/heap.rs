//! Abstract heap objects.
//!
//! A [`HeapObject`] is an immutable snapshot of what is known about one
//! allocation site's object. Updates are copy-on-write: every `with_*`
//! method returns a new object and leaves the receiver untouched, so
//! snapshots can be shared freely between evaluation states.

use crate::{
    builtins::{HostId, NativeFn},
    ops::array_index,
    utils::FxIndexMap,
    value::{Reference, Value},
};
use ast::NodeId;
use atoms::{js_word, JsWord};
use std::rc::Rc;

/// Prototype chains longer than this are assumed to be cyclic.
const MAX_CHAIN_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionLink {
    Native(NativeFn),
    /// The `Function` node of a user function.
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Object,
    Array,
    Function(Option<FunctionLink>),
    Number,
    Boolean,
    String,
    RegExp,
    Arguments,
}

/// How completely an object's set of properties is known. Ordered from least
/// to most knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKnowledge {
    /// Any property may exist with any value.
    MayHaveNew,
    /// Known own properties are final, but properties with other names may
    /// exist.
    NoUnknownOverride,
    /// As above, and every enumerable property is known.
    NoUnknownOverrideOrEnumerable,
    /// The object has exactly the listed properties.
    KnowsAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Data(Value),
    Accessor {
        get: Option<Reference>,
        set: Option<Reference>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub enumerable: bool,
    pub writable: bool,
    pub configurable: bool,
    /// Writes have effects on other properties that aren't modelled, like an
    /// array's `length`.
    pub hidden_setter: bool,
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    /// A property created by assignment or an object literal.
    pub fn data(value: Value) -> Self {
        PropertyDescriptor {
            enumerable: true,
            writable: true,
            configurable: true,
            hidden_setter: false,
            kind: PropertyKind::Data(value),
        }
    }

    /// A method or other non-enumerable property of a built-in.
    pub fn hidden(value: Value) -> Self {
        PropertyDescriptor {
            enumerable: false,
            ..PropertyDescriptor::data(value)
        }
    }

    pub fn frozen(value: Value) -> Self {
        PropertyDescriptor {
            enumerable: false,
            writable: false,
            configurable: false,
            hidden_setter: false,
            kind: PropertyKind::Data(value),
        }
    }

    pub fn accessor(get: Option<Reference>, set: Option<Reference>) -> Self {
        PropertyDescriptor {
            enumerable: true,
            writable: true,
            configurable: true,
            hidden_setter: false,
            kind: PropertyKind::Accessor { get, set },
        }
    }

    fn same_flags(&self, other: &Self) -> bool {
        self.enumerable == other.enumerable
            && self.writable == other.writable
            && self.configurable == other.configurable
            && self.hidden_setter == other.hidden_setter
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapObject {
    pub proto: Option<Reference>,
    pub properties: FxIndexMap<JsWord, PropertyDescriptor>,
    pub knowledge: PropertyKnowledge,
    /// Set for built-in objects, whose real counterpart the analysis may
    /// only rely on when natives are known not to be overwritten.
    pub true_value: Option<HostId>,
    pub dirty: bool,
}

/// The result of resolving a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The property certainly doesn't exist.
    Absent,
    Present(Value),
    Unknown,
}

/// What the heap model needs from its surroundings: reading other objects on
/// the prototype chain and running getters.
pub trait HeapAccess {
    fn dereference(&mut self, r: Reference) -> Rc<HeapObject>;

    /// Invokes `getter` with `this` bound to `this` and returns its result.
    fn call_getter(&mut self, getter: Reference, this: Reference) -> Value;

    /// Whether built-in objects may be assumed to be unmodified.
    fn trusts_natives(&self) -> bool;
}

impl HeapObject {
    pub fn new(proto: Option<Reference>, knowledge: PropertyKnowledge) -> Self {
        HeapObject {
            proto,
            properties: Default::default(),
            knowledge,
            true_value: None,
            dirty: false,
        }
    }

    /// The sentinel for an object about which nothing is known.
    pub fn dirty() -> Self {
        HeapObject {
            proto: None,
            properties: Default::default(),
            knowledge: PropertyKnowledge::MayHaveNew,
            true_value: None,
            dirty: true,
        }
    }

    /// Adds or replaces a property while building an object.
    pub fn insert(&mut self, name: JsWord, desc: PropertyDescriptor) {
        self.properties.insert(name, desc);
    }

    /// Refuses to answer for built-ins unless they are trusted.
    fn is_trusted(&self, heap: &dyn HeapAccess) -> bool {
        !self.dirty && (self.true_value.is_none() || heap.trusts_natives())
    }

    /// Resolves property `name` of this object, which is the object `this`
    /// refers to or one of its prototypes.
    pub fn lookup(&self, this: Reference, name: &JsWord, heap: &mut dyn HeapAccess) -> Lookup {
        self.lookup_at(this, name, heap, 0)
    }

    fn lookup_at(
        &self,
        this: Reference,
        name: &JsWord,
        heap: &mut dyn HeapAccess,
        depth: usize,
    ) -> Lookup {
        if !self.is_trusted(heap) || depth > MAX_CHAIN_DEPTH {
            return Lookup::Unknown;
        }
        if let Some(desc) = self.properties.get(name) {
            return match &desc.kind {
                PropertyKind::Data(v) => Lookup::Present(v.clone()),
                PropertyKind::Accessor { get: Some(get), .. } => {
                    Lookup::Present(heap.call_getter(*get, this))
                }
                PropertyKind::Accessor { get: None, .. } => Lookup::Present(Value::UNDEFINED),
            };
        }
        if self.knowledge == PropertyKnowledge::MayHaveNew {
            return Lookup::Unknown;
        }
        match self.proto {
            None if self.knowledge == PropertyKnowledge::KnowsAll => Lookup::Absent,
            None => Lookup::Unknown,
            Some(proto) => {
                let proto = heap.dereference(proto);
                match proto.lookup_at(this, name, heap, depth + 1) {
                    Lookup::Absent if self.knowledge == PropertyKnowledge::KnowsAll => {
                        Lookup::Absent
                    }
                    Lookup::Absent => Lookup::Unknown,
                    found => found,
                }
            }
        }
    }

    /// Like [`lookup`](Self::lookup), with missing properties reading as
    /// `undefined`.
    pub fn resolve(&self, this: Reference, name: &JsWord, heap: &mut dyn HeapAccess) -> Value {
        match self.lookup(this, name, heap) {
            Lookup::Absent => Value::UNDEFINED,
            Lookup::Present(v) => v,
            Lookup::Unknown => Value::Unknown,
        }
    }

    /// The `in` operator. Doesn't run getters.
    pub fn has(&self, name: &JsWord, heap: &mut dyn HeapAccess) -> Option<bool> {
        let mut obj = Rc::new(self.clone());
        for _ in 0..MAX_CHAIN_DEPTH {
            if !obj.is_trusted(heap) {
                return None;
            }
            if obj.properties.contains_key(name) {
                return Some(true);
            }
            if obj.knowledge == PropertyKnowledge::MayHaveNew {
                return None;
            }
            match obj.proto {
                None if obj.knowledge == PropertyKnowledge::KnowsAll => return Some(false),
                None => return None,
                Some(_) if obj.knowledge != PropertyKnowledge::KnowsAll => return None,
                Some(proto) => obj = heap.dereference(proto),
            }
        }
        None
    }

    /// The own setter for `name`, if the property is an accessor.
    pub fn setter(&self, name: &JsWord) -> Option<Option<Reference>> {
        match self.properties.get(name).map(|desc| &desc.kind) {
            Some(PropertyKind::Accessor { set, .. }) => Some(*set),
            _ => None,
        }
    }

    /// Returns the object after assigning `value` to property `name`.
    ///
    /// Accessor properties are returned unchanged; running the setter is up
    /// to the caller.
    pub fn with_property(&self, name: &JsWord, value: Value) -> HeapObject {
        if self.dirty {
            return HeapObject::dirty();
        }
        match self.properties.get(name) {
            Some(desc) if !desc.writable => self.clone(),
            Some(desc) if desc.hidden_setter => HeapObject::dirty(),
            Some(PropertyDescriptor {
                kind: PropertyKind::Accessor { .. },
                ..
            }) => self.clone(),
            Some(desc) => {
                let mut obj = self.clone();
                obj.properties.insert(
                    name.clone(),
                    PropertyDescriptor {
                        kind: PropertyKind::Data(value),
                        ..desc.clone()
                    },
                );
                obj
            }
            None => {
                if self.is_array() && array_index(name).is_some() {
                    // May grow `length`.
                    return HeapObject::dirty();
                }
                let mut obj = self.clone();
                obj.properties
                    .insert(name.clone(), PropertyDescriptor::data(value));
                obj
            }
        }
    }

    /// Returns the object after `delete obj[name]`.
    pub fn without_property(&self, name: &JsWord) -> HeapObject {
        if self.dirty {
            return HeapObject::dirty();
        }
        match self.properties.get(name) {
            Some(desc) if desc.configurable => {
                let mut obj = self.clone();
                obj.properties.shift_remove(name);
                // The real object no longer matches.
                obj.true_value = None;
                obj
            }
            _ => self.clone(),
        }
    }

    /// Arrays carry a `length` with a hidden setter.
    pub fn is_array(&self) -> bool {
        self.properties
            .get(&js_word!("length"))
            .map_or(false, |desc| desc.hidden_setter)
    }

    /// The elements of an array whose contents are fully known.
    pub fn array_elements(&self) -> Option<Vec<Value>> {
        if self.dirty || !self.is_array() || self.knowledge != PropertyKnowledge::KnowsAll {
            return None;
        }
        let len = match &self.properties.get(&js_word!("length"))?.kind {
            PropertyKind::Data(v) => match v.as_primitive()? {
                crate::value::Primitive::Number(n) => *n as usize,
                _ => return None,
            },
            PropertyKind::Accessor { .. } => return None,
        };
        (0..len)
            .map(|i| match self.properties.get(&JsWord::from(i.to_string())) {
                Some(PropertyDescriptor {
                    kind: PropertyKind::Data(v),
                    ..
                }) => Some(v.clone()),
                Some(_) => None,
                None => Some(Value::UNDEFINED),
            })
            .collect()
    }

    /// Returns the array after replacing all of its elements.
    pub fn with_elements(&self, elems: &[Value]) -> HeapObject {
        let mut obj = self.clone();
        obj.properties
            .retain(|key, _| array_index(key).is_none() && *key != js_word!("length"));
        for (i, elem) in elems.iter().enumerate() {
            obj.properties
                .insert(i.to_string().into(), PropertyDescriptor::data(elem.clone()));
        }
        obj.properties.insert(
            js_word!("length"),
            array_length(elems.len()),
        );
        obj
    }

    /// Least upper bound of two versions of the same object.
    pub fn or(&self, other: &HeapObject) -> HeapObject {
        if self == other {
            return self.clone();
        }
        if self.dirty || other.dirty || self.proto != other.proto {
            return HeapObject::dirty();
        }

        let mut knowledge = self.knowledge.min(other.knowledge);
        let mut properties = FxIndexMap::default();
        for (name, a) in &self.properties {
            let merged = other.properties.get(name).and_then(|b| {
                if !a.same_flags(b) {
                    return None;
                }
                let kind = match (&a.kind, &b.kind) {
                    (PropertyKind::Data(x), PropertyKind::Data(y)) => PropertyKind::Data(x.or(y)),
                    (x @ PropertyKind::Accessor { .. }, y) if x == y => x.clone(),
                    _ => return None,
                };
                Some(PropertyDescriptor {
                    kind,
                    ..a.clone()
                })
            });
            match merged {
                Some(desc) => {
                    properties.insert(name.clone(), desc);
                }
                None => knowledge = PropertyKnowledge::MayHaveNew,
            }
        }
        if other
            .properties
            .keys()
            .any(|name| !self.properties.contains_key(name))
        {
            knowledge = PropertyKnowledge::MayHaveNew;
        }

        HeapObject {
            proto: self.proto,
            properties,
            knowledge,
            true_value: if self.true_value == other.true_value {
                self.true_value
            } else {
                None
            },
            dirty: false,
        }
    }

    /// Whether `for-in` over this object visits a statically known list of
    /// keys.
    pub fn can_iterate(&self, heap: &mut dyn HeapAccess) -> bool {
        self.iterate(heap).is_some()
    }

    /// The keys `for-in` visits, in order. `None` when any object on the
    /// prototype chain may have enumerable properties that aren't known.
    pub fn iterate(&self, heap: &mut dyn HeapAccess) -> Option<Vec<JsWord>> {
        self.iterate_at(heap, 0)
    }

    fn iterate_at(&self, heap: &mut dyn HeapAccess, depth: usize) -> Option<Vec<JsWord>> {
        if !self.is_trusted(heap)
            || depth > MAX_CHAIN_DEPTH
            || self.knowledge < PropertyKnowledge::NoUnknownOverrideOrEnumerable
        {
            return None;
        }

        let mut indices: Vec<(u32, &JsWord)> = vec![];
        let mut keys: Vec<JsWord> = vec![];
        for (name, desc) in &self.properties {
            if !desc.enumerable {
                continue;
            }
            match array_index(name) {
                Some(i) => indices.push((i, name)),
                None => keys.push(name.clone()),
            }
        }
        indices.sort_by_key(|(i, _)| *i);
        let mut out: Vec<JsWord> = indices.into_iter().map(|(_, name)| name.clone()).collect();
        out.extend(keys);

        if let Some(proto) = self.proto {
            let proto = heap.dereference(proto);
            for name in proto.iterate_at(heap, depth + 1)? {
                if !self.properties.contains_key(&name) && !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        Some(out)
    }

    /// Whether `proto` is on this object's prototype chain. `None` when the
    /// chain isn't known.
    pub fn is_instance_of(&self, proto: Reference, heap: &mut dyn HeapAccess) -> Option<bool> {
        let mut obj = Rc::new(self.clone());
        for _ in 0..MAX_CHAIN_DEPTH {
            if obj.dirty {
                return None;
            }
            match obj.proto {
                None => return Some(false),
                Some(p) if p == proto => return Some(true),
                Some(p) => obj = heap.dereference(p),
            }
        }
        None
    }

    /// Every reference stored in this object.
    pub fn references(&self) -> impl Iterator<Item = Reference> + '_ {
        self.proto.into_iter().chain(self.properties.values().flat_map(|desc| {
            let refs: Vec<Reference> = match &desc.kind {
                PropertyKind::Data(v) => v.references().collect(),
                PropertyKind::Accessor { get, set } => get.iter().chain(set).copied().collect(),
            };
            refs
        }))
    }
}

pub fn array_length(len: usize) -> PropertyDescriptor {
    PropertyDescriptor {
        enumerable: false,
        writable: true,
        configurable: false,
        hidden_setter: true,
        kind: PropertyKind::Data(Value::number(len as f64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct TestHeap {
        objects: FxHashMap<Reference, Rc<HeapObject>>,
        trusts_natives: bool,
    }

    impl HeapAccess for TestHeap {
        fn dereference(&mut self, r: Reference) -> Rc<HeapObject> {
            self.objects
                .get(&r)
                .cloned()
                .unwrap_or_else(|| Rc::new(HeapObject::dirty()))
        }

        fn call_getter(&mut self, _: Reference, _: Reference) -> Value {
            Value::string("from getter")
        }

        fn trusts_natives(&self) -> bool {
            self.trusts_natives
        }
    }

    fn r(i: usize) -> Reference {
        Reference::from_index(i)
    }

    fn key(s: &str) -> JsWord {
        s.into()
    }

    fn object(props: &[(&str, f64)]) -> HeapObject {
        let mut obj = HeapObject::new(None, PropertyKnowledge::KnowsAll);
        for (name, v) in props {
            obj.insert(key(name), PropertyDescriptor::data(Value::number(*v)));
        }
        obj
    }

    #[test]
    fn with_property_is_copy_on_write() {
        let mut heap = TestHeap::default();
        let h1 = object(&[("x", 1.0)]);
        let h2 = h1.with_property(&key("x"), Value::number(2.0));

        assert_eq!(h1.resolve(r(0), &key("x"), &mut heap), Value::number(1.0));
        assert_eq!(h2.resolve(r(0), &key("x"), &mut heap), Value::number(2.0));
    }

    #[test]
    fn non_writable_is_unchanged() {
        let mut obj = object(&[]);
        obj.insert(key("PI"), PropertyDescriptor::frozen(Value::number(3.0)));
        assert_eq!(obj.with_property(&key("PI"), Value::number(4.0)), obj);
    }

    #[test]
    fn hidden_setter_dirties() {
        let mut arr = object(&[]);
        arr.insert(js_word!("length"), array_length(0));
        assert!(arr.with_property(&js_word!("length"), Value::number(3.0)).dirty);
        assert!(arr.with_property(&key("0"), Value::number(3.0)).dirty);
        assert!(!arr.with_property(&key("foo"), Value::number(3.0)).dirty);
    }

    #[test]
    fn dirty_reads_unknown() {
        let mut heap = TestHeap::default();
        let obj = HeapObject::dirty().with_property(&key("x"), Value::number(1.0));
        assert!(obj.dirty);
        assert_eq!(obj.lookup(r(0), &key("x"), &mut heap), Lookup::Unknown);
    }

    #[test]
    fn missing_properties() {
        let mut heap = TestHeap::default();
        let closed = object(&[("x", 1.0)]);
        assert_eq!(closed.lookup(r(0), &key("y"), &mut heap), Lookup::Absent);
        assert_eq!(closed.resolve(r(0), &key("y"), &mut heap), Value::UNDEFINED);

        let open = HeapObject::new(None, PropertyKnowledge::NoUnknownOverride);
        assert_eq!(open.lookup(r(0), &key("y"), &mut heap), Lookup::Unknown);
    }

    #[test]
    fn inherited_properties() {
        let mut heap = TestHeap::default();
        heap.objects.insert(r(1), Rc::new(object(&[("inherited", 7.0)])));

        let mut child = object(&[("own", 1.0)]);
        child.proto = Some(r(1));
        assert_eq!(
            child.resolve(r(0), &key("inherited"), &mut heap),
            Value::number(7.0)
        );
        assert_eq!(child.lookup(r(0), &key("nope"), &mut heap), Lookup::Absent);

        child.knowledge = PropertyKnowledge::NoUnknownOverride;
        assert_eq!(child.lookup(r(0), &key("nope"), &mut heap), Lookup::Unknown);
        assert_eq!(
            child.lookup(r(0), &key("own"), &mut heap),
            Lookup::Present(Value::number(1.0))
        );
    }

    #[test]
    fn getters_are_called() {
        let mut heap = TestHeap::default();
        let mut obj = object(&[]);
        obj.insert(key("g"), PropertyDescriptor::accessor(Some(r(5)), None));
        obj.insert(key("s"), PropertyDescriptor::accessor(None, Some(r(6))));
        assert_eq!(
            obj.resolve(r(0), &key("g"), &mut heap),
            Value::string("from getter")
        );
        assert_eq!(obj.resolve(r(0), &key("s"), &mut heap), Value::UNDEFINED);
        assert_eq!(obj.with_property(&key("s"), Value::NULL), obj);
    }

    #[test]
    fn built_ins_need_trust() {
        let mut heap = TestHeap::default();
        let mut math = object(&[("PI", 3.0)]);
        math.true_value = Some(HostId::Math);
        assert_eq!(math.lookup(r(0), &key("PI"), &mut heap), Lookup::Unknown);

        heap.trusts_natives = true;
        assert_eq!(
            math.lookup(r(0), &key("PI"), &mut heap),
            Lookup::Present(Value::number(3.0))
        );
    }

    #[test]
    fn without_property() {
        let mut obj = object(&[("x", 1.0)]);
        obj.true_value = Some(HostId::Math);
        obj.insert(key("fixed"), PropertyDescriptor::frozen(Value::NULL));

        let deleted = obj.without_property(&key("x"));
        assert!(!deleted.properties.contains_key(&key("x")));
        assert_eq!(deleted.true_value, None);
        assert_eq!(obj.without_property(&key("fixed")), obj);
        assert_eq!(obj.without_property(&key("missing")), obj);
    }

    #[test]
    fn or_merges_values() {
        let a = object(&[("x", 1.0), ("y", 1.0)]);
        let b = object(&[("x", 2.0), ("y", 1.0)]);
        let merged = a.or(&b);
        assert_eq!(merged.knowledge, PropertyKnowledge::KnowsAll);
        assert_eq!(
            merged.properties[&key("x")].kind,
            PropertyKind::Data(Value::number(1.0).or(&Value::number(2.0)))
        );
    }

    #[test]
    fn or_degrades_on_mismatch() {
        let a = object(&[("x", 1.0)]);
        let b = object(&[("y", 1.0)]);
        let merged = a.or(&b);
        assert!(merged.properties.is_empty());
        assert_eq!(merged.knowledge, PropertyKnowledge::MayHaveNew);

        let mut c = object(&[]);
        c.insert(key("x"), PropertyDescriptor::hidden(Value::number(1.0)));
        let merged = a.or(&c);
        assert!(merged.properties.is_empty());
        assert_eq!(merged.knowledge, PropertyKnowledge::MayHaveNew);

        assert!(a.or(&HeapObject::dirty()).dirty);
    }

    #[test]
    fn iteration_order() {
        let mut heap = TestHeap::default();
        let mut proto = object(&[("inherited", 0.0), ("b", 0.0)]);
        proto.insert(key("hidden"), PropertyDescriptor::hidden(Value::NULL));
        heap.objects.insert(r(1), Rc::new(proto));

        let mut obj = object(&[("b", 1.0), ("10", 1.0), ("a", 1.0), ("2", 1.0)]);
        obj.proto = Some(r(1));
        let keys = obj.iterate(&mut heap).unwrap();
        assert_eq!(keys, vec![key("2"), key("10"), key("b"), key("a"), key("inherited")]);
    }

    #[test]
    fn iteration_needs_known_enumerables() {
        let mut heap = TestHeap::default();
        let mut obj = object(&[("a", 1.0)]);
        obj.knowledge = PropertyKnowledge::NoUnknownOverride;
        assert!(!obj.can_iterate(&mut heap));

        let mut obj = object(&[("a", 1.0)]);
        obj.proto = Some(r(9));
        assert!(!obj.can_iterate(&mut heap));
    }

    #[test]
    fn instance_of() {
        let mut heap = TestHeap::default();
        heap.objects.insert(r(1), Rc::new(object(&[])));

        let mut obj = object(&[]);
        obj.proto = Some(r(1));
        assert_eq!(obj.is_instance_of(r(1), &mut heap), Some(true));
        assert_eq!(obj.is_instance_of(r(2), &mut heap), Some(false));

        obj.proto = Some(r(3));
        assert_eq!(obj.is_instance_of(r(2), &mut heap), None);
    }

    #[test]
    fn array_snapshots() {
        let mut arr = object(&[("0", 1.0), ("1", 2.0)]);
        arr.insert(js_word!("length"), array_length(2));
        assert_eq!(
            arr.array_elements(),
            Some(vec![Value::number(1.0), Value::number(2.0)])
        );

        let updated = arr.with_elements(&[Value::number(3.0)]);
        assert_eq!(updated.array_elements(), Some(vec![Value::number(3.0)]));
        assert!(!updated.properties.contains_key(&key("1")));
    }
}
