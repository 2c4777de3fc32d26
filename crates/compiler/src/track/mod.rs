//! Abstract interpretation of statements and expressions.
//!
//! This module holds what statements and expressions share: allocation,
//! property access, calls and the effects of calling code the analysis
//! can't see.

use crate::{
    analysis::{Analysis, Tracked},
    builtins::{self, ArrayCallResult, Effect, HostId, NativeFn, Receiver},
    heap::{
        array_length, FunctionLink, HeapAccess, HeapObject, Lookup, ObjectClass,
        PropertyDescriptor, PropertyKind, PropertyKnowledge,
    },
    ops,
    registry::{AllocSite, PROTOTYPE_SLOT},
    state::{ObjectLookup, State},
    value::{Primitive, Reference, Single, Value},
};
use ast::NodeId;
use atoms::{js_word, JsWord};
use rustc_hash::FxHashSet;
use std::rc::Rc;

mod expr;
mod stmt;

/// Calls to pure natives are evaluated for at most this many combinations
/// of possible inputs.
const MAX_NATIVE_COMBINATIONS: usize = 64;

/// Lets the heap model read the current state and run getters.
struct Access<'c, 'a, 's, 'p> {
    cx: &'c mut Analysis<'a>,
    state: &'s State<'p>,
    /// A getter that may have effects ran.
    impure: bool,
}

impl HeapAccess for Access<'_, '_, '_, '_> {
    fn dereference(&mut self, r: Reference) -> Rc<HeapObject> {
        self.state.dereference(self.cx.registry, r)
    }

    fn call_getter(&mut self, getter: Reference, _this: Reference) -> Value {
        let summary = self
            .cx
            .registry
            .function_node(getter)
            .and_then(|id| self.cx.prev.summaries.get(&id));
        match summary {
            Some(summary) => {
                self.impure |= !summary.pure;
                summary.returns.clone()
            }
            None => {
                self.impure = true;
                Value::Unknown
            }
        }
    }

    fn trusts_natives(&self) -> bool {
        self.cx.options.no_native_overwrites
    }
}

/// Where a property assignment ends up.
enum WriteTarget {
    /// An own data property is created or updated.
    Data,
    Setter(Reference),
    /// The assignment silently does nothing.
    Ignored,
    Unknown,
}

/// The keys `for-in` visits.
pub(crate) enum Keys {
    /// No iteration at all.
    Empty,
    Known(Reference, Vec<JsWord>),
    Unknown,
}

impl<'a> Analysis<'a> {
    pub(crate) fn function_reference(&mut self, function: NodeId) -> Reference {
        self.registry.reference(
            AllocSite::Node(function, 0),
            ObjectClass::Function(Some(FunctionLink::Node(function))),
        )
    }

    /// Allocates a function object and its `prototype` object.
    pub(crate) fn allocate_function(&mut self, state: &mut State<'_>, function: NodeId) -> Reference {
        let r = self.function_reference(function);
        let proto = self
            .registry
            .reference(AllocSite::Node(function, PROTOTYPE_SLOT), ObjectClass::Object);
        let object_proto = self.registry.resolve_host(HostId::ObjectPrototype);
        let function_proto = self.registry.resolve_host(HostId::FunctionPrototype);

        let mut proto_obj = HeapObject::new(Some(object_proto), PropertyKnowledge::KnowsAll);
        proto_obj.insert(
            js_word!("constructor"),
            PropertyDescriptor::hidden(r.into()),
        );
        let mut obj = HeapObject::new(
            Some(function_proto),
            PropertyKnowledge::NoUnknownOverrideOrEnumerable,
        );
        obj.insert(
            js_word!("prototype"),
            PropertyDescriptor {
                configurable: false,
                ..PropertyDescriptor::hidden(proto.into())
            },
        );
        self.allocate(state, proto, proto_obj);
        self.allocate(state, r, obj);
        r
    }

    pub(crate) fn allocate_array(
        &mut self,
        state: &mut State<'_>,
        node: NodeId,
        elems: Vec<Option<Value>>,
    ) -> Reference {
        let r = self
            .registry
            .reference(AllocSite::Node(node, 0), ObjectClass::Array);
        let proto = self.registry.resolve_host(HostId::ArrayPrototype);
        let mut obj = HeapObject::new(Some(proto), PropertyKnowledge::KnowsAll);
        let len = elems.len();
        for (i, elem) in elems.into_iter().enumerate() {
            if let Some(value) = elem {
                obj.insert(i.to_string().into(), PropertyDescriptor::data(value));
            }
        }
        obj.insert(js_word!("length"), array_length(len));
        self.allocate(state, r, obj);
        r
    }

    /// Stores a freshly allocated object. A site that already has an object
    /// in this state now stands for both.
    pub(crate) fn allocate(&mut self, state: &mut State<'_>, r: Reference, obj: HeapObject) {
        self.frame_mut().allocated.insert(r);
        let obj = match state.lookup_object(r) {
            ObjectLookup::Found(old) => self.join_objects(&old, &obj),
            ObjectLookup::Dirty => {
                self.escaped.extend(obj.references());
                self.registry.dirty()
            }
            ObjectLookup::Missing => Rc::new(obj),
        };
        state.put_object(r, obj);
    }

    /// The effects of running code the analysis can't see: it may mutate
    /// every object reachable from `roots`, from escaped objects and from
    /// variables shared with other functions.
    pub(crate) fn unknown_call<I>(&mut self, state: &mut State<'_>, roots: I)
    where
        I: IntoIterator<Item = Reference>,
    {
        let scopes = self.scopes;
        let mut work: Vec<Reference> = roots.into_iter().collect();
        work.extend(self.escaped.iter().copied());
        work.extend(self.prev.escaped.iter().copied());

        // Trusting globals only rules out readers outside the program; the
        // program's own functions may still reach them.
        let mut shared: FxHashSet<_> = scopes.captured_vars().collect();
        if self.options.no_global_property_reads {
            shared.extend(scopes.shared_global_vars());
        } else {
            shared.extend(scopes.global_vars());
        }
        let mut shared: Vec<_> = shared.into_iter().collect();
        shared.sort();
        for var in shared {
            work.extend(state.current(scopes, var).references());
            work.extend(state.reach_of(var));
            let key = scopes.var(var).key();
            for possible in [self.possible(&key), self.prev.possible_values.get(&key)] {
                if let Some(value) = possible {
                    work.extend(value.references());
                }
            }
        }

        let mut reachable = FxHashSet::default();
        while let Some(r) = work.pop() {
            if !reachable.insert(r) {
                continue;
            }
            let obj = state.dereference(self.registry, r);
            work.extend(obj.references());
        }

        let trust_natives = self.options.no_native_overwrites;
        let mut reachable: Vec<_> = reachable.into_iter().collect();
        reachable.sort();
        for r in reachable {
            self.escaped.insert(r);
            if trust_natives && self.registry.is_host(r) {
                continue;
            }
            state.make_dirty(self, r);
        }
        self.frame_mut().effects = true;
    }

    /// Converting the values to primitives may run `valueOf` or `toString`.
    /// Returns whether every value already is a primitive.
    pub(crate) fn to_primitive(&mut self, state: &mut State<'_>, values: &[&Value]) -> bool {
        if values.iter().all(|v| v.is_primitive()) {
            return true;
        }
        let roots: Vec<Reference> = values.iter().flat_map(|v| v.references()).collect();
        self.unknown_call(state, roots);
        false
    }

    /// The property names a key value converts to.
    pub(crate) fn property_names(&mut self, state: &mut State<'_>, key: &Value) -> Option<Vec<JsWord>> {
        if !self.to_primitive(state, &[key]) {
            return None;
        }
        key.singles().map(|singles| {
            singles
                .iter()
                .filter_map(Single::as_primitive)
                .map(ops::to_string)
                .collect()
        })
    }

    fn lookup_in(&mut self, state: &mut State<'_>, obj: &HeapObject, this: Reference, name: &JsWord) -> Tracked {
        let mut access = Access {
            cx: self,
            state,
            impure: false,
        };
        let lookup = obj.lookup(this, name, &mut access);
        let impure = access.impure;
        if impure {
            self.unknown_call(state, [this]);
        }
        match lookup {
            Lookup::Absent => Tracked {
                value: Value::UNDEFINED,
                pure: !impure,
            },
            Lookup::Present(value) => Tracked {
                value,
                pure: !impure,
            },
            Lookup::Unknown => {
                // May be a getter.
                self.unknown_call(state, [this]);
                Tracked::impure(Value::Unknown)
            }
        }
    }

    fn read_primitive_property(&mut self, state: &mut State<'_>, p: &Primitive, name: &JsWord) -> Tracked {
        let host = match p {
            Primitive::Undefined | Primitive::Null => {
                // TypeError.
                self.frame_mut().effects = true;
                return Tracked::impure(Value::Unknown);
            }
            Primitive::String(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                if *name == js_word!("length") {
                    return Tracked::pure(Value::number(units.len() as f64));
                }
                if let Some(i) = ops::array_index(name) {
                    return Tracked::pure(match units.get(i as usize) {
                        Some(unit) => String::from_utf16(&[*unit])
                            .map(Value::string)
                            .unwrap_or(Value::Unknown),
                        None => Value::UNDEFINED,
                    });
                }
                HostId::StringPrototype
            }
            Primitive::Number(_) => HostId::NumberPrototype,
            Primitive::Bool(_) => HostId::BooleanPrototype,
        };
        let proto = self.registry.resolve_host(host);
        let obj = state.dereference(self.registry, proto);
        self.lookup_in(state, &obj, proto, name)
    }

    /// `obj[key]`
    pub(crate) fn read_property(&mut self, state: &mut State<'_>, obj: &Value, key: &Value) -> Tracked {
        let names = match self.property_names(state, key) {
            Some(names) => names,
            None => return Tracked::impure(Value::Unknown),
        };
        let singles = match obj.singles() {
            Some(singles) => singles.to_vec(),
            None => {
                self.unknown_call(state, []);
                return Tracked::impure(Value::Unknown);
            }
        };

        let mut value: Option<Value> = None;
        let mut pure = true;
        for single in &singles {
            for name in &names {
                let t = match single {
                    Single::Primitive(p) => self.read_primitive_property(state, p, name),
                    Single::Reference(r) => {
                        let heap_obj = state.dereference(self.registry, *r);
                        self.lookup_in(state, &heap_obj, *r, name)
                    }
                };
                pure &= t.pure;
                value = Some(match value {
                    Some(v) => self.join(&v, &t.value),
                    None => t.value,
                });
            }
        }
        Tracked {
            value: value.unwrap_or(Value::Unknown),
            pure,
        }
    }

    fn write_target(&mut self, state: &State<'_>, obj: &HeapObject, name: &JsWord) -> WriteTarget {
        if let Some(desc) = obj.properties.get(name) {
            return match &desc.kind {
                PropertyKind::Accessor { set: Some(set), .. } => WriteTarget::Setter(*set),
                PropertyKind::Accessor { set: None, .. } => WriteTarget::Ignored,
                PropertyKind::Data(_) if !desc.writable => WriteTarget::Ignored,
                PropertyKind::Data(_) => WriteTarget::Data,
            };
        }

        // Inherited accessors and read-only properties apply too.
        let mut proto = obj.proto;
        for _ in 0..32 {
            let r = match proto {
                Some(r) => r,
                None => return WriteTarget::Data,
            };
            let p = state.dereference(self.registry, r);
            if p.dirty || (p.true_value.is_some() && !self.options.no_native_overwrites) {
                return WriteTarget::Unknown;
            }
            if let Some(desc) = p.properties.get(name) {
                return match &desc.kind {
                    PropertyKind::Accessor { set: Some(set), .. } => WriteTarget::Setter(*set),
                    PropertyKind::Accessor { set: None, .. } => WriteTarget::Ignored,
                    PropertyKind::Data(_) if !desc.writable => WriteTarget::Ignored,
                    PropertyKind::Data(_) => WriteTarget::Data,
                };
            }
            if p.knowledge == PropertyKnowledge::MayHaveNew {
                return WriteTarget::Unknown;
            }
            proto = p.proto;
        }
        WriteTarget::Unknown
    }

    fn call_setter(&mut self, state: &mut State<'_>, setter: Reference, this: Reference, value: &Value) {
        let pure = self
            .registry
            .function_node(setter)
            .and_then(|id| self.prev.summaries.get(&id))
            .map_or(false, |summary| summary.pure);
        if !pure {
            let roots: Vec<_> = std::iter::once(this).chain(value.references()).collect();
            self.unknown_call(state, roots);
        }
    }

    /// `obj[key] = value`
    pub(crate) fn write_property(&mut self, state: &mut State<'_>, obj: &Value, key: &Value, value: &Value) {
        let singles = match obj.singles() {
            Some(singles) => singles.to_vec(),
            None => {
                self.unknown_call(state, value.references().collect::<Vec<_>>());
                return;
            }
        };
        let name = match self.property_names(state, key) {
            Some(mut names) if names.len() == 1 => names.remove(0),
            _ => {
                self.escaped.extend(value.references());
                for r in obj.references() {
                    state.make_dirty(self, r);
                }
                return;
            }
        };

        let weak = singles.len() > 1;
        for single in singles {
            let r = match single {
                Single::Primitive(p) => {
                    if p.is_nullish() {
                        self.frame_mut().effects = true;
                    }
                    continue;
                }
                Single::Reference(r) => r,
            };
            if name == js_word!("__proto__") {
                self.escaped.extend(value.references());
                state.make_dirty(self, r);
                continue;
            }
            let current = state.dereference(self.registry, r);
            if current.dirty {
                self.escaped.extend(value.references());
                if !self.frame().allocated.contains(&r) {
                    self.frame_mut().effects = true;
                }
                continue;
            }
            match self.write_target(state, &current, &name) {
                WriteTarget::Data => {
                    let updated = current.with_property(&name, value.clone());
                    let updated = if weak {
                        let joined = self.join_objects(&current, &updated);
                        (*joined).clone()
                    } else {
                        updated
                    };
                    if updated.dirty {
                        self.escaped.extend(value.references());
                    }
                    state.update_object(self, r, updated);
                }
                WriteTarget::Setter(setter) => self.call_setter(state, setter, r, value),
                WriteTarget::Ignored => {}
                WriteTarget::Unknown => {
                    let roots: Vec<_> = std::iter::once(r).chain(value.references()).collect();
                    self.unknown_call(state, roots);
                }
            }
        }
    }

    /// The keys `for-in` visits for `value`.
    pub(crate) fn enumerate(&mut self, state: &State<'_>, value: &Value) -> Keys {
        match value.as_single() {
            Some(Single::Primitive(p)) if p.is_nullish() => Keys::Empty,
            Some(Single::Reference(r)) => {
                let obj = state.dereference(self.registry, *r);
                let mut access = Access {
                    cx: self,
                    state,
                    impure: false,
                };
                match obj.iterate(&mut access) {
                    Some(keys) if keys.is_empty() => Keys::Empty,
                    Some(keys) => Keys::Known(*r, keys),
                    None => Keys::Unknown,
                }
            }
            _ => Keys::Unknown,
        }
    }

    /// Calls `callee` with `this` and `args`.
    pub(crate) fn call(&mut self, state: &mut State<'_>, callee: &Value, this: &Value, args: &[Value]) -> Tracked {
        let roots = || -> Vec<Reference> {
            this.references()
                .chain(args.iter().flat_map(Value::references))
                .collect()
        };
        let singles = match callee.singles() {
            Some(singles) => singles.to_vec(),
            None => {
                self.unknown_call(state, roots());
                return Tracked::impure(Value::Unknown);
            }
        };

        let mut value: Option<Value> = None;
        let mut pure = true;
        for single in singles {
            let class = single.as_reference().map(|r| self.registry.class_of(r));
            let t = match class {
                Some(ObjectClass::Function(Some(FunctionLink::Node(id)))) => {
                    self.call_user(state, id, this, args)
                }
                Some(ObjectClass::Function(Some(FunctionLink::Native(f)))) => {
                    self.call_native(state, f, this, args)
                }
                Some(ObjectClass::Function(None)) => {
                    self.unknown_call(state, roots());
                    Tracked::impure(Value::Unknown)
                }
                _ => {
                    // Not callable: TypeError.
                    self.frame_mut().effects = true;
                    pure = false;
                    continue;
                }
            };
            pure &= t.pure;
            value = Some(match value {
                Some(v) => self.join(&v, &t.value),
                None => t.value,
            });
        }
        Tracked {
            value: value.unwrap_or(Value::Unknown),
            pure,
        }
    }

    fn call_user(&mut self, state: &mut State<'_>, function: NodeId, this: &Value, args: &[Value]) -> Tracked {
        self.observe_call(function, args);
        let summary = self.prev.summaries.get(&function).cloned();
        match summary {
            Some(summary) => {
                if !summary.pure {
                    let roots: Vec<_> = this
                        .references()
                        .chain(args.iter().flat_map(Value::references))
                        .collect();
                    self.unknown_call(state, roots);
                }
                Tracked {
                    value: summary.returns,
                    pure: summary.pure,
                }
            }
            None => {
                let roots: Vec<_> = this
                    .references()
                    .chain(args.iter().flat_map(Value::references))
                    .collect();
                self.unknown_call(state, roots);
                Tracked::impure(Value::Unknown)
            }
        }
    }

    fn call_native(&mut self, state: &mut State<'_>, f: NativeFn, this: &Value, args: &[Value]) -> Tracked {
        let roots = || -> Vec<Reference> {
            this.references()
                .chain(args.iter().flat_map(Value::references))
                .collect()
        };
        match (f.effect(), f.receiver()) {
            (_, Receiver::Array) => match self.call_array_native(state, f, this, args) {
                Some(t) => t,
                None => {
                    self.unknown_call(state, roots());
                    Tracked::impure(Value::Unknown)
                }
            },
            (Effect::Pure, receiver) => {
                let mut inputs: Vec<&Value> = args.iter().collect();
                if receiver != Receiver::Ignored {
                    inputs.push(this);
                }
                if !self.to_primitive(state, &inputs) {
                    return Tracked::impure(Value::Unknown);
                }
                match call_pure_product(f, this, args) {
                    Some(value) => Tracked::pure(value),
                    None => {
                        // Possibly a TypeError.
                        self.frame_mut().effects = true;
                        Tracked::impure(Value::Unknown)
                    }
                }
            }
            (_, _) => {
                if !args.iter().all(Value::is_primitive) {
                    self.unknown_call(state, roots());
                }
                self.frame_mut().effects = true;
                let value = match f {
                    NativeFn::ConsoleLog | NativeFn::ConsoleWarn | NativeFn::ConsoleError => {
                        Value::UNDEFINED
                    }
                    _ => Value::Unknown,
                };
                Tracked::impure(value)
            }
        }
    }

    /// Runs an array method against a snapshot of its receiver.
    fn call_array_native(&mut self, state: &mut State<'_>, f: NativeFn, this: &Value, args: &[Value]) -> Option<Tracked> {
        let r = this.as_reference()?;
        let current = state.dereference(self.registry, r);
        let mut elems = current.array_elements()?;
        let result = builtins::call_array(f, &mut elems, args)?;
        let mutates = f.effect() == Effect::MutatesReceiver;
        if mutates {
            let updated = current.with_elements(&elems);
            state.update_object(self, r, updated);
        }
        let value = match result {
            ArrayCallResult::Value(v) => v,
            ArrayCallResult::This => r.into(),
        };
        Some(Tracked {
            value,
            pure: !mutates,
        })
    }
}

/// Evaluates a pure native for every combination of possible primitive
/// inputs.
fn call_pure_product(f: NativeFn, this: &Value, args: &[Value]) -> Option<Value> {
    let primitives = |v: &Value| -> Option<Vec<Primitive>> {
        v.singles()?
            .iter()
            .map(|s| s.as_primitive().cloned())
            .collect()
    };
    let this_choices = match f.receiver() {
        Receiver::Ignored => vec![Primitive::Undefined],
        _ => primitives(this)?,
    };
    let arg_choices: Vec<Vec<Primitive>> = args.iter().map(primitives).collect::<Option<_>>()?;
    let combinations = arg_choices
        .iter()
        .try_fold(this_choices.len(), |acc, c| acc.checked_mul(c.len()))?;
    if combinations > MAX_NATIVE_COMBINATIONS {
        return Some(Value::Unknown);
    }

    let mut results = vec![];
    let mut indices = vec![0; arg_choices.len()];
    for this in &this_choices {
        loop {
            let args: Vec<Primitive> = indices
                .iter()
                .zip(&arg_choices)
                .map(|(i, choices)| choices[*i].clone())
                .collect();
            results.push(Single::Primitive(builtins::call_pure(f, this, &args)?));

            // Advance like an odometer.
            let mut pos = 0;
            loop {
                if pos == indices.len() {
                    break;
                }
                indices[pos] += 1;
                if indices[pos] < arg_choices[pos].len() {
                    break;
                }
                indices[pos] = 0;
                pos += 1;
            }
            if pos == indices.len() {
                break;
            }
        }
    }
    Some(Value::from_singles(results))
}
