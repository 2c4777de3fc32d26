//! Flow-sensitive evaluation state.
//!
//! A [`State`] holds what is known at one point of the program: the current
//! value of variables, the current version of heap objects and the
//! references reachable from each variable. States form a chain that mirrors
//! control flow: a branch is tracked in a child that borrows its parent, and
//! the child's changes come back as a [`Delta`] that the parent merges in
//! one of four ways depending on how the branch relates to the code around
//! it.
//!
//! Besides the current facts every state records the union of everything
//! written while it was active ([`Written`]). A construct that may stop
//! part-way (a loop, a `try` block) is merged through those unions, which
//! covers every intermediate state.

use crate::{
    analysis::Analysis,
    heap::HeapObject,
    registry::Registry,
    scope::{ScopeId, ScopeTree, VarId},
    value::{Reference, Value},
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::trace;

/// Loops that don't stabilize within this many iterations are given up on.
const MAX_LOOP_ITERATIONS: usize = 32;

pub type RefSet = FxHashSet<Reference>;

/// Union of all facts written in a state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Written {
    pub vars: FxHashMap<VarId, Value>,
    pub heap: FxHashMap<Reference, Rc<HeapObject>>,
    pub reach: FxHashMap<VarId, RefSet>,
}

impl Written {
    fn var(&mut self, var: VarId, value: &Value) -> bool {
        match self.vars.get_mut(&var) {
            Some(old) => {
                let merged = old.or(value);
                let changed = merged != *old;
                *old = merged;
                changed
            }
            None => {
                self.vars.insert(var, value.clone());
                true
            }
        }
    }

    fn object(&mut self, r: Reference, obj: &Rc<HeapObject>) -> bool {
        match self.heap.get_mut(&r) {
            Some(old) => {
                if **old == **obj {
                    return false;
                }
                let merged = old.or(obj);
                let changed = merged != **old;
                *old = Rc::new(merged);
                changed
            }
            None => {
                self.heap.insert(r, obj.clone());
                true
            }
        }
    }

    fn reach(&mut self, var: VarId, refs: &RefSet) -> bool {
        let set = self.reach.entry(var).or_default();
        let before = set.len();
        set.extend(refs);
        set.len() != before
    }

    /// Adds everything `other` wrote. Returns whether anything changed.
    pub fn absorb(&mut self, other: &Written) -> bool {
        let mut changed = false;
        for (var, value) in &other.vars {
            changed |= self.var(*var, value);
        }
        for (r, obj) in &other.heap {
            changed |= self.object(*r, obj);
        }
        for (var, refs) in &other.reach {
            changed |= self.reach(*var, refs);
        }
        changed
    }
}

/// Facts that are unreliable inside an unsure construct because the
/// construct itself may change them on another run.
#[derive(Debug, Default)]
pub struct Boundary {
    /// Variables written anywhere inside the construct.
    pub vars: FxHashSet<VarId>,
    /// Objects mutated inside the construct.
    pub refs: RefSet,
    /// References the construct may make reachable from a variable.
    pub reach: FxHashMap<VarId, RefSet>,
}

/// The changes a finished child state makes to its parent.
#[derive(Debug, Default)]
pub struct Delta {
    pub vars: FxHashMap<VarId, Value>,
    pub heap: FxHashMap<Reference, Rc<HeapObject>>,
    pub reach: FxHashMap<VarId, RefSet>,
    pub written: Written,
    pub dead: bool,
}

impl Delta {
    fn from_written(written: Written) -> Self {
        Delta {
            written,
            ..Default::default()
        }
    }
}

pub enum ObjectLookup {
    Found(Rc<HeapObject>),
    /// Mutated by the enclosing unsure construct.
    Dirty,
    /// Not allocated or changed by the program so far.
    Missing,
}

#[derive(Debug, Default)]
pub struct State<'p> {
    parent: Option<&'p State<'p>>,
    boundary: Option<Boundary>,
    vars: FxHashMap<VarId, Value>,
    heap: FxHashMap<Reference, Rc<HeapObject>>,
    reach: FxHashMap<VarId, RefSet>,
    written: Written,
    dead: bool,
}

impl<'p> State<'p> {
    pub fn root() -> State<'static> {
        State::default()
    }

    pub fn child(&self) -> State<'_> {
        State {
            parent: Some(self),
            ..Default::default()
        }
    }

    fn unsure_child(&self, boundary: Boundary) -> State<'_> {
        State {
            parent: Some(self),
            boundary: Some(boundary),
            ..Default::default()
        }
    }

    pub fn into_delta(self) -> Delta {
        Delta {
            vars: self.vars,
            heap: self.heap,
            reach: self.reach,
            written: self.written,
            dead: self.dead,
        }
    }

    /// Control can't reach the current point.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn mark_dead(&mut self) {
        self.dead = true;
    }

    /// The flow value of `var`, if any state on the chain knows it.
    pub fn lookup(&self, var: VarId) -> Option<Value> {
        let mut state = Some(self);
        while let Some(s) = state {
            if let Some(v) = s.vars.get(&var) {
                return Some(v.clone());
            }
            if s.boundary.as_ref().map_or(false, |b| b.vars.contains(&var)) {
                return Some(Value::Unknown);
            }
            state = s.parent;
        }
        None
    }

    /// The flow value, falling back to the value the variable has when its
    /// scope is entered.
    pub fn current(&self, scopes: &ScopeTree, var: VarId) -> Value {
        self.lookup(var)
            .or_else(|| scopes.initial_value(var).cloned())
            .unwrap_or(Value::Unknown)
    }

    /// References that may be reachable from `var`.
    pub fn reach_of(&self, var: VarId) -> RefSet {
        if let Some(refs) = self.reach.get(&var) {
            return refs.clone();
        }
        let mut refs = self.parent.map(|p| p.reach_of(var)).unwrap_or_default();
        if let Some(extra) = self.boundary.as_ref().and_then(|b| b.reach.get(&var)) {
            refs.extend(extra);
        }
        refs
    }

    pub fn lookup_object(&self, r: Reference) -> ObjectLookup {
        let mut state = Some(self);
        while let Some(s) = state {
            if let Some(obj) = s.heap.get(&r) {
                return ObjectLookup::Found(obj.clone());
            }
            if s.boundary.as_ref().map_or(false, |b| b.refs.contains(&r)) {
                return ObjectLookup::Dirty;
            }
            state = s.parent;
        }
        ObjectLookup::Missing
    }

    /// The current version of an object. Objects the program hasn't touched
    /// come from the registry's initial heap; anything else is unknown.
    pub fn dereference(&self, registry: &Registry, r: Reference) -> Rc<HeapObject> {
        self.ambient_object(registry, r)
            .unwrap_or_else(|| registry.dirty())
    }

    /// `None` for references that don't exist yet at this point, which is
    /// the case for objects allocated inside a branch.
    fn ambient_object(&self, registry: &Registry, r: Reference) -> Option<Rc<HeapObject>> {
        match self.lookup_object(r) {
            ObjectLookup::Found(obj) => Some(obj),
            ObjectLookup::Dirty => Some(registry.dirty()),
            ObjectLookup::Missing => registry.initial_object(r),
        }
    }

    /// Stores a flow value without any of the checks of
    /// [`set_value`](Self::set_value).
    pub fn set_raw(&mut self, var: VarId, value: Value) {
        let mut refs: RefSet = value.references().collect();
        if value.is_unknown() {
            refs.extend(self.reach_of(var));
        }
        self.written.var(var, &value);
        self.written.reach(var, &refs);
        self.reach.insert(var, refs);
        self.vars.insert(var, value);
    }

    pub fn put_object(&mut self, r: Reference, obj: Rc<HeapObject>) {
        self.written.object(r, &obj);
        self.heap.insert(r, obj);
    }

    /// Reads a variable as seen from the function being tracked.
    pub fn get_value(&self, cx: &Analysis<'_>, var: VarId) -> Value {
        let scopes = cx.scopes;
        let v = scopes.var(var);
        if v.global && !cx.options.no_global_property_overwrites && !scopes.is_pristine_builtin(var)
        {
            return Value::Unknown;
        }
        if scopes.has_foreign_writes(var) || v.fn_scope != cx.frame().scope {
            return cx
                .prev
                .possible_values
                .get(&v.key())
                .cloned()
                .unwrap_or(Value::Unknown);
        }
        self.current(scopes, var)
    }

    /// Assigns a variable. Writes from outside the declaring function, and
    /// to variables written from elsewhere, are not tracked; they only feed
    /// the set of possible values. Returns whether the write was tracked.
    pub fn set_value(&mut self, cx: &mut Analysis<'_>, var: VarId, value: Value) -> bool {
        let scopes = cx.scopes;
        let v = scopes.var(var);
        cx.add_possible_value(v.key(), &value);
        if scopes.has_foreign_writes(var) || v.fn_scope != cx.frame().scope {
            cx.frame_mut().effects = true;
            return false;
        }
        self.set_raw(var, value);
        true
    }

    /// Replaces the current version of an object.
    pub fn update_object(&mut self, cx: &mut Analysis<'_>, r: Reference, obj: HeapObject) {
        let old = self.dereference(cx.registry, r);
        if obj.dirty && !old.dirty {
            cx.escaped.extend(old.references());
        }
        if !cx.frame().allocated.contains(&r) {
            cx.frame_mut().effects = true;
        }
        self.put_object(r, Rc::new(obj));
    }

    pub fn make_dirty(&mut self, cx: &mut Analysis<'_>, r: Reference) {
        let old = self.dereference(cx.registry, r);
        if old.dirty {
            return;
        }
        cx.escaped.extend(old.references());
        if !cx.frame().allocated.contains(&r) {
            cx.frame_mut().effects = true;
        }
        self.put_object(r, cx.registry.dirty());
    }

    fn join_objects(
        &self,
        cx: &mut Analysis<'_>,
        r: Reference,
        a: Option<Rc<HeapObject>>,
        b: Option<Rc<HeapObject>>,
    ) -> Option<Rc<HeapObject>> {
        let a = a.or_else(|| self.ambient_object(cx.registry, r));
        let b = b.or_else(|| self.ambient_object(cx.registry, r));
        match (a, b) {
            (Some(a), Some(b)) => Some(cx.join_objects(&a, &b)),
            (Some(obj), None) | (None, Some(obj)) => Some(obj),
            (None, None) => None,
        }
    }

    /// Applies a delta that certainly happened, dropping the variables of
    /// `discard` which go out of scope.
    pub fn merge_back(&mut self, cx: &mut Analysis<'_>, delta: Delta, discard: Option<ScopeId>) {
        let keep = |var: &VarId| discard.map_or(true, |scope| cx.scopes.var(*var).scope != scope);
        self.written.absorb(&delta.written);
        self.dead |= delta.dead;
        for (var, value) in delta.vars {
            if keep(&var) {
                self.vars.insert(var, value);
            }
        }
        for (var, refs) in delta.reach {
            if keep(&var) {
                self.reach.insert(var, refs);
            }
        }
        self.heap.extend(delta.heap);
    }

    /// Joins the two arms of a branch that certainly took one of them.
    pub fn merge_or(&mut self, cx: &mut Analysis<'_>, a: Delta, b: Delta) {
        match (a.dead, b.dead) {
            (true, true) => {
                self.written.absorb(&a.written);
                self.written.absorb(&b.written);
                self.dead = true;
                return;
            }
            (true, false) => {
                self.written.absorb(&a.written);
                return self.merge_back(cx, b, None);
            }
            (false, true) => {
                self.written.absorb(&b.written);
                return self.merge_back(cx, a, None);
            }
            (false, false) => {}
        }
        self.written.absorb(&a.written);
        self.written.absorb(&b.written);

        let vars: FxHashSet<VarId> = a.vars.keys().chain(b.vars.keys()).copied().collect();
        for var in vars {
            let ambient = || self.current(cx.scopes, var);
            let va = a.vars.get(&var).cloned().unwrap_or_else(ambient);
            let vb = b.vars.get(&var).cloned().unwrap_or_else(ambient);
            let merged = cx.join(&va, &vb);
            self.vars.insert(var, merged);
        }

        let refs: FxHashSet<Reference> = a.heap.keys().chain(b.heap.keys()).copied().collect();
        for r in refs {
            let merged = self.join_objects(cx, r, a.heap.get(&r).cloned(), b.heap.get(&r).cloned());
            if let Some(obj) = merged {
                self.heap.insert(r, obj);
            }
        }

        let vars: FxHashSet<VarId> = a.reach.keys().chain(b.reach.keys()).copied().collect();
        for var in vars {
            let mut refs = a.reach.get(&var).cloned().unwrap_or_else(|| self.reach_of(var));
            refs.extend(b.reach.get(&var).cloned().unwrap_or_else(|| self.reach_of(var)));
            self.reach.insert(var, refs);
        }
    }

    /// Joins a branch that may or may not have run.
    pub fn merge_maybe(&mut self, cx: &mut Analysis<'_>, delta: Delta) {
        self.written.absorb(&delta.written);
        if delta.dead {
            return;
        }
        for (var, value) in delta.vars {
            let merged = cx.join(&self.current(cx.scopes, var), &value);
            self.vars.insert(var, merged);
        }
        for (r, obj) in delta.heap {
            if let Some(merged) = self.join_objects(cx, r, None, Some(obj)) {
                self.heap.insert(r, merged);
            }
        }
        for (var, refs) in delta.reach {
            let mut all = self.reach_of(var);
            all.extend(refs);
            self.reach.insert(var, all);
        }
    }

    /// Joins a construct that may have run any number of times, stopping at
    /// any point, through everything it wrote. Returns whether the receiver
    /// changed.
    pub fn merge_unsure(&mut self, cx: &mut Analysis<'_>, delta: Delta) -> bool {
        let mut changed = false;
        for (var, value) in &delta.written.vars {
            let current = self.current(cx.scopes, *var);
            let merged = cx.join(&current, value);
            if merged != current || self.lookup(*var).is_none() {
                changed = true;
                self.vars.insert(*var, merged);
            }
        }
        for (r, obj) in &delta.written.heap {
            let current = self.ambient_object(cx.registry, *r);
            let merged = self.join_objects(cx, *r, None, Some(obj.clone()));
            if let Some(merged) = merged {
                if current.as_ref() != Some(&merged) {
                    changed = true;
                    self.heap.insert(*r, merged);
                }
            }
        }
        for (var, refs) in &delta.written.reach {
            let mut all = self.reach_of(*var);
            let before = all.len();
            all.extend(refs);
            if all.len() != before {
                changed = true;
                self.reach.insert(*var, all);
            }
        }
        self.written.absorb(&delta.written);
        changed
    }

    /// Tracks a construct that may run any number of times (`loop_`) or may
    /// stop at any point.
    ///
    /// Inside a loop every variable in `written_vars` reads as unknown, and
    /// every object the loop mutates dereferences as dirty. The body is
    /// re-tracked until what it writes stops changing.
    pub fn track_as_unsure<'a, F>(
        &mut self,
        cx: &mut Analysis<'a>,
        written_vars: FxHashSet<VarId>,
        loop_: bool,
        mut f: F,
    ) where
        F: FnMut(&mut Analysis<'a>, &mut State<'_>),
    {
        if !loop_ {
            let mut child = self.child();
            f(cx, &mut child);
            let delta = child.into_delta();
            self.merge_unsure(cx, delta);
            return;
        }

        let mut acc = Written::default();
        let mut stable = false;
        for iteration in 0..MAX_LOOP_ITERATIONS {
            let boundary = Boundary {
                vars: written_vars.clone(),
                refs: acc.heap.keys().copied().collect(),
                reach: acc.reach.clone(),
            };
            let mut child = self.unsure_child(boundary);
            f(cx, &mut child);
            let delta = child.into_delta();
            if !acc.absorb(&delta.written) {
                trace!("loop stable after {} iterations", iteration + 1);
                stable = true;
                break;
            }
        }
        if !stable {
            for value in acc.vars.values_mut() {
                cx.escaped.extend(value.references());
                *value = Value::Unknown;
            }
            for (r, obj) in acc.heap.iter_mut() {
                cx.escaped.extend(obj.references());
                cx.escaped.insert(*r);
                *obj = cx.registry.dirty();
            }
        }
        self.merge_unsure(cx, Delta::from_written(acc));
    }
}

#[cfg(test)]
mod tests;
