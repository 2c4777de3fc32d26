//! One analysis pass over a program.
//!
//! The program body and then every function body are tracked once, each in
//! an isolated state. Whatever crosses a function boundary (parameter values,
//! return values, values of variables shared between functions) is read from
//! the [`Facts`] of the previous pass and re-collected for the next one. The
//! driver repeats passes until the facts stop changing; only then are the
//! per-node results trustworthy.

use crate::{
    heap::HeapObject,
    options::Options,
    registry::Registry,
    scope::{ScopeId, ScopeTree, SiteKind, VarKey},
    state::State,
    value::{Reference, Value},
};
use ast::*;
use atoms::JsWord;
use ecma_visit::{Visit, VisitWith};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// What one pass learns about function boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    /// Values each parameter may have on entry, keyed by `Function` node.
    /// Only published for functions whose every caller is known.
    pub params: FxHashMap<NodeId, Vec<Value>>,
    /// Every value ever stored in a variable.
    pub possible_values: FxHashMap<VarKey, Value>,
    pub summaries: FxHashMap<NodeId, FunctionSummary>,
    /// Objects that code the analysis can't see may hold.
    pub escaped: FxHashSet<Reference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSummary {
    /// Union of all returned values.
    pub returns: Value,
    /// Calling the function has no observable effect.
    pub pure: bool,
}

/// What is known about an expression over every time it was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFacts {
    pub value: Value,
    /// Evaluating the node has no effect besides producing its value.
    pub pure: bool,
}

/// The result of evaluating an expression once.
#[derive(Debug, Clone)]
pub(crate) struct Tracked {
    pub value: Value,
    pub pure: bool,
}

impl Tracked {
    pub fn pure(value: Value) -> Self {
        Tracked { value, pure: true }
    }

    pub fn impure(value: Value) -> Self {
        Tracked { value, pure: false }
    }
}

#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl NodeRef<'_> {
    pub fn node_id(&self) -> NodeId {
        match self {
            NodeRef::Stmt(s) => s.node_id(),
            NodeRef::Expr(e) => e.node_id(),
        }
    }
}

/// Watches the analysis as it runs. Called after each statement and
/// expression is tracked, with the state at that point and, for
/// expressions, the facts recorded so far.
pub trait Observer {
    fn call_all(&mut self, node: NodeRef<'_>, state: &State<'_>, facts: Option<&NodeFacts>);
}

pub(crate) struct Frame {
    /// The function scope of the body, or the program scope.
    pub scope: ScopeId,
    pub returns: Option<Value>,
    pub effects: bool,
    /// Objects allocated by this body; mutating them isn't an effect.
    pub allocated: FxHashSet<Reference>,
}

impl Frame {
    fn new(scope: ScopeId) -> Self {
        Frame {
            scope,
            returns: None,
            effects: false,
            allocated: Default::default(),
        }
    }
}

pub struct AnalysisResult {
    pub scopes: ScopeTree,
    pub node_facts: FxHashMap<NodeId, NodeFacts>,
    /// The keys each `for-in` loop visits, for loops that visit the same
    /// keys every time and don't change the object.
    pub for_in_keys: FxHashMap<NodeId, Vec<JsWord>>,
    pub facts: Facts,
}

impl AnalysisResult {
    pub fn facts_of(&self, node: NodeId) -> Option<&NodeFacts> {
        self.node_facts.get(&node)
    }

    pub fn is_pure(&self, node: NodeId) -> bool {
        self.facts_of(node).map_or(false, |f| f.pure)
    }
}

pub fn analyze(
    program: &Program,
    options: &Options,
    registry: &mut Registry,
    prev: &Facts,
) -> AnalysisResult {
    analyze_with(program, options, registry, prev, vec![])
}

pub fn analyze_with(
    program: &Program,
    options: &Options,
    registry: &mut Registry,
    prev: &Facts,
    observers: Vec<Box<dyn Observer + '_>>,
) -> AnalysisResult {
    let scopes = ScopeTree::build(program, registry);
    let (node_facts, for_in_keys, facts) = {
        let mut cx = Analysis::new(options, &scopes, registry, prev, observers);
        cx.track_program(program);
        cx.finish()
    };
    AnalysisResult {
        scopes,
        node_facts,
        for_in_keys,
        facts,
    }
}

pub struct Analysis<'a> {
    pub(crate) options: &'a Options,
    pub(crate) scopes: &'a ScopeTree,
    pub(crate) registry: &'a mut Registry,
    pub(crate) prev: &'a Facts,
    node_facts: FxHashMap<NodeId, NodeFacts>,
    for_in_keys: FxHashMap<NodeId, Option<Vec<JsWord>>>,
    /// Arguments observed at call sites, by callee `Function` node.
    calls: FxHashMap<NodeId, Vec<Value>>,
    possible: FxHashMap<VarKey, Value>,
    summaries: FxHashMap<NodeId, FunctionSummary>,
    /// Objects unknown code may have obtained.
    pub(crate) escaped: FxHashSet<Reference>,
    /// The body being tracked. Bodies are tracked one after the other,
    /// never nested.
    frame: Frame,
    observers: Vec<Box<dyn Observer + 'a>>,
}

impl<'a> Analysis<'a> {
    pub(crate) fn new(
        options: &'a Options,
        scopes: &'a ScopeTree,
        registry: &'a mut Registry,
        prev: &'a Facts,
        observers: Vec<Box<dyn Observer + 'a>>,
    ) -> Self {
        Analysis {
            options,
            scopes,
            registry,
            prev,
            node_facts: Default::default(),
            for_in_keys: Default::default(),
            calls: Default::default(),
            possible: Default::default(),
            summaries: Default::default(),
            escaped: Default::default(),
            frame: Frame::new(scopes.root()),
            observers,
        }
    }

    /// Values seen so far for a variable in this pass.
    pub(crate) fn possible(&self, key: &VarKey) -> Option<&Value> {
        self.possible.get(key)
    }

    pub(crate) fn frame(&self) -> &Frame {
        &self.frame
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub(crate) fn record(&mut self, node: NodeId, tracked: &Tracked) {
        match self.node_facts.get_mut(&node) {
            Some(facts) => {
                facts.value = facts.value.or(&tracked.value);
                facts.pure &= tracked.pure;
            }
            None => {
                self.node_facts.insert(
                    node,
                    NodeFacts {
                        value: tracked.value.clone(),
                        pure: tracked.pure,
                    },
                );
            }
        }
    }

    pub(crate) fn record_for_in(&mut self, node: NodeId, keys: Option<Vec<JsWord>>) {
        match self.for_in_keys.get_mut(&node) {
            Some(old) => {
                if *old != keys {
                    *old = None;
                }
            }
            None => {
                self.for_in_keys.insert(node, keys);
            }
        }
    }

    pub(crate) fn notify(&mut self, node: NodeRef<'_>, state: &State<'_>) {
        let facts = self.node_facts.get(&node.node_id());
        for observer in self.observers.iter_mut() {
            observer.call_all(node, state, facts);
        }
    }

    pub(crate) fn add_possible_value(&mut self, key: VarKey, value: &Value) {
        match self.possible.get_mut(&key) {
            Some(old) => *old = old.or(value),
            None => {
                self.possible.insert(key, value.clone());
            }
        }
    }

    pub(crate) fn observe_call(&mut self, function: NodeId, args: &[Value]) {
        if !self.calls.contains_key(&function) {
            self.calls.insert(function, args.to_vec());
            return;
        }
        let observed = self.calls.entry(function).or_default();
        for i in 0..observed.len().max(args.len()) {
            let arg = args.get(i).unwrap_or(&Value::UNDEFINED);
            match observed.get_mut(i) {
                Some(old) => *old = old.or(arg),
                // Earlier calls passed fewer arguments.
                None => observed.push(Value::UNDEFINED.or(arg)),
            }
        }
    }

    /// Joins two values, treating references that fall into `Unknown` as
    /// escaped since nothing tracks them any more.
    pub(crate) fn join(&mut self, a: &Value, b: &Value) -> Value {
        let merged = a.or(b);
        if merged.is_unknown() {
            self.escaped.extend(a.references());
            self.escaped.extend(b.references());
        }
        merged
    }

    pub(crate) fn join_objects(&mut self, a: &HeapObject, b: &HeapObject) -> std::rc::Rc<HeapObject> {
        let merged = a.or(b);
        let kept: FxHashSet<Reference> = merged.references().collect();
        for r in a.references().chain(b.references()) {
            if !kept.contains(&r) {
                self.escaped.insert(r);
            }
        }
        std::rc::Rc::new(merged)
    }

    fn track_program(&mut self, program: &'a Program) {
        let root = self.scopes.root();
        self.frame = Frame::new(root);
        let mut state = State::root();
        self.enter_scope(&mut state, root);
        for stmt in &program.body {
            self.track_stmt(&mut state, stmt);
        }

        let mut functions = FunctionCollector { functions: vec![] };
        program.body.visit_with(&mut functions);
        for function in functions.functions {
            self.track_function(function);
        }
    }

    fn track_function(&mut self, function: &'a Function) {
        let scopes = self.scopes;
        let info = match scopes.function(function.node_id) {
            Some(info) => info,
            None => return,
        };
        self.frame = Frame::new(info.scope);
        let mut state = State::root();

        for (i, param) in info.params.iter().enumerate() {
            let value = self
                .prev
                .params
                .get(&function.node_id)
                .and_then(|params| params.get(i))
                .cloned()
                .unwrap_or(Value::Unknown);
            state.set_value(self, *param, value);
        }
        if let Some(name) = info.name_var {
            if !info.is_decl {
                let r = self.function_reference(function.node_id);
                state.set_value(self, name, r.into());
            }
        }
        self.enter_scope(&mut state, info.scope);

        for stmt in &function.body.stmts {
            self.track_stmt(&mut state, stmt);
        }

        let frame = &self.frame;
        let returns = match (&frame.returns, state.is_dead()) {
            (Some(returns), true) => returns.clone(),
            (Some(returns), false) => returns.or(&Value::UNDEFINED),
            (None, _) => Value::UNDEFINED,
        };
        trace!(
            "summary of {:?}: returns {:?}, pure: {}",
            function.node_id,
            returns,
            !frame.effects
        );
        self.summaries.insert(
            function.node_id,
            FunctionSummary {
                returns,
                pure: !frame.effects,
            },
        );
    }

    /// Gives the variables of a scope their entry values and allocates the
    /// functions declared in it.
    pub(crate) fn enter_scope(&mut self, state: &mut State<'_>, scope: ScopeId) {
        let scopes = self.scopes;
        let s = scopes.scope(scope);
        let mut initial: Vec<_> = s.initial_values.iter().collect();
        initial.sort_by_key(|(var, _)| **var);
        for (var, value) in initial {
            state.set_value(self, *var, value.clone());
        }
        for (var, function) in &s.hoisted_fns {
            let r = self.allocate_function(state, *function);
            state.set_value(self, *var, r.into());
        }
    }

    fn finish(self) -> (
        FxHashMap<NodeId, NodeFacts>,
        FxHashMap<NodeId, Vec<JsWord>>,
        Facts,
    ) {
        let scopes = self.scopes;
        let mut params = FxHashMap::default();
        for (id, observed) in &self.calls {
            let info = match scopes.function(*id) {
                Some(info) => info,
                None => continue,
            };
            if !info.is_decl || info.uses_arguments {
                continue;
            }
            let name = match info.name_var {
                Some(name) => scopes.var(name),
                None => continue,
            };
            let only_called = name.reads.iter().all(|site| site.kind == SiteKind::Callee)
                && name.writes.len() == 1;
            if !only_called || (name.global && !self.options.no_global_property_reads) {
                continue;
            }
            let values = (0..info.params.len())
                .map(|i| observed.get(i).cloned().unwrap_or(Value::UNDEFINED))
                .collect();
            params.insert(*id, values);
        }

        let for_in_keys = self
            .for_in_keys
            .into_iter()
            .filter_map(|(node, keys)| keys.map(|keys| (node, keys)))
            .collect();

        debug!(
            "analysis done: {} node facts, {} summaries, {} escaped objects",
            self.node_facts.len(),
            self.summaries.len(),
            self.escaped.len()
        );
        let facts = Facts {
            params,
            possible_values: self.possible,
            summaries: self.summaries,
            escaped: self.escaped,
        };
        (self.node_facts, for_in_keys, facts)
    }
}

/// Every function in the program, outermost first.
struct FunctionCollector<'a> {
    functions: Vec<&'a Function>,
}

impl<'a> Visit<'a> for FunctionCollector<'a> {
    fn visit_function(&mut self, n: &'a Function) {
        self.functions.push(n);
        n.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests;
