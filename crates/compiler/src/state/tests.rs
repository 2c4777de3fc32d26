use super::*;
use crate::{
    analysis::Facts,
    heap::{ObjectClass, PropertyKnowledge},
    options::Options,
    registry::AllocSite,
};
use ast::ProgramData;
use pretty_assertions::assert_eq;

struct Setup {
    tree: ScopeTree,
    registry: Registry,
    program_data: ProgramData,
}

fn setup(src: &str) -> Setup {
    let mut program_data = ProgramData::default();
    let program = parser::parse_program(src, &mut program_data).unwrap();
    let mut registry = Registry::default();
    let tree = ScopeTree::build(&program, &mut registry);
    Setup {
        tree,
        registry,
        program_data,
    }
}

impl Setup {
    fn var(&self, name: &str) -> VarId {
        self.tree
            .vars()
            .find(|(_, v)| &*v.name == name)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("no variable named {}", name))
    }

    fn object(&mut self) -> Reference {
        let node = self.program_data.new_id();
        self.registry
            .reference(AllocSite::Node(node, 0), ObjectClass::Object)
    }
}

fn object() -> Rc<HeapObject> {
    Rc::new(HeapObject::new(None, PropertyKnowledge::KnowsAll))
}

#[test]
fn lookups_walk_the_chain() {
    let s = setup("var a, b;");
    let (a, b) = (s.var("a"), s.var("b"));

    let mut root = State::root();
    root.set_raw(a, Value::number(1.0));
    let mut child = root.child();
    child.set_raw(b, Value::number(2.0));

    assert_eq!(child.lookup(a), Some(Value::number(1.0)));
    assert_eq!(child.lookup(b), Some(Value::number(2.0)));
    assert_eq!(root.lookup(b), None);
    assert_eq!(root.current(&s.tree, b), Value::UNDEFINED);
}

#[test]
fn child_changes_come_back_as_a_delta() {
    let s = setup("var a;");
    let a = s.var("a");

    let root = State::root();
    let mut child = root.child();
    child.set_raw(a, Value::number(1.0));
    child.set_raw(a, Value::number(2.0));
    child.mark_dead();
    let delta = child.into_delta();

    assert_eq!(delta.vars.get(&a), Some(&Value::number(2.0)));
    // The union covers the intermediate value too.
    assert_eq!(
        delta.written.vars.get(&a),
        Some(&Value::number(1.0).or(&Value::number(2.0)))
    );
    assert!(delta.dead);
}

#[test]
fn boundary_hides_written_values() {
    let s = setup("var a;");
    let a = s.var("a");

    let mut root = State::root();
    root.set_raw(a, Value::number(1.0));
    let boundary = Boundary {
        vars: std::iter::once(a).collect(),
        ..Default::default()
    };
    let child = root.unsure_child(boundary);
    assert_eq!(child.lookup(a), Some(Value::Unknown));
}

#[test]
fn reach_follows_stored_references() {
    let mut s = setup("var a, b;");
    let (a, b) = (s.var("a"), s.var("b"));
    let r = s.object();

    let mut root = State::root();
    root.set_raw(a, r.into());
    assert!(root.reach_of(a).contains(&r));

    // An unknown value keeps whatever was reachable before.
    let mut child = root.child();
    child.set_raw(a, Value::Unknown);
    assert!(child.reach_of(a).contains(&r));
    assert!(child.reach_of(b).is_empty());

    // A known value replaces it.
    child.set_raw(a, Value::number(1.0));
    assert!(child.reach_of(a).is_empty());
}

#[test]
fn dereference_falls_back_to_dirty() {
    let mut s = setup("");
    let r = s.object();

    let mut root = State::root();
    assert!(matches!(root.lookup_object(r), ObjectLookup::Missing));
    assert!(root.dereference(&s.registry, r).dirty);

    root.put_object(r, object());
    let child = root.child();
    assert!(matches!(child.lookup_object(r), ObjectLookup::Found(_)));
    assert!(!child.dereference(&s.registry, r).dirty);

    let boundary = Boundary {
        refs: std::iter::once(r).collect(),
        ..Default::default()
    };
    let unsure = root.unsure_child(boundary);
    assert!(matches!(unsure.lookup_object(r), ObjectLookup::Dirty));
    assert!(unsure.dereference(&s.registry, r).dirty);
}

#[test]
fn absorb_reports_changes() {
    let mut s = setup("var a;");
    let a = s.var("a");
    let r = s.object();

    let mut acc = Written::default();
    let mut first = Written::default();
    first.var(a, &Value::number(1.0));
    first.object(r, &object());
    assert!(acc.absorb(&first));
    assert!(!acc.absorb(&first));

    let mut second = Written::default();
    second.var(a, &Value::number(2.0));
    assert!(acc.absorb(&second));
    assert_eq!(
        acc.vars.get(&a),
        Some(&Value::number(1.0).or(&Value::number(2.0)))
    );
    assert!(!acc.absorb(&second));
}

fn num(n: f64) -> Value {
    Value::number(n)
}

#[test]
fn either_arm_joins_with_the_ambient_value() {
    let mut s = setup("var a, b, c, d;");
    let (a, b, c, d) = (s.var("a"), s.var("b"), s.var("c"), s.var("d"));
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.set_raw(b, num(7.0));
    root.set_raw(c, num(0.0));
    let (left, right) = {
        let mut left = root.child();
        left.set_raw(a, num(1.0));
        left.set_raw(c, num(1.0));
        left.set_raw(d, num(5.0));
        let mut right = root.child();
        right.set_raw(a, num(2.0));
        (left.into_delta(), right.into_delta())
    };
    root.merge_or(&mut cx, left, right);

    assert_eq!(root.lookup(a), Some(num(1.0).or(&num(2.0))));
    assert_eq!(root.lookup(b), Some(num(7.0)));
    assert_eq!(root.lookup(c), Some(num(0.0).or(&num(1.0))));
    // Never assigned before the branch: joins with the hoisted `undefined`.
    assert_eq!(root.lookup(d), Some(Value::UNDEFINED.or(&num(5.0))));
}

#[test]
fn dead_arm_is_ignored() {
    let mut s = setup("var a;");
    let a = s.var("a");
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.set_raw(a, num(0.0));
    let (left, right) = {
        let mut left = root.child();
        left.set_raw(a, num(1.0));
        left.mark_dead();
        let mut right = root.child();
        right.set_raw(a, num(2.0));
        (left.into_delta(), right.into_delta())
    };
    root.merge_or(&mut cx, left, right);
    assert_eq!(root.lookup(a), Some(num(2.0)));
    assert!(!root.is_dead());
}

#[test]
fn maybe_keeps_the_old_value() {
    let mut s = setup("var a;");
    let a = s.var("a");
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.set_raw(a, num(0.0));
    let delta = {
        let mut child = root.child();
        child.set_raw(a, num(1.0));
        child.into_delta()
    };
    root.merge_maybe(&mut cx, delta);
    assert_eq!(root.lookup(a), Some(num(0.0).or(&num(1.0))));

    let dead = {
        let mut child = root.child();
        child.set_raw(a, num(2.0));
        child.mark_dead();
        child.into_delta()
    };
    root.merge_maybe(&mut cx, dead);
    assert_eq!(root.lookup(a), Some(num(0.0).or(&num(1.0))));
}

#[test]
fn merge_back_drops_the_discarded_scope() {
    let mut s = setup("var a; { let b; }");
    let (a, b) = (s.var("a"), s.var("b"));
    let block = s.tree.var(b).scope;
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    let delta = {
        let mut child = root.child();
        child.set_raw(a, num(1.0));
        child.set_raw(b, num(2.0));
        child.into_delta()
    };
    root.merge_back(&mut cx, delta, Some(block));
    assert_eq!(root.lookup(a), Some(num(1.0)));
    assert_eq!(root.lookup(b), None);
}

#[test]
fn unsure_joins_every_written_value() {
    let mut s = setup("var a;");
    let a = s.var("a");
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.set_raw(a, num(1.0));
    let run = |root: &State<'_>| {
        let mut child = root.child();
        child.set_raw(a, num(2.0));
        child.set_raw(a, num(3.0));
        child.into_delta()
    };
    let delta = run(&root);
    assert!(root.merge_unsure(&mut cx, delta));
    assert_eq!(
        root.lookup(a),
        Some(num(1.0).or(&num(2.0)).or(&num(3.0)))
    );
    let delta = run(&root);
    assert!(!root.merge_unsure(&mut cx, delta));
}

#[test]
fn loop_stops_once_nothing_new_is_written() {
    let mut s = setup("var a;");
    let a = s.var("a");
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.set_raw(a, num(0.0));
    let mut runs = 0;
    root.track_as_unsure(&mut cx, std::iter::once(a).collect(), true, |_, state| {
        runs += 1;
        // Written by the loop, so unknown on entry.
        assert_eq!(state.lookup(a), Some(Value::Unknown));
        state.set_raw(a, num(1.0));
    });
    // The second run writes nothing new.
    assert_eq!(runs, 2);
    assert_eq!(root.lookup(a), Some(num(0.0).or(&num(1.0))));
}

#[test]
fn growing_loop_ends_unknown() {
    let mut s = setup("var a;");
    let a = s.var("a");
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.set_raw(a, num(0.0));
    let mut runs = 0;
    root.track_as_unsure(&mut cx, std::iter::once(a).collect(), true, |_, state| {
        runs += 1;
        state.set_raw(a, num(runs as f64));
    });
    assert!(runs <= MAX_LOOP_ITERATIONS);
    assert_eq!(root.lookup(a), Some(Value::Unknown));
}

#[test]
fn dirty_objects_stay_dirty_after_a_join() {
    let mut s = setup("var a;");
    let r = s.object();
    let options = Options::trusting();
    let facts = Facts::default();
    let mut cx = Analysis::new(&options, &s.tree, &mut s.registry, &facts, vec![]);

    let mut root = State::root();
    root.put_object(r, object());
    let delta = {
        let mut child = root.child();
        child.make_dirty(&mut cx, r);
        child.into_delta()
    };
    root.merge_maybe(&mut cx, delta);
    assert!(root.dereference(cx.registry, r).dirty);
    assert!(cx.frame().effects);
}
