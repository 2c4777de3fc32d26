use super::*;
use pretty_assertions::assert_eq;
use std::{cell::RefCell, rc::Rc};

fn parse(src: &str) -> Program {
    let mut program_data = ProgramData::default();
    parser::parse_program(src, &mut program_data).unwrap()
}

/// Analyzes until the facts stop changing.
fn analyze_fixed(program: &Program) -> AnalysisResult {
    let options = Options::trusting();
    let mut registry = Registry::default();
    let mut facts = Facts::default();
    for _ in 0..20 {
        let result = analyze(program, &options, &mut registry, &facts);
        if result.facts == facts {
            return result;
        }
        facts = result.facts;
    }
    panic!("facts did not stabilize");
}

/// The arguments of every `inspect(..)` call, in source order.
struct Inspected<'a> {
    args: Vec<&'a Expr>,
}

impl<'a> Visit<'a> for Inspected<'a> {
    fn visit_call_expr(&mut self, n: &'a CallExpr) {
        if matches!(&*n.callee, Expr::Ident(i) if &*i.sym == "inspect") {
            self.args.extend(n.args.iter());
        }
        n.visit_children_with(self);
    }
}

fn inspected_facts(program: &Program, result: &AnalysisResult) -> Vec<NodeFacts> {
    let mut inspected = Inspected { args: vec![] };
    program.visit_with(&mut inspected);
    inspected
        .args
        .iter()
        .map(|arg| {
            result
                .facts_of(arg.node_id())
                .cloned()
                .unwrap_or_else(|| panic!("no facts for {:?}", arg))
        })
        .collect()
}

fn num(n: f64) -> Value {
    Value::number(n)
}

#[test]
fn both_arms_of_a_branch() {
    let program = parse(
        "var x; if (foo()) x = 1; else x = 2; inspect(x); var y; if (foo()) y = 1; inspect(y);",
    );
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert_eq!(facts[0].value, num(1.0).or(&num(2.0)));
    assert!(facts[0].pure);
    assert_eq!(facts[1].value, Value::UNDEFINED.or(&num(1.0)));
}

#[test]
fn loops_terminate() {
    let program = parse(
        "var i = 0; while (foo()) { i = i + 1; } inspect(i); var j = 0; while (foo()) { j = 1; } inspect(j);",
    );
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert!(facts[0].value.is_unknown());
    assert_eq!(facts[1].value, num(0.0).or(&num(1.0)));
}

#[test]
fn parameters_collect_call_site_values() {
    let program = parse("function f(a) { inspect(a); } f(1); f(2);");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert_eq!(facts[0].value, num(1.0).or(&num(2.0)));
}

#[test]
fn summaries_describe_calls() {
    let program = parse("function f(a) { return a + 1; } inspect(f(1));");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert_eq!(facts[0].value, num(2.0));
    assert!(facts[0].pure);

    let f = match &program.body[0] {
        Stmt::Fn(f) => f,
        _ => unreachable!(),
    };
    let summary = &result.facts.summaries[&f.function.node_id];
    assert!(summary.pure);
    assert_eq!(summary.returns, num(2.0));
}

#[test]
fn unknown_calls_are_impure_and_leak_arguments() {
    let program = parse("var o = {}; inspect(o); inspect(o.x);");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    let o = facts[0]
        .value
        .as_reference()
        .expect("o holds a single object");
    assert!(result.facts.escaped.contains(&o));
    assert!(facts[1].value.is_unknown());

    let call = match &program.body[1] {
        Stmt::Expr(s) => s.expr.node_id(),
        _ => unreachable!(),
    };
    assert!(!result.is_pure(call));
}

struct Recorder {
    seen: Rc<RefCell<Vec<Value>>>,
    stmts: Rc<RefCell<usize>>,
}

impl Observer for Recorder {
    fn call_all(&mut self, node: NodeRef<'_>, _state: &State<'_>, facts: Option<&NodeFacts>) {
        match node {
            NodeRef::Stmt(_) => *self.stmts.borrow_mut() += 1,
            NodeRef::Expr(Expr::Ident(i)) if &*i.sym == "x" => {
                if let Some(facts) = facts {
                    self.seen.borrow_mut().push(facts.value.clone());
                }
            }
            NodeRef::Expr(_) => {}
        }
    }
}

#[test]
fn observers_see_every_evaluation() {
    let program = parse("var x = 1; inspect(x); x = 2; inspect(x);");
    let seen = Rc::new(RefCell::new(vec![]));
    let stmts = Rc::new(RefCell::new(0));
    let recorder = Recorder {
        seen: seen.clone(),
        stmts: stmts.clone(),
    };
    analyze_with(
        &program,
        &Options::trusting(),
        &mut Registry::default(),
        &Facts::default(),
        vec![Box::new(recorder)],
    );
    assert_eq!(*seen.borrow(), vec![num(1.0), num(2.0)]);
    assert_eq!(*stmts.borrow(), 4);
}

#[test]
fn unknown_keys_dirty_the_object() {
    let program = parse("var o = { x: 1, y: 2 }; o[foo()] = 1; inspect(o.x); inspect(o.y);");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert!(facts[0].value.is_unknown());
    assert!(facts[1].value.is_unknown());
}

#[test]
fn called_functions_may_mutate_globals() {
    let program = parse("var o = { x: 1 }; function g() { o.x = 5; } g(); inspect(o.x);");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert!(facts[0].value.is_unknown());

    let g = match &program.body[1] {
        Stmt::Fn(f) => f,
        _ => unreachable!(),
    };
    assert!(!result.facts.summaries[&g.function.node_id].pure);
}

#[test]
fn escaped_closures_may_mutate_globals() {
    let program = parse("var o = { x: 1 }; var g = function () { o.x = 5; }; foo(g); inspect(o.x);");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert!(facts[0].value.is_unknown());
}

#[test]
fn closures_may_mutate_locals() {
    let program = parse(
        "function f() { var o = { x: 1 }; function g() { o.x = 5; } g(); inspect(o.x); } f();",
    );
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert!(facts[0].value.is_unknown());
}

#[test]
fn untouched_objects_keep_their_properties() {
    let program = parse("var o = { x: 1 }; var p = { x: 2 }; function g() { p.x = 5; } g(); inspect(o.x);");
    let result = analyze_fixed(&program);
    let facts = inspected_facts(&program, &result);
    assert_eq!(facts[0].value, num(1.0));
}
