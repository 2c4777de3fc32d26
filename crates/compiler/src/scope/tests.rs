use super::*;
use ast::ProgramData;
use pretty_assertions::assert_eq;

fn build(src: &str) -> (Program, ScopeTree) {
    let mut program_data = ProgramData::default();
    let program = parser::parse_program(src, &mut program_data).unwrap();
    let tree = ScopeTree::build(&program, &mut Registry::default());
    (program, tree)
}

fn var_named(tree: &ScopeTree, name: &str) -> VarId {
    tree.vars()
        .find(|(_, v)| &*v.name == name)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no variable named {}", name))
}

#[test]
fn hoists_vars_and_functions() {
    let (_, tree) = build("f(); { var x = 1; } function f() { if (a) { function g() {} } }");
    let x = var_named(&tree, "x");
    assert_eq!(tree.var(x).kind, VarKind::Var);
    assert!(tree.var(x).global);
    assert_eq!(tree.initial_value(x), Some(&Value::UNDEFINED));

    let f = var_named(&tree, "f");
    assert_eq!(tree.var(f).kind, VarKind::Function);
    assert_eq!(tree.var(f).reads[0].kind, SiteKind::Callee);
    assert_eq!(tree.scope(tree.root()).hoisted_fns.len(), 1);

    let g = var_named(&tree, "g");
    assert!(!tree.var(g).global);
    assert_ne!(tree.var(g).fn_scope, tree.root());
}

#[test]
fn block_scoping() {
    let (_, tree) = build("let x = 1; { let x = 2; x; } x;");
    let vars: Vec<_> = tree.vars().filter(|(_, v)| &*v.name == "x").collect();
    assert_eq!(vars.len(), 2);
    assert!(vars.iter().all(|(_, v)| v.block_scoped));
    assert_eq!(vars[0].1.reads.len(), 1);
    assert_eq!(vars[1].1.reads.len(), 1);
    assert_ne!(vars[0].1.scope, vars[1].1.scope);
}

#[test]
fn implicit_globals() {
    let (_, tree) = build("foo = Math; bar;");
    let foo = var_named(&tree, "foo");
    assert_eq!(tree.var(foo).kind, VarKind::Implicit);
    assert_eq!(tree.var(foo).writes[0].kind, SiteKind::Assign);
    assert!(!tree.is_pristine_builtin(foo));

    let math = var_named(&tree, "Math");
    assert!(tree.is_pristine_builtin(math));
    assert!(tree.initial_value(var_named(&tree, "bar")).is_none());
}

#[test]
fn site_kinds() {
    let (_, tree) = build("var o = {}; o.x = 1; o.y += 1; var n = 0; n++; n += 2; for (var k in o) {}");
    let o = var_named(&tree, "o");
    let kinds: Vec<_> = tree.var(o).reads.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SiteKind::PropWriteObject, SiteKind::Read, SiteKind::Read]
    );
    assert!(tree.is_unused(var_named(&tree, "k")) == false);

    let n = var_named(&tree, "n");
    let kinds: Vec<_> = tree.var(n).writes.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SiteKind::Init, SiteKind::Compound, SiteKind::Compound]
    );
    assert!(!tree.is_unused(n));
}

#[test]
fn unused_variables() {
    let (_, tree) = build("var a = 1; a = 2; var o = {}; o.p = 1; var used = 1; used;");
    assert!(tree.is_unused(var_named(&tree, "a")));
    assert!(tree.is_unused(var_named(&tree, "o")));
    assert!(!tree.is_unused(var_named(&tree, "used")));
}

#[test]
fn foreign_writes_and_captures() {
    let (_, tree) = build(
        "var a = 1, b = 2; function f() { a = 3; return b; } function g(p) { return function () { return p; }; }",
    );
    let a = var_named(&tree, "a");
    let b = var_named(&tree, "b");
    assert!(tree.has_foreign_writes(a));
    assert!(!tree.has_foreign_writes(b));

    // Globals are handled separately from captured locals.
    assert!(!tree.is_captured(b));
    let shared: Vec<_> = tree.shared_global_vars().collect();
    assert!(shared.contains(&a));
    assert!(shared.contains(&b));
    let p = var_named(&tree, "p");
    assert!(tree.is_captured(p));
    assert!(!tree.has_foreign_writes(p));
}

#[test]
fn function_info() {
    let (program, tree) = build("function f(a, b) { this; return arguments; } var h = function g() { g; };");
    let f = match &program.body[0] {
        Stmt::Fn(f) => f,
        _ => unreachable!(),
    };
    let info = tree.function(f.function.node_id).unwrap();
    assert_eq!(info.params.len(), 2);
    assert!(info.uses_arguments);
    assert!(info.uses_this);
    assert!(info.is_decl);
    assert_eq!(info.name_var, Some(var_named(&tree, "f")));
    assert!(tree.vars().all(|(_, v)| &*v.name != "arguments"));

    let g = var_named(&tree, "g");
    assert_eq!(tree.var(g).kind, VarKind::FnExprName);
    assert_eq!(tree.var(g).reads.len(), 1);
}

#[test]
fn detects_with_and_eval() {
    assert!(build("with (o) { x; }").1.has_with_or_eval);
    assert!(build("eval('1');").1.has_with_or_eval);
    assert!(!build("var eval = 1; function f() { eval(); }").1.has_with_or_eval);
}

#[test]
fn written_vars() {
    let (program, tree) = build("var i = 0, j = 0; while (i < 10) { i++; j; }");
    let written = tree.written_in_stmt(&program.body[1]);
    assert!(written.contains(&var_named(&tree, "i")));
    assert!(!written.contains(&var_named(&tree, "j")));
}

#[test]
fn globals_only_used_at_top_level_are_not_shared() {
    let (_, tree) = build("var o = {}; o.x = 1; var p = {}; function f() { p.x = 2; }");
    let shared: Vec<_> = tree.shared_global_vars().collect();
    assert_eq!(shared, vec![var_named(&tree, "p")]);
}
