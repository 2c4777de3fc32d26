use crate::{print_program, Config};
use ast::*;
use pretty_assertions::assert_eq;

fn parse(src: &str) -> Program {
    let mut program_data = ProgramData::default();
    match parser::parse_program(src, &mut program_data) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse {:?}: {}", src, err),
    }
}

fn test(src: &str, expected: &str) {
    assert_eq!(print_program(&parse(src), Config::default()), expected);
}

fn test_minified(src: &str, expected: &str) {
    assert_eq!(print_program(&parse(src), Config { minify: true }), expected);
}

#[test]
fn declarations() {
    test("var a = 1, b;", "var a = 1, b;\n");
    test("let a; const b = 2;", "let a;\nconst b = 2;\n");
    test(
        "function f(a, b) { return a + b; }",
        "function f(a, b) {\n    return a + b;\n}\n",
    );
}

#[test]
fn if_else() {
    test("if (a) b(); else c();", "if (a)\n    b();\nelse\n    c();\n");
    test(
        "if (a) { b(); } else { c(); }",
        "if (a) {\n    b();\n} else {\n    c();\n}\n",
    );
    test(
        "if (a) b(); else if (c) d();",
        "if (a)\n    b();\nelse if (c)\n    d();\n",
    );
}

#[test]
fn dangling_else_gets_a_block() {
    let mut program = parse("if (a) { if (b) x(); } else y();");
    if let Stmt::If(outer) = &mut program.body[0] {
        let inner = match &mut *outer.cons {
            Stmt::Block(b) => b.stmts.remove(0),
            s => panic!("unexpected {:?}", s),
        };
        *outer.cons = inner;
    }
    assert_eq!(
        print_program(&program, Config::default()),
        "if (a) {\n    if (b)\n        x();\n} else\n    y();\n"
    );
}

#[test]
fn loops() {
    test(
        "for (var i = 0; i < n; i++) {}",
        "for (var i = 0; i < n; i++) {}\n",
    );
    test("for (k in o) f(k);", "for (k in o)\n    f(k);\n");
    test("do x(); while (y);", "do\n    x();\nwhile (y);\n");
    test(
        "outer: for (;;) break outer;",
        "outer: for (;;)\n    break outer;\n",
    );
}

#[test]
fn in_is_parenthesized_in_for_init() {
    test(
        "for (var x = ('a' in o);;) ;",
        "for (var x = (\"a\" in o);;)\n    ;\n",
    );
}

#[test]
fn try_catch_finally() {
    test(
        "try { a(); } catch (e) { b(); } finally { c(); }",
        "try {\n    a();\n} catch (e) {\n    b();\n} finally {\n    c();\n}\n",
    );
}

#[test]
fn parens_follow_precedence() {
    test("(a + b) * c;", "(a + b) * c;\n");
    test("a + (b * c);", "a + b * c;\n");
    test("a - (b - c);", "a - (b - c);\n");
    test("(a, b);", "a, b;\n");
    test("x = (y, z);", "x = (y, z);\n");
    test("f((a, b), c);", "f((a, b), c);\n");
    test("(a ? b : c) ? d : e;", "(a ? b : c) ? d : e;\n");
    test("a ? b : c ? d : e;", "a ? b : c ? d : e;\n");
    test("!(a && b);", "!(a && b);\n");
    test("a = b = c;", "a = b = c;\n");
}

#[test]
fn adjacent_operators_are_separated() {
    test("- -x;", "- -x;\n");
    test("a + +b;", "a + +b;\n");
    test("typeof x;", "typeof x;\n");
    test("x = a / /b/g;", "x = a / /b/g;\n");
}

#[test]
fn new_and_member() {
    test("new a.b();", "new a.b();\n");
    test("new (f())();", "new (f())();\n");
    test("new (a.f().b)();", "new (a.f().b)();\n");
    test("new a().b;", "new a().b;\n");
    test("(1).toString();", "(1).toString();\n");
    test("a[b + 1].c;", "a[b + 1].c;\n");
}

#[test]
fn statement_starting_with_function_or_object() {
    test("(function () {})();", "(function() {}());\n");
    test("({}).x;", "({}.x);\n");
}

#[test]
fn literals() {
    test("'it\\'s';", "\"it's\";\n");
    test("x = [1, 2];", "x = [1, 2];\n");
    test("x = 1e21;", "x = 1e+21;\n");
    test("x = 0x10;", "x = 16;\n");
    test(
        "x = { a: 1, 'b c': 2 };",
        "x = {\n    a: 1,\n    \"b c\": 2\n};\n",
    );
    test("x = null;", "x = null;\n");
}

#[test]
fn minified() {
    test_minified("if (a) { b(); } else c();", "if(a){b();}else c();");
    test_minified("var a = 1; return_(a);", "var a=1;return_(a);");
    test_minified("function f() { return x; }", "function f(){return x;}");
}
