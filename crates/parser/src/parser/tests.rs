use crate::{parse_program, SyntaxError};
use ast::*;
use pretty_assertions::assert_eq;

fn parse(src: &str) -> Vec<Stmt> {
    let mut program_data = ProgramData::default();
    match parse_program(src, &mut program_data) {
        Ok(program) => program.body,
        Err(err) => panic!("failed to parse {:?}: {}", src, err),
    }
}

fn parse_err(src: &str) -> SyntaxError {
    let mut program_data = ProgramData::default();
    match parse_program(src, &mut program_data) {
        Ok(program) => panic!("expected an error, got {:?}", program),
        Err(err) => err.kind,
    }
}

fn expr(src: &str) -> Expr {
    match parse(src).pop() {
        Some(Stmt::Expr(s)) => *s.expr,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn bin_op(e: &Expr) -> BinaryOp {
    match e {
        Expr::Bin(b) => b.op,
        _ => panic!("expected a binary expression, got {:?}", e),
    }
}

#[test]
fn multiplication_binds_tighter() {
    let e = expr("a + b * c;");
    assert_eq!(bin_op(&e), BinaryOp::Add);
    match e {
        Expr::Bin(b) => assert_eq!(bin_op(&b.right), BinaryOp::Mul),
        _ => unreachable!(),
    }
}

#[test]
fn subtraction_is_left_associative() {
    match expr("a - b - c;") {
        Expr::Bin(b) => {
            assert_eq!(bin_op(&b.left), BinaryOp::Sub);
            assert!(matches!(*b.right, Expr::Ident(_)));
        }
        e => panic!("unexpected {:?}", e),
    }
}

#[test]
fn negative_number_is_unary_minus() {
    match expr("-1;") {
        Expr::Unary(u) => {
            assert_eq!(u.op, UnaryOp::Minus);
            assert!(matches!(*u.arg, Expr::Lit(Lit::Num(Number { value, .. })) if value == 1.0));
        }
        e => panic!("unexpected {:?}", e),
    }
}

#[test]
fn new_takes_member_callee() {
    match expr("new a.b(1).c();") {
        Expr::Call(call) => match *call.callee {
            Expr::Member(m) => match *m.obj {
                Expr::New(n) => {
                    assert!(matches!(*n.callee, Expr::Member(_)));
                    assert_eq!(n.args.len(), 1);
                }
                e => panic!("unexpected {:?}", e),
            },
            e => panic!("unexpected {:?}", e),
        },
        e => panic!("unexpected {:?}", e),
    }
}

#[test]
fn automatic_semicolon_insertion() {
    let stmts = parse("var a = 1\nvar b = 2\na\n++b");
    assert_eq!(stmts.len(), 4);
    assert!(matches!(
        &stmts[3],
        Stmt::Expr(ExprStmt { expr, .. }) if matches!(**expr, Expr::Update(UpdateExpr { prefix: true, .. }))
    ));
}

#[test]
fn return_without_argument_before_line_break() {
    let stmts = parse("function f() { return\n1 }");
    match &stmts[0] {
        Stmt::Fn(f) => {
            assert_eq!(f.function.body.stmts.len(), 2);
            assert!(matches!(
                &f.function.body.stmts[0],
                Stmt::Return(ReturnStmt { arg: None, .. })
            ));
        }
        s => panic!("unexpected {:?}", s),
    }
}

#[test]
fn for_in_with_declaration() {
    match &parse("for (var k in o) {}")[0] {
        Stmt::ForIn(f) => match &f.left {
            ForHead::VarDecl(d) => assert_eq!(&*d.decls[0].name.sym, "k"),
            h => panic!("unexpected {:?}", h),
        },
        s => panic!("unexpected {:?}", s),
    }
}

#[test]
fn in_inside_for_init_parens() {
    match &parse("for (var x = ('a' in o); x; ) {}")[0] {
        Stmt::For(f) => assert!(f.update.is_none()),
        s => panic!("unexpected {:?}", s),
    }
}

#[test]
fn object_literal_accessors() {
    match expr("({ get: 1, get a() { return 1; }, set a(v) {}, [k]: 2, 'b': 3, 4: 5 });") {
        Expr::Object(o) => {
            assert_eq!(o.props.len(), 6);
            assert!(matches!(&o.props[0], Prop::KeyValue(_)));
            assert!(matches!(&o.props[1], Prop::Getter(_)));
            assert!(matches!(&o.props[2], Prop::Setter(_)));
            assert!(matches!(o.props[3].key(), PropName::Computed(_)));
            assert!(matches!(o.props[4].key(), PropName::Str(_)));
            assert!(matches!(o.props[5].key(), PropName::Num(_)));
        }
        e => panic!("unexpected {:?}", e),
    }
}

#[test]
fn array_holes() {
    match expr("[, 1, , 2,];") {
        Expr::Array(a) => {
            let holes: Vec<_> = a.elems.iter().map(Option::is_none).collect();
            assert_eq!(holes, vec![true, false, true, false]);
        }
        e => panic!("unexpected {:?}", e),
    }
}

#[test]
fn labeled_continue() {
    let stmts = parse("outer: for (;;) { while (x) { continue outer; } }");
    assert!(matches!(&stmts[0], Stmt::Labeled(_)));
}

#[test]
fn keyword_property_names() {
    match expr("a.delete(b.in);") {
        Expr::Call(c) => match *c.callee {
            Expr::Member(MemberExpr {
                prop: MemberProp::Ident(ref i),
                ..
            }) => assert_eq!(&*i.sym, "delete"),
            ref e => panic!("unexpected {:?}", e),
        },
        e => panic!("unexpected {:?}", e),
    }
}

#[test]
fn node_ids_are_unique() {
    struct Ids(Vec<NodeId>);
    let mut program_data = ProgramData::default();
    let program = parse_program("var a = [1, {b: 2}]; f(a);", &mut program_data).unwrap();
    let mut ids = Ids(Vec::new());
    collect(&program.body, &mut ids.0);
    let count = ids.0.len();
    ids.0.sort();
    ids.0.dedup();
    assert_eq!(ids.0.len(), count);

    fn collect(stmts: &[Stmt], out: &mut Vec<NodeId>) {
        for s in stmts {
            out.push(s.node_id());
        }
    }
}

#[test]
fn errors() {
    assert_eq!(parse_err("return 1;"), SyntaxError::ReturnNotAllowed);
    assert_eq!(parse_err("break;"), SyntaxError::IllegalBreak);
    assert_eq!(parse_err("while (x) { continue y; }"), SyntaxError::UndefinedLabel("y".into()));
    assert_eq!(parse_err("a: a: x;"), SyntaxError::DuplicateLabel("a".into()));
    assert_eq!(parse_err("1 = 2;"), SyntaxError::InvalidAssignTarget);
    assert_eq!(parse_err("try {}"), SyntaxError::TryWithoutHandler);
    assert_eq!(parse_err("throw\nx;"), SyntaxError::LineBreakInThrow);
    assert_eq!(parse_err("a b"), SyntaxError::Unexpected {
        got: "`b`".into(),
        expected: "`;`",
    });
    assert_eq!(parse_err("f("), SyntaxError::Eof);
    assert_eq!(parse_err("switch (x) {}"), SyntaxError::Unsupported("switch statement"));
}
