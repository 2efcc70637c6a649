use es_runtime::{BinaryOp, CatchClause, Expr, ForInTarget, JSError, Program, PropertyDefinition, Runtime, RuntimeConfig, Statement, StatementKind};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn run(body: Vec<Statement>) -> Result<String, JSError> {
    Runtime::new(RuntimeConfig::default()).run(&Program::new(body))
}

fn append(target: &str, value: Expr) -> Statement {
    Statement::expr(Expr::compound_assign(Expr::ident(target), BinaryOp::Add, value))
}

#[test]
fn test_try_catch_finally_order() {
    // var log = ""; try { log += "t"; throw 1; } catch (e) { log += "c" + e; } finally { log += "f"; } log
    let body = vec![
        Statement::var("log", Some(Expr::str(""))),
        StatementKind::Try(
            vec![append("log", Expr::str("t")), Statement::throw(Expr::num(1.0))],
            Some(CatchClause {
                param: "e".to_string(),
                body: vec![append("log", Expr::binary(Expr::str("c"), BinaryOp::Add, Expr::ident("e")))],
            }),
            Some(vec![append("log", Expr::str("f"))]),
        )
        .into(),
        Statement::expr(Expr::ident("log")),
    ];
    assert_eq!(run(body).unwrap(), "tc1f");
}

#[test]
fn test_catch_parameter_is_scoped_to_the_handler() {
    // try { throw "x"; } catch (e) { var seen = e; } typeof e + seen
    let body = vec![
        Statement::try_catch(
            vec![Statement::throw(Expr::str("x"))],
            "e",
            vec![Statement::var("seen", Some(Expr::ident("e")))],
        ),
        Statement::expr(Expr::binary(Expr::typeof_(Expr::ident("e")), BinaryOp::Add, Expr::ident("seen"))),
    ];
    assert_eq!(run(body).unwrap(), "undefinedx");
}

#[test]
fn test_runtime_faults_are_catchable_error_objects() {
    // try { null.x; } catch (e) { (e instanceof TypeError) + ":" + e.name }
    let body = vec![Statement::try_catch(
        vec![Statement::expr(Expr::member(Expr::null(), "x"))],
        "e",
        vec![Statement::expr(Expr::binary(
            Expr::binary(
                Expr::binary(Expr::ident("e"), BinaryOp::InstanceOf, Expr::ident("TypeError")),
                BinaryOp::Add,
                Expr::str(":"),
            ),
            BinaryOp::Add,
            Expr::member(Expr::ident("e"), "name"),
        ))],
    )];
    assert_eq!(run(body).unwrap(), "true:TypeError");

    let body = vec![Statement::try_catch(
        vec![Statement::expr(Expr::ident("nowhere"))],
        "e",
        vec![Statement::expr(Expr::binary(Expr::ident("e"), BinaryOp::Add, Expr::str("")))],
    )];
    assert_eq!(run(body).unwrap(), "ReferenceError: nowhere is not defined");
}

#[test]
fn test_uncaught_exceptions_reach_the_host() {
    let result = run(vec![Statement::throw(Expr::construct(Expr::ident("RangeError"), vec![Expr::str("too far")]))]);
    match result {
        Err(JSError::RangeError { message }) => assert_eq!(message, "too far"),
        other => panic!("Expected RangeError, got {:?}", other),
    }
    let result = run(vec![Statement::throw(Expr::num(42.0))]);
    assert!(matches!(result, Err(JSError::Throw { .. })), "got {:?}", result);
}

#[test]
fn test_with_statement_resolves_through_object() {
    // var o = { x: 1, f: function () { return this.x; } }; with (o) { x = 2; f() }
    let f = es_runtime::FunctionCode::new(None, &[], vec![Statement::ret(Some(Expr::member(Expr::this(), "x")))]);
    let body = vec![
        Statement::var(
            "o",
            Some(Expr::object(vec![
                PropertyDefinition::Value("x".to_string(), Expr::num(1.0)),
                PropertyDefinition::Value("f".to_string(), Expr::function(f)),
            ])),
        ),
        StatementKind::With(
            Expr::ident("o"),
            vec![
                Statement::expr(Expr::assign(Expr::ident("x"), Expr::num(2.0))),
                Statement::expr(Expr::call(Expr::ident("f"), vec![])),
            ],
        )
        .into(),
    ];
    assert_eq!(run(body).unwrap(), "2");
}

#[test]
fn test_for_in_visits_own_then_inherited_keys() {
    // var p = { a: 1 }; var o = Object.create(p); o.b = 2; o.a = 3; var s = ""; for (var k in o) { s += k; } s
    let body = vec![
        Statement::var("p", Some(Expr::object(vec![PropertyDefinition::Value("a".to_string(), Expr::num(1.0))]))),
        Statement::var(
            "o",
            Some(Expr::call(Expr::member(Expr::ident("Object"), "create"), vec![Expr::ident("p")])),
        ),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("o"), "b"), Expr::num(2.0))),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("o"), "a"), Expr::num(3.0))),
        Statement::var("s", Some(Expr::str(""))),
        StatementKind::ForIn(ForInTarget::Var("k".to_string()), Expr::ident("o"), vec![append("s", Expr::ident("k"))]).into(),
        Statement::expr(Expr::ident("s")),
    ];
    assert_eq!(run(body).unwrap(), "ba");
}

#[test]
fn test_for_in_over_null_runs_nothing() {
    let body = vec![
        Statement::var("n", Some(Expr::num(0.0))),
        StatementKind::ForIn(ForInTarget::Var("k".to_string()), Expr::null(), vec![append("n", Expr::num(1.0))]).into(),
        Statement::expr(Expr::ident("n")),
    ];
    assert_eq!(run(body).unwrap(), "0");
}

#[test]
fn test_while_with_break_and_continue() {
    // var i = 0, s = 0; while (true) { i++; if (i > 5) break; if (i % 2) continue; s += i; } s
    let body = vec![
        Statement::var("i", Some(Expr::num(0.0))),
        Statement::var("s", Some(Expr::num(0.0))),
        Statement::while_loop(
            Expr::boolean(true),
            vec![
                Statement::expr(Expr::postfix(es_runtime::UpdateOp::Increment, Expr::ident("i"))),
                Statement::if_then(
                    Expr::binary(Expr::ident("i"), BinaryOp::GreaterThan, Expr::num(5.0)),
                    vec![StatementKind::Break(None).into()],
                    None,
                ),
                Statement::if_then(
                    Expr::binary(Expr::ident("i"), BinaryOp::Mod, Expr::num(2.0)),
                    vec![StatementKind::Continue(None).into()],
                    None,
                ),
                append("s", Expr::ident("i")),
            ],
        ),
        Statement::expr(Expr::ident("s")),
    ];
    assert_eq!(run(body).unwrap(), "6");
}

#[test]
fn test_do_while_runs_body_once() {
    let body = vec![
        Statement::var("n", Some(Expr::num(0.0))),
        StatementKind::DoWhile(vec![append("n", Expr::num(1.0))], Expr::boolean(false)).into(),
        Statement::expr(Expr::ident("n")),
    ];
    assert_eq!(run(body).unwrap(), "1");
}
