use es_runtime::{BinaryOp, Expr, FunctionCode, JSError, Program, PropertyDefinition, Runtime, RuntimeConfig, Statement, UpdateOp};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn run(body: Vec<Statement>) -> Result<String, JSError> {
    Runtime::new(RuntimeConfig::default()).run(&Program::new(body))
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(Expr::ident(name), args)
}

#[test]
fn test_function_declarations_are_hoisted() {
    // var r = f(); function f() { return typeof x; } var x = 1; r
    let body = vec![
        Statement::var("r", Some(call("f", vec![]))),
        Statement::function(FunctionCode::new(Some("f"), &[], vec![Statement::ret(Some(Expr::typeof_(Expr::ident("x"))))])),
        Statement::var("x", Some(Expr::num(1.0))),
        Statement::expr(Expr::ident("r")),
    ];
    assert_eq!(run(body).unwrap(), "undefined");
}

#[test]
fn test_later_declaration_wins() {
    let body = vec![
        Statement::function(FunctionCode::new(Some("f"), &[], vec![Statement::ret(Some(Expr::num(1.0)))])),
        Statement::function(FunctionCode::new(Some("f"), &[], vec![Statement::ret(Some(Expr::num(2.0)))])),
        Statement::expr(call("f", vec![])),
    ];
    assert_eq!(run(body).unwrap(), "2");
}

#[test]
fn test_arguments_alias_parameters() {
    // function f(a) { arguments[0] = 9; return a; } f(1)
    let f = FunctionCode::new(
        Some("f"),
        &["a"],
        vec![
            Statement::expr(Expr::assign(Expr::index(Expr::ident("arguments"), Expr::num(0.0)), Expr::num(9.0))),
            Statement::ret(Some(Expr::ident("a"))),
        ],
    );
    let body = vec![Statement::function(f), Statement::expr(call("f", vec![Expr::num(1.0)]))];
    assert_eq!(run(body).unwrap(), "9");

    // function g(a) { a = 2; return arguments[0]; } g(1)
    let g = FunctionCode::new(
        Some("g"),
        &["a"],
        vec![
            Statement::expr(Expr::assign(Expr::ident("a"), Expr::num(2.0))),
            Statement::ret(Some(Expr::index(Expr::ident("arguments"), Expr::num(0.0)))),
        ],
    );
    let body = vec![Statement::function(g), Statement::expr(call("g", vec![Expr::num(1.0)]))];
    assert_eq!(run(body).unwrap(), "2");
}

#[test]
fn test_strict_arguments_do_not_alias() {
    let f = FunctionCode::new(
        Some("f"),
        &["a"],
        vec![
            Statement::expr(Expr::assign(Expr::index(Expr::ident("arguments"), Expr::num(0.0)), Expr::num(9.0))),
            Statement::ret(Some(Expr::ident("a"))),
        ],
    )
    .strict();
    let body = vec![Statement::function(f), Statement::expr(call("f", vec![Expr::num(1.0)]))];
    assert_eq!(run(body).unwrap(), "1");
}

#[test]
fn test_missing_arguments_are_undefined_and_length_counts_actuals() {
    // function f(a, b) { return typeof b + arguments.length; } f(1)
    let f = FunctionCode::new(
        Some("f"),
        &["a", "b"],
        vec![Statement::ret(Some(Expr::binary(
            Expr::typeof_(Expr::ident("b")),
            BinaryOp::Add,
            Expr::member(Expr::ident("arguments"), "length"),
        )))],
    );
    let body = vec![Statement::function(f), Statement::expr(call("f", vec![Expr::num(1.0)]))];
    assert_eq!(run(body).unwrap(), "undefined1");
}

#[test]
fn test_method_call_this() {
    // var o = { v: 3, m: function () { return this.v; } }; o.m()
    let m = FunctionCode::new(None, &[], vec![Statement::ret(Some(Expr::member(Expr::this(), "v")))]);
    let body = vec![
        Statement::var(
            "o",
            Some(Expr::object(vec![
                es_runtime::PropertyDefinition::Value("v".to_string(), Expr::num(3.0)),
                es_runtime::PropertyDefinition::Value("m".to_string(), Expr::function(m)),
            ])),
        ),
        Statement::expr(Expr::call(Expr::member(Expr::ident("o"), "m"), vec![])),
    ];
    assert_eq!(run(body).unwrap(), "3");
}

#[test]
fn test_plain_call_this_depends_on_strictness() {
    let sloppy = FunctionCode::new(Some("s"), &[], vec![Statement::ret(Some(Expr::this()))]);
    let strict = FunctionCode::new(Some("t"), &[], vec![Statement::ret(Some(Expr::this()))]).strict();
    let body = vec![
        Statement::function(sloppy),
        Statement::function(strict),
        Statement::expr(Expr::binary(
            Expr::binary(call("s", vec![]), BinaryOp::StrictEqual, Expr::this()),
            BinaryOp::Add,
            Expr::typeof_(call("t", vec![])),
        )),
    ];
    assert_eq!(run(body).unwrap(), "trueundefined");
}

#[test]
fn test_closures_capture_environment() {
    // function counter() { var n = 0; return function () { return ++n; }; } var c = counter(); c(); c()
    let inner = FunctionCode::new(None, &[], vec![Statement::ret(Some(Expr::prefix(UpdateOp::Increment, Expr::ident("n"))))]);
    let counter = FunctionCode::new(
        Some("counter"),
        &[],
        vec![Statement::var("n", Some(Expr::num(0.0))), Statement::ret(Some(Expr::function(inner)))],
    );
    let body = vec![
        Statement::function(counter),
        Statement::var("c", Some(call("counter", vec![]))),
        Statement::expr(call("c", vec![])),
        Statement::expr(call("c", vec![])),
    ];
    assert_eq!(run(body).unwrap(), "2");
}

#[test]
fn test_named_function_expression_binding_is_local_and_immutable() {
    // var f = function fact(n) { fact = null; return n <= 1 ? 1 : n * fact(n - 1); }; f(4) + typeof fact
    let fact = FunctionCode::new(
        Some("fact"),
        &["n"],
        vec![
            Statement::expr(Expr::assign(Expr::ident("fact"), Expr::null())),
            Statement::ret(Some(Expr::conditional(
                Expr::binary(Expr::ident("n"), BinaryOp::LessEqual, Expr::num(1.0)),
                Expr::num(1.0),
                Expr::binary(
                    Expr::ident("n"),
                    BinaryOp::Mul,
                    call("fact", vec![Expr::binary(Expr::ident("n"), BinaryOp::Sub, Expr::num(1.0))]),
                ),
            ))),
        ],
    );
    let body = vec![
        Statement::var("f", Some(Expr::function(fact))),
        Statement::expr(Expr::binary(
            call("f", vec![Expr::num(4.0)]),
            BinaryOp::Add,
            Expr::typeof_(Expr::ident("fact")),
        )),
    ];
    assert_eq!(run(body).unwrap(), "24undefined");
}

#[test]
fn test_constructor_and_instanceof() {
    // function F() { this.a = 1; } var o = new F(); (o instanceof F) + "" + o.a
    let f = FunctionCode::new(
        Some("F"),
        &[],
        vec![Statement::expr(Expr::assign(Expr::member(Expr::this(), "a"), Expr::num(1.0)))],
    );
    let body = vec![
        Statement::function(f),
        Statement::var("o", Some(Expr::construct(Expr::ident("F"), vec![]))),
        Statement::expr(Expr::binary(
            Expr::binary(
                Expr::binary(Expr::ident("o"), BinaryOp::InstanceOf, Expr::ident("F")),
                BinaryOp::Add,
                Expr::str(""),
            ),
            BinaryOp::Add,
            Expr::member(Expr::ident("o"), "a"),
        )),
    ];
    assert_eq!(run(body).unwrap(), "true1");
}

#[test]
fn test_call_and_apply() {
    // function add(a, b) { return a + b + this.c; } add.call({c: 1}, 2, 3) + add.apply({c: 10}, [20, 30])
    let add = FunctionCode::new(
        Some("add"),
        &["a", "b"],
        vec![Statement::ret(Some(Expr::binary(
            Expr::binary(Expr::ident("a"), BinaryOp::Add, Expr::ident("b")),
            BinaryOp::Add,
            Expr::member(Expr::this(), "c"),
        )))],
    );
    let receiver = |c: f64| Expr::object(vec![es_runtime::PropertyDefinition::Value("c".to_string(), Expr::num(c))]);
    let body = vec![
        Statement::function(add),
        Statement::expr(Expr::binary(
            Expr::call(Expr::member(Expr::ident("add"), "call"), vec![receiver(1.0), Expr::num(2.0), Expr::num(3.0)]),
            BinaryOp::Add,
            Expr::call(
                Expr::member(Expr::ident("add"), "apply"),
                vec![receiver(10.0), Expr::array(vec![Expr::num(20.0), Expr::num(30.0)])],
            ),
        )),
    ];
    assert_eq!(run(body).unwrap(), "66");
}

#[test]
fn test_runaway_recursion_is_a_range_error() {
    let config = RuntimeConfig {
        max_call_depth: 32,
        ..RuntimeConfig::default()
    };
    let f = FunctionCode::new(Some("f"), &[], vec![Statement::ret(Some(call("f", vec![])))]);
    let program = Program::new(vec![Statement::function(f), Statement::expr(call("f", vec![]))]);
    let result = Runtime::new(config).run(&program);
    assert!(matches!(result, Err(JSError::RangeError { .. })), "got {:?}", result);
}

#[test]
fn test_calling_non_function_is_type_error() {
    let body = vec![Statement::var("x", Some(Expr::num(1.0))), Statement::expr(call("x", vec![]))];
    let result = run(body);
    assert!(matches!(result, Err(JSError::TypeError { .. })), "got {:?}", result);
}

#[test]
fn test_apply_rejects_oversized_argument_list() {
    // function f() {} try { f.apply(null, {length: 4294967295}); "called" } catch (e) { e instanceof RangeError ? "range" : "other" }
    let huge = Expr::object(vec![PropertyDefinition::Value("length".to_string(), Expr::num(4294967295.0))]);
    let apply = Expr::call(Expr::member(Expr::ident("f"), "apply"), vec![Expr::null(), huge]);
    let handler = Statement::expr(Expr::conditional(
        Expr::binary(Expr::ident("e"), BinaryOp::InstanceOf, Expr::ident("RangeError")),
        Expr::str("range"),
        Expr::str("other"),
    ));
    let body = vec![
        Statement::function(FunctionCode::new(Some("f"), &[], vec![])),
        Statement::try_catch(vec![Statement::expr(apply), Statement::expr(Expr::str("called"))], "e", vec![handler]),
    ];
    assert_eq!(run(body).unwrap(), "range");
}

#[test]
fn test_apply_accepts_array_like_objects() {
    // function f(a, b) { return a + b; } f.apply(null, {length: 2, 0: 3, 1: 4})
    let args = Expr::object(vec![
        PropertyDefinition::Value("length".to_string(), Expr::num(2.0)),
        PropertyDefinition::Value("0".to_string(), Expr::num(3.0)),
        PropertyDefinition::Value("1".to_string(), Expr::num(4.0)),
    ]);
    let sum = Statement::ret(Some(Expr::binary(Expr::ident("a"), BinaryOp::Add, Expr::ident("b"))));
    let body = vec![
        Statement::function(FunctionCode::new(Some("f"), &["a", "b"], vec![sum])),
        Statement::expr(Expr::call(Expr::member(Expr::ident("f"), "apply"), vec![Expr::null(), args])),
    ];
    assert_eq!(run(body).unwrap(), "7");
}
