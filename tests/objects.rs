use es_runtime::{BinaryOp, Expr, FunctionCode, JSError, Program, PropertyDefinition, Runtime, RuntimeConfig, Statement};
use std::rc::Rc;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn run(body: Vec<Statement>) -> Result<String, JSError> {
    Runtime::new(RuntimeConfig::default()).run(&Program::new(body))
}

fn object_method(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(Expr::member(Expr::ident("Object"), name), args)
}

fn prop(key: &str, value: Expr) -> PropertyDefinition {
    PropertyDefinition::Value(key.to_string(), value)
}

#[test]
fn test_define_property_defaults_to_read_only() {
    // var o = {}; Object.defineProperty(o, "x", { value: 1 }); o.x = 2; o.x
    let body = vec![
        Statement::var("o", Some(Expr::object(vec![]))),
        Statement::expr(object_method(
            "defineProperty",
            vec![Expr::ident("o"), Expr::str("x"), Expr::object(vec![prop("value", Expr::num(1.0))])],
        )),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("o"), "x"), Expr::num(2.0))),
        Statement::expr(Expr::member(Expr::ident("o"), "x")),
    ];
    assert_eq!(run(body.clone()).unwrap(), "1");
    let result = Runtime::new(RuntimeConfig::default()).run(&Program::new(body).strict());
    assert!(matches!(result, Err(JSError::TypeError { .. })), "got {:?}", result);
}

#[test]
fn test_redefining_non_configurable_property_throws() {
    let descriptor = |v: f64| Expr::object(vec![prop("value", Expr::num(v))]);
    let body = vec![
        Statement::var("o", Some(Expr::object(vec![]))),
        Statement::expr(object_method("defineProperty", vec![Expr::ident("o"), Expr::str("x"), descriptor(1.0)])),
        Statement::expr(object_method("defineProperty", vec![Expr::ident("o"), Expr::str("x"), descriptor(2.0)])),
    ];
    let result = run(body);
    assert!(matches!(result, Err(JSError::TypeError { .. })), "got {:?}", result);
}

#[test]
fn test_mixed_descriptor_is_rejected() {
    let getter = Expr::function(FunctionCode::new(None, &[], vec![]));
    let body = vec![Statement::expr(object_method(
        "defineProperty",
        vec![
            Expr::object(vec![]),
            Expr::str("x"),
            Expr::object(vec![prop("value", Expr::num(1.0)), prop("get", getter)]),
        ],
    ))];
    let result = run(body);
    assert!(matches!(result, Err(JSError::TypeError { .. })), "got {:?}", result);
}

#[test]
fn test_accessor_literal() {
    // var o = { get v() { return this._v * 2; }, set v(x) { this._v = x; } }; o.v = 5; o.v
    let getter = FunctionCode::new(
        None,
        &[],
        vec![Statement::ret(Some(Expr::binary(Expr::member(Expr::this(), "_v"), BinaryOp::Mul, Expr::num(2.0))))],
    );
    let setter = FunctionCode::new(
        None,
        &["x"],
        vec![Statement::expr(Expr::assign(Expr::member(Expr::this(), "_v"), Expr::ident("x")))],
    );
    let body = vec![
        Statement::var(
            "o",
            Some(Expr::object(vec![
                PropertyDefinition::Getter("v".to_string(), Rc::new(getter)),
                PropertyDefinition::Setter("v".to_string(), Rc::new(setter)),
            ])),
        ),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("o"), "v"), Expr::num(5.0))),
        Statement::expr(Expr::member(Expr::ident("o"), "v")),
    ];
    assert_eq!(run(body).unwrap(), "10");
}

#[test]
fn test_getter_without_setter_rejects_writes_in_strict_code() {
    let getter = FunctionCode::new(None, &[], vec![Statement::ret(Some(Expr::num(1.0)))]);
    let body = vec![
        Statement::var("o", Some(Expr::object(vec![PropertyDefinition::Getter("r".to_string(), Rc::new(getter))]))),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("o"), "r"), Expr::num(2.0))),
        Statement::expr(Expr::member(Expr::ident("o"), "r")),
    ];
    assert_eq!(run(body.clone()).unwrap(), "1");
    let result = Runtime::new(RuntimeConfig::default()).run(&Program::new(body).strict());
    assert!(matches!(result, Err(JSError::TypeError { .. })), "got {:?}", result);
}

#[test]
fn test_array_literal_holes_and_length() {
    // var a = [1, , 3]; a.length + ":" + (1 in a)
    let body = vec![
        Statement::var("a", Some(Expr::Array(vec![Some(Expr::num(1.0)), None, Some(Expr::num(3.0))]))),
        Statement::expr(Expr::binary(
            Expr::binary(Expr::member(Expr::ident("a"), "length"), BinaryOp::Add, Expr::str(":")),
            BinaryOp::Add,
            Expr::binary(Expr::num(1.0), BinaryOp::In, Expr::ident("a")),
        )),
    ];
    assert_eq!(run(body).unwrap(), "3:false");
}

#[test]
fn test_array_length_tracks_writes() {
    // var a = [1, 2, 3]; a.length = 1; a[4] = "x"; a.length + a.join("-")
    let body = vec![
        Statement::var("a", Some(Expr::array(vec![Expr::num(1.0), Expr::num(2.0), Expr::num(3.0)]))),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("a"), "length"), Expr::num(1.0))),
        Statement::expr(Expr::assign(Expr::index(Expr::ident("a"), Expr::num(4.0)), Expr::str("x"))),
        Statement::expr(Expr::binary(
            Expr::member(Expr::ident("a"), "length"),
            BinaryOp::Add,
            Expr::call(Expr::member(Expr::ident("a"), "join"), vec![Expr::str("-")]),
        )),
    ];
    assert_eq!(run(body).unwrap(), "51----x");
}

#[test]
fn test_invalid_array_length_is_range_error() {
    let body = vec![
        Statement::var("a", Some(Expr::array(vec![]))),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("a"), "length"), Expr::num(-1.0))),
    ];
    let result = run(body);
    assert!(matches!(result, Err(JSError::RangeError { .. })), "got {:?}", result);
}

#[test]
fn test_frozen_object_reports_frozen() {
    let body = vec![
        Statement::var("o", Some(Expr::object(vec![prop("a", Expr::num(1.0))]))),
        Statement::expr(object_method("freeze", vec![Expr::ident("o")])),
        Statement::expr(Expr::assign(Expr::member(Expr::ident("o"), "b"), Expr::num(1.0))),
        Statement::expr(Expr::binary(
            Expr::binary(object_method("isFrozen", vec![Expr::ident("o")]), BinaryOp::Add, Expr::str(":")),
            BinaryOp::Add,
            Expr::typeof_(Expr::member(Expr::ident("o"), "b")),
        )),
    ];
    assert_eq!(run(body).unwrap(), "true:undefined");
}

#[test]
fn test_keys_and_own_property_descriptor() {
    // var o = { a: 1 }; Object.defineProperty(o, "h", { value: 2 });
    // Object.keys(o).join() + ":" + Object.getOwnPropertyNames(o).join() + ":" + Object.getOwnPropertyDescriptor(o, "h").enumerable
    let body = vec![
        Statement::var("o", Some(Expr::object(vec![prop("a", Expr::num(1.0))]))),
        Statement::expr(object_method(
            "defineProperty",
            vec![Expr::ident("o"), Expr::str("h"), Expr::object(vec![prop("value", Expr::num(2.0))])],
        )),
        Statement::expr(Expr::binary(
            Expr::binary(
                Expr::binary(
                    Expr::binary(
                        Expr::call(Expr::member(object_method("keys", vec![Expr::ident("o")]), "join"), vec![]),
                        BinaryOp::Add,
                        Expr::str(":"),
                    ),
                    BinaryOp::Add,
                    Expr::call(Expr::member(object_method("getOwnPropertyNames", vec![Expr::ident("o")]), "join"), vec![]),
                ),
                BinaryOp::Add,
                Expr::str(":"),
            ),
            BinaryOp::Add,
            Expr::member(object_method("getOwnPropertyDescriptor", vec![Expr::ident("o"), Expr::str("h")]), "enumerable"),
        )),
    ];
    assert_eq!(run(body).unwrap(), "a:a,h:false");
}

#[test]
fn test_primitive_property_access_uses_wrappers() {
    // "abc".length + "abc"[1] + (5).toString(2)
    let body = vec![Statement::expr(Expr::binary(
        Expr::binary(Expr::member(Expr::str("abc"), "length"), BinaryOp::Add, Expr::index(Expr::str("abc"), Expr::num(1.0))),
        BinaryOp::Add,
        Expr::call(Expr::member(Expr::num(5.0), "toString"), vec![Expr::num(2.0)]),
    ))];
    assert_eq!(run(body).unwrap(), "3b101");
}

#[test]
fn test_delete_respects_configurability() {
    // var o = { a: 1 }; (delete o.a) + ":" + (delete Object.prototype) + ":" + ("a" in o)
    let body = vec![
        Statement::var("o", Some(Expr::object(vec![prop("a", Expr::num(1.0))]))),
        Statement::expr(Expr::binary(
            Expr::binary(
                Expr::binary(
                    Expr::binary(Expr::delete(Expr::member(Expr::ident("o"), "a")), BinaryOp::Add, Expr::str(":")),
                    BinaryOp::Add,
                    Expr::delete(Expr::member(Expr::ident("Object"), "prototype")),
                ),
                BinaryOp::Add,
                Expr::str(":"),
            ),
            BinaryOp::Add,
            Expr::binary(Expr::str("a"), BinaryOp::In, Expr::ident("o")),
        )),
    ];
    assert_eq!(run(body).unwrap(), "true:false:false");
}
