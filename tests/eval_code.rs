use es_runtime::{Expr, JSError, Program, Runtime, RuntimeConfig, Statement};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn expr(e: Expr) -> Program {
    Program::new(vec![Statement::expr(e)])
}

#[test]
fn test_eval_vars_are_deletable_but_global_vars_are_not() {
    let rt = Runtime::new(RuntimeConfig::default());
    rt.run_eval(&Program::new(vec![Statement::var("fromEval", Some(Expr::num(1.0)))])).unwrap();
    rt.run(&Program::new(vec![Statement::var("fromGlobal", Some(Expr::num(1.0)))])).unwrap();

    assert_eq!(rt.run(&expr(Expr::ident("fromEval"))).unwrap(), "1");
    assert_eq!(rt.run(&expr(Expr::delete(Expr::ident("fromEval")))).unwrap(), "true");
    assert_eq!(rt.run(&expr(Expr::typeof_(Expr::ident("fromEval")))).unwrap(), "undefined");
    assert_eq!(rt.run(&expr(Expr::delete(Expr::ident("fromGlobal")))).unwrap(), "false");
}

#[test]
fn test_strict_eval_keeps_declarations_private() {
    let rt = Runtime::new(RuntimeConfig::default());
    let program = Program::new(vec![
        Statement::var("hidden", Some(Expr::num(1.0))),
        Statement::expr(Expr::ident("hidden")),
    ])
    .strict();
    assert_eq!(rt.run_eval(&program).unwrap(), "1");
    assert_eq!(rt.run(&expr(Expr::typeof_(Expr::ident("hidden")))).unwrap(), "undefined");
}

#[test]
fn test_eval_completion_value_is_last_value_producing_statement() {
    let rt = Runtime::new(RuntimeConfig::default());
    let program = Program::new(vec![
        Statement::expr(Expr::num(1.0)),
        Statement::var("x", Some(Expr::num(2.0))),
        Statement::empty(),
    ]);
    assert_eq!(rt.run_eval(&program).unwrap(), "1");
    assert_eq!(rt.run_eval(&Program::new(vec![])).unwrap(), "undefined");
}

#[test]
fn test_state_persists_between_runs() {
    let rt = Runtime::new(RuntimeConfig::default());
    rt.run(&Program::new(vec![Statement::var("counter", Some(Expr::num(41.0)))])).unwrap();
    let result = rt.run(&expr(Expr::prefix(es_runtime::UpdateOp::Increment, Expr::ident("counter"))));
    assert_eq!(result.unwrap(), "42");
    let missing = rt.run(&expr(Expr::ident("nothingHere")));
    assert!(matches!(missing, Err(JSError::ReferenceError { .. })), "got {:?}", missing);
}
