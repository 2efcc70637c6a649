use crate::core::{
    BinaryOp, CodeKind, EvalError, ExecutionContext, Expr, ForInTarget, ForInit, JSObjectDataPtr, LogicalOp, MutationContext, PreferredType, Program,
    PropertyDefinition, PropertyDescriptor, Realm, Reference, ReferenceBase, Statement, StatementKind, UnaryOp, UpdateOp, Value,
    abstract_equals, abstract_relational_comparison, check_object_coercible, create_immutable_binding, create_mutable_binding,
    declaration_binding_instantiation, delete_reference, get_identifier_reference, get_own_property, get_property, get_value, implicit_this_value,
    initialize_immutable_binding, new_declarative_environment, new_object_environment, object_define_own_property, object_has_property,
    object_put, own_property_keys, put_value, set_mutable_binding, strict_equals, to_boolean, to_int32, to_js_string, to_number, to_object,
    to_primitive, to_property_key, to_uint32,
};
use crate::js_array::create_array;
use crate::js_function::{call_function, construct, create_function_object, has_instance};
use crate::{raise_reference_error, raise_syntax_error, raise_type_error};
use std::collections::HashSet;

/// Completion record of a statement.
#[derive(Debug)]
pub enum ControlFlow<'gc> {
    Normal(Option<Value<'gc>>),
    Return(Value<'gc>),
    Break(Option<String>),
    Continue(Option<String>),
}

fn completion_value<'gc>(flow: ControlFlow<'gc>) -> Result<Value<'gc>, EvalError<'gc>> {
    match flow {
        ControlFlow::Normal(value) => Ok(value.unwrap_or(Value::Undefined)),
        ControlFlow::Return(_) => Err(raise_syntax_error!("Illegal return statement").into()),
        ControlFlow::Break(_) | ControlFlow::Continue(_) => Err(raise_syntax_error!("Illegal break or continue statement").into()),
    }
}

/// Evaluates `program` as global code.
pub fn evaluate_program<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, program: &Program) -> Result<Value<'gc>, EvalError<'gc>> {
    let strict = program.strict || realm.config.strict_global;
    let ctx = ExecutionContext {
        lexical_environment: realm.global_env,
        variable_environment: realm.global_env,
        this_binding: Value::Object(realm.global_object),
        strict,
        function_name: None,
    };
    let _guard = realm.enter_context(mc, ctx)?;
    declaration_binding_instantiation(mc, realm, CodeKind::Global, &program.body, None)?;
    completion_value(evaluate_statements(mc, realm, &program.body)?)
}

/// Evaluates `program` as eval code. A direct eval runs in the caller's
/// environments and `this`; an indirect one (or one without a running
/// context) runs as if in global code. Strict eval code gets its own
/// variable environment so its declarations do not leak.
pub fn evaluate_eval_code<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    program: &Program,
    direct: bool,
) -> Result<Value<'gc>, EvalError<'gc>> {
    let caller = if direct { realm.current_context() } else { None };
    let (mut lexical, mut variable, this_binding, caller_strict) = match caller {
        Some(ctx) => (ctx.lexical_environment, ctx.variable_environment, ctx.this_binding, ctx.strict),
        None => (realm.global_env, realm.global_env, Value::Object(realm.global_object), false),
    };
    let strict = program.strict || caller_strict;
    if strict {
        let env = new_declarative_environment(mc, Some(lexical));
        lexical = env;
        variable = env;
    }
    log::debug!("eval code (direct={}, strict={})", direct, strict);
    let ctx = ExecutionContext {
        lexical_environment: lexical,
        variable_environment: variable,
        this_binding,
        strict,
        function_name: None,
    };
    let _guard = realm.enter_context(mc, ctx)?;
    declaration_binding_instantiation(mc, realm, CodeKind::Eval, &program.body, None)?;
    completion_value(evaluate_statements(mc, realm, &program.body)?)
}

/// Runs a statement list, keeping the value of the last statement that produced one.
pub fn evaluate_statements<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, stmts: &[Statement]) -> Result<ControlFlow<'gc>, EvalError<'gc>> {
    let mut last = None;
    for stmt in stmts {
        match evaluate_statement(mc, realm, stmt)? {
            ControlFlow::Normal(value) => {
                if value.is_some() {
                    last = value;
                }
            }
            abrupt => return Ok(abrupt),
        }
    }
    Ok(ControlFlow::Normal(last))
}

pub fn evaluate_statement<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, stmt: &Statement) -> Result<ControlFlow<'gc>, EvalError<'gc>> {
    evaluate_labelled_statement(mc, realm, stmt, &[])
}

// Decides whether a loop keeps iterating after its body completed with `flow`.
// `None` means continue looping; `Some` is the completion of the whole loop.
fn loop_continues<'gc>(flow: ControlFlow<'gc>, labels: &[String], last: &mut Option<Value<'gc>>) -> Option<ControlFlow<'gc>> {
    match flow {
        ControlFlow::Normal(value) => {
            if value.is_some() {
                *last = value;
            }
            None
        }
        ControlFlow::Continue(None) => None,
        ControlFlow::Continue(Some(label)) if labels.contains(&label) => None,
        ControlFlow::Break(None) => Some(ControlFlow::Normal(last.take())),
        ControlFlow::Break(Some(label)) if labels.contains(&label) => Some(ControlFlow::Normal(last.take())),
        abrupt => Some(abrupt),
    }
}

fn evaluate_labelled_statement<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    stmt: &Statement,
    labels: &[String],
) -> Result<ControlFlow<'gc>, EvalError<'gc>> {
    log::trace!("statement at {}:{}", stmt.line, stmt.column);
    match &stmt.kind {
        StatementKind::Empty | StatementKind::FunctionDeclaration(_) => Ok(ControlFlow::Normal(None)),
        StatementKind::Expr(expr) => Ok(ControlFlow::Normal(Some(evaluate_expr(mc, realm, expr)?))),
        StatementKind::Var(decls) => {
            evaluate_var_declarations(mc, realm, decls)?;
            Ok(ControlFlow::Normal(None))
        }
        StatementKind::Return(expr) => {
            let value = match expr {
                Some(expr) => evaluate_expr(mc, realm, expr)?,
                None => Value::Undefined,
            };
            Ok(ControlFlow::Return(value))
        }
        StatementKind::If(condition, then_body, else_body) => {
            if to_boolean(&evaluate_expr(mc, realm, condition)?) {
                evaluate_statements(mc, realm, then_body)
            } else if let Some(else_body) = else_body {
                evaluate_statements(mc, realm, else_body)
            } else {
                Ok(ControlFlow::Normal(None))
            }
        }
        StatementKind::Block(body) => evaluate_statements(mc, realm, body),
        StatementKind::While(condition, body) => {
            let mut last = None;
            while to_boolean(&evaluate_expr(mc, realm, condition)?) {
                let flow = evaluate_statements(mc, realm, body)?;
                if let Some(done) = loop_continues(flow, labels, &mut last) {
                    return Ok(done);
                }
            }
            Ok(ControlFlow::Normal(last))
        }
        StatementKind::DoWhile(body, condition) => {
            let mut last = None;
            loop {
                let flow = evaluate_statements(mc, realm, body)?;
                if let Some(done) = loop_continues(flow, labels, &mut last) {
                    return Ok(done);
                }
                if !to_boolean(&evaluate_expr(mc, realm, condition)?) {
                    break;
                }
            }
            Ok(ControlFlow::Normal(last))
        }
        StatementKind::For(init, condition, update, body) => {
            match init {
                Some(ForInit::Var(decls)) => evaluate_var_declarations(mc, realm, decls)?,
                Some(ForInit::Expr(expr)) => {
                    evaluate_expr(mc, realm, expr)?;
                }
                None => {}
            }
            let mut last = None;
            loop {
                if let Some(condition) = condition
                    && !to_boolean(&evaluate_expr(mc, realm, condition)?)
                {
                    break;
                }
                let flow = evaluate_statements(mc, realm, body)?;
                if let Some(done) = loop_continues(flow, labels, &mut last) {
                    return Ok(done);
                }
                if let Some(update) = update {
                    evaluate_expr(mc, realm, update)?;
                }
            }
            Ok(ControlFlow::Normal(last))
        }
        StatementKind::ForIn(target, object, body) => evaluate_for_in(mc, realm, target, object, body, labels),
        StatementKind::Break(label) => Ok(ControlFlow::Break(label.clone())),
        StatementKind::Continue(label) => Ok(ControlFlow::Continue(label.clone())),
        StatementKind::Label(name, inner) => {
            let mut nested = labels.to_vec();
            nested.push(name.clone());
            match evaluate_labelled_statement(mc, realm, inner, &nested)? {
                ControlFlow::Break(Some(label)) if &label == name => Ok(ControlFlow::Normal(None)),
                flow => Ok(flow),
            }
        }
        StatementKind::Throw(expr) => {
            let value = evaluate_expr(mc, realm, expr)?;
            Err(EvalError::Throw(value))
        }
        StatementKind::Try(body, catch, finally) => {
            let mut result = evaluate_statements(mc, realm, body);
            if let Err(err) = &result
                && err.is_early_error()
            {
                return result;
            }
            if let Some(catch) = catch
                && let Err(err) = result
            {
                if realm.is_strict() && (catch.param == "eval" || catch.param == "arguments") {
                    return Err(raise_syntax_error!(format!("Unexpected eval or arguments in strict mode: '{}'", catch.param)).into());
                }
                log::debug!("caught: {}", err.message());
                let thrown = err.into_thrown(mc, realm);
                let catch_env = new_declarative_environment(mc, Some(realm.lexical_environment()));
                create_mutable_binding(mc, realm, &catch_env, &catch.param, false)?;
                set_mutable_binding(mc, realm, &catch_env, &catch.param, thrown, false)?;
                let _scope = realm.enter_lexical_scope(mc, catch_env)?;
                result = evaluate_statements(mc, realm, &catch.body);
            }
            match finally {
                Some(finally) => match evaluate_statements(mc, realm, finally)? {
                    ControlFlow::Normal(_) => result,
                    abrupt => Ok(abrupt),
                },
                None => result,
            }
        }
        StatementKind::With(object, body) => {
            if realm.is_strict() {
                return Err(raise_syntax_error!("Strict mode code may not include a with statement").into());
            }
            let value = evaluate_expr(mc, realm, object)?;
            let obj = to_object(mc, realm, &value)?;
            let env = new_object_environment(mc, obj, true, Some(realm.lexical_environment()));
            let _scope = realm.enter_lexical_scope(mc, env)?;
            evaluate_statements(mc, realm, body)
        }
        StatementKind::Yield(_) => Err(raise_syntax_error!("yield is only supported as a top-level statement of a generator body").into()),
    }
}

fn evaluate_var_declarations<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, decls: &[(String, Option<Expr>)]) -> Result<(), EvalError<'gc>> {
    for (name, init) in decls {
        let reference = identifier_reference(realm, name);
        reference.check_strict_target()?;
        if let Some(init) = init {
            let value = evaluate_expr(mc, realm, init)?;
            put_value(mc, realm, &reference, value)?;
        }
    }
    Ok(())
}

// Names visited by for-in: own then inherited enumerable keys, each once.
// A shadowing property hides inherited ones even when it is not enumerable.
fn enumerable_keys<'gc>(obj: &JSObjectDataPtr<'gc>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    let mut current = Some(*obj);
    while let Some(o) = current {
        for key in own_property_keys(&o) {
            if !seen.insert(key.clone()) {
                continue;
            }
            if get_own_property(&o, &key).is_some_and(|d| d.enumerable()) {
                keys.push(key);
            }
        }
        current = o.borrow().prototype;
    }
    keys
}

fn evaluate_for_in<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    target: &ForInTarget,
    object: &Expr,
    body: &[Statement],
    labels: &[String],
) -> Result<ControlFlow<'gc>, EvalError<'gc>> {
    let value = evaluate_expr(mc, realm, object)?;
    if value.is_null_or_undefined() {
        return Ok(ControlFlow::Normal(None));
    }
    let obj = to_object(mc, realm, &value)?;
    let mut last = None;
    for key in enumerable_keys(&obj) {
        // properties deleted before they are reached are skipped
        if !get_property(&obj, &key).is_some_and(|d| d.enumerable()) {
            continue;
        }
        let reference = match target {
            ForInTarget::Var(name) => identifier_reference(realm, name),
            ForInTarget::Expr(expr) => evaluate_reference(mc, realm, expr)?,
        };
        put_value(mc, realm, &reference, Value::from(key.as_str()))?;
        let flow = evaluate_statements(mc, realm, body)?;
        if let Some(done) = loop_continues(flow, labels, &mut last) {
            return Ok(done);
        }
    }
    Ok(ControlFlow::Normal(last))
}

fn identifier_reference<'gc>(realm: Realm<'gc>, name: &str) -> Reference<'gc> {
    get_identifier_reference(Some(realm.lexical_environment()), name, realm.is_strict())
}

/// Evaluates a left-hand-side expression to a [`Reference`].
pub fn evaluate_reference<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, expr: &Expr) -> Result<Reference<'gc>, EvalError<'gc>> {
    match expr {
        Expr::Var(name) => Ok(identifier_reference(realm, name)),
        Expr::Property(base, name) => {
            let base = evaluate_expr(mc, realm, base)?;
            check_object_coercible(&base)?;
            Ok(Reference::property(base, name.clone(), realm.is_strict()))
        }
        Expr::Index(base, key) => {
            let base = evaluate_expr(mc, realm, base)?;
            let key = evaluate_expr(mc, realm, key)?;
            check_object_coercible(&base)?;
            let name = to_property_key(mc, realm, &key)?;
            Ok(Reference::property(base, name, realm.is_strict()))
        }
        _ => Err(raise_reference_error!("Invalid left-hand side in assignment").into()),
    }
}

fn is_reference_expr(expr: &Expr) -> bool {
    matches!(expr, Expr::Var(_) | Expr::Property(..) | Expr::Index(..))
}

fn describe_callee(expr: &Expr) -> String {
    match expr {
        Expr::Var(name) => name.clone(),
        Expr::Property(base, name) => format!("{}.{}", describe_callee(base), name),
        Expr::This => "this".to_string(),
        _ => "expression".to_string(),
    }
}

fn evaluate_arguments<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, args: &[Expr]) -> Result<Vec<Value<'gc>>, EvalError<'gc>> {
    args.iter().map(|arg| evaluate_expr(mc, realm, arg)).collect()
}

pub fn evaluate_expr<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, expr: &Expr) -> Result<Value<'gc>, EvalError<'gc>> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::StringLit(s) => Ok(Value::String(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::This => Ok(realm.this_binding()),
        Expr::Var(_) | Expr::Property(..) | Expr::Index(..) => {
            let reference = evaluate_reference(mc, realm, expr)?;
            get_value(mc, realm, &reference)
        }
        Expr::Call(callee, args) => {
            let (func, this) = if is_reference_expr(callee) {
                let reference = evaluate_reference(mc, realm, callee)?;
                let func = get_value(mc, realm, &reference)?;
                let this = match &reference.base {
                    ReferenceBase::Value(base) => base.clone(),
                    ReferenceBase::Environment(env) => implicit_this_value(env),
                    ReferenceBase::Unresolvable => Value::Undefined,
                };
                (func, this)
            } else {
                (evaluate_expr(mc, realm, callee)?, Value::Undefined)
            };
            let args = evaluate_arguments(mc, realm, args)?;
            if !func.is_callable() {
                return Err(raise_type_error!(format!("{} is not a function", describe_callee(callee))).into());
            }
            call_function(mc, realm, &func, this, &args)
        }
        Expr::New(callee, args) => {
            let ctor = evaluate_expr(mc, realm, callee)?;
            let args = evaluate_arguments(mc, realm, args)?;
            if !ctor.as_object().is_some_and(|obj| obj.borrow().is_constructor()) {
                return Err(raise_type_error!(format!("{} is not a constructor", describe_callee(callee))).into());
            }
            construct(mc, realm, &ctor, &args)
        }
        Expr::Function(code) => {
            let scope = realm.lexical_environment();
            let strict = realm.is_strict();
            match code.name.as_deref() {
                // the name of a function expression is bound only inside it
                Some(name) => {
                    let func_env = new_declarative_environment(mc, Some(scope));
                    create_immutable_binding(mc, &func_env, name)?;
                    let closure = create_function_object(mc, realm, code, func_env, strict);
                    initialize_immutable_binding(mc, &func_env, name, Value::Object(closure))?;
                    Ok(Value::Object(closure))
                }
                None => Ok(Value::Object(create_function_object(mc, realm, code, scope, strict))),
            }
        }
        Expr::Object(properties) => evaluate_object_literal(mc, realm, properties),
        Expr::Array(elements) => {
            let array = create_array(mc, realm, &[]);
            for (index, element) in elements.iter().enumerate() {
                if let Some(element) = element {
                    let value = evaluate_expr(mc, realm, element)?;
                    let desc = PropertyDescriptor::new_data(&value, true, true, true);
                    object_define_own_property(mc, realm, &array, &index.to_string(), desc, false)?;
                }
            }
            object_put(mc, realm, &array, "length", Value::Number(elements.len() as f64), false)?;
            Ok(Value::Object(array))
        }
        Expr::Unary(op, operand) => evaluate_unary(mc, realm, *op, operand),
        Expr::Update(op, prefix, target) => {
            let reference = evaluate_reference(mc, realm, target)?;
            reference.check_strict_target()?;
            let old = to_number(mc, realm, &get_value(mc, realm, &reference)?)?;
            let new = match op {
                UpdateOp::Increment => old + 1.0,
                UpdateOp::Decrement => old - 1.0,
            };
            put_value(mc, realm, &reference, Value::Number(new))?;
            Ok(Value::Number(if *prefix { new } else { old }))
        }
        Expr::Binary(left, op, right) => {
            let lval = evaluate_expr(mc, realm, left)?;
            let rval = evaluate_expr(mc, realm, right)?;
            apply_binary_operator(mc, realm, *op, &lval, &rval)
        }
        Expr::Logical(left, op, right) => {
            let lval = evaluate_expr(mc, realm, left)?;
            match (op, to_boolean(&lval)) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(lval),
                _ => evaluate_expr(mc, realm, right),
            }
        }
        Expr::Conditional(test, consequent, alternate) => {
            if to_boolean(&evaluate_expr(mc, realm, test)?) {
                evaluate_expr(mc, realm, consequent)
            } else {
                evaluate_expr(mc, realm, alternate)
            }
        }
        Expr::Assign(target, value) => {
            let reference = evaluate_reference(mc, realm, target)?;
            reference.check_strict_target()?;
            let value = evaluate_expr(mc, realm, value)?;
            put_value(mc, realm, &reference, value.clone())?;
            Ok(value)
        }
        Expr::CompoundAssign(target, op, value) => {
            let reference = evaluate_reference(mc, realm, target)?;
            reference.check_strict_target()?;
            let lval = get_value(mc, realm, &reference)?;
            let rval = evaluate_expr(mc, realm, value)?;
            let result = apply_binary_operator(mc, realm, *op, &lval, &rval)?;
            put_value(mc, realm, &reference, result.clone())?;
            Ok(result)
        }
        Expr::Comma(left, right) => {
            evaluate_expr(mc, realm, left)?;
            evaluate_expr(mc, realm, right)
        }
    }
}

fn evaluate_object_literal<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    properties: &[PropertyDefinition],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = realm.new_object(mc);
    let scope = realm.lexical_environment();
    let strict = realm.is_strict();
    for property in properties {
        let (key, desc) = match property {
            PropertyDefinition::Value(key, expr) => {
                let value = evaluate_expr(mc, realm, expr)?;
                (key, PropertyDescriptor::new_data(&value, true, true, true))
            }
            PropertyDefinition::Getter(key, code) => {
                let getter = create_function_object(mc, realm, code, scope, strict);
                let desc = PropertyDescriptor {
                    get: Some(Value::Object(getter)),
                    enumerable: Some(true),
                    configurable: Some(true),
                    ..Default::default()
                };
                (key, desc)
            }
            PropertyDefinition::Setter(key, code) => {
                let setter = create_function_object(mc, realm, code, scope, strict);
                let desc = PropertyDescriptor {
                    set: Some(Value::Object(setter)),
                    enumerable: Some(true),
                    configurable: Some(true),
                    ..Default::default()
                };
                (key, desc)
            }
        };
        object_define_own_property(mc, realm, &obj, key, desc, false)?;
    }
    Ok(Value::Object(obj))
}

fn evaluate_unary<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, op: UnaryOp, operand: &Expr) -> Result<Value<'gc>, EvalError<'gc>> {
    match op {
        UnaryOp::Delete => {
            if !is_reference_expr(operand) {
                evaluate_expr(mc, realm, operand)?;
                return Ok(Value::Boolean(true));
            }
            let reference = evaluate_reference(mc, realm, operand)?;
            Ok(Value::Boolean(delete_reference(mc, realm, &reference)?))
        }
        UnaryOp::TypeOf => {
            let value = if is_reference_expr(operand) {
                let reference = evaluate_reference(mc, realm, operand)?;
                if reference.is_unresolvable() {
                    return Ok(Value::from("undefined"));
                }
                get_value(mc, realm, &reference)?
            } else {
                evaluate_expr(mc, realm, operand)?
            };
            Ok(Value::from(value.type_of()))
        }
        UnaryOp::Void => {
            evaluate_expr(mc, realm, operand)?;
            Ok(Value::Undefined)
        }
        UnaryOp::Neg => {
            let value = evaluate_expr(mc, realm, operand)?;
            Ok(Value::Number(-to_number(mc, realm, &value)?))
        }
        UnaryOp::Plus => {
            let value = evaluate_expr(mc, realm, operand)?;
            Ok(Value::Number(to_number(mc, realm, &value)?))
        }
        UnaryOp::Not => {
            let value = evaluate_expr(mc, realm, operand)?;
            Ok(Value::Boolean(!to_boolean(&value)))
        }
        UnaryOp::BitNot => {
            let value = evaluate_expr(mc, realm, operand)?;
            Ok(Value::Number(!to_int32(mc, realm, &value)? as f64))
        }
    }
}

/// Applies a binary operator to two already evaluated operands.
pub fn apply_binary_operator<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    op: BinaryOp,
    lval: &Value<'gc>,
    rval: &Value<'gc>,
) -> Result<Value<'gc>, EvalError<'gc>> {
    let numeric = |f: fn(f64, f64) -> f64| -> Result<Value<'gc>, EvalError<'gc>> {
        let l = to_number(mc, realm, lval)?;
        let r = to_number(mc, realm, rval)?;
        Ok(Value::Number(f(l, r)))
    };
    let bitwise = |f: fn(i32, i32) -> i32| -> Result<Value<'gc>, EvalError<'gc>> {
        let l = to_int32(mc, realm, lval)?;
        let r = to_int32(mc, realm, rval)?;
        Ok(Value::Number(f(l, r) as f64))
    };
    match op {
        BinaryOp::Add => {
            let lprim = to_primitive(mc, realm, lval, PreferredType::Default)?;
            let rprim = to_primitive(mc, realm, rval, PreferredType::Default)?;
            if matches!(lprim, Value::String(_)) || matches!(rprim, Value::String(_)) {
                let mut text = to_js_string(mc, realm, &lprim)?;
                text.extend(to_js_string(mc, realm, &rprim)?);
                return Ok(Value::String(text));
            }
            Ok(Value::Number(to_number(mc, realm, &lprim)? + to_number(mc, realm, &rprim)?))
        }
        BinaryOp::Sub => numeric(|a, b| a - b),
        BinaryOp::Mul => numeric(|a, b| a * b),
        BinaryOp::Div => numeric(|a, b| a / b),
        // f64 `%` truncates like the language remainder; the sign follows the dividend
        BinaryOp::Mod => numeric(|a, b| a % b),
        BinaryOp::LeftShift => {
            let l = to_int32(mc, realm, lval)?;
            let r = to_uint32(mc, realm, rval)?;
            Ok(Value::Number(l.wrapping_shl(r & 0x1f) as f64))
        }
        BinaryOp::RightShift => {
            let l = to_int32(mc, realm, lval)?;
            let r = to_uint32(mc, realm, rval)?;
            Ok(Value::Number((l >> (r & 0x1f)) as f64))
        }
        BinaryOp::UnsignedRightShift => {
            let l = to_uint32(mc, realm, lval)?;
            let r = to_uint32(mc, realm, rval)?;
            Ok(Value::Number((l >> (r & 0x1f)) as f64))
        }
        BinaryOp::BitAnd => bitwise(|a, b| a & b),
        BinaryOp::BitOr => bitwise(|a, b| a | b),
        BinaryOp::BitXor => bitwise(|a, b| a ^ b),
        BinaryOp::Equal => Ok(Value::Boolean(abstract_equals(mc, realm, lval, rval)?)),
        BinaryOp::NotEqual => Ok(Value::Boolean(!abstract_equals(mc, realm, lval, rval)?)),
        BinaryOp::StrictEqual => Ok(Value::Boolean(strict_equals(lval, rval))),
        BinaryOp::StrictNotEqual => Ok(Value::Boolean(!strict_equals(lval, rval))),
        BinaryOp::LessThan => {
            let r = abstract_relational_comparison(mc, realm, lval, rval, true)?;
            Ok(Value::Boolean(r == Some(true)))
        }
        BinaryOp::GreaterThan => {
            let r = abstract_relational_comparison(mc, realm, rval, lval, false)?;
            Ok(Value::Boolean(r == Some(true)))
        }
        BinaryOp::LessEqual => {
            let r = abstract_relational_comparison(mc, realm, rval, lval, false)?;
            Ok(Value::Boolean(r == Some(false)))
        }
        BinaryOp::GreaterEqual => {
            let r = abstract_relational_comparison(mc, realm, lval, rval, true)?;
            Ok(Value::Boolean(r == Some(false)))
        }
        BinaryOp::InstanceOf => {
            let Some(func) = rval.as_object().filter(|obj| obj.borrow().is_callable()) else {
                return Err(raise_type_error!("Right-hand side of 'instanceof' is not callable").into());
            };
            Ok(Value::Boolean(has_instance(mc, realm, &func, lval)?))
        }
        BinaryOp::In => {
            let Value::Object(obj) = rval else {
                return Err(raise_type_error!("Cannot use 'in' operator to search for a key in a non-object").into());
            };
            let key = to_property_key(mc, realm, lval)?;
            Ok(Value::Boolean(object_has_property(obj, &key)))
        }
    }
}
