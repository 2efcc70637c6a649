use crate::core::{
    CodeKind, Collect, ControlFlow, EvalError, ExecutionContext, FunctionArguments, GcPtr, GcTrace, Intrinsics, JSObjectDataPtr, MutationContext,
    ObjectKind, Realm, Statement, StatementKind, Value, argument, declaration_binding_instantiation, define_builtin_property, evaluate_expr,
    evaluate_statement, new_gc_cell_ptr, new_object_with_prototype, object_get, object_set_key_value, to_boolean,
};
use crate::js_function::{NativeFn, ScriptFunction, create_native_function};
use crate::{raise_syntax_error, raise_type_error};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Collect)]
#[collect(require_static)]
pub enum GeneratorStatus {
    SuspendedStart,
    SuspendedYield,
    Running,
    Completed,
}

/// One pending unit of a suspended generator body.
#[derive(Clone, Debug)]
enum GeneratorStep {
    Run(Statement),
    /// Re-tests a flattened `while` loop; also the target of `break`/`continue`.
    LoopBoundary(Statement),
}

/// Suspended generator: the remaining statements plus the context to resume them in.
pub struct GeneratorState<'gc> {
    pub status: GeneratorStatus,
    pub context: ExecutionContext<'gc>,
    steps: VecDeque<GeneratorStep>,
}

unsafe impl<'gc> Collect<'gc> for GeneratorState<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        self.context.trace(cc);
    }
}

/// Runs the prologue of a generator function call and returns the suspended
/// generator object. The body does not start until the first `next()`.
pub fn create_generator<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    callee: JSObjectDataPtr<'gc>,
    func: &ScriptFunction<'gc>,
    context: ExecutionContext<'gc>,
    args: &[Value<'gc>],
) -> Result<JSObjectDataPtr<'gc>, EvalError<'gc>> {
    {
        let _guard = realm.enter_context(mc, context.clone())?;
        let arguments = FunctionArguments {
            callee,
            params: &func.code.params,
            args,
        };
        declaration_binding_instantiation(mc, realm, CodeKind::Function, &func.code.body, Some(arguments))?;
    }
    let proto = match object_get(mc, realm, &callee, "prototype")? {
        Value::Object(proto) => proto,
        _ => realm.intrinsics.generator_prototype,
    };
    let state = GeneratorState {
        status: GeneratorStatus::SuspendedStart,
        context,
        steps: func.code.body.iter().cloned().map(GeneratorStep::Run).collect(),
    };
    log::debug!("generator {:?} created", func.code.name);
    Ok(new_object_with_prototype(
        mc,
        Some(proto),
        "Generator",
        ObjectKind::Generator(new_gc_cell_ptr(mc, state)),
    ))
}

fn create_iterator_result<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, value: Value<'gc>, done: bool) -> Value<'gc> {
    let result = realm.new_object(mc);
    object_set_key_value(mc, &result, "value", &value);
    object_set_key_value(mc, &result, "done", &Value::Boolean(done));
    Value::Object(result)
}

fn generator_state<'gc>(this: &Value<'gc>) -> Result<GcPtr<'gc, GeneratorState<'gc>>, EvalError<'gc>> {
    if let Value::Object(obj) = this
        && let ObjectKind::Generator(state) = &obj.borrow().kind
    {
        return Ok(*state);
    }
    Err(raise_type_error!("next method called on incompatible receiver").into())
}

fn pop_step<'gc>(mc: &MutationContext<'gc>, state: GcPtr<'gc, GeneratorState<'gc>>) -> Option<GeneratorStep> {
    state.borrow_mut(mc).steps.pop_front()
}

fn push_front<'gc>(mc: &MutationContext<'gc>, state: GcPtr<'gc, GeneratorState<'gc>>, steps: Vec<GeneratorStep>) {
    let mut st = state.borrow_mut(mc);
    for step in steps.into_iter().rev() {
        st.steps.push_front(step);
    }
}

/// Discards queued steps up to the innermost flattened loop. `continue` keeps
/// the boundary so the loop test runs next; `break` drops it as well.
fn unwind_to_loop<'gc>(mc: &MutationContext<'gc>, state: GcPtr<'gc, GeneratorState<'gc>>, keep_boundary: bool) -> bool {
    let mut st = state.borrow_mut(mc);
    while let Some(step) = st.steps.pop_front() {
        if let GeneratorStep::LoopBoundary(_) = step {
            if keep_boundary {
                st.steps.push_front(step);
            }
            return true;
        }
    }
    false
}

enum StepOutcome<'gc> {
    Continue,
    Yield(Value<'gc>),
    Return(Value<'gc>),
}

fn run_step<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    state: GcPtr<'gc, GeneratorState<'gc>>,
    step: GeneratorStep,
) -> Result<StepOutcome<'gc>, EvalError<'gc>> {
    let stmt = match step {
        GeneratorStep::Run(stmt) | GeneratorStep::LoopBoundary(stmt) => stmt,
    };
    match &stmt.kind {
        StatementKind::Yield(expr) => {
            let value = match expr {
                Some(expr) => evaluate_expr(mc, realm, expr)?,
                None => Value::Undefined,
            };
            Ok(StepOutcome::Yield(value))
        }
        StatementKind::Block(body) => {
            push_front(mc, state, body.iter().cloned().map(GeneratorStep::Run).collect());
            Ok(StepOutcome::Continue)
        }
        StatementKind::If(condition, then_body, else_body) => {
            let branch = if to_boolean(&evaluate_expr(mc, realm, condition)?) {
                Some(then_body)
            } else {
                else_body.as_ref()
            };
            if let Some(branch) = branch {
                push_front(mc, state, branch.iter().cloned().map(GeneratorStep::Run).collect());
            }
            Ok(StepOutcome::Continue)
        }
        StatementKind::While(condition, body) => {
            if to_boolean(&evaluate_expr(mc, realm, condition)?) {
                let mut steps: Vec<GeneratorStep> = body.iter().cloned().map(GeneratorStep::Run).collect();
                steps.push(GeneratorStep::LoopBoundary(stmt.clone()));
                push_front(mc, state, steps);
            }
            Ok(StepOutcome::Continue)
        }
        _ => match evaluate_statement(mc, realm, &stmt)? {
            ControlFlow::Normal(_) => Ok(StepOutcome::Continue),
            ControlFlow::Return(value) => Ok(StepOutcome::Return(value)),
            ControlFlow::Break(None) => {
                if !unwind_to_loop(mc, state, false) {
                    return Err(raise_syntax_error!("Illegal break statement").into());
                }
                Ok(StepOutcome::Continue)
            }
            ControlFlow::Continue(None) => {
                if !unwind_to_loop(mc, state, true) {
                    return Err(raise_syntax_error!("Illegal continue statement").into());
                }
                Ok(StepOutcome::Continue)
            }
            ControlFlow::Break(Some(label)) | ControlFlow::Continue(Some(label)) => {
                Err(raise_syntax_error!(format!("Undefined label '{}'", label)).into())
            }
        },
    }
}

fn set_status<'gc>(mc: &MutationContext<'gc>, state: GcPtr<'gc, GeneratorState<'gc>>, status: GeneratorStatus) {
    state.borrow_mut(mc).status = status;
}

/// Resumes the generator until its next `yield` or completion.
pub fn generator_resume<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    state: GcPtr<'gc, GeneratorState<'gc>>,
) -> Result<Value<'gc>, EvalError<'gc>> {
    let (status, context) = {
        let st = state.borrow();
        (st.status, st.context.clone())
    };
    match status {
        GeneratorStatus::Running => return Err(raise_type_error!("Generator is already running").into()),
        GeneratorStatus::Completed => return Ok(create_iterator_result(mc, realm, Value::Undefined, true)),
        GeneratorStatus::SuspendedStart | GeneratorStatus::SuspendedYield => {}
    }

    set_status(mc, state, GeneratorStatus::Running);
    match drive(mc, realm, state, context) {
        Ok(StepOutcome::Yield(value)) => {
            set_status(mc, state, GeneratorStatus::SuspendedYield);
            Ok(create_iterator_result(mc, realm, value, false))
        }
        Ok(StepOutcome::Return(value)) => {
            finish(mc, state);
            Ok(create_iterator_result(mc, realm, value, true))
        }
        Ok(StepOutcome::Continue) => {
            finish(mc, state);
            Ok(create_iterator_result(mc, realm, Value::Undefined, true))
        }
        Err(e) => {
            finish(mc, state);
            Err(e)
        }
    }
}

fn drive<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    state: GcPtr<'gc, GeneratorState<'gc>>,
    context: ExecutionContext<'gc>,
) -> Result<StepOutcome<'gc>, EvalError<'gc>> {
    let _guard = realm.enter_context(mc, context)?;
    while let Some(step) = pop_step(mc, state) {
        match run_step(mc, realm, state, step)? {
            StepOutcome::Continue => continue,
            outcome => return Ok(outcome),
        }
    }
    Ok(StepOutcome::Return(Value::Undefined))
}

fn finish<'gc>(mc: &MutationContext<'gc>, state: GcPtr<'gc, GeneratorState<'gc>>) {
    let mut st = state.borrow_mut(mc);
    st.status = GeneratorStatus::Completed;
    st.steps.clear();
}

fn generator_next<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let state = generator_state(this)?;
    generator_resume(mc, realm, state)
}

fn generator_return<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let state = generator_state(this)?;
    if state.borrow().status == GeneratorStatus::Running {
        return Err(raise_type_error!("Generator is already running").into());
    }
    finish(mc, state);
    Ok(create_iterator_result(mc, realm, argument(args, 0), true))
}

fn generator_throw<'gc>(
    mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let state = generator_state(this)?;
    if state.borrow().status == GeneratorStatus::Running {
        return Err(raise_type_error!("Generator is already running").into());
    }
    // a yield step is never inside a try block, so nothing can catch it
    finish(mc, state);
    Err(EvalError::Throw(argument(args, 0)))
}

pub fn initialize_generator<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>) {
    let proto = intrinsics.generator_prototype;
    let methods: [(&'static str, usize, NativeFn); 3] = [
        ("next", 1, generator_next),
        ("return", 1, generator_return),
        ("throw", 1, generator_throw),
    ];
    for (name, length, call) in methods {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &proto, name, &Value::Object(method));
    }
}
