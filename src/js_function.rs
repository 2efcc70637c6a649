use crate::core::{
    CodeKind, Collect, ControlFlow, EnvPtr, EvalError, ExecutionContext, FunctionArguments, FunctionCode, Gc, GcTrace, Intrinsics, JSObjectDataPtr,
    MutationContext, ObjectKind, PropertyDescriptor, Realm, Value, argument, declaration_binding_instantiation, define_builtin_property,
    define_frozen_property, evaluate_statements, new_declarative_environment, new_object_with_prototype, object_get, to_object, to_uint32,
    value_to_string,
};
use crate::js_generator::create_generator;
use crate::{raise_range_error, raise_syntax_error, raise_type_error};
use std::rc::Rc;

/// Signature of functions implemented in Rust. Receives the function object
/// being invoked, the `this` value and the argument list.
pub type NativeFn = for<'gc> fn(&MutationContext<'gc>, Realm<'gc>, JSObjectDataPtr<'gc>, &Value<'gc>, &[Value<'gc>]) -> Result<Value<'gc>, EvalError<'gc>>;

#[derive(Clone, Copy, Collect)]
#[collect(require_static)]
pub struct NativeFunction {
    pub name: &'static str,
    pub call: NativeFn,
    pub constructor: bool,
}

/// A function created from code: the compiled body plus the environment it closes over.
#[derive(Clone)]
pub struct ScriptFunction<'gc> {
    pub code: Rc<FunctionCode>,
    pub scope: EnvPtr<'gc>,
    pub strict: bool,
}

unsafe impl<'gc> Collect<'gc> for ScriptFunction<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        self.scope.trace(cc);
    }
}

#[derive(Clone, Collect)]
#[collect(no_drop)]
pub enum FunctionData<'gc> {
    Script(ScriptFunction<'gc>),
    Native(NativeFunction),
}

fn function_data<'gc>(value: &Value<'gc>) -> Option<(JSObjectDataPtr<'gc>, FunctionData<'gc>)> {
    let Value::Object(obj) = value else {
        return None;
    };
    match &obj.borrow().kind {
        ObjectKind::Function(data) => Some((*obj, data.clone())),
        _ => None,
    }
}

/// [[Call]]
pub fn call_function<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    func: &Value<'gc>,
    this: Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let Some((callee, data)) = function_data(func) else {
        return Err(raise_type_error!(format!("{} is not a function", value_to_string(func))).into());
    };
    match data {
        FunctionData::Native(native) => {
            log::trace!("call native '{}' with {} args", native.name, args.len());
            (native.call)(mc, realm, callee, &this, args)
        }
        FunctionData::Script(script) => call_script_function(mc, realm, callee, &script, this, args),
    }
}

/// The execution context a call of `func` runs in: a fresh declarative
/// environment over the closure scope and the coerced `this` value.
pub(crate) fn function_call_context<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    func: &ScriptFunction<'gc>,
    this: Value<'gc>,
) -> Result<ExecutionContext<'gc>, EvalError<'gc>> {
    let this_binding = if func.strict {
        this
    } else if this.is_null_or_undefined() {
        Value::Object(realm.global_object)
    } else if this.is_primitive() {
        Value::Object(to_object(mc, realm, &this)?)
    } else {
        this
    };
    let env = new_declarative_environment(mc, Some(func.scope));
    Ok(ExecutionContext {
        lexical_environment: env,
        variable_environment: env,
        this_binding,
        strict: func.strict,
        function_name: func.code.name.clone(),
    })
}

pub fn call_script_function<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    callee: JSObjectDataPtr<'gc>,
    func: &ScriptFunction<'gc>,
    this: Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let ctx = function_call_context(mc, realm, func, this)?;
    if func.code.generator {
        return create_generator(mc, realm, callee, func, ctx, args).map(Value::Object);
    }
    let _guard = realm.enter_context(mc, ctx)?;
    let arguments = FunctionArguments {
        callee,
        params: &func.code.params,
        args,
    };
    declaration_binding_instantiation(mc, realm, CodeKind::Function, &func.code.body, Some(arguments))?;
    match evaluate_statements(mc, realm, &func.code.body)? {
        ControlFlow::Normal(_) => Ok(Value::Undefined),
        ControlFlow::Return(value) => Ok(value),
        ControlFlow::Break(_) | ControlFlow::Continue(_) => Err(raise_syntax_error!("Illegal break or continue statement").into()),
    }
}

/// [[Construct]]
pub fn construct<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, ctor: &Value<'gc>, args: &[Value<'gc>]) -> Result<Value<'gc>, EvalError<'gc>> {
    let Some((callee, data)) = function_data(ctor).filter(|(obj, _)| obj.borrow().is_constructor()) else {
        return Err(raise_type_error!(format!("{} is not a constructor", value_to_string(ctor))).into());
    };
    match data {
        // built-in constructors allocate their own result
        FunctionData::Native(native) => (native.call)(mc, realm, callee, &Value::Undefined, args),
        FunctionData::Script(script) => {
            let proto = match object_get(mc, realm, &callee, "prototype")? {
                Value::Object(proto) => proto,
                _ => realm.intrinsics.object_prototype,
            };
            let obj = new_object_with_prototype(mc, Some(proto), "Object", ObjectKind::Ordinary);
            let result = call_script_function(mc, realm, callee, &script, Value::Object(obj), args)?;
            if let Value::Object(_) = result {
                Ok(result)
            } else {
                Ok(Value::Object(obj))
            }
        }
    }
}

/// [[HasInstance]], the right-hand side of `instanceof`.
pub fn has_instance<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, func: &JSObjectDataPtr<'gc>, value: &Value<'gc>) -> Result<bool, EvalError<'gc>> {
    let Value::Object(obj) = value else {
        return Ok(false);
    };
    let Value::Object(proto) = object_get(mc, realm, func, "prototype")? else {
        return Err(raise_type_error!("Function has non-object prototype in instanceof check").into());
    };
    let mut current = obj.borrow().prototype;
    while let Some(p) = current {
        if Gc::ptr_eq(p, proto) {
            return Ok(true);
        }
        current = p.borrow().prototype;
    }
    Ok(false)
}

/// Creates a function object from `code` closing over `scope`.
pub fn create_function_object<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    code: &Rc<FunctionCode>,
    scope: EnvPtr<'gc>,
    strict: bool,
) -> JSObjectDataPtr<'gc> {
    let strict = strict || code.strict;
    let intrinsics = &realm.intrinsics;
    let script = ScriptFunction {
        code: code.clone(),
        scope,
        strict,
    };
    let func = new_object_with_prototype(
        mc,
        Some(intrinsics.function_prototype),
        "Function",
        ObjectKind::Function(FunctionData::Script(script)),
    );
    define_frozen_property(mc, &func, "length", &Value::Number(code.params.len() as f64));

    let proto_parent = if code.generator {
        intrinsics.generator_prototype
    } else {
        intrinsics.object_prototype
    };
    let proto = new_object_with_prototype(mc, Some(proto_parent), "Object", ObjectKind::Ordinary);
    if !code.generator {
        define_builtin_property(mc, &proto, "constructor", &Value::Object(func));
    }
    func.borrow_mut(mc)
        .insert("prototype", PropertyDescriptor::new_data(&Value::Object(proto), true, false, false));

    if strict {
        let thrower = Some(Value::Object(intrinsics.throw_type_error));
        let mut data = func.borrow_mut(mc);
        data.insert("caller", PropertyDescriptor::new_accessor(thrower.clone(), thrower.clone(), false, false));
        data.insert("arguments", PropertyDescriptor::new_accessor(thrower.clone(), thrower, false, false));
    }
    log::trace!("created function {:?} (strict={})", code.name, strict);
    func
}

fn native_function_object<'gc>(
    mc: &MutationContext<'gc>,
    function_prototype: JSObjectDataPtr<'gc>,
    name: &'static str,
    length: usize,
    call: NativeFn,
    constructor: bool,
) -> JSObjectDataPtr<'gc> {
    let native = NativeFunction { name, call, constructor };
    let func = new_object_with_prototype(mc, Some(function_prototype), "Function", ObjectKind::Function(FunctionData::Native(native)));
    define_frozen_property(mc, &func, "length", &Value::Number(length as f64));
    func
}

pub fn create_native_function<'gc>(
    mc: &MutationContext<'gc>,
    function_prototype: JSObjectDataPtr<'gc>,
    name: &'static str,
    length: usize,
    call: NativeFn,
) -> JSObjectDataPtr<'gc> {
    native_function_object(mc, function_prototype, name, length, call, false)
}

/// Like [`create_native_function`] but also usable with `new`.
pub fn create_native_constructor<'gc>(
    mc: &MutationContext<'gc>,
    function_prototype: JSObjectDataPtr<'gc>,
    name: &'static str,
    length: usize,
    call: NativeFn,
) -> JSObjectDataPtr<'gc> {
    native_function_object(mc, function_prototype, name, length, call, true)
}

/// Behavior of Function.prototype itself: accepts anything, returns undefined.
pub fn function_prototype_call<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Ok(Value::Undefined)
}

fn throw_type_error_function<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Err(raise_type_error!("'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions or the arguments objects for calls to them").into())
}

/// The shared %ThrowTypeError% accessor.
pub fn create_throw_type_error<'gc>(mc: &MutationContext<'gc>, function_prototype: JSObjectDataPtr<'gc>) -> JSObjectDataPtr<'gc> {
    let thrower = create_native_function(mc, function_prototype, "ThrowTypeError", 0, throw_type_error_function);
    thrower.borrow_mut(mc).prevent_extensions();
    thrower
}

fn function_prototype_call_method<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let rest = args.get(1..).unwrap_or(&[]);
    call_function(mc, realm, this, argument(args, 0), rest)
}

/// Upper bound on the array-like length `apply` spreads into an argument list.
const MAX_APPLY_ARGUMENTS: u32 = u16::MAX as u32;

fn function_prototype_apply<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    if !this.is_callable() {
        return Err(raise_type_error!("Function.prototype.apply was called on a non-function").into());
    }
    let list = match argument(args, 1) {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(array_like) => {
            let len = to_uint32(mc, realm, &object_get(mc, realm, &array_like, "length")?)?;
            if len > MAX_APPLY_ARGUMENTS {
                return Err(raise_range_error!("Too many arguments in function call").into());
            }
            let mut list = Vec::new();
            for index in 0..len {
                list.push(object_get(mc, realm, &array_like, &index.to_string())?);
            }
            list
        }
        _ => return Err(raise_type_error!("CreateListFromArrayLike called on non-object").into()),
    };
    call_function(mc, realm, this, argument(args, 0), &list)
}

fn function_prototype_to_string<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let Some((_, data)) = function_data(this) else {
        return Err(raise_type_error!("Function.prototype.toString requires that 'this' be a Function").into());
    };
    let text = match data {
        FunctionData::Native(native) => format!("function {}() {{ [native code] }}", native.name),
        FunctionData::Script(script) => format!(
            "function {}({}) {{ [code] }}",
            script.code.name.as_deref().unwrap_or(""),
            script.code.params.join(", ")
        ),
    };
    Ok(Value::from(text))
}

pub fn initialize_function<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>) {
    let proto = intrinsics.function_prototype;
    let methods: [(&'static str, usize, NativeFn); 3] = [
        ("call", 1, function_prototype_call_method),
        ("apply", 2, function_prototype_apply),
        ("toString", 0, function_prototype_to_string),
    ];
    for (name, length, call) in methods {
        let method = create_native_function(mc, proto, name, length, call);
        define_builtin_property(mc, &proto, name, &Value::Object(method));
    }
}
