use crate::core::{
    EvalError, JSObjectDataPtr, MutationContext, PropertyDescriptor, Realm, Statement, Value, create_arguments_object, create_immutable_binding,
    create_mutable_binding, function_declarations, get_property, has_binding, initialize_immutable_binding, object_define_own_property,
    set_mutable_binding, var_declared_names,
};
use crate::js_function::create_function_object;
use crate::raise_type_error;

/// Classification of the code whose declarations are being bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeKind {
    Global,
    Eval,
    Function,
}

impl CodeKind {
    /// Only eval code produces deletable bindings.
    fn configurable_bindings(self) -> bool {
        self == CodeKind::Eval
    }
}

/// What a function call contributes to binding instantiation.
pub struct FunctionArguments<'a, 'gc> {
    pub callee: JSObjectDataPtr<'gc>,
    pub params: &'a [String],
    pub args: &'a [Value<'gc>],
}

/// Declaration Binding Instantiation for the running execution context:
/// formal parameters, then function declarations, then `arguments`, then
/// `var` names. Existing bindings are never overwritten by the var pass.
pub fn declaration_binding_instantiation<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    kind: CodeKind,
    body: &[Statement],
    function: Option<FunctionArguments<'_, 'gc>>,
) -> Result<(), EvalError<'gc>> {
    let ctx = realm.running_context()?;
    let env = ctx.variable_environment;
    let strict = ctx.strict;
    log::debug!("binding instantiation for {:?} code (strict={})", kind, strict);

    if let Some(function) = &function {
        for (index, name) in function.params.iter().enumerate() {
            let value = function.args.get(index).cloned().unwrap_or(Value::Undefined);
            if !has_binding(&env, name) {
                create_mutable_binding(mc, realm, &env, name, false)?;
            }
            // a repeated parameter name takes the last value
            set_mutable_binding(mc, realm, &env, name, value, strict)?;
        }
    }

    bind_function_declarations(mc, realm, kind, body)?;

    if let Some(function) = &function
        && !has_binding(&env, "arguments")
    {
        let arguments = create_arguments_object(mc, realm, function.callee, function.params, function.args, env, strict);
        if strict {
            create_immutable_binding(mc, &env, "arguments")?;
            initialize_immutable_binding(mc, &env, "arguments", Value::Object(arguments))?;
        } else {
            create_mutable_binding(mc, realm, &env, "arguments", false)?;
            set_mutable_binding(mc, realm, &env, "arguments", Value::Object(arguments), false)?;
        }
    }

    bind_variable_declarations(mc, realm, kind, body)
}

/// Hoists the function declarations of `body` into the running variable
/// environment. A later declaration of the same name replaces an earlier one.
pub fn bind_function_declarations<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, kind: CodeKind, body: &[Statement]) -> Result<(), EvalError<'gc>> {
    let ctx = realm.running_context()?;
    let env = ctx.variable_environment;
    let configurable = kind.configurable_bindings();
    for code in function_declarations(body) {
        let Some(name) = code.name.as_deref() else {
            continue;
        };
        let function = create_function_object(mc, realm, &code, env, ctx.strict);
        if !has_binding(&env, name) {
            create_mutable_binding(mc, realm, &env, name, configurable)?;
        } else if kind == CodeKind::Global && realm.is_global_environment(&env) {
            let existing = get_property(&realm.global_object, name);
            match existing {
                Some(existing) if !existing.configurable() => {
                    if existing.is_accessor_descriptor() || !(existing.writable() && existing.enumerable()) {
                        return Err(raise_type_error!(format!("Cannot redeclare global property '{}' as a function", name)).into());
                    }
                }
                // configurable: replace with a plain data property
                _ => {
                    let desc = PropertyDescriptor::new_data(&Value::Undefined, true, true, configurable);
                    object_define_own_property(mc, realm, &realm.global_object, name, desc, true)?;
                }
            }
        }
        log::trace!("hoisted function '{}'", name);
        set_mutable_binding(mc, realm, &env, name, Value::Object(function), ctx.strict)?;
    }
    Ok(())
}

/// Creates an `undefined` binding for every `var` name not already bound.
pub fn bind_variable_declarations<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, kind: CodeKind, body: &[Statement]) -> Result<(), EvalError<'gc>> {
    let ctx = realm.running_context()?;
    let env = ctx.variable_environment;
    let configurable = kind.configurable_bindings();
    for name in var_declared_names(body) {
        if !has_binding(&env, &name) {
            create_mutable_binding(mc, realm, &env, &name, configurable)?;
            set_mutable_binding(mc, realm, &env, &name, Value::Undefined, ctx.strict)?;
        }
    }
    Ok(())
}
