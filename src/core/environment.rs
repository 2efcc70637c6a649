use crate::core::{
    Collect, EvalError, GcPtr, GcTrace, JSObjectDataPtr, MutationContext, PropertyDescriptor, Realm, Reference, ReferenceBase, Value,
    new_gc_cell_ptr, object_define_own_property, object_delete, object_get, object_has_property, object_put,
};
use crate::{raise_eval_error, raise_reference_error, raise_type_error};
use indexmap::IndexMap;

pub type EnvPtr<'gc> = GcPtr<'gc, LexicalEnvironment<'gc>>;

/// An environment record paired with the (possibly absent) outer environment.
#[derive(Collect)]
#[collect(no_drop)]
pub struct LexicalEnvironment<'gc> {
    pub record: EnvironmentRecord<'gc>,
    pub outer: Option<EnvPtr<'gc>>,
}

#[derive(Collect)]
#[collect(no_drop)]
pub enum EnvironmentRecord<'gc> {
    Declarative(DeclarativeRecord<'gc>),
    Object(ObjectRecord<'gc>),
}

#[derive(Default)]
pub struct DeclarativeRecord<'gc> {
    pub bindings: IndexMap<String, Binding<'gc>>,
}

unsafe impl<'gc> Collect<'gc> for DeclarativeRecord<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        for binding in self.bindings.values() {
            binding.trace(cc);
        }
    }
}

/// Bindings backed by the properties of an object (global code, `with`).
#[derive(Clone, Copy, Collect)]
#[collect(no_drop)]
pub struct ObjectRecord<'gc> {
    pub object: JSObjectDataPtr<'gc>,
    pub provide_this: bool,
}

#[derive(Clone, Collect)]
#[collect(no_drop)]
pub struct Binding<'gc> {
    pub value: Value<'gc>,
    pub mutable: bool,
    pub deletable: bool,
    pub initialized: bool,
}

// Decides which record variant to act on without holding a borrow across
// calls that may run user code.
enum RecordHandle<'gc> {
    Declarative,
    Object(ObjectRecord<'gc>),
}

fn record_handle<'gc>(env: &EnvPtr<'gc>) -> RecordHandle<'gc> {
    match &env.borrow().record {
        EnvironmentRecord::Declarative(_) => RecordHandle::Declarative,
        EnvironmentRecord::Object(record) => RecordHandle::Object(*record),
    }
}

pub fn new_declarative_environment<'gc>(mc: &MutationContext<'gc>, outer: Option<EnvPtr<'gc>>) -> EnvPtr<'gc> {
    new_gc_cell_ptr(
        mc,
        LexicalEnvironment {
            record: EnvironmentRecord::Declarative(DeclarativeRecord::default()),
            outer,
        },
    )
}

pub fn new_object_environment<'gc>(
    mc: &MutationContext<'gc>,
    object: JSObjectDataPtr<'gc>,
    provide_this: bool,
    outer: Option<EnvPtr<'gc>>,
) -> EnvPtr<'gc> {
    new_gc_cell_ptr(
        mc,
        LexicalEnvironment {
            record: EnvironmentRecord::Object(ObjectRecord { object, provide_this }),
            outer,
        },
    )
}

pub fn has_binding<'gc>(env: &EnvPtr<'gc>, name: &str) -> bool {
    match &env.borrow().record {
        EnvironmentRecord::Declarative(record) => record.bindings.contains_key(name),
        EnvironmentRecord::Object(record) => object_has_property(&record.object, name),
    }
}

pub fn create_mutable_binding<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    env: &EnvPtr<'gc>,
    name: &str,
    deletable: bool,
) -> Result<(), EvalError<'gc>> {
    match record_handle(env) {
        RecordHandle::Declarative => {
            let mut lex = env.borrow_mut(mc);
            let EnvironmentRecord::Declarative(record) = &mut lex.record else {
                return Err(raise_eval_error!("declarative record expected").into());
            };
            if record.bindings.contains_key(name) {
                return Err(raise_eval_error!(format!("binding '{}' already exists", name)).into());
            }
            record.bindings.insert(
                name.to_string(),
                Binding {
                    value: Value::Undefined,
                    mutable: true,
                    deletable,
                    initialized: true,
                },
            );
            Ok(())
        }
        RecordHandle::Object(record) => {
            let desc = PropertyDescriptor::new_data(&Value::Undefined, true, true, deletable);
            object_define_own_property(mc, realm, &record.object, name, desc, true)?;
            Ok(())
        }
    }
}

pub fn set_mutable_binding<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    env: &EnvPtr<'gc>,
    name: &str,
    value: Value<'gc>,
    strict: bool,
) -> Result<(), EvalError<'gc>> {
    match record_handle(env) {
        RecordHandle::Declarative => {
            let mut lex = env.borrow_mut(mc);
            let EnvironmentRecord::Declarative(record) = &mut lex.record else {
                return Err(raise_eval_error!("declarative record expected").into());
            };
            let Some(binding) = record.bindings.get_mut(name) else {
                return Err(raise_eval_error!(format!("binding '{}' does not exist", name)).into());
            };
            if binding.mutable {
                binding.value = value;
            } else if strict {
                return Err(raise_type_error!(format!("Assignment to constant variable '{}'", name)).into());
            } else {
                log::debug!("ignoring write to immutable binding '{}'", name);
            }
            Ok(())
        }
        RecordHandle::Object(record) => object_put(mc, realm, &record.object, name, value, strict),
    }
}

pub fn get_binding_value<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    env: &EnvPtr<'gc>,
    name: &str,
    strict: bool,
) -> Result<Value<'gc>, EvalError<'gc>> {
    match record_handle(env) {
        RecordHandle::Declarative => {
            let lex = env.borrow();
            let EnvironmentRecord::Declarative(record) = &lex.record else {
                return Err(raise_eval_error!("declarative record expected").into());
            };
            let Some(binding) = record.bindings.get(name) else {
                return Err(raise_eval_error!(format!("binding '{}' does not exist", name)).into());
            };
            if binding.initialized {
                Ok(binding.value.clone())
            } else if strict {
                Err(raise_reference_error!(format!("Cannot access '{}' before initialization", name)).into())
            } else {
                Ok(Value::Undefined)
            }
        }
        RecordHandle::Object(record) => {
            if !object_has_property(&record.object, name) {
                if strict {
                    return Err(raise_reference_error!(format!("{} is not defined", name)).into());
                }
                return Ok(Value::Undefined);
            }
            object_get(mc, realm, &record.object, name)
        }
    }
}

pub fn delete_binding<'gc>(mc: &MutationContext<'gc>, env: &EnvPtr<'gc>, name: &str) -> Result<bool, EvalError<'gc>> {
    match record_handle(env) {
        RecordHandle::Declarative => {
            let mut lex = env.borrow_mut(mc);
            let EnvironmentRecord::Declarative(record) = &mut lex.record else {
                return Err(raise_eval_error!("declarative record expected").into());
            };
            let deletable = match record.bindings.get(name) {
                None => return Ok(true),
                Some(binding) => binding.deletable,
            };
            if deletable {
                record.bindings.shift_remove(name);
            }
            Ok(deletable)
        }
        RecordHandle::Object(record) => object_delete(mc, &record.object, name, false),
    }
}

/// Declarative records only: an immutable binding starts out uninitialized.
pub fn create_immutable_binding<'gc>(mc: &MutationContext<'gc>, env: &EnvPtr<'gc>, name: &str) -> Result<(), EvalError<'gc>> {
    let mut lex = env.borrow_mut(mc);
    let EnvironmentRecord::Declarative(record) = &mut lex.record else {
        return Err(raise_eval_error!("immutable bindings need a declarative record").into());
    };
    if record.bindings.contains_key(name) {
        return Err(raise_eval_error!(format!("binding '{}' already exists", name)).into());
    }
    record.bindings.insert(
        name.to_string(),
        Binding {
            value: Value::Undefined,
            mutable: false,
            deletable: false,
            initialized: false,
        },
    );
    Ok(())
}

pub fn initialize_immutable_binding<'gc>(
    mc: &MutationContext<'gc>,
    env: &EnvPtr<'gc>,
    name: &str,
    value: Value<'gc>,
) -> Result<(), EvalError<'gc>> {
    let mut lex = env.borrow_mut(mc);
    let EnvironmentRecord::Declarative(record) = &mut lex.record else {
        return Err(raise_eval_error!("immutable bindings need a declarative record").into());
    };
    match record.bindings.get_mut(name) {
        Some(binding) if !binding.mutable && !binding.initialized => {
            binding.value = value;
            binding.initialized = true;
            Ok(())
        }
        _ => Err(raise_eval_error!(format!("'{}' is not an uninitialized immutable binding", name)).into()),
    }
}

/// `this` supplied to calls through an identifier reference.
pub fn implicit_this_value<'gc>(env: &EnvPtr<'gc>) -> Value<'gc> {
    match &env.borrow().record {
        EnvironmentRecord::Object(record) if record.provide_this => Value::Object(record.object),
        _ => Value::Undefined,
    }
}

/// Direct read of a declarative binding; used by mapped arguments objects.
pub(crate) fn binding_value<'gc>(env: &EnvPtr<'gc>, name: &str) -> Value<'gc> {
    match &env.borrow().record {
        EnvironmentRecord::Declarative(record) => record.bindings.get(name).map(|b| b.value.clone()).unwrap_or(Value::Undefined),
        EnvironmentRecord::Object(record) => crate::core::object_get_key_value(&record.object, name).unwrap_or(Value::Undefined),
    }
}

/// Walks the environment chain for `name`; an unresolvable reference when no record has it.
pub fn get_identifier_reference<'gc>(env: Option<EnvPtr<'gc>>, name: &str, strict: bool) -> Reference<'gc> {
    let mut current = env;
    while let Some(e) = current {
        if has_binding(&e, name) {
            return Reference {
                base: ReferenceBase::Environment(e),
                name: name.to_string(),
                strict,
            };
        }
        current = e.borrow().outer;
    }
    log::trace!("identifier '{}' is unresolvable", name);
    Reference {
        base: ReferenceBase::Unresolvable,
        name: name.to_string(),
        strict,
    }
}
