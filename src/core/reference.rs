use crate::core::{
    EnvPtr, EvalError, MutationContext, Realm, Value, delete_binding, get_binding_value, get_own_property, get_property, object_can_put,
    object_delete, object_get_with_receiver, object_put, set_mutable_binding, to_object,
};
use crate::js_function::call_function;
use crate::{raise_reference_error, raise_syntax_error, raise_type_error};

#[derive(Clone)]
pub enum ReferenceBase<'gc> {
    Unresolvable,
    Environment(EnvPtr<'gc>),
    Value(Value<'gc>),
}

impl<'gc> std::fmt::Debug for ReferenceBase<'gc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceBase::Unresolvable => write!(f, "Unresolvable"),
            ReferenceBase::Environment(_) => write!(f, "Environment"),
            ReferenceBase::Value(v) => write!(f, "Value({:?})", v),
        }
    }
}

/// A resolved name binding: the base it lives on, the referenced name and the strict flag.
#[derive(Clone, Debug)]
pub struct Reference<'gc> {
    pub base: ReferenceBase<'gc>,
    pub name: String,
    pub strict: bool,
}

impl<'gc> Reference<'gc> {
    pub fn property(base: Value<'gc>, name: impl Into<String>, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Value(base),
            name: name.into(),
            strict,
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn is_property_reference(&self) -> bool {
        matches!(self.base, ReferenceBase::Value(_))
    }

    pub fn has_primitive_base(&self) -> bool {
        matches!(&self.base, ReferenceBase::Value(v) if v.is_primitive())
    }

    /// Strict code may not assign to, increment or delete `eval` / `arguments` bindings.
    pub fn check_strict_target(&self) -> Result<(), EvalError<'gc>> {
        if self.strict && !self.is_property_reference() && (self.name == "eval" || self.name == "arguments") {
            return Err(raise_syntax_error!(format!("Unexpected eval or arguments in strict mode: '{}'", self.name)).into());
        }
        Ok(())
    }
}

/// GetValue
pub fn get_value<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, reference: &Reference<'gc>) -> Result<Value<'gc>, EvalError<'gc>> {
    match &reference.base {
        ReferenceBase::Unresolvable => Err(raise_reference_error!(format!("{} is not defined", reference.name)).into()),
        ReferenceBase::Environment(env) => get_binding_value(mc, realm, env, &reference.name, reference.strict),
        ReferenceBase::Value(Value::Object(obj)) => object_get_with_receiver(mc, realm, obj, &reference.name, &Value::Object(*obj)),
        ReferenceBase::Value(base) => {
            // primitive base: look up on the wrapper, run accessors with the primitive as `this`
            let wrapper = to_object(mc, realm, base)?;
            object_get_with_receiver(mc, realm, &wrapper, &reference.name, base)
        }
    }
}

/// PutValue
pub fn put_value<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    reference: &Reference<'gc>,
    value: Value<'gc>,
) -> Result<(), EvalError<'gc>> {
    let name = reference.name.as_str();
    match &reference.base {
        ReferenceBase::Unresolvable => {
            if reference.strict {
                return Err(raise_reference_error!(format!("{} is not defined", name)).into());
            }
            log::debug!("implicit global '{}'", name);
            object_put(mc, realm, &realm.global_object, name, value, false)
        }
        ReferenceBase::Environment(env) => set_mutable_binding(mc, realm, env, name, value, reference.strict),
        ReferenceBase::Value(Value::Object(obj)) => object_put(mc, realm, obj, name, value, reference.strict),
        ReferenceBase::Value(base) => put_on_primitive(mc, realm, base, name, value, reference.strict),
    }
}

// Writes through a primitive base never create properties on the temporary wrapper.
fn put_on_primitive<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    base: &Value<'gc>,
    name: &str,
    value: Value<'gc>,
    strict: bool,
) -> Result<(), EvalError<'gc>> {
    let rejected = || -> Result<(), EvalError<'gc>> {
        if strict {
            Err(raise_type_error!(format!("Cannot create property '{}' on primitive value", name)).into())
        } else {
            Ok(())
        }
    };
    let wrapper = to_object(mc, realm, base)?;
    if !object_can_put(&wrapper, name) {
        return rejected();
    }
    if let Some(own) = get_own_property(&wrapper, name)
        && own.is_data_descriptor()
    {
        return rejected();
    }
    if let Some(desc) = get_property(&wrapper, name)
        && let Some(setter) = desc.setter()
    {
        call_function(mc, realm, &Value::Object(setter), base.clone(), &[value])?;
        return Ok(());
    }
    rejected()
}

/// The `delete` operator applied to a reference.
pub fn delete_reference<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, reference: &Reference<'gc>) -> Result<bool, EvalError<'gc>> {
    match &reference.base {
        ReferenceBase::Unresolvable => {
            if reference.strict {
                return Err(raise_syntax_error!(format!("Delete of an unqualified identifier '{}' in strict mode", reference.name)).into());
            }
            Ok(true)
        }
        ReferenceBase::Environment(env) => {
            if reference.strict {
                return Err(raise_syntax_error!(format!("Delete of an unqualified identifier '{}' in strict mode", reference.name)).into());
            }
            delete_binding(mc, env, &reference.name)
        }
        ReferenceBase::Value(base) => {
            let obj = to_object(mc, realm, base)?;
            object_delete(mc, &obj, &reference.name, reference.strict)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JSError;
    use crate::core::{Runtime, RuntimeConfig, object_get_key_value};

    #[test]
    fn unresolvable_read_is_reference_error() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let reference = Reference {
                base: ReferenceBase::Unresolvable,
                name: "ghost".to_string(),
                strict: false,
            };
            match get_value(mc, realm, &reference) {
                Err(EvalError::Js(JSError::ReferenceError { message })) => assert!(message.contains("ghost")),
                other => panic!("Expected ReferenceError, got {:?}", other),
            }
        });
    }

    #[test]
    fn unresolvable_write_depends_on_strictness() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let mut reference = Reference {
                base: ReferenceBase::Unresolvable,
                name: "leaked".to_string(),
                strict: true,
            };
            assert!(put_value(mc, realm, &reference, Value::Number(1.0)).is_err());
            assert!(object_get_key_value(&realm.global_object, "leaked").is_none());

            reference.strict = false;
            put_value(mc, realm, &reference, Value::Number(1.0)).unwrap();
            assert!(matches!(object_get_key_value(&realm.global_object, "leaked"), Some(Value::Number(n)) if n == 1.0));
        });
    }

    #[test]
    fn primitive_base_writes_are_discarded() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let sloppy = Reference::property(Value::from("text"), "extra", false);
            put_value(mc, realm, &sloppy, Value::Number(1.0)).unwrap();
            assert!(matches!(get_value(mc, realm, &sloppy), Ok(Value::Undefined)));

            let strict = Reference::property(Value::from("text"), "extra", true);
            match put_value(mc, realm, &strict, Value::Number(1.0)) {
                Err(EvalError::Js(JSError::TypeError { .. })) => {}
                other => panic!("Expected TypeError, got {:?}", other),
            }
            let length = Reference::property(Value::from("text"), "length", false);
            assert!(matches!(get_value(mc, realm, &length), Ok(Value::Number(n)) if n == 4.0));
        });
    }

    #[test]
    fn strict_targets_exclude_eval_and_arguments() {
        let reference: Reference<'_> = Reference {
            base: ReferenceBase::Unresolvable,
            name: "eval".to_string(),
            strict: true,
        };
        assert!(reference.check_strict_target().is_err());
        let property: Reference<'_> = Reference::property(Value::Null, "eval", true);
        assert!(property.check_strict_target().is_ok());
    }
}
