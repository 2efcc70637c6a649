use crate::core::{EvalError, Intrinsics, JSObjectDataPtr, MutationContext, ObjectKind, Realm, Value, define_builtin_property};
use crate::js_function::{NativeFn, create_native_function};
use crate::raise_type_error;

// thisBooleanValue: a boolean primitive or a Boolean wrapper
fn this_boolean_value<'gc>(this: &Value<'gc>, method: &str) -> Result<bool, EvalError<'gc>> {
    match this {
        Value::Boolean(b) => Ok(*b),
        Value::Object(obj) => match obj.borrow().kind {
            ObjectKind::Boolean(b) => Ok(b),
            _ => Err(raise_type_error!(format!("Boolean.prototype.{} requires that 'this' be a Boolean", method)).into()),
        },
        _ => Err(raise_type_error!(format!("Boolean.prototype.{} requires that 'this' be a Boolean", method)).into()),
    }
}

fn boolean_to_string<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let b = this_boolean_value(this, "toString")?;
    Ok(Value::from(if b { "true" } else { "false" }))
}

fn boolean_value_of<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Ok(Value::Boolean(this_boolean_value(this, "valueOf")?))
}

pub fn initialize_boolean<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>) {
    let methods: [(&'static str, usize, NativeFn); 2] = [("toString", 0, boolean_to_string), ("valueOf", 0, boolean_value_of)];
    for (name, length, call) in methods {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &intrinsics.boolean_prototype, name, &Value::Object(method));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PreferredType, Runtime, RuntimeConfig, to_object, to_primitive};

    #[test]
    fn wrapper_unwraps_through_value_of() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let wrapper = to_object(mc, realm, &Value::Boolean(false)).unwrap();
            let prim = to_primitive(mc, realm, &Value::Object(wrapper), PreferredType::Number).unwrap();
            assert!(matches!(prim, Value::Boolean(false)));
        });
    }

    #[test]
    fn generic_receiver_is_rejected() {
        assert!(this_boolean_value(&Value::Number(1.0), "valueOf").is_err());
    }
}
