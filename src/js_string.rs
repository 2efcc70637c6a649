use crate::core::{
    EvalError, Intrinsics, JSObjectDataPtr, MutationContext, ObjectKind, PropertyDescriptor, Realm, Value, define_builtin_property,
    new_object_with_prototype,
};
use crate::js_function::{NativeFn, create_native_function};
use crate::raise_type_error;

/// String wrapper object. Its characters show up as read-only indexed own
/// properties next to a frozen `length`.
pub fn create_string_object<'gc>(mc: &MutationContext<'gc>, proto: JSObjectDataPtr<'gc>, text: Vec<u16>) -> JSObjectDataPtr<'gc> {
    let len = text.len();
    let obj = new_object_with_prototype(mc, Some(proto), "String", ObjectKind::String(text));
    obj.borrow_mut(mc)
        .insert("length", PropertyDescriptor::new_data(&Value::Number(len as f64), false, false, false));
    obj
}

fn this_string_value<'gc>(this: &Value<'gc>, method: &str) -> Result<Vec<u16>, EvalError<'gc>> {
    match this {
        Value::String(s) => Ok(s.clone()),
        Value::Object(obj) => match &obj.borrow().kind {
            ObjectKind::String(s) => Ok(s.clone()),
            _ => Err(raise_type_error!(format!("String.prototype.{} requires that 'this' be a String", method)).into()),
        },
        _ => Err(raise_type_error!(format!("String.prototype.{} requires that 'this' be a String", method)).into()),
    }
}

fn string_to_string<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Ok(Value::String(this_string_value(this, "toString")?))
}

fn string_value_of<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Ok(Value::String(this_string_value(this, "valueOf")?))
}

pub fn initialize_string<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>) {
    let proto = intrinsics.string_prototype;
    proto
        .borrow_mut(mc)
        .insert("length", PropertyDescriptor::new_data(&Value::Number(0.0), false, false, false));
    let methods: [(&'static str, usize, NativeFn); 2] = [("toString", 0, string_to_string), ("valueOf", 0, string_value_of)];
    for (name, length, call) in methods {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &proto, name, &Value::Object(method));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Runtime, RuntimeConfig, get_own_property, object_get, object_put, own_property_keys, to_object};
    use crate::unicode::utf8_to_utf16;

    #[test]
    fn indices_are_read_only_own_properties() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let obj = to_object(mc, realm, &Value::String(utf8_to_utf16("ab"))).unwrap();
            let desc = get_own_property(&obj, "1").unwrap();
            assert!(desc.enumerable());
            assert!(!desc.writable());
            assert!(matches!(desc.value, Some(Value::String(ref s)) if s == &utf8_to_utf16("b")));
            assert!(get_own_property(&obj, "2").is_none());
            assert_eq!(own_property_keys(&obj), vec!["0", "1", "length"]);

            assert!(object_put(mc, realm, &obj, "0", Value::from("z"), true).is_err());
            assert!(matches!(object_get(mc, realm, &obj, "length").unwrap(), Value::Number(n) if n == 2.0));
        });
    }
}
