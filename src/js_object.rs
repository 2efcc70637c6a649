use crate::core::{
    EvalError, Gc, Intrinsics, JSObjectDataPtr, MutationContext, ObjectKind, PropertyDescriptor, Realm, Value, argument, define_builtin_property,
    define_frozen_property, get_own_property, new_object_with_prototype, object_define_own_property, object_get, own_property_keys,
    to_object, to_property_key,
};
use crate::js_array::create_array;
use crate::js_function::{NativeFn, create_native_constructor, create_native_function};
use crate::raise_type_error;

fn require_object<'gc>(value: &Value<'gc>, method: &str) -> Result<JSObjectDataPtr<'gc>, EvalError<'gc>> {
    match value {
        Value::Object(obj) => Ok(*obj),
        _ => Err(raise_type_error!(format!("Object.{} called on non-object", method)).into()),
    }
}

fn object_constructor<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let value = argument(args, 0);
    if value.is_null_or_undefined() {
        return Ok(Value::Object(realm.new_object(mc)));
    }
    Ok(Value::Object(to_object(mc, realm, &value)?))
}

fn object_prototype_to_string<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let class = match this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        other => to_object(mc, realm, other)?.borrow().class,
    };
    Ok(Value::from(format!("[object {}]", class)))
}

fn object_prototype_value_of<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Ok(Value::Object(to_object(mc, realm, this)?))
}

fn object_prototype_has_own_property<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let name = to_property_key(mc, realm, &argument(args, 0))?;
    let obj = to_object(mc, realm, this)?;
    Ok(Value::Boolean(get_own_property(&obj, &name).is_some()))
}

fn object_prototype_is_prototype_of<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let Value::Object(value) = argument(args, 0) else {
        return Ok(Value::Boolean(false));
    };
    let obj = to_object(mc, realm, this)?;
    let mut current = value.borrow().prototype;
    while let Some(proto) = current {
        if Gc::ptr_eq(proto, obj) {
            return Ok(Value::Boolean(true));
        }
        current = proto.borrow().prototype;
    }
    Ok(Value::Boolean(false))
}

fn object_prototype_property_is_enumerable<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let name = to_property_key(mc, realm, &argument(args, 0))?;
    let obj = to_object(mc, realm, this)?;
    Ok(Value::Boolean(get_own_property(&obj, &name).is_some_and(|d| d.enumerable())))
}

fn object_get_prototype_of<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "getPrototypeOf")?;
    let proto = obj.borrow().prototype;
    Ok(proto.map(Value::Object).unwrap_or(Value::Null))
}

fn object_get_own_property_descriptor<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "getOwnPropertyDescriptor")?;
    let name = to_property_key(mc, realm, &argument(args, 1))?;
    Ok(match get_own_property(&obj, &name) {
        Some(desc) => Value::Object(desc.to_object(mc, realm)),
        None => Value::Undefined,
    })
}

fn object_get_own_property_names<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "getOwnPropertyNames")?;
    let names: Vec<Value> = own_property_keys(&obj).into_iter().map(Value::from).collect();
    Ok(Value::Object(create_array(mc, realm, &names)))
}

fn object_keys<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "keys")?;
    let names: Vec<Value> = own_property_keys(&obj)
        .into_iter()
        .filter(|name| get_own_property(&obj, name).is_some_and(|d| d.enumerable()))
        .map(Value::from)
        .collect();
    Ok(Value::Object(create_array(mc, realm, &names)))
}

fn to_descriptor<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, attributes: &Value<'gc>) -> Result<PropertyDescriptor<'gc>, EvalError<'gc>> {
    match attributes {
        Value::Object(attributes) => PropertyDescriptor::from_object(mc, realm, attributes),
        _ => Err(raise_type_error!("Property description must be an object").into()),
    }
}

// All descriptors are read before any is applied.
fn define_properties<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, obj: &JSObjectDataPtr<'gc>, properties: &Value<'gc>) -> Result<(), EvalError<'gc>> {
    let props = to_object(mc, realm, properties)?;
    let mut descriptors = Vec::new();
    for name in own_property_keys(&props) {
        if !get_own_property(&props, &name).is_some_and(|d| d.enumerable()) {
            continue;
        }
        let attributes = object_get(mc, realm, &props, &name)?;
        descriptors.push((name, to_descriptor(mc, realm, &attributes)?));
    }
    for (name, desc) in descriptors {
        object_define_own_property(mc, realm, obj, &name, desc, true)?;
    }
    Ok(())
}

fn object_define_property<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "defineProperty")?;
    let name = to_property_key(mc, realm, &argument(args, 1))?;
    let desc = to_descriptor(mc, realm, &argument(args, 2))?;
    object_define_own_property(mc, realm, &obj, &name, desc, true)?;
    Ok(Value::Object(obj))
}

fn object_define_properties<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "defineProperties")?;
    define_properties(mc, realm, &obj, &argument(args, 1))?;
    Ok(Value::Object(obj))
}

fn object_create<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let proto = match argument(args, 0) {
        Value::Object(proto) => Some(proto),
        Value::Null => None,
        _ => return Err(raise_type_error!("Object prototype may only be an Object or null").into()),
    };
    let obj = new_object_with_prototype(mc, proto, "Object", ObjectKind::Ordinary);
    let properties = argument(args, 1);
    if !properties.is_undefined() {
        define_properties(mc, realm, &obj, &properties)?;
    }
    Ok(Value::Object(obj))
}

// Shared body of seal and freeze.
fn restrict_properties<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, obj: &JSObjectDataPtr<'gc>, freeze: bool) -> Result<(), EvalError<'gc>> {
    for name in own_property_keys(obj) {
        let Some(current) = get_own_property(obj, &name) else {
            continue;
        };
        let mut desc = PropertyDescriptor {
            configurable: Some(false),
            ..Default::default()
        };
        if freeze && current.is_data_descriptor() {
            desc.writable = Some(false);
        }
        object_define_own_property(mc, realm, obj, &name, desc, true)?;
    }
    obj.borrow_mut(mc).prevent_extensions();
    Ok(())
}

// Shared body of isSealed and isFrozen.
fn properties_restricted<'gc>(obj: &JSObjectDataPtr<'gc>, frozen: bool) -> bool {
    if obj.borrow().is_extensible() {
        return false;
    }
    own_property_keys(obj).iter().all(|name| match get_own_property(obj, name) {
        Some(desc) if desc.configurable() => false,
        Some(desc) if frozen && desc.is_data_descriptor() => !desc.writable(),
        _ => true,
    })
}

fn object_seal<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "seal")?;
    restrict_properties(mc, realm, &obj, false)?;
    Ok(Value::Object(obj))
}

fn object_freeze<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "freeze")?;
    restrict_properties(mc, realm, &obj, true)?;
    Ok(Value::Object(obj))
}

fn object_prevent_extensions<'gc>(
    mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "preventExtensions")?;
    obj.borrow_mut(mc).prevent_extensions();
    Ok(Value::Object(obj))
}

fn object_is_sealed<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "isSealed")?;
    Ok(Value::Boolean(properties_restricted(&obj, false)))
}

fn object_is_frozen<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "isFrozen")?;
    Ok(Value::Boolean(properties_restricted(&obj, true)))
}

fn object_is_extensible<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = require_object(&argument(args, 0), "isExtensible")?;
    let extensible = obj.borrow().is_extensible();
    Ok(Value::Boolean(extensible))
}

/// Installs `Object`, its reflective statics and the Object.prototype methods.
pub fn initialize_object<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>, global: &JSObjectDataPtr<'gc>) {
    let proto = intrinsics.object_prototype;
    let ctor = create_native_constructor(mc, intrinsics.function_prototype, "Object", 1, object_constructor);
    define_frozen_property(mc, &ctor, "prototype", &Value::Object(proto));
    define_builtin_property(mc, &proto, "constructor", &Value::Object(ctor));

    let prototype_methods: [(&'static str, usize, NativeFn); 5] = [
        ("toString", 0, object_prototype_to_string),
        ("valueOf", 0, object_prototype_value_of),
        ("hasOwnProperty", 1, object_prototype_has_own_property),
        ("isPrototypeOf", 1, object_prototype_is_prototype_of),
        ("propertyIsEnumerable", 1, object_prototype_property_is_enumerable),
    ];
    for (name, length, call) in prototype_methods {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &proto, name, &Value::Object(method));
    }

    let statics: [(&'static str, usize, NativeFn); 13] = [
        ("getPrototypeOf", 1, object_get_prototype_of),
        ("getOwnPropertyDescriptor", 2, object_get_own_property_descriptor),
        ("getOwnPropertyNames", 1, object_get_own_property_names),
        ("create", 2, object_create),
        ("defineProperty", 3, object_define_property),
        ("defineProperties", 2, object_define_properties),
        ("seal", 1, object_seal),
        ("freeze", 1, object_freeze),
        ("preventExtensions", 1, object_prevent_extensions),
        ("isSealed", 1, object_is_sealed),
        ("isFrozen", 1, object_is_frozen),
        ("isExtensible", 1, object_is_extensible),
        ("keys", 1, object_keys),
    ];
    for (name, length, call) in statics {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &ctor, name, &Value::Object(method));
    }

    define_builtin_property(mc, global, "Object", &Value::Object(ctor));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Runtime, RuntimeConfig, object_put};
    use crate::js_function::call_function;
    use crate::unicode::utf16_to_utf8;

    fn object_static<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, name: &str) -> Value<'gc> {
        let ctor = object_get(mc, realm, &realm.global_object, "Object").unwrap();
        object_get(mc, realm, &ctor.as_object().unwrap(), name).unwrap()
    }

    #[test]
    fn freeze_makes_object_immutable() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let obj = realm.new_object(mc);
            object_put(mc, realm, &obj, "x", Value::Number(1.0), true).unwrap();
            let freeze = object_static(mc, realm, "freeze");
            call_function(mc, realm, &freeze, Value::Undefined, &[Value::Object(obj)]).unwrap();

            assert!(properties_restricted(&obj, true));
            assert!(object_put(mc, realm, &obj, "x", Value::Number(2.0), true).is_err());
            assert!(object_put(mc, realm, &obj, "y", Value::Number(2.0), true).is_err());
            // silent failure outside strict code
            object_put(mc, realm, &obj, "x", Value::Number(2.0), false).unwrap();
            assert!(matches!(object_get(mc, realm, &obj, "x").unwrap(), Value::Number(n) if n == 1.0));
        });
    }

    #[test]
    fn sealed_is_not_frozen() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let obj = realm.new_object(mc);
            object_put(mc, realm, &obj, "x", Value::Number(1.0), true).unwrap();
            restrict_properties(mc, realm, &obj, false).unwrap();
            assert!(properties_restricted(&obj, false));
            assert!(!properties_restricted(&obj, true));
            object_put(mc, realm, &obj, "x", Value::Number(2.0), true).unwrap();
        });
    }

    #[test]
    fn class_tags() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let proto = realm.intrinsics.object_prototype;
            let to_string = object_get(mc, realm, &proto, "toString").unwrap();
            let render = |this| match call_function(mc, realm, &to_string, this, &[]).unwrap() {
                Value::String(s) => utf16_to_utf8(&s),
                other => panic!("Expected string, got {:?}", other),
            };
            assert_eq!(render(Value::Null), "[object Null]");
            assert_eq!(render(Value::Undefined), "[object Undefined]");
            assert_eq!(render(Value::Number(1.0)), "[object Number]");
            assert_eq!(render(Value::Object(create_array(mc, realm, &[]))), "[object Array]");
        });
    }

    #[test]
    fn create_with_descriptors() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let attributes = realm.new_object(mc);
            object_put(mc, realm, &attributes, "value", Value::Number(7.0), true).unwrap();
            let props = realm.new_object(mc);
            object_put(mc, realm, &props, "answer", Value::Object(attributes), true).unwrap();
            let create = object_static(mc, realm, "create");
            let created = call_function(mc, realm, &create, Value::Undefined, &[Value::Null, Value::Object(props)]).unwrap();
            let created = created.as_object().unwrap();
            assert!(created.borrow().prototype.is_none());
            let desc = get_own_property(&created, "answer").unwrap();
            assert!(!desc.writable() && !desc.enumerable() && !desc.configurable());
        });
    }
}
