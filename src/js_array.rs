use crate::core::{
    EvalError, Intrinsics, JSObjectDataPtr, MutationContext, ObjectKind, PropertyDescriptor, Realm, Value, argument, define_builtin_property,
    get_own_property, new_object_with_prototype, object_delete, object_get, ordinary_define_own_property, own_property_keys, reject,
    to_js_string, to_number, to_object, to_uint32,
};
use crate::js_function::{NativeFn, call_function, create_native_function};
use crate::raise_range_error;
use crate::unicode::canonical_index;

/// Creates an array whose elements are `elements`, in order.
pub fn create_array<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, elements: &[Value<'gc>]) -> JSObjectDataPtr<'gc> {
    let arr = new_object_with_prototype(mc, Some(realm.intrinsics.array_prototype), "Array", ObjectKind::Array);
    {
        let mut data = arr.borrow_mut(mc);
        data.insert("length", PropertyDescriptor::new_data(&Value::Number(elements.len() as f64), true, false, false));
        for (index, value) in elements.iter().enumerate() {
            data.insert(index.to_string(), PropertyDescriptor::new_data(value, true, true, true));
        }
    }
    arr
}

fn array_index(name: &str) -> Option<u32> {
    canonical_index(name).filter(|index| *index != u32::MAX)
}

fn current_length<'gc>(obj: &JSObjectDataPtr<'gc>) -> (u32, PropertyDescriptor<'gc>) {
    let desc = get_own_property(obj, "length").unwrap_or_else(|| PropertyDescriptor::new_data(&Value::Number(0.0), true, false, false));
    let len = match desc.value {
        Some(Value::Number(n)) => n as u32,
        _ => 0,
    };
    (len, desc)
}

/// [[DefineOwnProperty]] of array objects: writes to `length` truncate the
/// array, and writes to an index at or past the end grow it.
pub fn array_define_own_property<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    desc: PropertyDescriptor<'gc>,
    throw: bool,
) -> Result<bool, EvalError<'gc>> {
    let (old_len, old_len_desc) = current_length(obj);

    if name == "length" {
        let Some(value) = desc.value.clone() else {
            return ordinary_define_own_property(mc, obj, "length", desc, throw);
        };
        let new_len = to_uint32(mc, realm, &value)?;
        if new_len as f64 != to_number(mc, realm, &value)? {
            return Err(raise_range_error!("Invalid array length").into());
        }
        let mut new_len_desc = desc;
        new_len_desc.value = Some(Value::Number(new_len as f64));
        if new_len >= old_len {
            return ordinary_define_own_property(mc, obj, "length", new_len_desc, throw);
        }
        if !old_len_desc.writable() {
            return reject(throw, "Cannot assign to read only property 'length' of array".to_string());
        }
        // elements are deleted before a requested read-only flag is applied
        let new_writable = new_len_desc.writable != Some(false);
        if !new_writable {
            new_len_desc.writable = Some(true);
        }
        if !ordinary_define_own_property(mc, obj, "length", new_len_desc.clone(), false)? {
            return reject(throw, "Cannot redefine property: length".to_string());
        }

        let mut doomed: Vec<u32> = own_property_keys(obj)
            .iter()
            .filter_map(|key| array_index(key))
            .filter(|index| *index >= new_len)
            .collect();
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        log::trace!("array length {} -> {}, deleting {} elements", old_len, new_len, doomed.len());
        for index in doomed {
            if !object_delete(mc, obj, &index.to_string(), false)? {
                new_len_desc.value = Some(Value::Number(index as f64 + 1.0));
                if !new_writable {
                    new_len_desc.writable = Some(false);
                }
                ordinary_define_own_property(mc, obj, "length", new_len_desc, false)?;
                return reject(throw, format!("Cannot delete array element {}", index));
            }
        }
        if !new_writable {
            let read_only = PropertyDescriptor {
                writable: Some(false),
                ..Default::default()
            };
            ordinary_define_own_property(mc, obj, "length", read_only, false)?;
        }
        return Ok(true);
    }

    if let Some(index) = array_index(name) {
        if index >= old_len && !old_len_desc.writable() {
            return reject(throw, format!("Cannot add element {}, array length is read only", index));
        }
        if !ordinary_define_own_property(mc, obj, name, desc, false)? {
            return reject(throw, format!("Cannot redefine property: {}", name));
        }
        if index >= old_len {
            let grown = PropertyDescriptor::with_value(Value::Number(index as f64 + 1.0));
            ordinary_define_own_property(mc, obj, "length", grown, false)?;
        }
        return Ok(true);
    }

    ordinary_define_own_property(mc, obj, name, desc, throw)
}

fn array_join<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = to_object(mc, realm, this)?;
    let len = to_uint32(mc, realm, &object_get(mc, realm, &obj, "length")?)?;
    let separator = match argument(args, 0) {
        Value::Undefined => vec![u16::from(b',')],
        sep => to_js_string(mc, realm, &sep)?,
    };
    let mut out = Vec::new();
    for index in 0..len {
        if index > 0 {
            out.extend_from_slice(&separator);
        }
        let element = object_get(mc, realm, &obj, &index.to_string())?;
        if !element.is_null_or_undefined() {
            out.extend(to_js_string(mc, realm, &element)?);
        }
    }
    Ok(Value::String(out))
}

fn array_to_string<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let obj = to_object(mc, realm, this)?;
    let join = object_get(mc, realm, &obj, "join")?;
    if join.is_callable() {
        return call_function(mc, realm, &join, Value::Object(obj), &[]);
    }
    let class = obj.borrow().class;
    Ok(Value::from(format!("[object {}]", class)))
}

pub fn initialize_array<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>) {
    let proto = intrinsics.array_prototype;
    proto
        .borrow_mut(mc)
        .insert("length", PropertyDescriptor::new_data(&Value::Number(0.0), true, false, false));

    let methods: [(&'static str, usize, NativeFn); 2] = [("join", 1, array_join), ("toString", 0, array_to_string)];
    for (name, length, call) in methods {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &proto, name, &Value::Object(method));
    }
}
