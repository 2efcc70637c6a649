use crate::core::{
    EnvPtr, EvalError, JSObjectDataPtr, MutationContext, ObjectKind, ParameterMap, PropertyDescriptor, Realm, Value, new_object_with_prototype,
    ordinary_define_own_property, reject, set_mutable_binding,
};
use crate::unicode::canonical_index;

/// Builds the `arguments` object of a call.
///
/// Indexed properties hold a snapshot of `args`. In non-strict code every index
/// below the number of formals is aliased to the matching parameter binding of
/// `env` (the last formal wins when names repeat) and `callee` refers back to
/// the function. Strict code gets an unmapped object whose `callee` and
/// `caller` are poisoned accessors.
pub fn create_arguments_object<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    callee: JSObjectDataPtr<'gc>,
    names: &[String],
    args: &[Value<'gc>],
    env: EnvPtr<'gc>,
    strict: bool,
) -> JSObjectDataPtr<'gc> {
    let obj = new_object_with_prototype(mc, Some(realm.intrinsics.object_prototype), "Arguments", ObjectKind::Arguments(None));
    {
        let mut data = obj.borrow_mut(mc);
        data.insert("length", PropertyDescriptor::new_data(&Value::Number(args.len() as f64), true, false, true));
        for (index, value) in args.iter().enumerate() {
            data.insert(index.to_string(), PropertyDescriptor::new_data(value, true, true, true));
        }
    }

    if strict {
        let thrower = Some(Value::Object(realm.intrinsics.throw_type_error));
        let mut data = obj.borrow_mut(mc);
        data.insert("caller", PropertyDescriptor::new_accessor(thrower.clone(), thrower.clone(), false, false));
        data.insert("callee", PropertyDescriptor::new_accessor(thrower.clone(), thrower, false, false));
        return obj;
    }

    let mapped_count = names.len().min(args.len());
    let mut mapped: Vec<Option<String>> = vec![None; mapped_count];
    for index in (0..mapped_count).rev() {
        let name = &names[index];
        if !mapped.iter().flatten().any(|n| n == name) {
            mapped[index] = Some(name.clone());
        }
    }
    log::trace!("arguments object maps {:?}", mapped);
    let mut data = obj.borrow_mut(mc);
    data.insert("callee", PropertyDescriptor::new_data(&Value::Object(callee), true, false, true));
    data.kind = ObjectKind::Arguments(Some(ParameterMap { env, names: mapped }));
    obj
}

fn unmap<'gc>(mc: &MutationContext<'gc>, obj: &JSObjectDataPtr<'gc>, name: &str) {
    let Some(index) = canonical_index(name) else {
        return;
    };
    if let ObjectKind::Arguments(Some(map)) = &mut obj.borrow_mut(mc).kind
        && let Some(slot) = map.names.get_mut(index as usize)
    {
        *slot = None;
    }
}

/// [[DefineOwnProperty]] of a mapped arguments object: redefinitions write
/// through to the aliased parameter, and accessor or read-only redefinitions
/// break the alias.
pub fn arguments_define_own_property<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    desc: PropertyDescriptor<'gc>,
    throw: bool,
) -> Result<bool, EvalError<'gc>> {
    let mapping = match &obj.borrow().kind {
        ObjectKind::Arguments(Some(map)) => map.mapped_name(name).map(|param| (map.env, param.to_string())),
        _ => None,
    };
    let is_accessor = desc.is_accessor_descriptor();
    let value = desc.value.clone();
    let read_only = desc.writable == Some(false);

    if !ordinary_define_own_property(mc, obj, name, desc, false)? {
        return reject(throw, format!("Cannot redefine property: {}", name));
    }
    if let Some((env, param)) = mapping {
        if is_accessor {
            unmap(mc, obj, name);
        } else {
            if let Some(value) = value {
                set_mutable_binding(mc, realm, &env, &param, value, false)?;
            }
            if read_only {
                unmap(mc, obj, name);
            }
        }
    }
    Ok(true)
}
