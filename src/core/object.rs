use crate::core::{
    Collect, EnvPtr, EvalError, GcPtr, GcTrace, MutationContext, PreferredType, PropertyDescriptor, Realm, Value, arguments_define_own_property,
    binding_value, new_gc_cell_ptr, same_value,
};
use crate::js_array::array_define_own_property;
use crate::js_function::{FunctionData, call_function};
use crate::js_generator::GeneratorState;
use crate::raise_type_error;
use crate::unicode::canonical_index;
use indexmap::IndexMap;

pub type JSObjectDataPtr<'gc> = GcPtr<'gc, JSObjectData<'gc>>;

/// Mapping from argument indices to the formal parameter names they alias.
#[derive(Clone, Collect)]
#[collect(no_drop)]
pub struct ParameterMap<'gc> {
    pub env: EnvPtr<'gc>,
    pub names: Vec<Option<String>>,
}

impl<'gc> ParameterMap<'gc> {
    pub fn mapped_name(&self, property: &str) -> Option<&str> {
        let index = canonical_index(property)? as usize;
        self.names.get(index)?.as_deref()
    }
}

/// Internal state distinguishing exotic and wrapper objects from ordinary ones.
#[derive(Collect)]
#[collect(no_drop)]
pub enum ObjectKind<'gc> {
    Ordinary,
    Array,
    Error,
    Boolean(bool),
    Number(f64),
    String(Vec<u16>),
    Function(FunctionData<'gc>),
    /// `None` for strict-mode arguments objects, which alias nothing.
    Arguments(Option<ParameterMap<'gc>>),
    Generator(GcPtr<'gc, GeneratorState<'gc>>),
}

pub struct JSObjectData<'gc> {
    pub properties: IndexMap<String, PropertyDescriptor<'gc>>,
    pub prototype: Option<JSObjectDataPtr<'gc>>,
    pub class: &'static str,
    pub extensible: bool,
    pub kind: ObjectKind<'gc>,
}

unsafe impl<'gc> Collect<'gc> for JSObjectData<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        for desc in self.properties.values() {
            desc.trace(cc);
        }
        if let Some(proto) = &self.prototype {
            proto.trace(cc);
        }
        self.kind.trace(cc);
    }
}

impl<'gc> JSObjectData<'gc> {
    pub fn new(prototype: Option<JSObjectDataPtr<'gc>>, class: &'static str, kind: ObjectKind<'gc>) -> Self {
        JSObjectData {
            properties: IndexMap::new(),
            prototype,
            class,
            extensible: true,
            kind,
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn is_constructor(&self) -> bool {
        match &self.kind {
            ObjectKind::Function(FunctionData::Native(native)) => native.constructor,
            ObjectKind::Function(FunctionData::Script(script)) => !script.code.generator,
            _ => false,
        }
    }

    /// Installs a complete descriptor without any validation.
    pub fn insert(&mut self, key: impl Into<String>, desc: PropertyDescriptor<'gc>) {
        self.properties.insert(key.into(), desc);
    }
}

pub fn new_js_object_data<'gc>(mc: &MutationContext<'gc>) -> JSObjectDataPtr<'gc> {
    new_gc_cell_ptr(mc, JSObjectData::new(None, "Object", ObjectKind::Ordinary))
}

pub fn new_object_with_prototype<'gc>(
    mc: &MutationContext<'gc>,
    prototype: Option<JSObjectDataPtr<'gc>>,
    class: &'static str,
    kind: ObjectKind<'gc>,
) -> JSObjectDataPtr<'gc> {
    new_gc_cell_ptr(mc, JSObjectData::new(prototype, class, kind))
}

/// Adds a writable, enumerable, configurable data property, bypassing [[DefineOwnProperty]].
/// Only for freshly created objects whose shape is known.
pub fn object_set_key_value<'gc>(mc: &MutationContext<'gc>, obj: &JSObjectDataPtr<'gc>, key: &str, val: &Value<'gc>) {
    obj.borrow_mut(mc).insert(key, PropertyDescriptor::new_data(val, true, true, true));
}

/// Built-in method/constructor slot: writable, non-enumerable, configurable.
pub fn define_builtin_property<'gc>(mc: &MutationContext<'gc>, obj: &JSObjectDataPtr<'gc>, key: &str, val: &Value<'gc>) {
    obj.borrow_mut(mc).insert(key, PropertyDescriptor::new_data(val, true, false, true));
}

/// Read-only, non-enumerable, non-configurable data property.
pub fn define_frozen_property<'gc>(mc: &MutationContext<'gc>, obj: &JSObjectDataPtr<'gc>, key: &str, val: &Value<'gc>) {
    obj.borrow_mut(mc).insert(key, PropertyDescriptor::new_data(val, false, false, false));
}

/// Data value along the prototype chain, without running getters.
pub fn object_get_key_value<'gc>(obj: &JSObjectDataPtr<'gc>, key: &str) -> Option<Value<'gc>> {
    get_property(obj, key).and_then(|desc| desc.value)
}

fn string_index_descriptor<'gc>(text: &[u16], name: &str) -> Option<PropertyDescriptor<'gc>> {
    let index = canonical_index(name)? as usize;
    let unit = *text.get(index)?;
    Some(PropertyDescriptor::new_data(&Value::String(vec![unit]), false, true, false))
}

/// [[GetOwnProperty]]. Returns a copy; mutating it does not affect the object.
pub fn get_own_property<'gc>(obj: &JSObjectDataPtr<'gc>, name: &str) -> Option<PropertyDescriptor<'gc>> {
    let data = obj.borrow();
    let mut desc = data.properties.get(name).cloned();
    match &data.kind {
        ObjectKind::String(text) if desc.is_none() => {
            desc = string_index_descriptor(text, name);
        }
        ObjectKind::Arguments(Some(map)) => {
            if let Some(d) = desc.as_mut()
                && let Some(param) = map.mapped_name(name)
            {
                d.value = Some(binding_value(&map.env, param));
            }
        }
        _ => {}
    }
    desc
}

/// [[GetProperty]]: own property first, then the prototype chain.
pub fn get_property<'gc>(obj: &JSObjectDataPtr<'gc>, name: &str) -> Option<PropertyDescriptor<'gc>> {
    let mut current = Some(*obj);
    while let Some(o) = current {
        if let Some(desc) = get_own_property(&o, name) {
            return Some(desc);
        }
        current = o.borrow().prototype;
    }
    None
}

/// Own property names: string indices first, then insertion order.
pub fn own_property_keys<'gc>(obj: &JSObjectDataPtr<'gc>) -> Vec<String> {
    let data = obj.borrow();
    let mut keys = Vec::new();
    if let ObjectKind::String(text) = &data.kind {
        keys.extend((0..text.len()).map(|i| i.to_string()));
    }
    keys.extend(data.properties.keys().cloned());
    keys
}

pub fn object_has_property<'gc>(obj: &JSObjectDataPtr<'gc>, name: &str) -> bool {
    get_property(obj, name).is_some()
}

pub fn object_get<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, obj: &JSObjectDataPtr<'gc>, name: &str) -> Result<Value<'gc>, EvalError<'gc>> {
    object_get_with_receiver(mc, realm, obj, name, &Value::Object(*obj))
}

/// [[Get]] with an explicit `this` for accessors; primitive bases pass themselves here.
pub fn object_get_with_receiver<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    receiver: &Value<'gc>,
) -> Result<Value<'gc>, EvalError<'gc>> {
    match get_property(obj, name) {
        None => Ok(Value::Undefined),
        Some(desc) if desc.is_accessor_descriptor() => match desc.getter() {
            Some(getter) => call_function(mc, realm, &Value::Object(getter), receiver.clone(), &[]),
            None => Ok(Value::Undefined),
        },
        Some(desc) => Ok(desc.value_or_undefined()),
    }
}

/// [[CanPut]]
pub fn object_can_put<'gc>(obj: &JSObjectDataPtr<'gc>, name: &str) -> bool {
    if let Some(desc) = get_own_property(obj, name) {
        return if desc.is_accessor_descriptor() {
            desc.setter().is_some()
        } else {
            desc.writable()
        };
    }
    let (prototype, extensible) = {
        let data = obj.borrow();
        (data.prototype, data.extensible)
    };
    let Some(prototype) = prototype else {
        return extensible;
    };
    match get_property(&prototype, name) {
        None => extensible,
        Some(inherited) if inherited.is_accessor_descriptor() => inherited.setter().is_some(),
        Some(inherited) => extensible && inherited.writable(),
    }
}

/// [[Put]]
pub fn object_put<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    value: Value<'gc>,
    throw: bool,
) -> Result<(), EvalError<'gc>> {
    if !object_can_put(obj, name) {
        log::debug!("put rejected for '{}'", name);
        if throw {
            return Err(raise_type_error!(format!("Cannot assign to read only property '{}' of object", name)).into());
        }
        return Ok(());
    }
    if let Some(own) = get_own_property(obj, name)
        && own.is_data_descriptor()
    {
        object_define_own_property(mc, realm, obj, name, PropertyDescriptor::with_value(value), throw)?;
        return Ok(());
    }
    if let Some(desc) = get_property(obj, name)
        && let Some(setter) = desc.setter()
    {
        call_function(mc, realm, &Value::Object(setter), Value::Object(*obj), &[value])?;
        return Ok(());
    }
    object_define_own_property(mc, realm, obj, name, PropertyDescriptor::new_data(&value, true, true, true), throw)?;
    Ok(())
}

/// [[Delete]]
pub fn object_delete<'gc>(
    mc: &MutationContext<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    throw: bool,
) -> Result<bool, EvalError<'gc>> {
    let Some(desc) = get_own_property(obj, name) else {
        return Ok(true);
    };
    if desc.configurable() {
        let mut data = obj.borrow_mut(mc);
        // shift_remove keeps the enumeration order of the remaining keys
        data.properties.shift_remove(name);
        if let ObjectKind::Arguments(Some(map)) = &mut data.kind
            && let Some(index) = canonical_index(name)
            && let Some(slot) = map.names.get_mut(index as usize)
        {
            *slot = None;
        }
        return Ok(true);
    }
    if throw {
        return Err(raise_type_error!(format!("Cannot delete property '{}'", name)).into());
    }
    Ok(false)
}

pub(crate) fn reject<'gc>(throw: bool, message: String) -> Result<bool, EvalError<'gc>> {
    log::debug!("define rejected: {}", message);
    if throw {
        Err(raise_type_error!(message).into())
    } else {
        Ok(false)
    }
}

/// [[DefineOwnProperty]], dispatching to the exotic variants.
pub fn object_define_own_property<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    desc: PropertyDescriptor<'gc>,
    throw: bool,
) -> Result<bool, EvalError<'gc>> {
    desc.validate()?;
    let (is_array, is_mapped_arguments) = {
        let data = obj.borrow();
        (
            matches!(data.kind, ObjectKind::Array),
            matches!(data.kind, ObjectKind::Arguments(Some(_))),
        )
    };
    if is_array {
        array_define_own_property(mc, realm, obj, name, desc, throw)
    } else if is_mapped_arguments {
        arguments_define_own_property(mc, realm, obj, name, desc, throw)
    } else {
        ordinary_define_own_property(mc, obj, name, desc, throw)
    }
}

/// The ordinary [[DefineOwnProperty]] reconciliation of a requested descriptor
/// against the current one.
pub(crate) fn ordinary_define_own_property<'gc>(
    mc: &MutationContext<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    name: &str,
    desc: PropertyDescriptor<'gc>,
    throw: bool,
) -> Result<bool, EvalError<'gc>> {
    let Some(current) = get_own_property(obj, name) else {
        if !obj.borrow().extensible {
            return reject(throw, format!("Cannot define property {}, object is not extensible", name));
        }
        obj.borrow_mut(mc).insert(name, desc.into_complete());
        return Ok(true);
    };

    if desc.is_empty() || desc.is_contained_in(&current) {
        return Ok(true);
    }

    if !current.configurable() {
        if desc.configurable == Some(true) {
            return reject(throw, format!("Cannot redefine property: {}", name));
        }
        if let Some(enumerable) = desc.enumerable
            && enumerable != current.enumerable()
        {
            return reject(throw, format!("Cannot redefine property: {}", name));
        }
    }

    let mut updated = current.clone();
    if desc.is_generic_descriptor() {
        // only the flags change
    } else if current.is_data_descriptor() != desc.is_data_descriptor() {
        if !current.configurable() {
            return reject(throw, format!("Cannot redefine property: {}", name));
        }
        // kind change keeps [[Configurable]] and [[Enumerable]], resets the rest
        updated = if current.is_data_descriptor() {
            PropertyDescriptor::new_accessor(Some(Value::Undefined), Some(Value::Undefined), current.enumerable(), current.configurable())
        } else {
            PropertyDescriptor::new_data(&Value::Undefined, false, current.enumerable(), current.configurable())
        };
    } else if current.is_data_descriptor() {
        if !current.configurable() && !current.writable() {
            if desc.writable == Some(true) {
                return reject(throw, format!("Cannot redefine property: {}", name));
            }
            if let Some(value) = &desc.value
                && !same_value(value, &current.value_or_undefined())
            {
                return reject(throw, format!("Cannot assign to read only property '{}'", name));
            }
        }
    } else if !current.configurable() {
        let unchanged = |field: &Option<Value<'gc>>, existing: &Option<Value<'gc>>| match field {
            Some(v) => same_value(v, existing.as_ref().unwrap_or(&Value::Undefined)),
            None => true,
        };
        if !unchanged(&desc.set, &current.set) || !unchanged(&desc.get, &current.get) {
            return reject(throw, format!("Cannot redefine property: {}", name));
        }
    }

    desc.merge_into(&mut updated);
    // insert on an existing key keeps its position
    obj.borrow_mut(mc).insert(name, updated);
    Ok(true)
}

/// [[DefaultValue]]
pub fn object_default_value<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    obj: &JSObjectDataPtr<'gc>,
    hint: PreferredType,
) -> Result<Value<'gc>, EvalError<'gc>> {
    let order = match hint {
        PreferredType::String => ["toString", "valueOf"],
        PreferredType::Number | PreferredType::Default => ["valueOf", "toString"],
    };
    for method in order {
        let func = object_get(mc, realm, obj, method)?;
        if func.is_callable() {
            let result = call_function(mc, realm, &func, Value::Object(*obj), &[])?;
            if result.is_primitive() {
                return Ok(result);
            }
        }
    }
    Err(raise_type_error!("Cannot convert object to primitive value").into())
}
