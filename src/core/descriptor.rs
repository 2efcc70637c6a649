use crate::core::{
    Collect, EvalError, JSObjectDataPtr, MutationContext, Realm, Value, object_get, object_has_property, object_set_key_value, same_value,
    to_boolean,
};
use crate::raise_type_error;

/// A Rust representation of a property descriptor used by the engine.
/// Supports both data descriptors (`value` + `writable`) and accessor descriptors (`get`/`set`).
/// Fields are optional to support "partial" descriptors (as accepted by DefineOwnProperty);
/// descriptors stored on objects always have every field of their kind populated.
#[derive(Clone, Debug, Default, Collect)]
#[collect(no_drop)]
pub struct PropertyDescriptor<'gc> {
    // Data fields
    pub value: Option<Value<'gc>>,
    pub writable: Option<bool>,
    // Accessor fields
    pub get: Option<Value<'gc>>,
    pub set: Option<Value<'gc>>,
    // Common flags
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl<'gc> PropertyDescriptor<'gc> {
    /// Construct a full data descriptor from explicit values
    pub fn new_data(value: &Value<'gc>, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor {
            value: Some(value.clone()),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Construct an accessor descriptor
    pub fn new_accessor(get: Option<Value<'gc>>, set: Option<Value<'gc>>, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor {
            value: None,
            writable: None,
            get,
            set,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Partial descriptor carrying only a value, as used by [[Put]].
    pub fn with_value(value: Value<'gc>) -> Self {
        PropertyDescriptor {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    pub fn writable(&self) -> bool {
        self.writable.unwrap_or(false)
    }

    pub fn enumerable(&self) -> bool {
        self.enumerable.unwrap_or(false)
    }

    pub fn configurable(&self) -> bool {
        self.configurable.unwrap_or(false)
    }

    pub fn value_or_undefined(&self) -> Value<'gc> {
        self.value.clone().unwrap_or(Value::Undefined)
    }

    pub fn getter(&self) -> Option<JSObjectDataPtr<'gc>> {
        self.get.as_ref().and_then(Value::as_object)
    }

    pub fn setter(&self) -> Option<JSObjectDataPtr<'gc>> {
        self.set.as_ref().and_then(Value::as_object)
    }

    /// True when every field present here is also present in `current` with the same value.
    pub(crate) fn is_contained_in(&self, current: &PropertyDescriptor<'gc>) -> bool {
        fn same<'gc>(field: &Option<Value<'gc>>, other: &Option<Value<'gc>>) -> bool {
            match (field, other) {
                (None, _) => true,
                (Some(a), Some(b)) => same_value(a, b),
                (Some(_), None) => false,
            }
        }
        fn same_flag(field: Option<bool>, other: Option<bool>) -> bool {
            field.is_none() || field == other
        }
        same(&self.value, &current.value)
            && same(&self.get, &current.get)
            && same(&self.set, &current.set)
            && same_flag(self.writable, current.writable)
            && same_flag(self.enumerable, current.enumerable)
            && same_flag(self.configurable, current.configurable)
    }

    /// Fully populated descriptor for a newly created property, absent fields taking their defaults.
    pub(crate) fn into_complete(self) -> Self {
        if self.is_accessor_descriptor() {
            PropertyDescriptor::new_accessor(
                Some(self.get.unwrap_or(Value::Undefined)),
                Some(self.set.unwrap_or(Value::Undefined)),
                self.enumerable.unwrap_or(false),
                self.configurable.unwrap_or(false),
            )
        } else {
            PropertyDescriptor::new_data(
                &self.value.unwrap_or(Value::Undefined),
                self.writable.unwrap_or(false),
                self.enumerable.unwrap_or(false),
                self.configurable.unwrap_or(false),
            )
        }
    }

    /// Copies every present field onto `target`.
    pub(crate) fn merge_into(self, target: &mut PropertyDescriptor<'gc>) {
        if let Some(v) = self.value {
            target.value = Some(v);
        }
        if let Some(w) = self.writable {
            target.writable = Some(w);
        }
        if let Some(g) = self.get {
            target.get = Some(g);
        }
        if let Some(s) = self.set {
            target.set = Some(s);
        }
        if let Some(e) = self.enumerable {
            target.enumerable = Some(e);
        }
        if let Some(c) = self.configurable {
            target.configurable = Some(c);
        }
    }

    /// ToPropertyDescriptor: read a descriptor out of an attributes object.
    /// Reads go through [[Get]], so inherited fields and getters are honored.
    pub fn from_object(mc: &MutationContext<'gc>, realm: Realm<'gc>, obj: &JSObjectDataPtr<'gc>) -> Result<Self, EvalError<'gc>> {
        let mut desc = PropertyDescriptor::default();
        if object_has_property(obj, "enumerable") {
            desc.enumerable = Some(to_boolean(&object_get(mc, realm, obj, "enumerable")?));
        }
        if object_has_property(obj, "configurable") {
            desc.configurable = Some(to_boolean(&object_get(mc, realm, obj, "configurable")?));
        }
        if object_has_property(obj, "value") {
            desc.value = Some(object_get(mc, realm, obj, "value")?);
        }
        if object_has_property(obj, "writable") {
            desc.writable = Some(to_boolean(&object_get(mc, realm, obj, "writable")?));
        }
        if object_has_property(obj, "get") {
            let getter = object_get(mc, realm, obj, "get")?;
            if !getter.is_undefined() && !getter.is_callable() {
                return Err(raise_type_error!("Getter must be a function").into());
            }
            desc.get = Some(getter);
        }
        if object_has_property(obj, "set") {
            let setter = object_get(mc, realm, obj, "set")?;
            if !setter.is_undefined() && !setter.is_callable() {
                return Err(raise_type_error!("Setter must be a function").into());
            }
            desc.set = Some(setter);
        }
        desc.validate()?;
        Ok(desc)
    }

    /// Rejects descriptors mixing data and accessor fields.
    pub fn validate(&self) -> Result<(), EvalError<'gc>> {
        if self.is_accessor_descriptor() && self.is_data_descriptor() {
            return Err(raise_type_error!("Invalid property descriptor. Cannot both specify accessors and a value or writable attribute").into());
        }
        Ok(())
    }

    /// FromPropertyDescriptor: materialize this descriptor as a plain object.
    pub fn to_object(&self, mc: &MutationContext<'gc>, realm: Realm<'gc>) -> JSObjectDataPtr<'gc> {
        let desc = realm.new_object(mc);
        if self.is_accessor_descriptor() {
            object_set_key_value(mc, &desc, "get", &self.get.clone().unwrap_or(Value::Undefined));
            object_set_key_value(mc, &desc, "set", &self.set.clone().unwrap_or(Value::Undefined));
        } else {
            object_set_key_value(mc, &desc, "value", &self.value_or_undefined());
            object_set_key_value(mc, &desc, "writable", &Value::Boolean(self.writable()));
        }
        object_set_key_value(mc, &desc, "enumerable", &Value::Boolean(self.enumerable()));
        object_set_key_value(mc, &desc, "configurable", &Value::Boolean(self.configurable()));
        desc
    }
}
