use crate::core::{
    Collect, EvalError, Gc, JSObjectDataPtr, MutationContext, ObjectKind, Realm, f64_to_int32, f64_to_integer, f64_to_uint16, f64_to_uint32,
    new_object_with_prototype, number_to_string, object_default_value, string_to_number,
};
use crate::js_string::create_string_object;
use crate::raise_type_error;
use crate::unicode::{utf8_to_utf16, utf16_to_utf8};

/// A language value. Strings are sequences of UTF-16 code units.
#[derive(Clone, Collect)]
#[collect(no_drop)]
pub enum Value<'gc> {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Vec<u16>),
    Object(JSObjectDataPtr<'gc>),
}

/// Hint passed to ToPrimitive / [[DefaultValue]].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

impl<'gc> Value<'gc> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<JSObjectDataPtr<'gc>> {
        match self {
            Value::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(obj) => obj.borrow().is_callable(),
            _ => false,
        }
    }

    /// Result of the `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(obj) if obj.borrow().is_callable() => "function",
            Value::Object(_) => "object",
        }
    }
}

impl<'gc> From<f64> for Value<'gc> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<'gc> From<bool> for Value<'gc> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<'gc> From<&str> for Value<'gc> {
    fn from(s: &str) -> Self {
        Value::String(utf8_to_utf16(s))
    }
}

impl<'gc> From<String> for Value<'gc> {
    fn from(s: String) -> Self {
        Value::String(utf8_to_utf16(&s))
    }
}

impl<'gc> From<JSObjectDataPtr<'gc>> for Value<'gc> {
    fn from(obj: JSObjectDataPtr<'gc>) -> Self {
        Value::Object(obj)
    }
}

impl<'gc> std::fmt::Debug for Value<'gc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", utf16_to_utf8(s)),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Null => write!(f, "Null"),
            Value::Undefined => write!(f, "Undefined"),
            Value::Object(obj) => write!(f, "Object([object {}])", obj.borrow().class),
        }
    }
}

pub fn create_boolean<'gc>(b: bool) -> Value<'gc> {
    Value::Boolean(b)
}

pub fn create_number<'gc>(n: f64) -> Value<'gc> {
    Value::Number(n)
}

pub fn create_string<'gc>(s: &str) -> Value<'gc> {
    Value::String(utf8_to_utf16(s))
}

/// Positional argument, `undefined` when absent.
pub(crate) fn argument<'gc>(args: &[Value<'gc>], index: usize) -> Value<'gc> {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

/// Renders a value for diagnostics without running any language code.
pub fn value_to_string<'gc>(val: &Value<'gc>) -> String {
    match val {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => utf16_to_utf8(s),
        Value::Object(obj) => format!("[object {}]", obj.borrow().class),
    }
}

pub fn to_primitive<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    val: &Value<'gc>,
    hint: PreferredType,
) -> Result<Value<'gc>, EvalError<'gc>> {
    match val {
        Value::Object(obj) => object_default_value(mc, realm, obj, hint),
        _ => Ok(val.clone()),
    }
}

pub fn to_boolean(val: &Value<'_>) -> bool {
    match val {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => !(n.is_nan() || *n == 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) => true,
    }
}

pub fn to_number<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<f64, EvalError<'gc>> {
    Ok(match val {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Object(_) => {
            let prim = to_primitive(mc, realm, val, PreferredType::Number)?;
            return to_number(mc, realm, &prim);
        }
    })
}

pub fn to_integer<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<f64, EvalError<'gc>> {
    Ok(f64_to_integer(to_number(mc, realm, val)?))
}

pub fn to_int32<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<i32, EvalError<'gc>> {
    Ok(f64_to_int32(to_number(mc, realm, val)?))
}

pub fn to_uint32<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<u32, EvalError<'gc>> {
    Ok(f64_to_uint32(to_number(mc, realm, val)?))
}

pub fn to_uint16<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<u16, EvalError<'gc>> {
    Ok(f64_to_uint16(to_number(mc, realm, val)?))
}

pub fn to_js_string<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<Vec<u16>, EvalError<'gc>> {
    Ok(match val {
        Value::String(s) => s.clone(),
        Value::Object(_) => {
            let prim = to_primitive(mc, realm, val, PreferredType::String)?;
            return to_js_string(mc, realm, &prim);
        }
        other => utf8_to_utf16(&value_to_string(other)),
    })
}

/// ToString for use as a property name.
pub fn to_property_key<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<String, EvalError<'gc>> {
    match val {
        Value::String(s) => Ok(utf16_to_utf8(s)),
        _ => Ok(utf16_to_utf8(&to_js_string(mc, realm, val)?)),
    }
}

pub fn to_object<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, val: &Value<'gc>) -> Result<JSObjectDataPtr<'gc>, EvalError<'gc>> {
    let intrinsics = &realm.intrinsics;
    match val {
        Value::Undefined | Value::Null => Err(raise_type_error!(format!("Cannot convert {} to object", value_to_string(val))).into()),
        Value::Boolean(b) => Ok(new_object_with_prototype(
            mc,
            Some(intrinsics.boolean_prototype),
            "Boolean",
            ObjectKind::Boolean(*b),
        )),
        Value::Number(n) => Ok(new_object_with_prototype(
            mc,
            Some(intrinsics.number_prototype),
            "Number",
            ObjectKind::Number(*n),
        )),
        Value::String(s) => Ok(create_string_object(mc, intrinsics.string_prototype, s.clone())),
        Value::Object(obj) => Ok(*obj),
    }
}

pub fn check_object_coercible<'gc>(val: &Value<'gc>) -> Result<(), EvalError<'gc>> {
    if val.is_null_or_undefined() {
        return Err(raise_type_error!(format!("Cannot convert {} to object", value_to_string(val))).into());
    }
    Ok(())
}

/// The `===` comparison.
pub fn strict_equals<'gc>(x: &Value<'gc>, y: &Value<'gc>) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Object(a), Value::Object(b)) => Gc::ptr_eq(*a, *b),
        _ => false,
    }
}

/// SameValue: like `===` except NaN equals NaN and +0 differs from -0.
pub fn same_value<'gc>(x: &Value<'gc>, y: &Value<'gc>) -> bool {
    match (x, y) {
        (Value::Number(a), Value::Number(b)) => {
            if a.is_nan() && b.is_nan() {
                return true;
            }
            a == b && a.is_sign_negative() == b.is_sign_negative()
        }
        _ => strict_equals(x, y),
    }
}

/// The `==` comparison.
pub fn abstract_equals<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, x: &Value<'gc>, y: &Value<'gc>) -> Result<bool, EvalError<'gc>> {
    Ok(match (x, y) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Boolean(_), Value::Boolean(_))
        | (Value::Object(_), Value::Object(_)) => strict_equals(x, y),
        (Value::Number(a), Value::String(s)) => *a == string_to_number(s),
        (Value::String(s), Value::Number(b)) => string_to_number(s) == *b,
        (Value::Boolean(b), _) => return abstract_equals(mc, realm, &Value::Number(if *b { 1.0 } else { 0.0 }), y),
        (_, Value::Boolean(b)) => return abstract_equals(mc, realm, x, &Value::Number(if *b { 1.0 } else { 0.0 })),
        (Value::Number(_) | Value::String(_), Value::Object(_)) => {
            let prim = to_primitive(mc, realm, y, PreferredType::Default)?;
            return abstract_equals(mc, realm, x, &prim);
        }
        (Value::Object(_), Value::Number(_) | Value::String(_)) => {
            let prim = to_primitive(mc, realm, x, PreferredType::Default)?;
            return abstract_equals(mc, realm, &prim, y);
        }
        _ => false,
    })
}

/// The abstract relational comparison `x < y`.
///
/// `left_first` controls which operand is converted to a primitive first, so
/// that user-visible side effects keep source order for `>` and `<=`.
/// `None` stands for the "undefined" outcome produced by NaN operands.
pub fn abstract_relational_comparison<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    x: &Value<'gc>,
    y: &Value<'gc>,
    left_first: bool,
) -> Result<Option<bool>, EvalError<'gc>> {
    let (px, py) = if left_first {
        let px = to_primitive(mc, realm, x, PreferredType::Number)?;
        let py = to_primitive(mc, realm, y, PreferredType::Number)?;
        (px, py)
    } else {
        let py = to_primitive(mc, realm, y, PreferredType::Number)?;
        let px = to_primitive(mc, realm, x, PreferredType::Number)?;
        (px, py)
    };
    if let (Value::String(a), Value::String(b)) = (&px, &py) {
        // code-unit order, a proper prefix sorts first
        return Ok(Some(a < b));
    }
    let nx = to_number(mc, realm, &px)?;
    let ny = to_number(mc, realm, &py)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    Ok(Some(nx < ny))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Runtime, RuntimeConfig};

    fn s<'gc>(text: &str) -> Value<'gc> {
        Value::from(text)
    }

    #[test]
    fn to_boolean_falsy_values() {
        assert!(!to_boolean(&Value::Undefined));
        assert!(!to_boolean(&Value::Null));
        assert!(!to_boolean(&Value::Number(0.0)));
        assert!(!to_boolean(&Value::Number(-0.0)));
        assert!(!to_boolean(&Value::Number(f64::NAN)));
        assert!(!to_boolean(&s("")));
        assert!(to_boolean(&s("0")));
        assert!(to_boolean(&Value::Number(-1.0)));
    }

    #[test]
    fn same_value_distinguishes_zero_and_nan() {
        assert!(same_value(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        assert!(!same_value(&Value::Number(0.0), &Value::Number(-0.0)));
        assert!(!strict_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        assert!(strict_equals(&Value::Number(0.0), &Value::Number(-0.0)));
    }

    fn loose_eq<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, x: Value<'gc>, y: Value<'gc>) -> bool {
        abstract_equals(mc, realm, &x, &y).unwrap()
    }

    fn less_than<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, x: Value<'gc>, y: Value<'gc>) -> Option<bool> {
        abstract_relational_comparison(mc, realm, &x, &y, true).unwrap()
    }

    #[test]
    fn abstract_equality_coercions() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            assert!(loose_eq(mc, realm, Value::Null, Value::Undefined));
            assert!(!loose_eq(mc, realm, Value::Null, Value::Number(0.0)));
            assert!(loose_eq(mc, realm, Value::Number(1.0), s("1")));
            assert!(loose_eq(mc, realm, Value::Boolean(true), s("1")));
            assert!(loose_eq(mc, realm, s(""), Value::Number(0.0)));
            assert!(!loose_eq(mc, realm, Value::Number(f64::NAN), Value::Number(f64::NAN)));
            let obj = realm.new_object(mc);
            assert!(loose_eq(mc, realm, Value::Object(obj), Value::Object(obj)));
            assert!(loose_eq(mc, realm, Value::Object(obj), s("[object Object]")));
        });
    }

    #[test]
    fn relational_comparison_outcomes() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            assert_eq!(less_than(mc, realm, Value::Number(1.0), Value::Number(2.0)), Some(true));
            assert_eq!(less_than(mc, realm, Value::Number(f64::NAN), Value::Number(2.0)), None);
            assert_eq!(less_than(mc, realm, s("a"), s("ab")), Some(true));
            assert_eq!(less_than(mc, realm, s("b"), s("ab")), Some(false));
            assert_eq!(less_than(mc, realm, s("10"), Value::Number(9.0)), Some(false));
            assert_eq!(less_than(mc, realm, Value::Number(0.0), Value::Number(-0.0)), Some(false));
        });
    }

    #[test]
    fn to_object_rejects_null_and_undefined() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            assert!(to_object(mc, realm, &Value::Null).is_err());
            assert!(to_object(mc, realm, &Value::Undefined).is_err());
            let wrapped = to_object(mc, realm, &Value::Number(3.0)).unwrap();
            assert_eq!(wrapped.borrow().class, "Number");
            let text = to_object(mc, realm, &s("hey")).unwrap();
            assert_eq!(text.borrow().class, "String");
        });
    }
}
