use crate::{
    JSError,
    core::{
        Collect, Intrinsics, JSObjectDataPtr, MutationContext, ObjectKind, Realm, Value, argument, define_builtin_property, define_frozen_property,
        new_object_with_prototype, object_get, object_get_key_value, to_js_string, value_to_string,
    },
    js_function::create_native_constructor,
    raise_type_error,
    unicode::{utf8_to_utf16, utf16_to_utf8},
};

/// Abrupt completion of an evaluation step: either a native fault or a
/// language value raised by `throw`.
#[derive(Debug)]
pub enum EvalError<'gc> {
    Js(JSError),
    Throw(Value<'gc>),
}

impl<'gc> From<JSError> for EvalError<'gc> {
    fn from(e: JSError) -> Self {
        EvalError::Js(e)
    }
}

impl<'gc> From<EvalError<'gc>> for JSError {
    fn from(e: EvalError<'gc>) -> Self {
        match e {
            EvalError::Js(j) => j,
            EvalError::Throw(v) => JSError::Throw { message: value_to_string(&v) },
        }
    }
}

impl<'gc> EvalError<'gc> {
    pub fn message(&self) -> String {
        match self {
            EvalError::Js(e) => e.message().to_string(),
            EvalError::Throw(v) => value_to_string(v),
        }
    }

    /// Syntax faults stand for early errors of the code unit and escape
    /// every `try` statement in it.
    pub fn is_early_error(&self) -> bool {
        matches!(self, EvalError::Js(JSError::SyntaxError { .. }))
    }

    /// The value a `catch` clause receives.
    pub fn into_thrown(self, mc: &MutationContext<'gc>, realm: Realm<'gc>) -> Value<'gc> {
        match self {
            EvalError::Throw(v) => v,
            EvalError::Js(e) => Value::Object(error_to_object(mc, realm, &e)),
        }
    }
}

/// The native error constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Collect)]
#[collect(require_static)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::UriError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::UriError => "URIError",
        }
    }
}

/// Builds an error object of `kind` carrying `message`.
pub fn create_error<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, kind: ErrorKind, message: &str) -> JSObjectDataPtr<'gc> {
    let proto = realm.intrinsics.error_prototype_for(kind);
    let error = new_object_with_prototype(mc, Some(proto), "Error", ObjectKind::Error);
    define_builtin_property(mc, &error, "message", &Value::String(utf8_to_utf16(message)));
    error
}

/// Translates a native fault into the matching language-level error object.
pub fn error_to_object<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, err: &JSError) -> JSObjectDataPtr<'gc> {
    let kind = match err {
        JSError::TypeError { .. } => ErrorKind::TypeError,
        JSError::ReferenceError { .. } => ErrorKind::ReferenceError,
        JSError::RangeError { .. } => ErrorKind::RangeError,
        JSError::SyntaxError { .. } => ErrorKind::SyntaxError,
        JSError::EvaluationError { .. } | JSError::Throw { .. } => ErrorKind::Error,
    };
    log::debug!("materializing {} for catch: {}", kind.name(), err);
    create_error(mc, realm, kind, err.message())
}

pub fn is_error<'gc>(val: &Value<'gc>) -> bool {
    match val {
        Value::Object(obj) => matches!(obj.borrow().kind, ObjectKind::Error),
        _ => false,
    }
}

/// Maps an abrupt completion that escaped to the host back into a [`JSError`].
/// Thrown native errors keep their kind; other thrown values become `Throw`.
pub fn thrown_to_js_error<'gc>(mc: &MutationContext<'gc>, realm: Realm<'gc>, err: EvalError<'gc>) -> JSError {
    let value = match err {
        EvalError::Js(e) => return e,
        EvalError::Throw(v) => v,
    };
    let Value::Object(obj) = &value else {
        return JSError::Throw {
            message: value_to_string(&value),
        };
    };
    if !is_error(&value) {
        // a thrown plain object renders through its own toString when possible
        let message = to_js_string(mc, realm, &value)
            .map(|s| utf16_to_utf8(&s))
            .unwrap_or_else(|_| value_to_string(&value));
        return JSError::Throw { message };
    }
    let read = |key: &str| match object_get_key_value(obj, key) {
        Some(Value::String(s)) => utf16_to_utf8(&s),
        _ => String::new(),
    };
    let name = read("name");
    let message = read("message");
    match name.as_str() {
        "TypeError" => JSError::TypeError { message },
        "ReferenceError" => JSError::ReferenceError { message },
        "RangeError" => JSError::RangeError { message },
        "SyntaxError" => JSError::SyntaxError { message },
        _ if message.is_empty() => JSError::Throw { message: name },
        _ => JSError::Throw {
            message: format!("{}: {}", name, message),
        },
    }
}

// Shared by every native error constructor; the prototype comes from the callee.
fn error_constructor<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    callee: JSObjectDataPtr<'gc>,
    _this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let proto = object_get(mc, realm, &callee, "prototype")?
        .as_object()
        .unwrap_or(realm.intrinsics.error_prototype);
    let error = new_object_with_prototype(mc, Some(proto), "Error", ObjectKind::Error);
    let message = argument(args, 0);
    if !message.is_undefined() {
        let text = to_js_string(mc, realm, &message)?;
        define_builtin_property(mc, &error, "message", &Value::String(text));
    }
    Ok(Value::Object(error))
}

fn error_prototype_to_string<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let Value::Object(obj) = this else {
        return Err(raise_type_error!("Error.prototype.toString called on non-object").into());
    };
    let name = match object_get(mc, realm, obj, "name")? {
        Value::Undefined => utf8_to_utf16("Error"),
        other => to_js_string(mc, realm, &other)?,
    };
    let message = match object_get(mc, realm, obj, "message")? {
        Value::Undefined => Vec::new(),
        other => to_js_string(mc, realm, &other)?,
    };
    if name.is_empty() {
        return Ok(Value::String(message));
    }
    if message.is_empty() {
        return Ok(Value::String(name));
    }
    let mut text = name;
    text.extend(utf8_to_utf16(": "));
    text.extend(message);
    Ok(Value::String(text))
}

/// Installs Error and the six native error constructors on the global object.
pub fn initialize_error_constructors<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>, global: &JSObjectDataPtr<'gc>) {
    let to_string = crate::js_function::create_native_function(mc, intrinsics.function_prototype, "toString", 0, error_prototype_to_string);
    define_builtin_property(mc, &intrinsics.error_prototype, "toString", &Value::Object(to_string));

    for kind in ErrorKind::ALL {
        let proto = intrinsics.error_prototype_for(kind);
        let ctor = create_native_constructor(mc, intrinsics.function_prototype, kind.name(), 1, error_constructor);
        define_frozen_property(mc, &ctor, "prototype", &Value::Object(proto));
        define_builtin_property(mc, &proto, "constructor", &Value::Object(ctor));
        define_builtin_property(mc, &proto, "name", &Value::from(kind.name()));
        define_builtin_property(mc, &proto, "message", &Value::from(""));
        define_builtin_property(mc, global, kind.name(), &Value::Object(ctor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Runtime, RuntimeConfig, get_property};

    #[test]
    fn native_error_prototype_chain() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let err = create_error(mc, realm, ErrorKind::TypeError, "bad");
            let proto = err.borrow().prototype.unwrap();
            assert!(crate::core::Gc::ptr_eq(proto, realm.intrinsics.type_error_prototype));
            let grand = proto.borrow().prototype.unwrap();
            assert!(crate::core::Gc::ptr_eq(grand, realm.intrinsics.error_prototype));
            assert!(matches!(object_get_key_value(&err, "name"), Some(Value::String(s)) if s == utf8_to_utf16("TypeError")));
            assert!(!get_property(&err, "message").unwrap().enumerable());
        });
    }

    #[test]
    fn faults_round_trip_through_language_values() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let thrown = EvalError::from(raise_type_error!("nope")).into_thrown(mc, realm);
            assert!(is_error(&thrown));
            match thrown_to_js_error(mc, realm, EvalError::Throw(thrown)) {
                JSError::TypeError { message } => assert_eq!(message, "nope"),
                other => panic!("Expected TypeError, got {:?}", other),
            }
            match thrown_to_js_error(mc, realm, EvalError::Throw(Value::Number(7.0))) {
                JSError::Throw { message } => assert_eq!(message, "7"),
                other => panic!("Expected Throw, got {:?}", other),
            }
        });
    }

    #[test]
    fn error_to_string_formats_name_and_message() {
        let rt = Runtime::new(RuntimeConfig::default());
        rt.with(|mc, realm| {
            let err = create_error(mc, realm, ErrorKind::RangeError, "too far");
            let text = to_js_string(mc, realm, &Value::Object(err)).unwrap();
            assert_eq!(utf16_to_utf8(&text), "RangeError: too far");
            let bare = create_error(mc, realm, ErrorKind::Error, "");
            let text = to_js_string(mc, realm, &Value::Object(bare)).unwrap();
            assert_eq!(utf16_to_utf8(&text), "Error");
        });
    }
}
