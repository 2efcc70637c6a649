use crate::core::{
    EvalError, Intrinsics, JSObjectDataPtr, MutationContext, ObjectKind, Realm, Value, argument, define_builtin_property, number_to_string,
    to_integer,
};
use crate::js_function::{NativeFn, create_native_function};
use crate::{raise_range_error, raise_type_error};

fn this_number_value<'gc>(this: &Value<'gc>, method: &str) -> Result<f64, EvalError<'gc>> {
    match this {
        Value::Number(n) => Ok(*n),
        Value::Object(obj) => match obj.borrow().kind {
            ObjectKind::Number(n) => Ok(n),
            _ => Err(raise_type_error!(format!("Number.prototype.{} requires that 'this' be a Number", method)).into()),
        },
        _ => Err(raise_type_error!(format!("Number.prototype.{} requires that 'this' be a Number", method)).into()),
    }
}

// Longest fraction expansion emitted for a non-decimal radix.
const MAX_FRACTION_DIGITS: usize = 52;

/// Renders a finite `n` in `radix` (2..=36, not 10).
pub(crate) fn number_to_radix_string(n: f64, radix: u32) -> String {
    if !n.is_finite() {
        return number_to_string(n);
    }
    let negative = n < 0.0;
    let n = n.abs();
    let mut integer = n.trunc();
    let mut fraction = n - integer;
    let base = radix as f64;

    let mut digits = Vec::new();
    loop {
        let digit = (integer % base) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        integer = (integer / base).trunc();
        if integer < 1.0 {
            break;
        }
    }
    if negative {
        digits.push('-');
    }
    let mut out: String = digits.iter().rev().collect();

    if fraction > 0.0 {
        out.push('.');
        let mut emitted = 0;
        while fraction > 0.0 && emitted < MAX_FRACTION_DIGITS {
            fraction *= base;
            let digit = fraction.trunc();
            out.push(std::char::from_digit(digit as u32, radix).unwrap_or('0'));
            fraction -= digit;
            emitted += 1;
        }
        let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed);
    }
    out
}

fn number_to_string_method<'gc>(
    mc: &MutationContext<'gc>,
    realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    let n = this_number_value(this, "toString")?;
    let radix = match argument(args, 0) {
        Value::Undefined => 10.0,
        r => to_integer(mc, realm, &r)?,
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(raise_range_error!("toString() radix must be between 2 and 36").into());
    }
    if radix == 10.0 {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(number_to_radix_string(n, radix as u32)))
}

fn number_value_of<'gc>(
    _mc: &MutationContext<'gc>,
    _realm: Realm<'gc>,
    _callee: JSObjectDataPtr<'gc>,
    this: &Value<'gc>,
    _args: &[Value<'gc>],
) -> Result<Value<'gc>, EvalError<'gc>> {
    Ok(Value::Number(this_number_value(this, "valueOf")?))
}

pub fn initialize_number<'gc>(mc: &MutationContext<'gc>, intrinsics: &Intrinsics<'gc>) {
    let methods: [(&'static str, usize, NativeFn); 2] = [("toString", 1, number_to_string_method), ("valueOf", 0, number_value_of)];
    for (name, length, call) in methods {
        let method = create_native_function(mc, intrinsics.function_prototype, name, length, call);
        define_builtin_property(mc, &intrinsics.number_prototype, name, &Value::Object(method));
    }
}
