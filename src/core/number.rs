// Numeric conversion helpers shared by the coercions and the operators

use crate::unicode::{is_js_whitespace, utf16_to_utf8};

const TWO_32: f64 = 2_i64.pow(32) as f64; // 2^32
const TWO_16: f64 = 65536.0;

/// ToInteger on a Number: NaN maps to +0, infinities are kept.
pub fn f64_to_integer(n: f64) -> f64 {
    if n.is_nan() {
        return 0.0;
    }
    if !n.is_finite() || n == 0.0 {
        return n;
    }
    n.trunc()
}

/// JS ToInt32 semantics for Number inputs
pub fn f64_to_int32(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let int = n.trunc();
    let int32bit = ((int % TWO_32) + TWO_32) % TWO_32;
    if int32bit >= TWO_32 / 2.0 {
        (int32bit - TWO_32) as i32
    } else {
        int32bit as i32
    }
}

/// JS ToUint32 semantics for Number inputs
pub fn f64_to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0_u32;
    }
    let int = n.trunc();
    let u = ((int % TWO_32) + TWO_32) % TWO_32;
    u as u32
}

/// JS ToUint16 semantics for Number inputs
pub fn f64_to_uint16(n: f64) -> u16 {
    if !n.is_finite() {
        return 0;
    }
    let int = n.trunc();
    (((int % TWO_16) + TWO_16) % TWO_16) as u16
}

/// ToString applied to a Number.
///
/// Rust's `{:e}` formatting yields the shortest digit string that round-trips,
/// which is exactly the `s`/`k`/`n` triple the language's rendering rules start from.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }
    if n.is_infinite() {
        return "Infinity".to_string();
    }

    let repr = format!("{:e}", n);
    let (mantissa, exponent) = match repr.split_once('e') {
        Some(parts) => parts,
        None => (repr.as_str(), "0"),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let exp = (n - 1).abs();
        if k == 1 {
            format!("{}e{}{}", digits, sign, exp)
        } else {
            format!("{}.{}e{}{}", &digits[..1], &digits[1..], sign, exp)
        }
    }
}

/// ToNumber applied to a String (the StringNumericLiteral grammar).
pub fn string_to_number(s: &[u16]) -> f64 {
    let text = utf16_to_utf8(s);
    let trimmed = text.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return parse_hex_digits(hex).unwrap_or(f64::NAN);
    }
    parse_decimal_literal(trimmed).unwrap_or(f64::NAN)
}

fn parse_hex_digits(digits: &str) -> Option<f64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if digits.len() <= 32 {
        return u128::from_str_radix(digits, 16).ok().map(|v| v as f64);
    }
    Some(
        digits
            .chars()
            .fold(0.0, |acc, c| acc * 16.0 + c.to_digit(16).unwrap_or(0) as f64),
    )
}

// StrDecimalLiteral: sign, "Infinity", or digits with optional fraction and exponent.
fn parse_decimal_literal(text: &str) -> Option<f64> {
    let (sign, body) = match text.as_bytes().first() {
        Some(b'+') => (1.0, &text[1..]),
        Some(b'-') => (-1.0, &text[1..]),
        _ => (1.0, text),
    };
    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    let bytes = body.as_bytes();
    let scan_digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = scan_digits(0);
    let int_digits = &body[..int_end];
    let mut i = int_end;
    let mut frac_digits = "";
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_end = scan_digits(i + 1);
        frac_digits = &body[i + 1..frac_end];
        i = frac_end;
    }
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent = "0";
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let exp_start = i + 1;
        let mut j = exp_start;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_end = scan_digits(j);
        if exp_end == j {
            return None;
        }
        exponent = &body[exp_start..exp_end];
        i = exp_end;
    }
    if i != bytes.len() {
        return None;
    }

    let canonical = format!(
        "{}.{}e{}",
        if int_digits.is_empty() { "0" } else { int_digits },
        if frac_digits.is_empty() { "0" } else { frac_digits },
        exponent
    );
    canonical.parse::<f64>().ok().map(|v| sign * v)
}
