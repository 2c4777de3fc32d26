//! Operators and type conversions on primitive values.

use crate::value::Primitive;
use ast::{BinaryOp, UnaryOp};
use atoms::JsWord;
use codegen::util::number_to_js_string;

pub fn to_number(p: &Primitive) -> f64 {
    match p {
        Primitive::Undefined => f64::NAN,
        Primitive::Null => 0.0,
        Primitive::Bool(b) => *b as u8 as f64,
        Primitive::Number(n) => *n,
        Primitive::String(s) => string_to_number(s),
    }
}

pub fn to_string(p: &Primitive) -> JsWord {
    match p {
        Primitive::Undefined => "undefined".into(),
        Primitive::Null => "null".into(),
        Primitive::Bool(b) => if *b { "true" } else { "false" }.into(),
        Primitive::Number(n) => number_to_js_string(*n).into(),
        Primitive::String(s) => s.clone(),
    }
}

pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    let n = n.trunc() % 4294967296.0;
    let n = if n < 0.0 { n + 4294967296.0 } else { n };
    n as u32
}

fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}' | '\u{000b}' | '\u{000c}' | ' ' | '\u{00a0}' | '\u{feff}'
    ) || matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
        || (c.is_whitespace() && c as u32 > 0x7f)
}

/// StringToNumber.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits.chars().try_fold(0.0, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN);
    }

    let (sign, unsigned) = match s.as_bytes()[0] {
        b'+' => (1.0, &s[1..]),
        b'-' => (-1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    // Anything else must be a plain decimal literal.
    if unsigned.is_empty()
        || !unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || unsigned == "."
    {
        return f64::NAN;
    }
    match lexical::parse::<f64, _>(unsigned) {
        Ok(n) => sign * n,
        Err(_) => f64::NAN,
    }
}

fn number(n: f64) -> Primitive {
    Primitive::Number(n)
}

/// Abstract equality between primitives.
pub fn loose_equals(a: &Primitive, b: &Primitive) -> bool {
    match (a, b) {
        (Primitive::Undefined | Primitive::Null, Primitive::Undefined | Primitive::Null) => true,
        (Primitive::Undefined | Primitive::Null, _) | (_, Primitive::Undefined | Primitive::Null) => {
            false
        }
        (Primitive::String(a), Primitive::String(b)) => a == b,
        (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
        _ => to_number(a) == to_number(b),
    }
}

/// Strict equality between primitives. Unlike SameValue, `NaN !== NaN` and
/// `0 === -0`.
pub fn strict_equals(a: &Primitive, b: &Primitive) -> bool {
    match (a, b) {
        (Primitive::Number(a), Primitive::Number(b)) => a == b,
        _ => a == b,
    }
}

/// `a < b`. `None` when either side is `NaN`.
fn less_than(a: &Primitive, b: &Primitive) -> Option<bool> {
    if let (Primitive::String(a), Primitive::String(b)) = (a, b) {
        // Strings compare by UTF-16 code units.
        return Some(a.encode_utf16().lt(b.encode_utf16()));
    }
    let (a, b) = (to_number(a), to_number(b));
    if a.is_nan() || b.is_nan() {
        None
    } else {
        Some(a < b)
    }
}

/// Evaluates a binary operator on primitive operands. `None` for operators
/// that need objects (`in`, `instanceof`) and for the logical operators,
/// which are not strict in their right operand.
pub fn binary(op: BinaryOp, a: &Primitive, b: &Primitive) -> Option<Primitive> {
    let result = match op {
        BinaryOp::EqEq => Primitive::Bool(loose_equals(a, b)),
        BinaryOp::NotEq => Primitive::Bool(!loose_equals(a, b)),
        BinaryOp::EqEqEq => Primitive::Bool(strict_equals(a, b)),
        BinaryOp::NotEqEq => Primitive::Bool(!strict_equals(a, b)),
        BinaryOp::Lt => Primitive::Bool(less_than(a, b).unwrap_or(false)),
        BinaryOp::Gt => Primitive::Bool(less_than(b, a).unwrap_or(false)),
        BinaryOp::LtEq => Primitive::Bool(less_than(b, a).map_or(false, |gt| !gt)),
        BinaryOp::GtEq => Primitive::Bool(less_than(a, b).map_or(false, |lt| !lt)),
        BinaryOp::Add => match (a, b) {
            (Primitive::String(_), _) | (_, Primitive::String(_)) => {
                let mut s = to_string(a).to_string();
                s.push_str(&to_string(b));
                Primitive::String(s.into())
            }
            _ => number(to_number(a) + to_number(b)),
        },
        BinaryOp::Sub => number(to_number(a) - to_number(b)),
        BinaryOp::Mul => number(to_number(a) * to_number(b)),
        BinaryOp::Div => number(to_number(a) / to_number(b)),
        BinaryOp::Mod => number(js_rem(to_number(a), to_number(b))),
        BinaryOp::LShift => {
            number(to_int32(to_number(a)).wrapping_shl(to_uint32(to_number(b)) & 31) as f64)
        }
        BinaryOp::RShift => {
            number(to_int32(to_number(a)).wrapping_shr(to_uint32(to_number(b)) & 31) as f64)
        }
        BinaryOp::ZeroFillRShift => {
            number(to_uint32(to_number(a)).wrapping_shr(to_uint32(to_number(b)) & 31) as f64)
        }
        BinaryOp::BitOr => number((to_int32(to_number(a)) | to_int32(to_number(b))) as f64),
        BinaryOp::BitXor => number((to_int32(to_number(a)) ^ to_int32(to_number(b))) as f64),
        BinaryOp::BitAnd => number((to_int32(to_number(a)) & to_int32(to_number(b))) as f64),
        BinaryOp::LogicalOr | BinaryOp::LogicalAnd | BinaryOp::In | BinaryOp::InstanceOf => {
            return None
        }
    };
    Some(result)
}

/// `%` keeps the sign of the dividend, like Rust's `%` on floats.
fn js_rem(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() || a.is_infinite() || b == 0.0 {
        return f64::NAN;
    }
    if b.is_infinite() {
        return a;
    }
    a % b
}

/// Evaluates a unary operator on a primitive operand. `delete` has no
/// meaning for primitives and gives `None`.
pub fn unary(op: UnaryOp, a: &Primitive) -> Option<Primitive> {
    Some(match op {
        UnaryOp::Minus => number(-to_number(a)),
        UnaryOp::Plus => number(to_number(a)),
        UnaryOp::Bang => Primitive::Bool(!a.truthy()),
        UnaryOp::Tilde => number(!to_int32(to_number(a)) as f64),
        UnaryOp::TypeOf => Primitive::String(a.type_of().into()),
        UnaryOp::Void => Primitive::Undefined,
        UnaryOp::Delete => return None,
    })
}

/// Parses a canonical array index ("0", "1", ... but not "01").
pub fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|i| *i != u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Primitive {
        Primitive::String(v.into())
    }

    fn n(v: f64) -> Primitive {
        Primitive::Number(v)
    }

    #[test]
    fn string_conversion() {
        assert_eq!(string_to_number(" 42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1f"), 31.0);
        assert_eq!(string_to_number("-1.5e2"), -150.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("0x").is_nan());
        assert!(string_to_number("inf").is_nan());
    }

    #[test]
    fn addition() {
        assert_eq!(binary(BinaryOp::Add, &n(1.0), &n(2.0)), Some(n(3.0)));
        assert_eq!(binary(BinaryOp::Add, &s("a"), &n(1.0)), Some(s("a1")));
        assert_eq!(
            binary(BinaryOp::Add, &Primitive::Null, &Primitive::Bool(true)),
            Some(n(1.0))
        );
        assert_eq!(
            binary(BinaryOp::Add, &s("x"), &Primitive::Undefined),
            Some(s("xundefined"))
        );
    }

    #[test]
    fn equality() {
        assert!(loose_equals(&Primitive::Null, &Primitive::Undefined));
        assert!(loose_equals(&s("1"), &n(1.0)));
        assert!(!loose_equals(&Primitive::Null, &n(0.0)));
        assert!(!strict_equals(&n(f64::NAN), &n(f64::NAN)));
        assert!(strict_equals(&n(0.0), &n(-0.0)));
    }

    #[test]
    fn comparison() {
        assert_eq!(binary(BinaryOp::Lt, &s("a"), &s("b")), Some(Primitive::Bool(true)));
        assert_eq!(binary(BinaryOp::Lt, &s("10"), &n(9.0)), Some(Primitive::Bool(false)));
        assert_eq!(
            binary(BinaryOp::GtEq, &n(f64::NAN), &n(1.0)),
            Some(Primitive::Bool(false))
        );
        assert_eq!(binary(BinaryOp::LtEq, &n(1.0), &n(1.0)), Some(Primitive::Bool(true)));
    }

    #[test]
    fn bitwise() {
        assert_eq!(binary(BinaryOp::BitOr, &n(4294967297.0), &n(0.0)), Some(n(1.0)));
        assert_eq!(binary(BinaryOp::ZeroFillRShift, &n(-1.0), &n(0.0)), Some(n(4294967295.0)));
        assert_eq!(binary(BinaryOp::RShift, &n(-8.0), &n(1.0)), Some(n(-4.0)));
        assert_eq!(unary(UnaryOp::Tilde, &n(0.0)), Some(n(-1.0)));
    }

    #[test]
    fn remainder() {
        assert_eq!(binary(BinaryOp::Mod, &n(-7.0), &n(3.0)), Some(n(-1.0)));
        assert_eq!(binary(BinaryOp::Mod, &n(7.0), &n(f64::INFINITY)), Some(n(7.0)));
        assert_eq!(binary(BinaryOp::Mod, &n(1.0), &n(0.0)), Some(n(f64::NAN)));
    }

    #[test]
    fn unary_ops() {
        assert_eq!(unary(UnaryOp::TypeOf, &Primitive::Null), Some(s("object")));
        assert_eq!(unary(UnaryOp::Minus, &s("3")), Some(n(-3.0)));
        assert_eq!(unary(UnaryOp::Bang, &s("")), Some(Primitive::Bool(true)));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(&*to_string(&n(1e21)), "1e+21");
        assert_eq!(&*to_string(&n(-0.0)), "0");
        assert_eq!(&*to_string(&n(0.5)), "0.5");
    }

    #[test]
    fn array_indices() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("12"), Some(12));
        assert_eq!(array_index("012"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("length"), None);
    }
}
