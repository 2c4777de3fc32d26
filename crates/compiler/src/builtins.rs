//! The built-in environment: which globals and built-in properties the
//! analysis knows about, and Rust implementations of the native functions it
//! may execute at compile time.
//!
//! Only allow-listed names are modelled. Everything else on a built-in object
//! resolves to unknown.

use crate::{
    heap::{ObjectClass, PropertyKnowledge},
    ops::{self, to_number, to_string},
    value::{Primitive, Value},
};
use std::f64::consts;

/// Identifies a built-in host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostId {
    ObjectPrototype,
    FunctionPrototype,
    ArrayPrototype,
    StringPrototype,
    NumberPrototype,
    BooleanPrototype,
    RegExpPrototype,
    Math,
    Console,
    Function(NativeFn),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFn {
    Object,
    Array,
    String,
    Number,
    Boolean,
    ParseInt,
    ParseFloat,
    IsNaN,
    IsFinite,
    StringFromCharCode,
    MathAbs,
    MathCeil,
    MathFloor,
    MathRound,
    MathTrunc,
    MathSign,
    MathSqrt,
    MathPow,
    MathMax,
    MathMin,
    StringCharAt,
    StringCharCodeAt,
    StringIndexOf,
    StringSlice,
    StringSubstring,
    StringToUpperCase,
    StringToLowerCase,
    StringTrim,
    NumberToString,
    NumberToFixed,
    ArrayPush,
    ArrayPop,
    ArrayReverse,
    ArrayJoin,
    ArrayIndexOf,
    ConsoleLog,
    ConsoleWarn,
    ConsoleError,
}

/// What calling a native function may do besides computing its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing. Safe to execute at compile time once every input is known.
    Pure,
    /// Changes its (array) receiver. Executed against a snapshot whose result
    /// is written back to the heap.
    MutatesReceiver,
    /// Observable outside the program, e.g. I/O. May run user code through
    /// the conversion of object arguments.
    Opaque,
}

/// The kind of `this` a native function operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Ignored,
    String,
    Number,
    Array,
}

impl NativeFn {
    pub fn effect(self) -> Effect {
        match self {
            NativeFn::ArrayPush | NativeFn::ArrayPop | NativeFn::ArrayReverse => {
                Effect::MutatesReceiver
            }
            // Constructing through these allocates objects that the analysis
            // doesn't model.
            NativeFn::Object
            | NativeFn::Array
            | NativeFn::ConsoleLog
            | NativeFn::ConsoleWarn
            | NativeFn::ConsoleError => Effect::Opaque,
            _ => Effect::Pure,
        }
    }

    pub fn receiver(self) -> Receiver {
        match self {
            NativeFn::StringCharAt
            | NativeFn::StringCharCodeAt
            | NativeFn::StringIndexOf
            | NativeFn::StringSlice
            | NativeFn::StringSubstring
            | NativeFn::StringToUpperCase
            | NativeFn::StringToLowerCase
            | NativeFn::StringTrim => Receiver::String,
            NativeFn::NumberToString | NativeFn::NumberToFixed => Receiver::Number,
            NativeFn::ArrayPush
            | NativeFn::ArrayPop
            | NativeFn::ArrayReverse
            | NativeFn::ArrayJoin
            | NativeFn::ArrayIndexOf => Receiver::Array,
            _ => Receiver::Ignored,
        }
    }
}

/// A value stored in a built-in binding or property.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Primitive(Primitive),
    Host(HostId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    /// Writable, configurable, not enumerable.
    Method,
    /// Read-only and not enumerable.
    Constant,
}

/// Description of a built-in object, materialized into the heap on demand.
#[derive(Debug)]
pub struct HostObject {
    pub class: ObjectClass,
    pub proto: Option<HostId>,
    pub knowledge: PropertyKnowledge,
    pub properties: Vec<(&'static str, HostValue, Attr)>,
}

fn num(n: f64) -> HostValue {
    HostValue::Primitive(Primitive::Number(n))
}

fn method(name: &'static str, f: NativeFn) -> (&'static str, HostValue, Attr) {
    (name, HostValue::Host(HostId::Function(f)), Attr::Method)
}

fn constant(name: &'static str, value: HostValue) -> (&'static str, HostValue, Attr) {
    (name, value, Attr::Constant)
}

/// The allow-listed global bindings.
pub fn global(name: &str) -> Option<HostValue> {
    Some(match name {
        "undefined" => HostValue::Primitive(Primitive::Undefined),
        "NaN" => num(f64::NAN),
        "Infinity" => num(f64::INFINITY),
        "Math" => HostValue::Host(HostId::Math),
        "console" => HostValue::Host(HostId::Console),
        "Object" => HostValue::Host(HostId::Function(NativeFn::Object)),
        "Array" => HostValue::Host(HostId::Function(NativeFn::Array)),
        "String" => HostValue::Host(HostId::Function(NativeFn::String)),
        "Number" => HostValue::Host(HostId::Function(NativeFn::Number)),
        "Boolean" => HostValue::Host(HostId::Function(NativeFn::Boolean)),
        "parseInt" => HostValue::Host(HostId::Function(NativeFn::ParseInt)),
        "parseFloat" => HostValue::Host(HostId::Function(NativeFn::ParseFloat)),
        "isNaN" => HostValue::Host(HostId::Function(NativeFn::IsNaN)),
        "isFinite" => HostValue::Host(HostId::Function(NativeFn::IsFinite)),
        _ => return None,
    })
}

pub fn host_object(host: HostId) -> HostObject {
    use NativeFn::*;

    let (class, proto, properties) = match host {
        HostId::ObjectPrototype => (ObjectClass::Object, None, vec![]),
        HostId::FunctionPrototype => (ObjectClass::Object, Some(HostId::ObjectPrototype), vec![]),
        HostId::ArrayPrototype => (
            ObjectClass::Array,
            Some(HostId::ObjectPrototype),
            vec![
                method("push", ArrayPush),
                method("pop", ArrayPop),
                method("reverse", ArrayReverse),
                method("join", ArrayJoin),
                method("indexOf", ArrayIndexOf),
            ],
        ),
        HostId::StringPrototype => (
            ObjectClass::String,
            Some(HostId::ObjectPrototype),
            vec![
                method("charAt", StringCharAt),
                method("charCodeAt", StringCharCodeAt),
                method("indexOf", StringIndexOf),
                method("slice", StringSlice),
                method("substring", StringSubstring),
                method("toUpperCase", StringToUpperCase),
                method("toLowerCase", StringToLowerCase),
                method("trim", StringTrim),
            ],
        ),
        HostId::NumberPrototype => (
            ObjectClass::Number,
            Some(HostId::ObjectPrototype),
            vec![method("toString", NumberToString), method("toFixed", NumberToFixed)],
        ),
        HostId::BooleanPrototype => (ObjectClass::Boolean, Some(HostId::ObjectPrototype), vec![]),
        HostId::RegExpPrototype => (ObjectClass::Object, Some(HostId::ObjectPrototype), vec![]),
        HostId::Math => (
            ObjectClass::Object,
            Some(HostId::ObjectPrototype),
            vec![
                constant("PI", num(consts::PI)),
                constant("E", num(consts::E)),
                constant("LN2", num(consts::LN_2)),
                constant("LN10", num(consts::LN_10)),
                constant("LOG2E", num(consts::LOG2_E)),
                constant("LOG10E", num(consts::LOG10_E)),
                constant("SQRT2", num(consts::SQRT_2)),
                constant("SQRT1_2", num(consts::FRAC_1_SQRT_2)),
                method("abs", MathAbs),
                method("ceil", MathCeil),
                method("floor", MathFloor),
                method("round", MathRound),
                method("trunc", MathTrunc),
                method("sign", MathSign),
                method("sqrt", MathSqrt),
                method("pow", MathPow),
                method("max", MathMax),
                method("min", MathMin),
            ],
        ),
        HostId::Console => (
            ObjectClass::Object,
            Some(HostId::ObjectPrototype),
            vec![
                method("log", ConsoleLog),
                method("warn", ConsoleWarn),
                method("error", ConsoleError),
            ],
        ),
        HostId::Function(f) => {
            let mut properties = vec![];
            let prototype = match f {
                Object => Some(HostId::ObjectPrototype),
                Array => Some(HostId::ArrayPrototype),
                String => Some(HostId::StringPrototype),
                Number => Some(HostId::NumberPrototype),
                Boolean => Some(HostId::BooleanPrototype),
                _ => None,
            };
            if let Some(prototype) = prototype {
                properties.push(constant("prototype", HostValue::Host(prototype)));
            }
            match f {
                String => properties.push(method("fromCharCode", StringFromCharCode)),
                Number => {
                    properties.push(constant("MAX_VALUE", num(f64::MAX)));
                    properties.push(constant("MIN_VALUE", num(5e-324)));
                    properties.push(constant("POSITIVE_INFINITY", num(f64::INFINITY)));
                    properties.push(constant("NEGATIVE_INFINITY", num(f64::NEG_INFINITY)));
                    properties.push(constant("MAX_SAFE_INTEGER", num(9007199254740991.0)));
                    properties.push(constant("NaN", num(f64::NAN)));
                }
                _ => {}
            }
            (
                ObjectClass::Function(Some(crate::heap::FunctionLink::Native(f))),
                Some(HostId::FunctionPrototype),
                properties,
            )
        }
    };

    HostObject {
        class,
        proto,
        // Built-ins have more properties than the allow-list names, but none
        // of them are enumerable.
        knowledge: PropertyKnowledge::NoUnknownOverrideOrEnumerable,
        properties,
    }
}

fn arg(args: &[Primitive], i: usize) -> &Primitive {
    args.get(i).unwrap_or(&Primitive::Undefined)
}

/// ToIntegerOrInfinity.
fn to_integer(p: &Primitive) -> f64 {
    let n = to_number(p);
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

fn string(s: impl Into<atoms::JsWord>) -> Primitive {
    Primitive::String(s.into())
}

fn utf16_string(units: &[u16]) -> Option<Primitive> {
    String::from_utf16(units).ok().map(string)
}

/// Clamps a relative index the way `slice` does.
fn relative_index(p: &Primitive, len: usize, default: f64) -> usize {
    let n = if matches!(p, Primitive::Undefined) {
        default
    } else {
        to_integer(p)
    };
    let len = len as f64;
    let i = if n < 0.0 { (len + n).max(0.0) } else { n.min(len) };
    i as usize
}

/// Executes a pure native function on known primitive inputs. `None` when the
/// function isn't pure, the receiver is of the wrong kind, or the result is
/// one the analysis can't reproduce exactly.
pub fn call_pure(f: NativeFn, this: &Primitive, args: &[Primitive]) -> Option<Primitive> {
    use NativeFn::*;

    if f.effect() != Effect::Pure {
        return None;
    }

    let number = |n: f64| Some(Primitive::Number(n));
    let math = |op: fn(f64) -> f64| Some(Primitive::Number(op(to_number(arg(args, 0)))));

    match f {
        String => Some(match args.first() {
            Some(a) => string(to_string(a)),
            None => string(""),
        }),
        Number => number(args.first().map_or(0.0, to_number)),
        Boolean => Some(Primitive::Bool(arg(args, 0).truthy())),
        ParseInt => number(parse_int(&to_string(arg(args, 0)), arg(args, 1))),
        ParseFloat => number(parse_float(&to_string(arg(args, 0)))),
        IsNaN => Some(Primitive::Bool(to_number(arg(args, 0)).is_nan())),
        IsFinite => Some(Primitive::Bool(to_number(arg(args, 0)).is_finite())),
        StringFromCharCode => {
            let units: Vec<u16> = args.iter().map(|a| ops::to_uint32(to_number(a)) as u16).collect();
            utf16_string(&units)
        }
        MathAbs => math(f64::abs),
        MathCeil => math(f64::ceil),
        MathFloor => math(f64::floor),
        MathRound => math(js_round),
        MathTrunc => math(f64::trunc),
        MathSign => math(|n| if n == 0.0 || n.is_nan() { n } else { n.signum() }),
        MathSqrt => math(f64::sqrt),
        MathPow => number(js_pow(to_number(arg(args, 0)), to_number(arg(args, 1)))),
        MathMax => number(args.iter().map(to_number).fold(f64::NEG_INFINITY, |acc, n| {
            if acc.is_nan() || n.is_nan() {
                f64::NAN
            } else if n > acc || (n == 0.0 && acc == 0.0 && acc.is_sign_negative()) {
                n
            } else {
                acc
            }
        })),
        MathMin => number(args.iter().map(to_number).fold(f64::INFINITY, |acc, n| {
            if acc.is_nan() || n.is_nan() {
                f64::NAN
            } else if n < acc || (n == 0.0 && acc == 0.0 && n.is_sign_negative()) {
                n
            } else {
                acc
            }
        })),
        StringCharAt | StringCharCodeAt | StringIndexOf | StringSlice | StringSubstring
        | StringToUpperCase | StringToLowerCase | StringTrim => {
            let s = match this {
                Primitive::String(s) => s,
                _ => return None,
            };
            call_string_method(f, s, args)
        }
        NumberToString => {
            let n = match this {
                Primitive::Number(n) => *n,
                _ => return None,
            };
            match arg(args, 0) {
                Primitive::Undefined => Some(string(to_string(this))),
                radix if to_number(radix) == 10.0 => Some(string(to_string(this))),
                _ => {
                    let _ = n;
                    None
                }
            }
        }
        NumberToFixed => {
            let n = match this {
                Primitive::Number(n) => *n,
                _ => return None,
            };
            to_fixed(n, to_integer(arg(args, 0))).map(string)
        }
        _ => None,
    }
}

fn call_string_method(f: NativeFn, s: &str, args: &[Primitive]) -> Option<Primitive> {
    use NativeFn::*;

    let units: Vec<u16> = s.encode_utf16().collect();
    let len = units.len();
    match f {
        StringCharAt | StringCharCodeAt => {
            let pos = to_integer(arg(args, 0));
            let unit = if pos >= 0.0 && pos < len as f64 {
                Some(units[pos as usize])
            } else {
                None
            };
            match (f, unit) {
                (StringCharAt, Some(u)) => utf16_string(&[u]),
                (StringCharAt, None) => Some(string("")),
                (_, Some(u)) => Some(Primitive::Number(u as f64)),
                (_, None) => Some(Primitive::Number(f64::NAN)),
            }
        }
        StringIndexOf => {
            let search: Vec<u16> = to_string(arg(args, 0)).encode_utf16().collect();
            let from = to_integer(arg(args, 1)).max(0.0).min(len as f64) as usize;
            let found = (from..=len)
                .find(|&i| units[i..].starts_with(&search))
                .map_or(-1.0, |i| i as f64);
            Some(Primitive::Number(found))
        }
        StringSlice => {
            let start = relative_index(arg(args, 0), len, 0.0);
            let end = relative_index(arg(args, 1), len, len as f64);
            utf16_string(if start < end { &units[start..end] } else { &[] })
        }
        StringSubstring => {
            let clamp = |p: &Primitive, default: f64| {
                let n = if matches!(p, Primitive::Undefined) {
                    default
                } else {
                    to_integer(p)
                };
                n.max(0.0).min(len as f64) as usize
            };
            let a = clamp(arg(args, 0), 0.0);
            let b = clamp(arg(args, 1), len as f64);
            utf16_string(&units[a.min(b)..a.max(b)])
        }
        StringToUpperCase => Some(string(s.to_uppercase())),
        StringToLowerCase => Some(string(s.to_lowercase())),
        StringTrim => Some(string(s.trim_matches(|c: char| {
            c.is_whitespace() || c == '\u{feff}'
        }))),
        _ => None,
    }
}

/// Result of running an array method against a snapshot of its receiver.
#[derive(Debug, PartialEq)]
pub enum ArrayCallResult {
    Value(Value),
    /// The method returns its receiver.
    This,
}

/// Executes an array method on the elements of a fully known array. The
/// elements are updated in place for methods that mutate their receiver.
pub fn call_array(f: NativeFn, elems: &mut Vec<Value>, args: &[Value]) -> Option<ArrayCallResult> {
    use NativeFn::*;

    let known_primitives = |values: &[Value]| -> Option<Vec<Primitive>> {
        values.iter().map(|v| v.as_primitive().cloned()).collect()
    };

    Some(match f {
        ArrayPush => {
            elems.extend(args.iter().cloned());
            ArrayCallResult::Value(Value::number(elems.len() as f64))
        }
        ArrayPop => ArrayCallResult::Value(elems.pop().unwrap_or(Value::UNDEFINED)),
        ArrayReverse => {
            elems.reverse();
            ArrayCallResult::This
        }
        ArrayJoin => {
            let sep = match args.first() {
                None => ",".into(),
                Some(v) => match v.as_primitive()? {
                    Primitive::Undefined => ",".into(),
                    p => to_string(p),
                },
            };
            let parts = known_primitives(elems)?;
            let joined = parts
                .iter()
                .map(|p| {
                    if p.is_nullish() {
                        std::string::String::new()
                    } else {
                        to_string(p).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(&*sep);
            ArrayCallResult::Value(Value::string(joined))
        }
        ArrayIndexOf => {
            let search = args.first().map_or(Some(Primitive::Undefined), |v| {
                v.as_primitive().cloned()
            })?;
            let parts = known_primitives(elems)?;
            let found = parts
                .iter()
                .position(|p| ops::strict_equals(p, &search))
                .map_or(-1.0, |i| i as f64);
            ArrayCallResult::Value(Value::number(found))
        }
        _ => return None,
    })
}

fn js_round(n: f64) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return n;
    }
    let floor = n.floor();
    let rounded = if n - floor >= 0.5 { floor + 1.0 } else { floor };
    if rounded == 0.0 && n < 0.0 {
        -0.0
    } else {
        rounded
    }
}

fn js_pow(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exp)
}

fn parse_int(s: &str, radix: &Primitive) -> f64 {
    let s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let (sign, mut s) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let mut radix = ops::to_int32(to_number(radix));
    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return f64::NAN;
        }
        strip_prefix = radix == 16;
    } else {
        radix = 10;
    }
    if strip_prefix && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
        radix = 16;
    }
    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix as u32)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    sign * digits
        .iter()
        .fold(0.0, |acc, d| acc * radix as f64 + *d as f64)
}

fn parse_float(s: &str) -> f64 {
    let s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if has_digits || frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return f64::NAN;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    ops::string_to_number(&s[..end])
}

fn to_fixed(n: f64, digits: f64) -> Option<String> {
    if !(0.0..=20.0).contains(&digits) {
        return None;
    }
    if n.is_nan() {
        return Some("NaN".into());
    }
    if n.abs() >= 1e21 {
        return Some(to_string(&Primitive::Number(n)).to_string());
    }
    let digits = digits as usize;
    let scaled = n.abs() * 10f64.powi(digits as i32);
    // Exact ties round differently in Rust's formatter, leave them alone.
    if scaled - scaled.trunc() == 0.5 {
        return None;
    }
    let s = format!("{:.*}", digits, n.abs());
    Some(if n < 0.0 && s.bytes().any(|b| b != b'0' && b != b'.') {
        format!("-{}", s)
    } else {
        s
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> Primitive {
        Primitive::Number(v)
    }

    fn s(v: &str) -> Primitive {
        Primitive::String(v.into())
    }

    fn call(f: NativeFn, args: &[Primitive]) -> Option<Primitive> {
        call_pure(f, &Primitive::Undefined, args)
    }

    #[test]
    fn math() {
        assert_eq!(call(NativeFn::MathRound, &[n(2.5)]), Some(n(3.0)));
        assert_eq!(call(NativeFn::MathRound, &[n(-2.5)]), Some(n(-2.0)));
        assert_eq!(call(NativeFn::MathRound, &[n(-0.4)]), Some(n(-0.0)));
        assert_eq!(call(NativeFn::MathMax, &[n(1.0), n(3.0), n(2.0)]), Some(n(3.0)));
        assert_eq!(call(NativeFn::MathMax, &[]), Some(n(f64::NEG_INFINITY)));
        assert_eq!(call(NativeFn::MathMin, &[n(1.0), n(f64::NAN)]), Some(n(f64::NAN)));
        assert_eq!(call(NativeFn::MathPow, &[n(2.0), n(10.0)]), Some(n(1024.0)));
        assert_eq!(call(NativeFn::MathPow, &[n(1.0), n(f64::NAN)]), Some(n(f64::NAN)));
        assert_eq!(call(NativeFn::MathSign, &[n(-3.0)]), Some(n(-1.0)));
    }

    #[test]
    fn conversions() {
        assert_eq!(call(NativeFn::ParseInt, &[s("  42px")]), Some(n(42.0)));
        assert_eq!(call(NativeFn::ParseInt, &[s("0x1A")]), Some(n(26.0)));
        assert_eq!(call(NativeFn::ParseInt, &[s("101"), n(2.0)]), Some(n(5.0)));
        assert_eq!(call(NativeFn::ParseInt, &[s("z")]), Some(n(f64::NAN)));
        assert_eq!(call(NativeFn::ParseFloat, &[s("3.25e1abc")]), Some(n(32.5)));
        assert_eq!(call(NativeFn::ParseFloat, &[s("-Infinityx")]), Some(n(f64::NEG_INFINITY)));
        assert_eq!(call(NativeFn::String, &[n(1.5)]), Some(s("1.5")));
        assert_eq!(call(NativeFn::Number, &[]), Some(n(0.0)));
        assert_eq!(call(NativeFn::IsNaN, &[s("abc")]), Some(Primitive::Bool(true)));
    }

    #[test]
    fn string_methods() {
        let this = s("Hello");
        let call = |f, args: &[Primitive]| call_pure(f, &this, args);
        assert_eq!(call(NativeFn::StringCharAt, &[n(1.0)]), Some(s("e")));
        assert_eq!(call(NativeFn::StringCharAt, &[n(9.0)]), Some(s("")));
        assert_eq!(call(NativeFn::StringCharCodeAt, &[]), Some(n(72.0)));
        assert_eq!(call(NativeFn::StringIndexOf, &[s("l")]), Some(n(2.0)));
        assert_eq!(call(NativeFn::StringIndexOf, &[s("x")]), Some(n(-1.0)));
        assert_eq!(call(NativeFn::StringSlice, &[n(-3.0)]), Some(s("llo")));
        assert_eq!(call(NativeFn::StringSubstring, &[n(3.0), n(1.0)]), Some(s("el")));
        assert_eq!(call(NativeFn::StringToUpperCase, &[]), Some(s("HELLO")));
        assert_eq!(call_pure(NativeFn::StringCharAt, &n(1.0), &[]), None);
    }

    #[test]
    fn number_methods() {
        assert_eq!(call_pure(NativeFn::NumberToFixed, &n(1.005), &[n(1.0)]), Some(s("1.0")));
        assert_eq!(call_pure(NativeFn::NumberToFixed, &n(-1.25), &[n(1.0)]), None);
        assert_eq!(call_pure(NativeFn::NumberToFixed, &n(3.14159), &[n(2.0)]), Some(s("3.14")));
        assert_eq!(call_pure(NativeFn::NumberToString, &n(255.0), &[]), Some(s("255")));
    }

    #[test]
    fn impure_natives_are_not_executed() {
        assert_eq!(call(NativeFn::ConsoleLog, &[n(1.0)]), None);
        assert_eq!(call(NativeFn::ArrayPush, &[n(1.0)]), None);
    }

    #[test]
    fn array_methods() {
        let mut elems = vec![Value::number(1.0), Value::string("a")];
        assert_eq!(
            call_array(NativeFn::ArrayPush, &mut elems, &[Value::UNDEFINED]),
            Some(ArrayCallResult::Value(Value::number(3.0)))
        );
        assert_eq!(
            call_array(NativeFn::ArrayJoin, &mut elems, &[Value::string("-")]),
            Some(ArrayCallResult::Value(Value::string("1-a-")))
        );
        assert_eq!(
            call_array(NativeFn::ArrayReverse, &mut elems, &[]),
            Some(ArrayCallResult::This)
        );
        assert_eq!(elems[0], Value::UNDEFINED);
        assert_eq!(
            call_array(NativeFn::ArrayIndexOf, &mut elems, &[Value::number(1.0)]),
            Some(ArrayCallResult::Value(Value::number(2.0)))
        );
        assert_eq!(
            call_array(NativeFn::ArrayPop, &mut elems, &[]),
            Some(ArrayCallResult::Value(Value::number(1.0)))
        );

        let mut unknown = vec![Value::Unknown];
        assert_eq!(call_array(NativeFn::ArrayJoin, &mut unknown, &[]), None);
    }
}
