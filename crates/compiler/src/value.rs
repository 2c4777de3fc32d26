//! The value lattice: what is known about the runtime value of an
//! expression.
//!
//! A [`Value`] is either exactly one [`Single`] value, one of a small finite
//! set of them, or [`Value::Unknown`]. All operations are total; "don't know"
//! is always expressed as `Unknown`.

use atoms::JsWord;
use std::{
    fmt,
    hash::{Hash, Hasher},
    slice,
};

/// Sets larger than this collapse to [`Value::Unknown`], which bounds the
/// height of the lattice and so the number of loop iterations needed to reach
/// a fixed point.
pub const MAX_SET_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(JsWord),
}

/// SameValue: `NaN` equals `NaN`, `+0` and `-0` differ.
impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Undefined, Primitive::Undefined) | (Primitive::Null, Primitive::Null) => {
                true
            }
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Number(a), Primitive::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Primitive::String(a), Primitive::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Primitive::Undefined | Primitive::Null => {}
            Primitive::Bool(b) => b.hash(state),
            Primitive::Number(n) if n.is_nan() => f64::NAN.to_bits().hash(state),
            Primitive::Number(n) => n.to_bits().hash(state),
            Primitive::String(s) => s.hash(state),
        }
    }
}

impl Primitive {
    /// ToBoolean.
    pub fn truthy(&self) -> bool {
        match self {
            Primitive::Undefined | Primitive::Null => false,
            Primitive::Bool(b) => *b,
            Primitive::Number(n) => *n != 0.0 && !n.is_nan(),
            Primitive::String(s) => !s.is_empty(),
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Primitive::Undefined | Primitive::Null)
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Primitive::Undefined => "undefined",
            Primitive::Null => "object",
            Primitive::Bool(_) => "boolean",
            Primitive::Number(_) => "number",
            Primitive::String(_) => "string",
        }
    }
}

/// Handle to an abstract heap object. Equality is identity of the allocation
/// site, not of a single runtime object: a site inside a loop stands for every
/// object it allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference(u32);

impl Reference {
    pub(crate) fn from_index(index: usize) -> Self {
        Reference(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Single {
    Primitive(Primitive),
    Reference(Reference),
}

impl Single {
    pub fn truthy(&self) -> bool {
        match self {
            Single::Primitive(p) => p.truthy(),
            Single::Reference(_) => true,
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Single::Primitive(p) => Some(p),
            Single::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<Reference> {
        match self {
            Single::Reference(r) => Some(*r),
            Single::Primitive(_) => None,
        }
    }
}

/// Two or more distinct single values. Never nested, never holds duplicates.
#[derive(Debug, Clone)]
pub struct FiniteSet(Vec<Single>);

impl FiniteSet {
    pub fn iter(&self) -> slice::Iter<'_, Single> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Order insensitive.
impl PartialEq for FiniteSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|s| other.0.contains(s))
    }
}

impl Eq for FiniteSet {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Single(Single),
    Set(FiniteSet),
    Unknown,
}

impl Value {
    pub const UNDEFINED: Value = Value::Single(Single::Primitive(Primitive::Undefined));
    pub const NULL: Value = Value::Single(Single::Primitive(Primitive::Null));

    pub fn number(n: f64) -> Value {
        Primitive::Number(n).into()
    }

    pub fn string(s: impl Into<JsWord>) -> Value {
        Primitive::String(s.into()).into()
    }

    pub fn bool(b: bool) -> Value {
        Primitive::Bool(b).into()
    }

    /// Builds the least value containing all of `singles`, deduplicating and
    /// collapsing a set of one to the bare value. No values at all, and more
    /// than [`MAX_SET_SIZE`] distinct ones, both give `Unknown`.
    pub fn from_singles<I>(singles: I) -> Value
    where
        I: IntoIterator<Item = Single>,
    {
        let mut out: Vec<Single> = Vec::new();
        for single in singles {
            if out.contains(&single) {
                continue;
            }
            if out.len() == MAX_SET_SIZE {
                return Value::Unknown;
            }
            out.push(single);
        }
        match out.len() {
            0 => Value::Unknown,
            1 => Value::Single(out.remove(0)),
            _ => Value::Set(FiniteSet(out)),
        }
    }

    /// Least upper bound.
    pub fn or(&self, other: &Value) -> Value {
        match (self.singles(), other.singles()) {
            (Some(a), Some(b)) => {
                if self == other {
                    return self.clone();
                }
                Value::from_singles(a.iter().chain(b).cloned())
            }
            _ => Value::Unknown,
        }
    }

    /// Applies `f` to every single value and unions the results.
    pub fn map<F>(&self, mut f: F) -> Value
    where
        F: FnMut(&Single) -> Value,
    {
        let singles = match self.singles() {
            Some(singles) => singles,
            None => return Value::Unknown,
        };
        let mut out = Vec::new();
        for single in singles {
            match f(single) {
                Value::Unknown => return Value::Unknown,
                v => out.extend(v.singles().into_iter().flatten().cloned()),
            }
        }
        Value::from_singles(out)
    }

    /// Combines every pair of single values of `self` and `other`, e.g. the
    /// operands of a binary operator.
    pub fn product<F>(&self, other: &Value, mut f: F) -> Value
    where
        F: FnMut(&Single, &Single) -> Value,
    {
        match other.singles() {
            Some(right) => self.map(|l| {
                let mut acc: Option<Value> = None;
                for r in right {
                    let v = f(l, r);
                    acc = Some(match acc {
                        Some(acc) => acc.or(&v),
                        None => v,
                    });
                }
                acc.unwrap_or(Value::Unknown)
            }),
            None => Value::Unknown,
        }
    }

    /// Keeps the single values matching `f`.
    pub fn filter<F>(&self, mut f: F) -> Value
    where
        F: FnMut(&Single) -> bool,
    {
        match self.singles() {
            Some(singles) => Value::from_singles(singles.iter().filter(|s| f(s)).cloned()),
            None => Value::Unknown,
        }
    }

    /// The possible single values, or `None` for `Unknown`.
    pub fn singles(&self) -> Option<&[Single]> {
        match self {
            Value::Single(s) => Some(slice::from_ref(s)),
            Value::Set(set) => Some(&set.0),
            Value::Unknown => None,
        }
    }

    pub fn as_single(&self) -> Option<&Single> {
        match self {
            Value::Single(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        self.as_single().and_then(Single::as_primitive)
    }

    pub fn as_reference(&self) -> Option<Reference> {
        self.as_single().and_then(Single::as_reference)
    }

    /// Whether every possible value is a primitive.
    pub fn is_primitive(&self) -> bool {
        self.singles()
            .map_or(false, |s| s.iter().all(|s| s.as_primitive().is_some()))
    }

    pub fn references(&self) -> impl Iterator<Item = Reference> + '_ {
        self.singles()
            .into_iter()
            .flatten()
            .filter_map(Single::as_reference)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// `Some` when every possible value converts to the same boolean.
    pub fn truthiness(&self) -> Option<bool> {
        let singles = self.singles()?;
        let first = singles.first()?.truthy();
        if singles.iter().all(|s| s.truthy() == first) {
            Some(first)
        } else {
            None
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Value::Single(Single::Primitive(p))
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Single(Single::Reference(r))
    }
}

impl From<Single> for Value {
    fn from(s: Single) -> Self {
        Value::Single(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::number(n)
    }

    fn samples() -> Vec<Value> {
        vec![
            num(1.0),
            num(2.0),
            Value::string("a"),
            Value::UNDEFINED,
            Value::from(Reference(3)),
            num(1.0).or(&Value::string("b")),
            Value::Unknown,
        ]
    }

    #[test]
    fn or_is_idempotent() {
        for a in samples() {
            assert_eq!(a.or(&a), a);
        }
    }

    #[test]
    fn or_is_commutative() {
        for a in samples() {
            for b in samples() {
                assert_eq!(a.or(&b), b.or(&a));
            }
        }
    }

    #[test]
    fn or_is_associative() {
        for a in samples() {
            for b in samples() {
                for c in samples() {
                    assert_eq!(a.or(&b).or(&c), a.or(&b.or(&c)));
                }
            }
        }
    }

    #[test]
    fn unknown_absorbs() {
        for a in samples() {
            assert_eq!(Value::Unknown.or(&a), Value::Unknown);
            assert_eq!(a.or(&Value::Unknown), Value::Unknown);
        }
        assert_eq!(Value::Unknown.map(|s| Value::from(s.clone())), Value::Unknown);
    }

    #[test]
    fn map_distributes_over_or() {
        let f = |s: &Single| match s {
            Single::Primitive(Primitive::Number(n)) => num(n * 2.0),
            _ => Value::string("x"),
        };
        for a in samples() {
            for b in samples() {
                assert_eq!(a.or(&b).map(f), a.map(f).or(&b.map(f)));
            }
        }
    }

    #[test]
    fn duplicates_collapse() {
        let v = Value::from_singles(vec![
            Single::Primitive(Primitive::Number(1.0)),
            Single::Primitive(Primitive::Number(1.0)),
        ]);
        assert_eq!(v, num(1.0));

        let v = num(1.0).or(&num(2.0)).or(&num(1.0));
        assert_eq!(v.singles().map(<[_]>::len), Some(2));
    }

    #[test]
    fn sets_are_unordered_and_flat() {
        let a = num(1.0).or(&num(2.0));
        let b = num(2.0).or(&num(1.0));
        assert_eq!(a, b);

        let nested = a.or(&b.or(&num(3.0)));
        match nested {
            Value::Set(set) => assert_eq!(set.len(), 3),
            v => panic!("expected a set, got {:?}", v),
        }
    }

    #[test]
    fn large_sets_become_unknown() {
        let mut v = num(0.0);
        for i in 1..MAX_SET_SIZE {
            v = v.or(&num(i as f64));
        }
        assert!(!v.is_unknown());
        assert!(v.or(&num(100.0)).is_unknown());
    }

    #[test]
    fn same_value_equality() {
        assert_eq!(num(f64::NAN), num(f64::NAN));
        assert_ne!(num(0.0), num(-0.0));
        assert_eq!(num(0.0).or(&num(-0.0)).singles().map(<[_]>::len), Some(2));
    }

    #[test]
    fn product_combines_pairs() {
        let a = num(1.0).or(&num(2.0));
        let b = num(10.0).or(&num(20.0));
        let sum = a.product(&b, |l, r| match (l, r) {
            (
                Single::Primitive(Primitive::Number(l)),
                Single::Primitive(Primitive::Number(r)),
            ) => num(l + r),
            _ => Value::Unknown,
        });
        let expected = Value::from_singles(
            [11.0, 21.0, 12.0, 22.0]
                .iter()
                .map(|n| Single::Primitive(Primitive::Number(*n))),
        );
        assert_eq!(sum, expected);
    }

    #[test]
    fn truthiness() {
        assert_eq!(num(1.0).or(&Value::string("a")).truthiness(), Some(true));
        assert_eq!(num(0.0).or(&Value::UNDEFINED).truthiness(), Some(false));
        assert_eq!(num(0.0).or(&num(1.0)).truthiness(), None);
        assert_eq!(Value::from(Reference(0)).truthiness(), Some(true));
        assert_eq!(Value::Unknown.truthiness(), None);
    }
}
