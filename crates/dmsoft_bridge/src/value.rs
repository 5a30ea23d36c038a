//! Native-side argument values and argument lists.

use std::fmt;

use dmsoft_symbol::{Direction, ValueKind};

use crate::error::MarshalError;

/// Opaque identifier handed out by the automation object (window handle,
/// remote address, picture id). The bridge never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RawHandle(pub i64);

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Handle(RawHandle),
}

impl ArgumentValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ArgumentValue::Int32(_) => ValueKind::Int32,
            ArgumentValue::Int64(_) => ValueKind::Int64,
            ArgumentValue::Float32(_) => ValueKind::Float32,
            ArgumentValue::Float64(_) => ValueKind::Float64,
            ArgumentValue::Text(_) => ValueKind::Text,
            ArgumentValue::Handle(_) => ValueKind::Handle,
        }
    }

    /// Zero value of `kind`, used to seed out-only slots.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int32 => ArgumentValue::Int32(0),
            ValueKind::Int64 => ArgumentValue::Int64(0),
            ValueKind::Float32 => ArgumentValue::Float32(0.0),
            ValueKind::Float64 => ArgumentValue::Float64(0.0),
            ValueKind::Text => ArgumentValue::Text(String::new()),
            ValueKind::Handle => ArgumentValue::Handle(RawHandle(0)),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgumentValue::Int32(v) => Some(i64::from(*v)),
            ArgumentValue::Int64(v) => Some(*v),
            ArgumentValue::Handle(h) => Some(h.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::Int32(v) => write!(f, "{v}"),
            ArgumentValue::Int64(v) => write!(f, "{v}"),
            ArgumentValue::Float32(v) => write!(f, "{v}"),
            ArgumentValue::Float64(v) => write!(f, "{v}"),
            ArgumentValue::Text(s) => write!(f, "{s:?}"),
            ArgumentValue::Handle(h) => write!(f, "{h}"),
        }
    }
}

macro_rules! impl_from_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ArgumentValue {
                fn from(value: $ty) -> Self {
                    ArgumentValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_native! {
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    &str => Text,
    &String => Text,
    RawHandle => Handle,
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Int32(i32::from(value))
    }
}

/// One argument together with the direction it is supplied in.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    In(ArgumentValue),
    /// Out-only; the kind picks the zero value the slot starts with.
    Out(ValueKind),
    InOut(ArgumentValue),
}

impl Arg {
    pub fn direction(&self) -> Direction {
        match self {
            Arg::In(_) => Direction::In,
            Arg::Out(_) => Direction::Out,
            Arg::InOut(_) => Direction::InOut,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Arg::In(value) | Arg::InOut(value) => value.kind(),
            Arg::Out(kind) => *kind,
        }
    }

    pub fn value(&self) -> Option<&ArgumentValue> {
        match self {
            Arg::In(value) | Arg::InOut(value) => Some(value),
            Arg::Out(_) => None,
        }
    }
}

/// Arguments of one call in natural (declared) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgList {
    args: Vec<Arg>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            args: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: impl Into<ArgumentValue>) -> &mut Self {
        self.args.push(Arg::In(value.into()));
        self
    }

    pub fn push_out(&mut self, kind: ValueKind) -> &mut Self {
        self.args.push(Arg::Out(kind));
        self
    }

    pub fn push_in_out(&mut self, value: impl Into<ArgumentValue>) -> &mut Self {
        self.args.push(Arg::InOut(value.into()));
        self
    }

    pub fn arg(mut self, value: impl Into<ArgumentValue>) -> Self {
        self.push(value);
        self
    }

    pub fn out(mut self, kind: ValueKind) -> Self {
        self.push_out(kind);
        self
    }

    pub fn in_out(mut self, value: impl Into<ArgumentValue>) -> Self {
        self.push_in_out(value);
        self
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.args.iter()
    }

    pub fn as_slice(&self) -> &[Arg] {
        &self.args
    }
}

impl<'a> IntoIterator for &'a ArgList {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

impl FromIterator<Arg> for ArgList {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

/// Conversion of a native value into a call argument list.
///
/// Implemented for scalars, which append a single input, and for tuples of
/// them.
pub trait IntoArgs {
    fn into_args(self, args: &mut ArgList);
}

impl IntoArgs for ArgList {
    fn into_args(self, args: &mut ArgList) {
        args.args.extend(self.args);
    }
}

impl IntoArgs for () {
    fn into_args(self, _args: &mut ArgList) {}
}

impl IntoArgs for Arg {
    fn into_args(self, args: &mut ArgList) {
        args.args.push(self);
    }
}

macro_rules! impl_into_args_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoArgs for $ty {
                fn into_args(self, args: &mut ArgList) {
                    args.push(self);
                }
            }
        )*
    };
}

impl_into_args_scalar!(i32, i64, f32, f64, bool, String, &str, &String, RawHandle, ArgumentValue);

macro_rules! impl_into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoArgs),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self, args: &mut ArgList) {
                let ($($name,)+) = self;
                $($name.into_args(args);)+
            }
        }
    };
}

impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
impl_into_args_tuple!(A, B, C, D, E, F, G);
impl_into_args_tuple!(A, B, C, D, E, F, G, H);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

impl ArgList {
    pub fn from_args(values: impl IntoArgs) -> Self {
        let mut args = ArgList::new();
        values.into_args(&mut args);
        args
    }
}

/// Conversion of a returned value into a native type.
pub trait FromValue: Sized {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError>;
}

fn mismatch(method: &str, expected: ValueKind, value: &ArgumentValue) -> MarshalError {
    MarshalError::Kind {
        method: method.to_string(),
        param: "return".to_string(),
        expected,
        found: value.kind(),
    }
}

impl FromValue for ArgumentValue {
    fn from_value(_method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        Ok(value)
    }
}

impl FromValue for i32 {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value {
            ArgumentValue::Int32(v) => Ok(v),
            ArgumentValue::Handle(h) => i32::try_from(h.0).map_err(|_| MarshalError::OutOfRange {
                method: method.to_string(),
                param: "return".to_string(),
                value: h.0,
                target: ValueKind::Int32,
            }),
            other => Err(mismatch(method, ValueKind::Int32, &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value.as_i64() {
            Some(v) => Ok(v),
            None => Err(mismatch(method, ValueKind::Int64, &value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value {
            ArgumentValue::Float32(v) => Ok(v),
            other => Err(mismatch(method, ValueKind::Float32, &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value {
            ArgumentValue::Float64(v) => Ok(v),
            ArgumentValue::Float32(v) => Ok(f64::from(v)),
            other => Err(mismatch(method, ValueKind::Float64, &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value {
            ArgumentValue::Text(s) => Ok(s),
            other => Err(mismatch(method, ValueKind::Text, &other)),
        }
    }
}

impl FromValue for RawHandle {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value.as_i64() {
            Some(v) => Ok(RawHandle(v)),
            None => Err(mismatch(method, ValueKind::Handle, &value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
        match value.as_i64() {
            Some(v) => Ok(v != 0),
            None => Err(mismatch(method, ValueKind::Int32, &value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_into_args_keeps_natural_order() {
        let args = ArgList::from_args((10, "pic.bmp", 0.9_f64, RawHandle(7)));
        let kinds: Vec<_> = args.iter().map(Arg::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValueKind::Int32,
                ValueKind::Text,
                ValueKind::Float64,
                ValueKind::Handle
            ]
        );
        assert!(args.iter().all(|arg| arg.direction() == Direction::In));
    }

    #[test]
    fn test_builder_directions() {
        let args = ArgList::new()
            .in_out(5)
            .out(ValueKind::Int32)
            .arg(true);
        let dirs: Vec<_> = args.iter().map(Arg::direction).collect();
        assert_eq!(dirs, vec![Direction::InOut, Direction::Out, Direction::In]);
        assert_eq!(args.as_slice()[2].value(), Some(&ArgumentValue::Int32(1)));
    }

    #[test]
    fn test_from_value_conversions() {
        assert_eq!(i64::from_value("m", ArgumentValue::Int32(-3)), Ok(-3));
        assert_eq!(
            RawHandle::from_value("m", ArgumentValue::Int32(0x1234)),
            Ok(RawHandle(0x1234))
        );
        assert!(String::from_value("m", ArgumentValue::Int32(1)).is_err());
        assert!(
            i32::from_value("m", ArgumentValue::Handle(RawHandle(i64::from(u32::MAX)))).is_err()
        );
    }
}
