use std::fmt;

/// Semantic type of a parameter or return value.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
    /// Opaque identifier handed out by the object; never interpreted.
    Handle,
}

impl ValueKind {
    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, ValueKind::Int32 | ValueKind::Int64 | ValueKind::Handle)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int32 => write!(f, "i32"),
            ValueKind::Int64 => write!(f, "i64"),
            ValueKind::Float32 => write!(f, "f32"),
            ValueKind::Float64 => write!(f, "f64"),
            ValueKind::Text => write!(f, "text"),
            ValueKind::Handle => write!(f, "handle"),
        }
    }
}

/// Which way a parameter's value flows across the call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

impl Direction {
    /// Whether the caller supplies a value.
    #[inline]
    pub fn carries_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    /// Whether the slot is read back after the call.
    #[inline]
    pub fn is_by_ref(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "in,out"),
        }
    }
}
