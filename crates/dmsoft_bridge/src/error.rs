use dmsoft_symbol::{Direction, TableError, ValueKind};
use thiserror::Error;

use crate::resources::{ResourceKey, ResourceKind};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by the automation object itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code:#010x})")]
pub struct ForeignError {
    pub code: i32,
    pub message: String,
}

impl ForeignError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("automation object has not been acquired")]
    NotAcquired,
    #[error("automation handle has been released")]
    Released,
    #[error("cannot instantiate `{prog_id}`: {source}")]
    Instantiate {
        prog_id: String,
        #[source]
        source: ForeignError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarshalError {
    #[error("`{method}` takes {expected} argument(s), {found} supplied")]
    Arity {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("`{method}` parameter `{param}` expects {expected}, got {found}")]
    Kind {
        method: String,
        param: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("`{method}` parameter `{param}` is declared [{expected}], supplied as [{found}]")]
    Direction {
        method: String,
        param: String,
        expected: Direction,
        found: Direction,
    },
    #[error("`{method}` parameter `{param}`: {value} does not fit in {target}")]
    OutOfRange {
        method: String,
        param: String,
        value: i64,
        target: ValueKind,
    },
    #[error("`{method}` returned {found} where {expected} was declared")]
    UnexpectedVariant {
        method: String,
        expected: ValueKind,
        found: &'static str,
    },
    #[error("`{method}` returned `{text}` which is not a decimal 64-bit integer")]
    Int64Text { method: String, text: String },
    #[error("rectangle ({x1}, {y1}, {x2}, {y2}) is inverted")]
    InvertedRect { x1: i32, y1: i32, x2: i32, y2: i32 },
    #[error("rectangle at ({x}, {y}) of size {width}x{height} overflows")]
    RectOverflow {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("`{param}` must not be empty")]
    EmptyText { param: &'static str },
    #[error("`{method}` produced no value for {wanted}")]
    MissingValue { method: String, wanted: String },
    #[error("cannot read {format} from `{text}`")]
    ResultText { format: &'static str, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("automation handle released twice")]
    DoubleRelease,
    #[error("{kind} `{key}` was never registered")]
    Unknown { kind: ResourceKind, key: ResourceKey },
    #[error("{kind} `{key}` has already been freed")]
    AlreadyFreed { kind: ResourceKind, key: ResourceKey },
    #[error("{kind} `{key}` used after it was freed")]
    UseAfterFree { kind: ResourceKind, key: ResourceKey },
}

/// Structural failures of the bridge. Behavioral results of the object
/// (`0` for "not found", `-1` coordinates, empty strings) are values, not
/// errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("method `{name}` is not known to the automation object")]
    MethodNotFound { name: String },
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error("`{method}` failed: {source}")]
    InvocationFailed {
        method: String,
        #[source]
        source: ForeignError,
    },
    #[error(transparent)]
    HandleLifecycle(#[from] LifecycleError),
    #[error("method table rejected: {0}")]
    Table(#[from] TableError),
}

impl Error {
    /// Code attached by the object, if the failure came from it.
    pub fn foreign_code(&self) -> Option<i32> {
        match self {
            Error::InvocationFailed { source, .. } => Some(source.code),
            Error::Connection(ConnectionError::Instantiate { source, .. }) => Some(source.code),
            _ => None,
        }
    }

    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Error::MethodNotFound { .. })
    }
}
