//! Method descriptors for late-bound automation objects.
//!
//! A [`MethodTable`] is built once from C-style declaration lines and then
//! consulted by the dispatcher for every call: canonical spelling, parameter
//! kinds and directions, and the return kind.

pub mod decl;
pub mod descriptor;
pub mod kind;
pub mod table;

pub use decl::{DeclError, parse_declarations};
pub use descriptor::{MethodDescriptor, ParamSpec};
pub use kind::{Direction, ValueKind};
pub use table::{MethodTable, TableError};
