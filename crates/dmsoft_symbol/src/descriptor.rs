use std::fmt;

use crate::kind::{Direction, ValueKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ValueKind,
    pub direction: Direction,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ValueKind, direction: Direction) -> Self {
        Self {
            name: name.into(),
            kind,
            direction,
        }
    }

    pub fn input(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, kind, Direction::In)
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::In => write!(f, "{}: {}", self.name, self.kind),
            dir => write!(f, "[{dir}] {}: {}", self.name, self.kind),
        }
    }
}

/// Static metadata for one method exposed by the automation object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Canonical spelling, sent to the object's name lookup verbatim.
    pub name: String,
    /// Capability group the method belongs to (`"keyboard_mouse"`, `"memory"`, ...).
    pub capability: &'static str,
    pub params: Vec<ParamSpec>,
    pub result: ValueKind,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        capability: &'static str,
        params: Vec<ParamSpec>,
        result: ValueKind,
    ) -> Self {
        Self {
            name: name.into(),
            capability,
            params,
            result,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Positions (natural order) of out and in-out parameters.
    pub fn by_ref_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, param)| param.direction.is_by_ref())
            .map(|(idx, _)| idx)
    }

    pub fn has_by_ref(&self) -> bool {
        self.by_ref_positions().next().is_some()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|param| param.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({params}) -> {}", self.name, self.result)
    }
}
