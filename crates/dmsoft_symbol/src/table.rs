use std::collections::BTreeSet;

use ahash::AHashMap;
use thiserror::Error;

use crate::decl::{DeclError, parse_declarations};
use crate::descriptor::MethodDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("method `{name}` declared twice (capabilities `{first}` and `{second}`)")]
    Duplicate {
        name: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("in capability `{capability}`: {source}")]
    Declaration {
        capability: &'static str,
        #[source]
        source: DeclError,
    },
}

/// Case-insensitive lookup from method name to descriptor.
///
/// Built once, then shared read-only by every handle.
#[derive(Debug, Default, Clone)]
pub struct MethodTable {
    methods: AHashMap<String, MethodDescriptor>,
}

fn table_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(capability, declarations)` pairs.
    pub fn from_declarations<'a, I>(groups: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (&'static str, &'a str)>,
    {
        let mut table = Self::new();
        for (capability, source) in groups {
            let methods = parse_declarations(capability, source)
                .map_err(|source| TableError::Declaration { capability, source })?;
            table.register_many(methods)?;
        }
        Ok(table)
    }

    pub fn register(&mut self, method: MethodDescriptor) -> Result<(), TableError> {
        let key = table_key(&method.name);
        if let Some(existing) = self.methods.get(&key) {
            return Err(TableError::Duplicate {
                name: method.name,
                first: existing.capability,
                second: method.capability,
            });
        }
        self.methods.insert(key, method);
        Ok(())
    }

    pub fn register_many<I>(&mut self, methods: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = MethodDescriptor>,
    {
        for method in methods {
            self.register(method)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(&table_key(name))
    }

    pub fn resolve(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(&table_key(name))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    pub fn capability(&self, capability: &str) -> Vec<&MethodDescriptor> {
        let mut methods: Vec<_> = self
            .methods
            .values()
            .filter(|method| method.capability == capability)
            .collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    pub fn capabilities(&self) -> BTreeSet<&'static str> {
        self.methods.values().map(|method| method.capability).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ValueKind;

    const INPUT: &str = "long KeyPress(long vk);\nlong MoveTo(long x,long y);";
    const SYSTEM: &str = "CString Ver();";

    #[test]
    fn test_resolution_is_case_insensitive() {
        let table = MethodTable::from_declarations([("input", INPUT), ("system", SYSTEM)]).unwrap();
        assert_eq!(table.len(), 3);
        let method = table.resolve("keypress").unwrap();
        assert_eq!(method.name, "KeyPress");
        assert!(table.contains("VER"));
        assert_eq!(table.resolve("ver").unwrap().result, ValueKind::Text);
        assert!(table.resolve("KeyRelease").is_none());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let err = MethodTable::from_declarations([("input", INPUT), ("other", "long keypress(long vk);")])
            .unwrap_err();
        assert_eq!(
            err,
            TableError::Duplicate {
                name: "keypress".to_string(),
                first: "input",
                second: "other",
            }
        );
    }

    #[test]
    fn test_declaration_errors_name_the_capability() {
        let err = MethodTable::from_declarations([("broken", "long X(")]).unwrap_err();
        assert!(matches!(err, TableError::Declaration { capability: "broken", .. }));
    }

    #[test]
    fn test_capability_listing() {
        let table = MethodTable::from_declarations([("input", INPUT), ("system", SYSTEM)]).unwrap();
        let names: Vec<_> = table.capability("input").iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["KeyPress", "MoveTo"]);
        assert_eq!(table.capabilities().into_iter().collect::<Vec<_>>(), vec!["input", "system"]);
    }
}
