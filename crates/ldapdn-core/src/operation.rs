//! Operation types
//!
//! The typed output of the reconciliation engine: per-attribute operation
//! lists grouped into a [`WorkPlan`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::ApplyKind;

/// One change to a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "lowercase")]
pub enum Operation {
    /// Insert a value.
    Add(String),
    /// Remove every value of the attribute.
    Delete,
    /// Switch the attribute's directive grouping from add to replace; the
    /// values come from the `Add` operations that follow.
    Replace,
}

impl Operation {
    /// Create an add operation.
    pub fn add(value: impl Into<String>) -> Self {
        Operation::Add(value.into())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add(value) => write!(f, "add '{value}'"),
            Operation::Delete => write!(f, "delete"),
            Operation::Replace => write!(f, "replace"),
        }
    }
}

/// Ordered mapping of attribute name to its operation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeWork {
    entries: Vec<(String, Vec<Operation>)>,
}

impl AttributeWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation to an attribute's list.
    pub fn push(&mut self, name: &str, operation: Operation) {
        self.list_mut(name).push(operation);
    }

    /// Append an operation using builder pattern.
    pub fn with(mut self, name: &str, operation: Operation) -> Self {
        self.push(name, operation);
        self
    }

    /// Make sure an attribute has a (possibly empty) list.
    pub fn declare(&mut self, name: &str) {
        self.list_mut(name);
    }

    fn list_mut(&mut self, name: &str) -> &mut Vec<Operation> {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Operations recorded for an attribute.
    pub fn get(&self, name: &str) -> Option<&[Operation]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ops)| ops.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Operation])> {
        self.entries
            .iter()
            .map(|(n, ops)| (n.as_str(), ops.as_slice()))
    }

    /// Drop attributes whose list ended up empty.
    pub fn prune_empty(&mut self) {
        self.entries.retain(|(_, ops)| !ops.is_empty());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AttributeWork {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, ops) in &self.entries {
            map.serialize_entry(name, ops)?;
        }
        map.end()
    }
}

impl fmt::Display for AttributeWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, ops)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {name} => [")?;
            for (j, op) in ops.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{op}")?;
            }
            write!(f, "]")?;
        }
        write!(f, " }}")
    }
}

/// The outcome of one reconciliation: what, if anything, must be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "attributes", rename_all = "snake_case")]
pub enum WorkPlan {
    /// The entry already matches the declaration.
    NoWork,
    /// The entry does not exist and must be created; only `Add` operations.
    Create(AttributeWork),
    /// The entry exists and must be modified.
    Modify(AttributeWork),
}

impl WorkPlan {
    pub fn is_no_work(&self) -> bool {
        matches!(self, WorkPlan::NoWork)
    }

    pub fn has_work(&self) -> bool {
        !self.is_no_work()
    }

    /// The apply kind needed to carry out this plan, if any.
    pub fn apply_kind(&self) -> Option<ApplyKind> {
        match self {
            WorkPlan::NoWork => None,
            WorkPlan::Create(_) => Some(ApplyKind::Create),
            WorkPlan::Modify(_) => Some(ApplyKind::Modify),
        }
    }

    /// The per-attribute operations, if any.
    pub fn work(&self) -> Option<&AttributeWork> {
        match self {
            WorkPlan::NoWork => None,
            WorkPlan::Create(work) | WorkPlan::Modify(work) => Some(work),
        }
    }
}

impl fmt::Display for WorkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkPlan::NoWork => write!(f, "nothing to do"),
            WorkPlan::Create(work) => write!(f, "add {work}"),
            WorkPlan::Modify(work) => write!(f, "modify {work}"),
        }
    }
}
