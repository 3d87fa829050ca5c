//! Directive compiler
//!
//! Compiles a [`WorkPlan`] into the LDIF document the apply collaborator
//! submits: a plain record for `ldapadd`, or a `changetype: modify` record of
//! add/replace/delete blocks for `ldapmodify`.

use std::fmt;

use crate::operation::{Operation, WorkPlan};
use crate::types::ApplyKind;

/// Grouping mode of the attribute currently being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveMode {
    /// Each value is its own `add:` block.
    Add,
    /// Values accumulate under one open `replace:` block.
    Replace,
}

/// One modify directive, closed by a `-` line when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveBlock {
    Add { attribute: String, value: String },
    Replace { attribute: String, values: Vec<String> },
    Delete { attribute: String },
}

impl DirectiveBlock {
    fn write_lines(&self, lines: &mut Vec<String>) {
        match self {
            DirectiveBlock::Add { attribute, value } => {
                lines.push(format!("add: {attribute}"));
                lines.push(format!("{attribute}: {value}"));
            }
            DirectiveBlock::Replace { attribute, values } => {
                lines.push(format!("replace: {attribute}"));
                lines.extend(values.iter().map(|v| format!("{attribute}: {v}")));
            }
            DirectiveBlock::Delete { attribute } => {
                lines.push(format!("delete: {attribute}"));
            }
        }
        lines.push("-".to_string());
    }
}

/// Compile one attribute's operation list into directive blocks.
///
/// Repeated `Replace` markers are no-ops once the attribute is in replace
/// mode, and a second `Delete` of the same attribute is dropped.
pub fn compile_attribute(attribute: &str, operations: &[Operation]) -> Vec<DirectiveBlock> {
    let mut blocks = Vec::new();
    let mut mode = DirectiveMode::Add;
    let mut open_replace = None;
    let mut deleted = false;

    for operation in operations {
        match (operation, mode) {
            (Operation::Replace, DirectiveMode::Add) => {
                open_replace = Some(blocks.len());
                blocks.push(DirectiveBlock::Replace {
                    attribute: attribute.to_string(),
                    values: Vec::new(),
                });
                mode = DirectiveMode::Replace;
            }
            (Operation::Replace, DirectiveMode::Replace) => {}
            (Operation::Add(value), DirectiveMode::Add) => {
                blocks.push(DirectiveBlock::Add {
                    attribute: attribute.to_string(),
                    value: value.clone(),
                });
            }
            (Operation::Add(value), DirectiveMode::Replace) => {
                if let Some(DirectiveBlock::Replace { values, .. }) =
                    open_replace.and_then(|index| blocks.get_mut(index))
                {
                    values.push(value.clone());
                }
            }
            // Deletes leave the mode as it is.
            (Operation::Delete, _) => {
                if !deleted {
                    blocks.push(DirectiveBlock::Delete {
                        attribute: attribute.to_string(),
                    });
                    deleted = true;
                }
            }
        }
    }
    blocks
}

/// A compiled document, ready for the apply collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveDocument {
    /// A new entry: one flat record of attribute lines.
    Add {
        dn: String,
        attributes: Vec<(String, String)>,
    },
    /// Changes to an existing entry.
    Modify {
        dn: String,
        blocks: Vec<DirectiveBlock>,
    },
}

impl DirectiveDocument {
    pub fn kind(&self) -> ApplyKind {
        match self {
            DirectiveDocument::Add { .. } => ApplyKind::Create,
            DirectiveDocument::Modify { .. } => ApplyKind::Modify,
        }
    }

    pub fn dn(&self) -> &str {
        match self {
            DirectiveDocument::Add { dn, .. } | DirectiveDocument::Modify { dn, .. } => dn,
        }
    }

    /// The LDIF lines of the document, without line terminators.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("dn: {}", self.dn())];
        match self {
            DirectiveDocument::Add { attributes, .. } => {
                lines.extend(attributes.iter().map(|(n, v)| format!("{n}: {v}")));
            }
            DirectiveDocument::Modify { blocks, .. } => {
                lines.push("changetype: modify".to_string());
                for block in blocks {
                    block.write_lines(&mut lines);
                }
            }
        }
        lines
    }

    /// Render the document as LDIF text.
    pub fn to_ldif(&self) -> String {
        let mut text = self.lines().join("\n");
        text.push('\n');
        text
    }
}

impl fmt::Display for DirectiveDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ldif())
    }
}

/// Compile a work plan for `dn`; `None` when there is nothing to do.
pub fn compile(dn: &str, plan: &WorkPlan) -> Option<DirectiveDocument> {
    match plan {
        WorkPlan::NoWork => None,
        WorkPlan::Create(work) => {
            let attributes = work
                .iter()
                .flat_map(|(name, ops)| {
                    ops.iter().filter_map(move |op| match op {
                        Operation::Add(value) => Some((name.to_string(), value.clone())),
                        Operation::Delete | Operation::Replace => None,
                    })
                })
                .collect();
            Some(DirectiveDocument::Add {
                dn: dn.to_string(),
                attributes,
            })
        }
        WorkPlan::Modify(work) => {
            let blocks = work
                .iter()
                .flat_map(|(name, ops)| compile_attribute(name, ops))
                .collect();
            Some(DirectiveDocument::Modify {
                dn: dn.to_string(),
                blocks,
            })
        }
    }
}
