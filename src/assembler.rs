use crate::error::{AssemblerError, SharedSource};
use crate::parser::Statement;
use crate::value::{Dictionary, Value};
use log::{trace, warn};
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// Folds a statement sequence into the root dictionary.
///
/// The fold state is the dictionary built so far plus the current key group.
/// A key group header replaces the prefix outright; headers never nest
/// relative to the previous one.
pub(crate) struct Assembler {
    source: SharedSource,
    root: Dictionary,
    prefix: Vec<String>,
}

impl Assembler {
    pub fn new(source: SharedSource) -> Self {
        Assembler {
            source,
            root: Dictionary::new(),
            prefix: Vec::new(),
        }
    }

    pub fn assemble(
        mut self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> Result<Dictionary, AssemblerError> {
        for statement in statements {
            self.apply(statement)?;
        }
        Ok(self.root)
    }

    fn apply(&mut self, statement: Statement) -> Result<(), AssemblerError> {
        match statement {
            Statement::KeyGroup { path, span } => {
                trace!("entering key group [{}] at offset {}", path.join("."), span.offset());
                self.prefix = path;
                Ok(())
            }
            Statement::Assignment { key, value, span } => {
                let mut path: Vec<&str> = self.prefix.iter().map(String::as_str).collect();
                path.push(&key);
                trace!("assigning {} = {}", path.join("."), value);
                insert_at(&mut self.root, &path, value).map_err(|conflict| {
                    AssemblerError::DuplicateKey {
                        src: Arc::clone(&self.source),
                        span,
                        key: conflict,
                    }
                })
            }
        }
    }
}

/// Writes `value` at `path` below `dict`, creating intermediate dictionaries.
///
/// On conflict returns the dotted path of the key that was already assigned.
fn insert_at(dict: &mut Dictionary, path: &[&str], value: Value) -> Result<(), String> {
    let Some((head, tail)) = path.split_first() else {
        return Ok(());
    };

    match dict.entries_mut().entry((*head).to_string()) {
        Entry::Vacant(slot) => {
            if tail.is_empty() {
                slot.insert(value);
            } else {
                let mut child = Dictionary::new();
                insert_at(&mut child, tail, value).map_err(|key| join_key(head, &key))?;
                slot.insert(Value::Dictionary(child));
            }
            Ok(())
        }
        Entry::Occupied(_) if tail.is_empty() => Err((*head).to_string()),
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Dictionary(child) => {
                insert_at(child, tail, value).map_err(|key| join_key(head, &key))
            }
            existing => {
                warn!(
                    "`{head}` held a {} and is replaced by a key group",
                    existing.type_name()
                );
                let mut child = Dictionary::new();
                insert_at(&mut child, tail, value).map_err(|key| join_key(head, &key))?;
                *existing = Value::Dictionary(child);
                Ok(())
            }
        },
    }
}

fn join_key(head: &str, rest: &str) -> String {
    format!("{head}.{rest}")
}
