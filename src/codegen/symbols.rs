use std::collections::HashMap;

use super::EmitError;

/// Variable name to local slot, in first seen order. There are no nested scopes:
/// loop bodies share the table of the function.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable<'source> {
    slots: HashMap<&'source str, u32>,
    names: Vec<&'source str>,
}

impl<'source> SymbolTable<'source> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.slots.get(name).copied()
    }

    /// Returns the slot of `name`, allocating the next free one on first use.
    pub fn slot_for(&mut self, name: &'source str) -> Result<u32, EmitError> {
        if let Some(slot) = self.get(name) {
            return Ok(slot);
        }
        // keep the count itself representable as a u32
        let slot = u32::try_from(self.names.len())
            .ok()
            .filter(|slot| *slot < u32::MAX)
            .ok_or(EmitError::TooManyLocals(self.names.len()))?;
        tracing::trace!(target: "codegen::symbols", "allocated slot {slot} for {name:?}");
        self.slots.insert(name, slot);
        self.names.push(name);
        Ok(slot)
    }

    /// Number of locals the function body has to declare.
    pub fn local_count(&self) -> u32 {
        // slot_for never lets the table grow past u32::MAX entries
        self.names.len() as u32
    }

    /// Names ordered by slot.
    pub fn names(&self) -> impl Iterator<Item = &'source str> + '_ {
        self.names.iter().copied()
    }
}
