use super::Slot;
use crate::lang::Ident;
use std::collections::HashMap;
use std::rc::Rc;

/// ## Slot allocation
///
/// Maps the two-character storage key of an identifier to a dense slot.
/// Slots are handed out in order of first use and never change.
/// A second spelling of a key gets the first spelling's slot.

#[derive(Debug, Default, Clone)]
pub struct Namespace {
    slots: HashMap<String, Slot>,
    names: Vec<Rc<str>>,
    aliases: Vec<Rc<str>>,
}

impl Namespace {
    pub fn new() -> Namespace {
        Namespace::default()
    }

    /// Slot for `ident`, allocating one on first use. The second value
    /// is a warning the first time a new spelling aliases an old one.
    pub fn slot(&mut self, ident: &Ident) -> (Slot, Option<String>) {
        let key = ident.key();
        let name = ident.name();
        if let Some(slot) = self.slots.get(&key) {
            let slot = *slot;
            let first = &self.names[slot];
            if first != name && !self.aliases.contains(name) {
                self.aliases.push(name.clone());
                let warning = format!(
                    "WARNING: {} IS AN ALIAS FOR {}; BOTH NAME THE SAME VARIABLE",
                    name, first
                );
                return (slot, Some(warning));
            }
            return (slot, None);
        }
        let slot = self.names.len();
        self.slots.insert(key, slot);
        self.names.push(name.clone());
        (slot, None)
    }

    /// Slot for `ident` if one was ever allocated.
    pub fn lookup(&self, ident: &Ident) -> Option<Slot> {
        self.slots.get(&ident.key()).copied()
    }

    /// The spelling that first claimed `slot`.
    pub fn name(&self, slot: Slot) -> Option<&Rc<str>> {
        self.names.get(slot)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Rc<str>)> {
        self.names.iter().enumerate()
    }
}
