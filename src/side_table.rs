use std::{cell::Cell, collections::HashMap};

thread_local! {
    static ID_COUNTER: Cell<usize> = Cell::new(1);
}

/// Identity of an AST node. Two structurally identical nodes parsed from
/// different source positions always receive distinct ids.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct UniqueId(usize);
impl UniqueId {
    pub fn new() -> Self {
        ID_COUNTER.with(|counter| {
            let id = counter.get();
            counter.set(id + 1);
            UniqueId(id)
        })
    }
}
impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Unique {
    fn id(&self) -> UniqueId;
}

/// Per-node data stored outside the (immutable) tree, keyed by node identity.
#[derive(Debug)]
pub struct SideTable<T> {
    values: HashMap<UniqueId, T>,
}
impl<T> SideTable<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
    pub fn get(&self, owner: &impl Unique) -> Option<&T> {
        self.values.get(&owner.id())
    }
    pub fn set(&mut self, owner: &impl Unique, value: T) -> Option<T> {
        self.values.insert(owner.id(), value)
    }
    pub fn contains(&self, owner: &impl Unique) -> bool {
        self.values.contains_key(&owner.id())
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
impl<T> Default for SideTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
