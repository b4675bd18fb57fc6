//! Identity map and change tracking for one unit of work.

use crate::error::DomainError;
use crate::model::{Account, Entity, EntityId, Owner};
use crate::sql::{self, QueryBuf};
use std::collections::HashMap;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    Added,
    Unchanged,
    Modified,
    Deleted,
}

#[derive(Debug)]
struct Entry<T> {
    state: EntryState,
    current: T,
    /// Last state known to be in storage; `None` for Added entries.
    original: Option<T>,
}

impl<T: Entity> Entry<T> {
    fn unchanged(item: T) -> Self {
        Entry {
            state: EntryState::Unchanged,
            original: Some(item.clone()),
            current: item,
        }
    }

    fn needs_update(&self) -> bool {
        match self.state {
            EntryState::Modified => true,
            EntryState::Unchanged => self
                .original
                .as_ref()
                .is_some_and(|o| !self.current.scalars_eq(o)),
            EntryState::Added | EntryState::Deleted => false,
        }
    }
}

/// Tracked instances of one entity type, in tracking order.
#[derive(Debug)]
pub struct EntitySet<T> {
    entries: HashMap<EntityId, Entry<T>>,
    order: Vec<EntityId>,
}

impl<T> Default for EntitySet<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Entity> EntitySet<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, id: EntityId) -> Option<EntryState> {
        self.entries.get(&id).map(|e| e.state)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id).map(|e| &e.current)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id).map(|e| &mut e.current)
    }

    fn insert(&mut self, id: EntityId, entry: Entry<T>) {
        if self.entries.insert(id, entry).is_none() {
            self.order.push(id);
        }
    }

    fn forget(&mut self, id: EntityId) {
        if self.entries.remove(&id).is_some() {
            self.order.retain(|x| *x != id);
        }
    }

    /// Registers a row read from storage. An already tracked instance wins.
    pub(crate) fn track_loaded(&mut self, item: T) -> T {
        if let Some(entry) = self.entries.get(&item.id()) {
            return entry.current.clone();
        }
        self.insert(item.id(), Entry::unchanged(item.clone()));
        item
    }

    pub(crate) fn stage_added(&mut self, item: T) {
        self.insert(
            item.id(),
            Entry {
                state: EntryState::Added,
                current: item,
                original: None,
            },
        );
    }

    /// Copies the scalars of `item` onto the tracked instance. Returns false when not tracked.
    pub(crate) fn stage_modified(&mut self, item: &T) -> Result<bool, DomainError> {
        let Some(entry) = self.entries.get_mut(&item.id()) else {
            return Ok(false);
        };
        entry.current.check_update(item)?;
        entry.current.assign_scalars(item);
        if entry.state == EntryState::Unchanged {
            entry.state = EntryState::Modified;
        }
        Ok(true)
    }

    /// Runs `f` on the tracked instance itself. Scalar changes are found by dirty checking.
    pub(crate) fn modify<R>(&mut self, id: EntityId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.get_mut(id).map(f)
    }

    pub(crate) fn stage_deleted(&mut self, item: &T) {
        match self.state(item.id()) {
            Some(EntryState::Added) => self.forget(item.id()),
            Some(_) => {
                if let Some(entry) = self.entries.get_mut(&item.id()) {
                    entry.state = EntryState::Deleted;
                }
            }
            None => {
                let mut entry = Entry::unchanged(item.clone());
                entry.state = EntryState::Deleted;
                self.insert(item.id(), entry);
            }
        }
    }

    /// Registers `item` as Unchanged, or replaces the current state of a tracked instance.
    pub(crate) fn attach(&mut self, item: T) -> T {
        if let Some(entry) = self.entries.get_mut(&item.id()) {
            entry.current = item.clone();
        } else {
            self.insert(item.id(), Entry::unchanged(item.clone()));
        }
        item
    }

    fn in_order(&self) -> impl Iterator<Item = &Entry<T>> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    fn added(&self) -> impl Iterator<Item = &T> {
        self.in_order()
            .filter(|e| e.state == EntryState::Added)
            .map(|e| &e.current)
    }

    fn to_update(&self) -> impl Iterator<Item = &T> {
        self.in_order().filter(|e| e.needs_update()).map(|e| &e.current)
    }

    fn deleted(&self) -> impl Iterator<Item = &T> {
        self.in_order()
            .filter(|e| e.state == EntryState::Deleted)
            .map(|e| &e.current)
    }

    fn has_changes(&self) -> bool {
        self.in_order()
            .any(|e| e.state != EntryState::Unchanged || e.needs_update())
    }

    fn accept_changes(&mut self) {
        let deleted: Vec<EntityId> = self
            .in_order()
            .filter(|e| e.state == EntryState::Deleted)
            .map(|e| e.current.id())
            .collect();
        for id in deleted {
            self.forget(id);
        }
        for entry in self.entries.values_mut() {
            entry.state = EntryState::Unchanged;
            entry.original = Some(entry.current.clone());
        }
    }

    fn describe(&self, out: &mut String) {
        for entry in self.in_order() {
            let state = if entry.state == EntryState::Unchanged && entry.needs_update() {
                "Unchanged (dirty)".to_string()
            } else {
                format!("{:?}", entry.state)
            };
            let _ = writeln!(out, "  {} {}: {} {:?}", T::KIND, entry.current.id(), state, entry.current);
        }
    }
}

/// Identity maps of every entity type sharing one unit of work.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    pub(crate) owners: EntitySet<Owner>,
    pub(crate) accounts: EntitySet<Account>,
}

impl ChangeTracker {
    pub fn len(&self) -> usize {
        self.owners.len() + self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_changes(&self) -> bool {
        self.owners.has_changes() || self.accounts.has_changes()
    }

    /// Statements flushing every pending change, parents inserted first and deleted last.
    pub(crate) fn pending_statements(&self) -> Vec<QueryBuf> {
        let mut out = Vec::new();
        out.extend(self.owners.added().map(sql::insert));
        out.extend(self.accounts.added().map(sql::insert));
        out.extend(self.owners.to_update().map(sql::update));
        out.extend(self.accounts.to_update().map(sql::update));
        out.extend(self.accounts.deleted().map(|a| sql::delete::<Account>(a.id())));
        out.extend(self.owners.deleted().map(|o| sql::delete::<Owner>(o.id())));
        out
    }

    pub(crate) fn accept_all_changes(&mut self) {
        self.owners.accept_changes();
        self.accounts.accept_changes();
    }

    /// Human-readable dump of every tracked entry.
    pub fn debug_view(&self) -> String {
        let mut out = format!("{} tracked entries\n", self.len());
        self.owners.describe(&mut out);
        self.accounts.describe(&mut out);
        out
    }
}
