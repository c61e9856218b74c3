//! Reusable object pools.
//!
//! Bullets, meteors, jewels and fragments come and go every few frames.
//! Each type lives in a `Pool` split into an `available` queue and an
//! `in_use` list. Entities move between the two by value; only their
//! transient fields are reset, never their identity.

use std::collections::VecDeque;

use crate::entities::{Entity, EntityId, EntityKind, WorldFrame};

/// An entity that can be recycled through a [`Pool`].
pub trait Poolable {
    /// Stable identity, assigned once at construction.
    fn id(&self) -> EntityId;

    /// Clear per-life state (velocity, age, displacement) back to defaults.
    fn reset(&mut self);
}

/// Two disjoint sets of entities of one kind.
#[derive(Debug)]
pub struct Pool<T> {
    kind: EntityKind,
    /// Inactive entities, ready for reuse.
    available: VecDeque<T>,
    /// Active entities in insertion order.
    in_use: Vec<T>,
    next_id: u32,
}

impl<T: Poolable> Pool<T> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            available: VecDeque::new(),
            in_use: Vec::new(),
            next_id: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Build `count` inactive entities up front.
    pub fn prefill(&mut self, count: usize, mut make: impl FnMut(EntityId) -> T) {
        self.available.reserve(count);
        for _ in 0..count {
            let id = self.allocate_id();
            self.available.push_back(make(id));
        }
    }

    /// Move an inactive entity into use, constructing one with `make` only
    /// when none is available. The entity is appended to the in-use list
    /// and returned for the caller to launch.
    pub fn acquire_with(&mut self, make: impl FnOnce(EntityId) -> T) -> &mut T {
        let entity = match self.available.pop_back() {
            Some(e) => e,
            None => {
                let id = self.allocate_id();
                log::trace!("{:?} pool grew to {}", self.kind, self.next_id);
                make(id)
            }
        };
        self.in_use.push(entity);
        self.debug_check();
        let last = self.in_use.len() - 1;
        &mut self.in_use[last]
    }

    /// Return the in-use entity at `index` to the pool. In-use order of the
    /// remaining entities is preserved.
    pub fn release_at(&mut self, index: usize) -> EntityId {
        let mut entity = self.in_use.remove(index);
        entity.reset();
        let id = entity.id();
        self.available.push_front(entity);
        self.debug_check();
        id
    }

    /// Release several in-use indices gathered during a scan. Duplicates
    /// are ignored; removal runs from the highest index down so earlier
    /// indices stay valid. Ids are returned in ascending index order.
    pub fn release_indices(&mut self, indices: &mut Vec<usize>) -> Vec<EntityId> {
        indices.sort_unstable();
        indices.dedup();
        let mut released: Vec<EntityId> =
            indices.iter().rev().map(|&i| self.release_at(i)).collect();
        released.reverse();
        released
    }

    /// Release every in-use entity matching `pred`.
    pub fn release_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<EntityId> {
        let mut indices: Vec<usize> = self
            .in_use
            .iter()
            .enumerate()
            .filter(|(_, e)| pred(e))
            .map(|(i, _)| i)
            .collect();
        self.release_indices(&mut indices)
    }

    /// Return everything to the pool.
    pub fn release_all(&mut self) -> Vec<EntityId> {
        self.release_where(|_| true)
    }

    pub fn in_use(&self) -> &[T] {
        &self.in_use
    }

    pub fn in_use_len(&self) -> usize {
        self.in_use.len()
    }

    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    /// Total entities ever constructed by this pool.
    pub fn capacity(&self) -> usize {
        self.in_use.len() + self.available.len()
    }

    pub fn is_in_use(&self, id: EntityId) -> bool {
        self.in_use.iter().any(|e| e.id() == id)
    }

    pub fn is_available(&self, id: EntityId) -> bool {
        self.available.iter().any(|e| e.id() == id)
    }

    #[cfg(debug_assertions)]
    fn debug_check(&self) {
        debug_assert!(
            self.in_use.iter().all(|e| !self.is_available(e.id())),
            "{:?} entity present in both pool sets",
            self.kind
        );
        debug_assert_eq!(
            self.capacity(),
            self.next_id as usize,
            "{:?} pool lost track of an entity",
            self.kind
        );
    }

    #[cfg(not(debug_assertions))]
    fn debug_check(&self) {}
}

impl<T: Entity> Pool<T> {
    pub fn update(&mut self, frame: &WorldFrame) {
        for entity in &mut self.in_use {
            entity.update(frame);
        }
    }

    pub fn release_expired(&mut self) -> Vec<EntityId> {
        self.release_where(|e| e.is_expired())
    }

    /// Advance every in-use entity and release those that expired.
    pub fn tick(&mut self, frame: &WorldFrame) -> Vec<EntityId> {
        self.update(frame);
        self.release_expired()
    }
}
