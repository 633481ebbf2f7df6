use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{AllocError, IdentifierSpace};

/// Allocator of ephemeral identifiers drawn from an [`IdentifierSpace`].
///
/// Each active identifier exclusively reserves its starter, so no two active
/// identifiers can ever be equal. The free pool is an arena of starter
/// indices: slots `0..available` are free, everything past the boundary is
/// stale. Allocation and release are O(1).
///
/// Not meant for concurrent mutation; wrap it in a lock or give it a single
/// owner.
#[derive(Debug)]
pub struct EphemeralIds<R = StdRng> {
    space: Arc<IdentifierSpace>,
    pool: Vec<usize>,
    available: usize,
    /// Active identifier -> index of its reserved starter.
    active: HashMap<String, usize>,
    /// External key -> identifier.
    remapped: HashMap<String, String>,
    /// Identifier -> external key, for ids handed out by `remap`.
    owners: HashMap<String, String>,
    rng: R,
}

impl EphemeralIds<StdRng> {
    /// Builds an allocator seeded from operating-system entropy.
    pub fn new(space: impl Into<Arc<IdentifierSpace>>) -> Result<Self, AllocError> {
        Self::with_rng(space, StdRng::from_entropy())
    }
}

impl<R: Rng> EphemeralIds<R> {
    /// Builds an allocator with an injected random source.
    ///
    /// Fails with [`AllocError::EmptySpace`] when the space has no starters.
    pub fn with_rng(space: impl Into<Arc<IdentifierSpace>>, rng: R) -> Result<Self, AllocError> {
        let space = space.into();
        if space.is_empty() {
            return Err(AllocError::EmptySpace);
        }
        let total = space.len();
        Ok(Self {
            space,
            pool: (0..total).collect(),
            available: total,
            active: HashMap::new(),
            remapped: HashMap::new(),
            owners: HashMap::new(),
            rng,
        })
    }

    pub fn space(&self) -> &IdentifierSpace {
        &self.space
    }

    pub fn starter_length(&self) -> usize {
        self.space.starter_length()
    }

    /// Number of starters that can still be allocated.
    pub fn available(&self) -> usize {
        self.available
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, identifier: &str) -> bool {
        self.active.contains_key(identifier)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    /// Allocates a new identifier, reserving its starter until released.
    ///
    /// Fails with [`AllocError::Exhausted`] without touching any state when
    /// every starter is in use.
    pub fn allocate(&mut self) -> Result<String, AllocError> {
        if self.available == 0 {
            return Err(AllocError::Exhausted {
                active: self.active.len(),
            });
        }

        let slot = self.rng.gen_range(0..self.available);
        let index = self.pool[slot];
        let (starter, suffixes) = self.space.entry(index);
        let suffix = &suffixes[self.rng.gen_range(0..suffixes.len())];
        let identifier = format!("{starter}{suffix}");

        // Swap-remove: the last free slot fills the hole.
        self.pool[slot] = self.pool[self.available - 1];
        self.available -= 1;

        self.active.insert(identifier.clone(), index);
        Ok(identifier)
    }

    /// Releases an identifier and returns its starter to the pool.
    ///
    /// Unknown or already released identifiers are ignored.
    pub fn release(&mut self, identifier: &str) {
        let Some(index) = self.active.remove(identifier) else {
            return;
        };
        if let Some(key) = self.owners.remove(identifier) {
            self.remapped.remove(&key);
        }
        self.pool[self.available] = index;
        self.available += 1;
    }

    /// Restores full availability and forgets every active id and mapping.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.pool.extend(0..self.space.len());
        self.available = self.pool.len();
        self.active.clear();
        self.remapped.clear();
        self.owners.clear();
    }

    /// Maps the given external keys to identifiers, incrementally.
    ///
    /// Keys absent from `keys` but mapped before are released, new keys get a
    /// fresh identifier and keys already mapped keep theirs. Duplicate keys
    /// are mapped once. If the pool cannot cover the new keys the call fails
    /// with [`AllocError::Exhausted`] and changes nothing.
    pub fn remap<S: AsRef<str>>(
        &mut self,
        keys: &[S],
    ) -> Result<HashMap<String, String>, AllocError> {
        let wanted: HashSet<&str> = keys.iter().map(|key| key.as_ref()).collect();
        let dropped: Vec<String> = self
            .remapped
            .keys()
            .filter(|key| !wanted.contains(key.as_str()))
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let fresh: Vec<&str> = keys
            .iter()
            .map(|key| key.as_ref())
            .filter(|key: &&str| !self.remapped.contains_key(*key) && seen.insert(*key))
            .collect();

        if fresh.len() > self.available + dropped.len() {
            return Err(AllocError::Exhausted {
                active: self.active.len(),
            });
        }

        for key in dropped {
            if let Some(identifier) = self.remapped.get(&key).cloned() {
                self.release(&identifier);
            }
        }

        for key in fresh {
            let identifier = self.allocate()?;
            self.owners.insert(identifier.clone(), key.to_owned());
            self.remapped.insert(key.to_owned(), identifier);
        }

        Ok(self.remapped.clone())
    }

    /// Identifier currently mapped to `key` by [`remap`](Self::remap).
    pub fn mapping(&self, key: &str) -> Option<&str> {
        self.remapped.get(key).map(String::as_str)
    }

    pub fn remapped(&self) -> &HashMap<String, String> {
        &self.remapped
    }
}
