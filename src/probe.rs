//! Collision resolution for the open addressing table.
//!
//! A resolver turns a base slot index into a deterministic sequence of
//! candidate indices. `probe` walks that sequence looking for a slot an
//! insertion may write into, `search` walks the same sequence looking for an
//! occupied slot holding a given key. Both stop after visiting as many slots
//! as the table has, so neither can loop forever on a full table.

use crate::error::{Result, TableError};
use crate::slot::Slot;
use log::trace;
use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;

/// Linear probing: `start, start + step, start + 2 * step, ...` modulo the capacity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LinearProbe {
    step: usize,
}

impl LinearProbe {
    pub const DEFAULT_STEP: usize = 1;

    pub fn new(step: usize) -> Result<Self> {
        if step == 0 {
            return Err(TableError::InvalidResolver(
                "linear probe step must be at least 1".to_string(),
            ));
        }
        Ok(Self { step })
    }

    pub fn step(&self) -> usize {
        self.step
    }

    #[inline]
    fn index(&self, start: usize, i: usize, capacity: usize) -> usize {
        let m: u128 = capacity as u128;
        let offset: u128 = (self.step as u128 % m) * i as u128 % m;
        ((start as u128 + offset) % m) as usize
    }
}

impl Default for LinearProbe {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
        }
    }
}

/// Quadratic probing. The i-th candidate is `start + c1 * i + c2 * i * i`
/// modulo the capacity, always measured from the original start index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuadraticProbe {
    c1: usize,
    c2: usize,
}

impl QuadraticProbe {
    pub const DEFAULT_C1: usize = 1;
    pub const DEFAULT_C2: usize = 1;

    pub fn new(c1: usize, c2: usize) -> Result<Self> {
        if c1 == 0 && c2 == 0 {
            return Err(TableError::InvalidResolver(
                "quadratic probe constants cannot both be zero".to_string(),
            ));
        }
        Ok(Self { c1, c2 })
    }

    pub fn constants(&self) -> (usize, usize) {
        (self.c1, self.c2)
    }

    #[inline]
    fn index(&self, start: usize, i: usize, capacity: usize) -> usize {
        let m: u128 = capacity as u128;
        let i: u128 = i as u128;
        let linear: u128 = (self.c1 as u128 % m) * i % m;
        let quadratic: u128 = (self.c2 as u128 % m) * i % m * i % m;
        ((start as u128 + linear + quadratic) % m) as usize
    }
}

impl Default for QuadraticProbe {
    fn default() -> Self {
        Self {
            c1: Self::DEFAULT_C1,
            c2: Self::DEFAULT_C2,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CollisionResolver {
    Linear(LinearProbe),
    Quadratic(QuadraticProbe),
}

impl CollisionResolver {
    pub fn linear(step: usize) -> Result<Self> {
        LinearProbe::new(step).map(CollisionResolver::Linear)
    }

    pub fn quadratic(c1: usize, c2: usize) -> Result<Self> {
        QuadraticProbe::new(c1, c2).map(CollisionResolver::Quadratic)
    }

    /// The `i`-th candidate index for a sequence starting at `start`.
    #[inline]
    pub fn index(&self, start: usize, i: usize, capacity: usize) -> usize {
        match self {
            CollisionResolver::Linear(p) => p.index(start, i, capacity),
            CollisionResolver::Quadratic(p) => p.index(start, i, capacity),
        }
    }

    /// The first `capacity` candidate indices starting at `start`.
    pub fn sequence(&self, start: usize, capacity: usize) -> ProbeSequence {
        ProbeSequence {
            resolver: *self,
            start,
            capacity,
            i: 0,
        }
    }

    /// Returns the first index along the sequence whose slot is not occupied.
    /// Empty and tombstoned slots both qualify.
    pub fn probe<K, V>(&self, start: usize, slots: &[Slot<K, V>]) -> Result<usize> {
        let capacity: usize = slots.len();
        for (n, index) in self.sequence(start, capacity).enumerate() {
            if slots[index].is_free() {
                if n > 0 {
                    trace!("probe from {} settled on {} after {} collisions", start, index, n);
                }
                return Ok(index);
            }
        }
        trace!("probe from {} exhausted all {} slots", start, capacity);
        Err(TableError::TableFull { capacity })
    }

    /// Returns the index of the occupied slot holding `key`. Tombstones are
    /// skipped over, a never written slot ends the search.
    pub fn search<K, V, Q>(&self, start: usize, key: &Q, slots: &[Slot<K, V>]) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        for index in self.sequence(start, slots.len()) {
            match &slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(k, _) if Borrow::<Q>::borrow(k) == key => return Some(index),
                _ => (),
            }
        }
        None
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        CollisionResolver::Linear(LinearProbe::default())
    }
}

impl From<LinearProbe> for CollisionResolver {
    fn from(probe: LinearProbe) -> Self {
        CollisionResolver::Linear(probe)
    }
}

impl From<QuadraticProbe> for CollisionResolver {
    fn from(probe: QuadraticProbe) -> Self {
        CollisionResolver::Quadratic(probe)
    }
}

impl fmt::Display for CollisionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionResolver::Linear(p) => write!(f, "linear(step={})", p.step),
            CollisionResolver::Quadratic(p) => write!(f, "quadratic(c1={}, c2={})", p.c1, p.c2),
        }
    }
}

/// Iterator over the candidate indices of one probe sequence.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    resolver: CollisionResolver,
    start: usize,
    capacity: usize,
    i: usize,
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.i >= self.capacity {
            return None;
        }
        let index: usize = self.resolver.index(self.start, self.i, self.capacity);
        self.i += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = self.capacity - self.i;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

impl FusedIterator for ProbeSequence {}
