use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::probe::CollisionResolver;
use crate::slot::Slot;
use log::{debug, trace};
use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::iter::FusedIterator;
use std::mem;
use std::time::Instant;

/// Deterministic hasher used when the caller does not supply one.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// Maps the hash of `key` onto a slot index of a table with `capacity` slots.
#[inline]
fn bounded_hash<Q, S>(hash_builder: &S, key: &Q, capacity: usize) -> usize
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    (hash_builder.hash_one(key) % capacity as u64) as usize
}

fn allocate<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots: Vec<Slot<K, V>> = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::default);
    slots
}

/// An open addressing hash table backed by a single buffer of slots.
///
/// Collisions are resolved by the [`CollisionResolver`] chosen at
/// construction. Removed entries leave a tombstone behind so that keys placed
/// further along the same probe sequence stay reachable. The table doubles
/// whenever an insertion of a new key would push the load above the
/// configured threshold; it never shrinks.
#[derive(Debug, Clone)]
pub struct HashTable<K, V, S = DefaultHashBuilder> {
    count: usize,
    max_load_factor: f64,
    resolver: CollisionResolver,
    hash_builder: S,
    slots: Vec<Slot<K, V>>,
}

impl<K, V> HashTable<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// A table with capacity 5, load factor 0.7 and linear probing.
    pub fn new() -> Self {
        Self::build(TableConfig::default(), DefaultHashBuilder::default())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(TableConfig::default().with_capacity(capacity))
    }

    pub fn with_resolver(resolver: impl Into<CollisionResolver>) -> Self {
        Self::build(
            TableConfig::default().with_resolver(resolver),
            DefaultHashBuilder::default(),
        )
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for HashTable<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub const SLOT_SIZE: usize = mem::size_of::<Slot<K, V>>();
    pub const MAX_CAPACITY: usize = isize::MAX as usize / Self::SLOT_SIZE;

    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, hash_builder))
    }

    fn build(config: TableConfig, hash_builder: S) -> Self {
        Self {
            count: 0,
            max_load_factor: config.load_factor,
            resolver: config.resolver,
            hash_builder,
            slots: allocate(config.initial_capacity),
        }
    }

    /// The number of entries in the table.
    pub fn size(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The current ratio of entries to slots.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    pub fn load_factor_threshold(&self) -> f64 {
        self.max_load_factor
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns true if adding one more entry would push the load factor above the threshold.
    #[inline]
    fn should_grow(&self) -> bool {
        (self.count + 1) as f64 / self.capacity() as f64 > self.max_load_factor
    }

    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let base: usize = bounded_hash(&self.hash_builder, key, self.capacity());
        self.resolver.search(base, key, &self.slots)
    }

    /// Inserts a key-value pair. If the key is already present its value is
    /// replaced in place and the previous value is returned.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        if let Some(index) = self.find(&key) {
            if let Slot::Occupied(_, v) = &mut self.slots[index] {
                return Ok(Some(mem::replace(v, value)));
            }
        }

        if self.should_grow() {
            self.grow()?;
        }

        let index: usize = loop {
            let base: usize = bounded_hash(&self.hash_builder, &key, self.capacity());
            match self.resolver.probe(base, &self.slots) {
                Ok(index) => break index,
                Err(TableError::TableFull { capacity }) => {
                    debug!(
                        "{} probe exhausted at capacity {} with {} entries, growing",
                        self.resolver, capacity, self.count
                    );
                    self.grow()?;
                }
                Err(e) => return Err(e),
            }
        };

        if let Slot::Tombstone = self.slots[index] {
            trace!("reusing tombstone at slot {}", index);
        }
        self.slots[index] = Slot::Occupied(key, value);
        self.count += 1;
        Ok(None)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index: usize = self.find(key)?;
        self.slots[index].value()
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index: usize = self.find(key)?;
        match &mut self.slots[index] {
            Slot::Occupied(_, value) => Some(value),
            _ => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// The slot index currently holding `key`.
    pub fn slot_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key)
    }

    /// Removes `key` and returns its value, leaving a tombstone in its slot.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index: usize = self.find(key).ok_or(TableError::NotFound)?;
        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(_, value) => {
                self.count -= 1;
                trace!("tombstoned slot {}", index);
                Ok(value)
            }
            other => {
                self.slots[index] = other;
                Err(TableError::NotFound)
            }
        }
    }

    /// Iterates over the keys in slot order.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator {
            inner: self.iter(),
        }
    }

    /// Iterates over the entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.count,
        }
    }

    fn grow(&mut self) -> Result<()> {
        let old_capacity: usize = self.capacity();
        let new_capacity: usize = old_capacity
            .checked_mul(2)
            .ok_or(TableError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        let now: Instant = Instant::now();
        self.rebuild(new_capacity)?;
        debug!(
            "grew table from {} to {} slots, rehashed {} entries in {:?}",
            old_capacity,
            self.capacity(),
            self.count,
            now.elapsed()
        );
        Ok(())
    }

    /// Rehashes every entry into a fresh buffer of at least `capacity` slots.
    ///
    /// Placement is planned before anything moves. If the resolver cannot
    /// place every entry at the requested capacity, the capacity doubles
    /// again. On error the table is left as it was.
    fn rebuild(&mut self, mut capacity: usize) -> Result<()> {
        let placement: Vec<usize> = loop {
            if capacity > Self::MAX_CAPACITY {
                return Err(TableError::CapacityOverflow {
                    requested: capacity,
                });
            }
            match self.plan(capacity) {
                Ok(placement) => break placement,
                Err(TableError::TableFull { .. }) => {
                    debug!(
                        "{} cannot place {} entries in {} slots",
                        self.resolver, self.count, capacity
                    );
                    capacity = capacity
                        .checked_mul(2)
                        .ok_or(TableError::CapacityOverflow {
                            requested: usize::MAX,
                        })?;
                }
                Err(e) => return Err(e),
            }
        };

        let old: Vec<Slot<K, V>> = mem::replace(&mut self.slots, allocate(capacity));
        let entries = old
            .into_iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_, _)));
        for (slot, index) in entries.zip(placement) {
            self.slots[index] = slot;
        }
        Ok(())
    }

    /// Computes the new slot of every entry, in current slot order, for a
    /// table of `capacity` slots.
    fn plan(&self, capacity: usize) -> Result<Vec<usize>> {
        let mut shadow: Vec<Slot<(), ()>> = vec![Slot::Empty; capacity];
        let mut placement: Vec<usize> = Vec::with_capacity(self.count);
        for key in self.keys() {
            let base: usize = bounded_hash(&self.hash_builder, key, capacity);
            let index: usize = self.resolver.probe(base, &shadow)?;
            shadow[index] = Slot::Occupied((), ());
            placement.push(index);
        }
        Ok(placement)
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(key, value) = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A one-shot iterator over the keys of a table. It borrows the table, so
/// the table cannot change while the iterator is alive.
#[derive(Debug, Clone)]
pub struct KeyIterator<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for KeyIterator<'_, K, V> {}

impl<K, V> FusedIterator for KeyIterator<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::QuadraticProbe;
    use crate::slot::SlotState;
    use std::hash::Hasher;

    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for b in bytes {
                self.0 = (self.0 << 8) | *b as u64;
            }
        }

        fn write_usize(&mut self, n: usize) {
            self.0 = n as u64;
        }
    }

    type Identity = BuildHasherDefault<IdentityHasher>;

    fn table(config: TableConfig) -> HashTable<usize, usize, Identity> {
        HashTable::with_config_and_hasher(config, Identity::default()).unwrap()
    }

    fn tombstones<K, V, S>(table: &HashTable<K, V, S>) -> usize {
        table
            .slots
            .iter()
            .filter(|slot| slot.state() == SlotState::Tombstone)
            .count()
    }

    #[test]
    fn test_quadratic_collision_placement() {
        let mut t = table(
            TableConfig::new()
                .with_capacity(7)
                .with_resolver(QuadraticProbe::default()),
        );
        t.put(2, 20).unwrap();
        t.put(9, 90).unwrap();
        assert_eq!(t.slot_of(&2), Some(2));
        assert_eq!(t.slot_of(&9), Some(4));
        assert_eq!(t.get(&9), Some(&90));
    }

    #[test]
    fn test_linear_collision_chain_survives_removal() {
        let mut t = table(TableConfig::new().with_capacity(10).with_load_factor(0.9));
        for key in [1, 11, 21] {
            t.put(key, key * 10).unwrap();
        }
        assert_eq!(t.slot_of(&1), Some(1));
        assert_eq!(t.slot_of(&11), Some(2));
        assert_eq!(t.slot_of(&21), Some(3));

        assert_eq!(t.remove(&11), Ok(110));
        assert_eq!(tombstones(&t), 1);
        assert_eq!(t.get(&21), Some(&210));
        assert_eq!(t.get(&11), None);

        t.put(31, 310).unwrap();
        assert_eq!(t.slot_of(&31), Some(2));
        assert_eq!(tombstones(&t), 0);

        t.put(11, 111).unwrap();
        assert_eq!(t.slot_of(&11), Some(4));
        assert_eq!(t.size(), 4);
    }

    #[test]
    fn test_reput_reuses_tombstone() {
        let mut t = table(TableConfig::new().with_capacity(10));
        t.put(1, 1).unwrap();
        t.put(11, 11).unwrap();
        t.remove(&11).unwrap();
        t.put(11, 12).unwrap();
        assert_eq!(t.slot_of(&11), Some(2));
        assert_eq!(t.get(&11), Some(&12));
    }

    #[test]
    fn test_overwrite_does_not_grow() {
        let mut t: HashTable<&str, u32> = HashTable::new();
        t.put("a", 1).unwrap();
        t.put("b", 2).unwrap();
        t.put("c", 3).unwrap();
        assert_eq!(t.capacity(), 5);
        assert_eq!(t.put("a", 10), Ok(Some(1)));
        assert_eq!(t.capacity(), 5);
        assert_eq!(t.size(), 3);
        assert_eq!(t.get("a"), Some(&10));
    }

    #[test]
    fn test_grows_before_crossing_threshold() {
        let mut t: HashTable<&str, usize> = HashTable::new();
        for (i, key) in ["a", "b", "c"].iter().enumerate() {
            t.put(*key, i).unwrap();
        }
        assert_eq!(t.capacity(), 5);
        t.put("d", 3).unwrap();
        assert_eq!(t.capacity(), 10);
        assert_eq!(t.size(), 4);
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            assert_eq!(t.get(key), Some(&i));
        }
    }

    #[test]
    fn test_probe_exhaustion_grows_table() {
        // with c1 = c2 = 1 and 4 slots the sequence from 0 only visits 0 and 2
        let mut t = table(
            TableConfig::new()
                .with_capacity(4)
                .with_load_factor(0.9)
                .with_resolver(QuadraticProbe::default()),
        );
        t.put(0, 0).unwrap();
        t.put(4, 4).unwrap();
        assert_eq!(t.slot_of(&4), Some(2));
        assert_eq!(t.capacity(), 4);

        t.put(8, 8).unwrap();
        assert_eq!(t.capacity(), 8);
        assert_eq!(t.slot_of(&0), Some(0));
        assert_eq!(t.slot_of(&4), Some(4));
        assert_eq!(t.slot_of(&8), Some(2));
        assert_eq!(t.size(), 3);
    }

    #[test]
    fn test_resize_drops_tombstones() {
        let mut t = table(TableConfig::new().with_capacity(4));
        t.put(1, 1).unwrap();
        t.put(5, 5).unwrap();
        t.remove(&1).unwrap();
        t.put(2, 2).unwrap();
        assert_eq!(t.slot_of(&2), Some(3));
        assert_eq!(tombstones(&t), 1);

        t.put(3, 3).unwrap();
        assert_eq!(t.capacity(), 8);
        assert_eq!(tombstones(&t), 0);
        assert_eq!(t.slot_of(&5), Some(5));
        assert_eq!(t.slot_of(&2), Some(2));
        assert_eq!(t.slot_of(&3), Some(3));
        assert_eq!(t.size(), 3);
    }

    #[test]
    fn test_remove_missing_key() {
        let mut t: HashTable<String, u32> = HashTable::new();
        assert_eq!(t.remove("nope"), Err(TableError::NotFound));
        t.put("yes".to_string(), 1).unwrap();
        assert_eq!(t.remove("yes"), Ok(1));
        assert_eq!(t.remove("yes"), Err(TableError::NotFound));
        assert!(t.is_empty());
    }

    #[test]
    fn test_keys_in_slot_order() {
        let mut t = table(TableConfig::new().with_capacity(10));
        for key in [3, 1, 2] {
            t.put(key, key).unwrap();
        }
        let keys = t.keys();
        assert_eq!(keys.len(), 3);
        let keys: Vec<usize> = keys.copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);

        let pairs: Vec<(usize, usize)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_get_mut_and_contains_key() {
        let mut t: HashTable<String, Vec<u32>> = HashTable::new();
        t.put("list".to_string(), vec![1]).unwrap();
        if let Some(list) = t.get_mut("list") {
            list.push(2);
        }
        assert_eq!(t.get("list"), Some(&vec![1, 2]));
        assert!(t.contains_key("list"));
        assert!(!t.contains_key("other"));
        assert!(t.get_mut("other").is_none());
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            HashTable::<u32, u32>::with_capacity(0),
            Err(TableError::InvalidCapacity(0))
        ));
        assert!(matches!(
            HashTable::<u32, u32>::with_config(TableConfig::new().with_load_factor(1.5)),
            Err(TableError::InvalidLoadFactor(_))
        ));
    }

    #[test]
    fn test_load_factor() {
        let mut t = table(TableConfig::new().with_capacity(10));
        assert_eq!(t.load_factor(), 0.0);
        t.put(1, 1).unwrap();
        t.put(2, 2).unwrap();
        assert!((t.load_factor() - 0.2).abs() < f64::EPSILON);
        assert_eq!(t.load_factor_threshold(), 0.7);
    }
}
