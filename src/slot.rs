/// The three states a slot in the backing buffer can be in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// Never written since the buffer was allocated.
    Empty,
    Occupied,
    /// Held a key that has since been removed. Searches pass through it and
    /// probes may reuse it.
    Tombstone,
}

#[derive(Debug, Clone)]
pub enum Slot<K, V> {
    Empty,
    Occupied(K, V),
    Tombstone,
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<K, V> Slot<K, V> {
    pub fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Occupied(_, _) => SlotState::Occupied,
            Slot::Tombstone => SlotState::Tombstone,
        }
    }

    /// Returns true if an insertion may write into this slot.
    #[inline]
    pub fn is_free(&self) -> bool {
        !matches!(self, Slot::Occupied(_, _))
    }

    #[inline]
    pub fn key(&self) -> Option<&K> {
        match self {
            Slot::Occupied(key, _) => Some(key),
            _ => None,
        }
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied(_, value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_states() {
        let empty: Slot<&str, u32> = Slot::default();
        let occupied: Slot<&str, u32> = Slot::Occupied("a", 1);
        let tombstone: Slot<&str, u32> = Slot::Tombstone;

        assert_eq!(empty.state(), SlotState::Empty);
        assert_eq!(occupied.state(), SlotState::Occupied);
        assert_eq!(tombstone.state(), SlotState::Tombstone);

        assert!(empty.is_free());
        assert!(tombstone.is_free());
        assert!(!occupied.is_free());

        assert_eq!(occupied.key(), Some(&"a"));
        assert_eq!(occupied.value(), Some(&1));
        assert_eq!(tombstone.key(), None);
    }
}
