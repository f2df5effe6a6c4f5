use crate::SyntaxKind;

const SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SyntaxSet {
    bits: [u64; SIZE],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn from_kind(kind: SyntaxKind) -> Self {
        let kind = kind as u16;

        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;

        debug_assert!(
            slot_index < Self::EMPTY.bits.len(),
            "Index out of bounds. Increase the size of the bitset array."
        );

        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        let mut bits = Self::EMPTY.bits;
        bits[slot_index] = mask;

        Self { bits }
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < self.bits.len() {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.union(&Self::from_kind(kinds[i]));
            i += 1;
        }

        set
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        self.bits[slot_index] & mask != 0
    }

    pub fn insert(&mut self, kind: SyntaxKind) {
        *self = self.union(&Self::from_kind(kind));
    }

    pub fn remove(&mut self, kind: SyntaxKind) {
        let mask = Self::from_kind(kind);
        for (slot, bit) in self.bits.iter_mut().zip(mask.bits) {
            *slot &= !bit;
        }
    }

    pub fn set(&mut self, kind: SyntaxKind, enabled: bool) {
        if enabled { self.insert(kind) } else { self.remove(kind) }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == Self::EMPTY.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove() {
        let mut set = SyntaxSet::new([SyntaxKind::STATIC_KW]);
        set.insert(SyntaxKind::FINAL_KW);
        set.insert(SyntaxKind::TOMBSTONE);

        assert!(set.contains(SyntaxKind::STATIC_KW));
        assert!(set.contains(SyntaxKind::FINAL_KW));
        assert!(set.contains(SyntaxKind::TOMBSTONE));
        assert!(!set.contains(SyntaxKind::PUBLIC_KW));

        set.set(SyntaxKind::STATIC_KW, false);
        set.remove(SyntaxKind::FINAL_KW);
        set.remove(SyntaxKind::TOMBSTONE);
        assert!(set.is_empty());
    }
}
