//! # Fixed Ring
//!
//! Fixed-capacity ring buffer addressed from the head.
//!
//! Logical index 0 is the newest element (the head of a falling column), the
//! last index is the oldest (the tail tip). Pushing a new head drops the
//! oldest element. Every operation is **O(1)** and the storage is allocated
//! exactly once.

/// A fixed-capacity ring buffer of `Copy` values.
///
/// # Example
///
/// ```rust
/// use glyphrain_core::FixedRing;
///
/// let mut ring = FixedRing::new(3, 'a');
/// ring.push_head('b');
/// assert_eq!(ring.get(0), 'b');
/// assert_eq!(ring.get(1), 'a');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedRing<T> {
    /// Backing storage; never resized after construction.
    storage: Box<[T]>,
    /// Physical index of logical slot 0.
    head: usize,
}

impl<T: Copy> FixedRing<T> {
    /// Creates a ring of `capacity` slots, all set to `fill`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, fill: T) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self {
            storage: vec![fill; capacity].into_boxed_slice(),
            head: 0,
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Always false; a ring has at least one slot.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        debug_assert!(index < self.len(), "ring index {index} out of bounds");
        (self.head + index) % self.len()
    }

    /// Returns the value at logical `index` (0 = head).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        self.storage[self.physical(index)]
    }

    /// Overwrites the value at logical `index`.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) {
        let physical = self.physical(index);
        self.storage[physical] = value;
    }

    /// Rotates one slot toward the tail and writes `value` as the new head.
    ///
    /// The previous tail value is discarded.
    #[inline]
    pub fn push_head(&mut self, value: T) {
        self.head = if self.head == 0 {
            self.len() - 1
        } else {
            self.head - 1
        };
        self.storage[self.head] = value;
    }

    /// Rewrites every slot from head to tail with `f(logical_index)`.
    pub fn refill(&mut self, mut f: impl FnMut(usize) -> T) {
        self.head = 0;
        for (index, slot) in self.storage.iter_mut().enumerate() {
            *slot = f(index);
        }
    }

    /// Iterates from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_head_shifts_toward_tail() {
        let mut ring = FixedRing::new(4, 0u32);
        ring.refill(|i| i as u32 + 1); // [1, 2, 3, 4]
        ring.push_head(9);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![9, 1, 2, 3]);
        ring.push_head(8);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![8, 9, 1, 2]);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_set_is_logical() {
        let mut ring = FixedRing::new(3, 'x');
        ring.push_head('h');
        ring.set(2, 't');
        assert_eq!(ring.get(0), 'h');
        assert_eq!(ring.get(2), 't');
    }

    #[test]
    fn test_many_pushes_wrap() {
        let mut ring = FixedRing::new(5, 0usize);
        for value in 0..1_003 {
            ring.push_head(value);
        }
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![1_002, 1_001, 1_000, 999, 998]);
    }

    #[test]
    #[should_panic(expected = "Capacity must be greater than zero")]
    fn test_zero_capacity_panics() {
        let _ = FixedRing::new(0, 0u8);
    }
}
