//! The slot pool.
//!
//! Every sequence snapshot lives in a slot drawn from a pool allocated once, up front. This
//! keeps the hot path away from the general-purpose allocator and makes reclamation
//! deterministic: the pool's capacity bounds how many snapshots can be alive (under
//! construction, published, or pending reclamation) at any instant.
//!
//! The free list is the only lock-guarded state in the crate. Its critical sections are a deque
//! operation long and sit off the compare-and-swap path, so they cannot starve the protocol.

use parking_lot::Mutex;
use std::collections::VecDeque;

use debug;
use desc;
use slot::Slot;

/// A fixed-capacity pool of preallocated slots.
pub struct Pool<T> {
    /// The slots.
    slots: Box<[Slot<T>]>,
    /// The indexes of the slots not currently hosting a snapshot.
    free: Mutex<VecDeque<usize>>,
}

impl<T> Pool<T> {
    /// Create a pool of `capacity` preallocated slots, all free.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero (the published snapshot alone needs a slot) or doesn't
    /// fit the descriptor's index field.
    pub fn new(capacity: usize) -> Pool<T> {
        assert!(capacity > 0, "A pool must have at least one slot.");
        assert!(
            capacity <= desc::MAX_INDEX,
            "Pool capacity doesn't fit the descriptor's index field."
        );

        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(Slot::new());
        }

        Pool {
            slots: slots.into_boxed_slice(),
            free: Mutex::new((0..capacity).collect()),
        }
    }

    /// The number of slots in the pool, free or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Take a free slot out of the pool.
    ///
    /// Returns `None` when every slot hosts a live snapshot, meaning the pool was sized too
    /// small for the number of snapshots in flight.
    pub fn acquire(&self) -> Option<usize> {
        let index = self.free.lock().pop_front();

        debug::exec(|| println!("csortvec: acquired slot {:?}.", index));

        index
    }

    /// Hand a slot back to the pool.
    ///
    /// The slot must no longer host a constructed sequence and its settle header must be at
    /// rest.
    pub fn release(&self, index: usize) {
        debug::exec(|| println!("csortvec: released slot {}.", index));

        self.free.lock().push_back(index);
    }

    /// Get the slot at `index`.
    pub fn slot(&self, index: usize) -> &Slot<T> {
        &self.slots[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_roundtrip() {
        let pool: Pool<u8> = Pool::new(4);
        assert_eq!(pool.capacity(), 4);

        let mut taken = Vec::new();
        for _ in 0..4 {
            taken.push(pool.acquire().unwrap());
        }
        taken.sort();
        assert_eq!(taken, vec![0, 1, 2, 3]);

        assert_eq!(pool.acquire(), None);

        for index in taken {
            pool.release(index);
        }
        for _ in 0..4 {
            assert!(pool.acquire().is_some());
        }
        assert_eq!(pool.acquire(), None);
    }

    #[test]
    fn recycles_in_fifo_order() {
        let pool: Pool<u8> = Pool::new(2);

        let first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();
        pool.release(second);
        pool.release(first);

        assert_eq!(pool.acquire(), Some(second));
        assert_eq!(pool.acquire(), Some(first));
    }

    #[test]
    #[should_panic]
    fn zero_capacity() {
        let _: Pool<u8> = Pool::new(0);
    }
}
