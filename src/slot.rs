//! Pool slots.
//!
//! A slot is a preallocated home for one sequence snapshot, together with the per-snapshot
//! header the reclamation protocol settles against. The slot performs no construction or
//! destruction on its own: the caller places a sequence into an acquired slot and destructs it
//! before the slot is released.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{self, AtomicIsize};

/// The ordering used by the settle header.
const ORDERING: atomic::Ordering = atomic::Ordering::SeqCst;

/// A preallocated home for one sequence snapshot.
///
/// The sequence storage starts uninitialized and cycles through initialized/uninitialized as
/// snapshots are placed into and torn out of the slot. The settle header outlives every hosted
/// snapshot and is zero whenever the slot sits in the pool's free list.
pub struct Slot<T> {
    /// The settle count of the hosted snapshot.
    ///
    /// While a snapshot is published, its readers are counted in the descriptor word, and this
    /// header rests at zero. When the snapshot is superseded, the publisher transfers the
    /// observed reader count here and readers still holding pins settle here. The slot may be
    /// reclaimed exactly when the header returns to zero afterwards.
    settle: AtomicIsize,
    /// Storage for the hosted sequence.
    data: UnsafeCell<MaybeUninit<Vec<T>>>,
}

// Slots travel between threads inside the pool, and a pinned snapshot is read from many threads
// at once, so a slot is as sendable and shareable as its element type.
unsafe impl<T: Send> Send for Slot<T> {}
unsafe impl<T: Send + Sync> Sync for Slot<T> {}

impl<T> Slot<T> {
    /// Create a free slot.
    pub fn new() -> Slot<T> {
        Slot {
            settle: AtomicIsize::new(0),
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Place a sequence into the slot.
    ///
    /// # Safety
    ///
    /// The slot must be free: freshly acquired from the pool and not hosting a constructed
    /// sequence.
    pub unsafe fn init(&self, seq: Vec<T>) {
        debug_assert!(
            self.settle.load(ORDERING) == 0,
            "Initializing a slot whose settle header hasn't returned to rest."
        );

        ptr::write((*self.data.get()).as_mut_ptr(), seq);
    }

    /// Run the hosted sequence's destructor, leaving the slot uninitialized.
    ///
    /// # Safety
    ///
    /// The slot must host a constructed sequence, and no reference into it may survive this
    /// call.
    pub unsafe fn destroy(&self) {
        ptr::drop_in_place((*self.data.get()).as_mut_ptr());
    }

    /// Get a reference to the hosted sequence.
    ///
    /// # Safety
    ///
    /// The slot must host a constructed sequence, and the caller must hold a pin keeping it
    /// alive for the lifetime of the reference.
    pub unsafe fn get(&self) -> &Vec<T> {
        &*(*self.data.get()).as_ptr()
    }

    /// Transfer the superseded descriptor's reader count onto the slot.
    ///
    /// Called once per hosted snapshot, by the writer that superseded it, with the reader count
    /// its publish observed. Returns true when the header has thereby settled to zero, in which
    /// case no pin is outstanding and the caller must reclaim the slot.
    pub fn transfer(&self, readers: isize) -> bool {
        self.settle.fetch_add(readers, ORDERING) + readers == 0
    }

    /// Settle one pin that outlived the hosted snapshot's publication.
    ///
    /// Returns true when this was the last outstanding pin and the transfer has already landed,
    /// in which case the caller must reclaim the slot.
    pub fn settle_one(&self) -> bool {
        self.settle.fetch_sub(1, ORDERING) == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_get_destroy() {
        let slot: Slot<u32> = Slot::new();

        unsafe {
            slot.init(vec![1, 2, 3]);
            assert_eq!(slot.get().as_slice(), &[1, 2, 3]);
            slot.destroy();

            slot.init(Vec::new());
            assert!(slot.get().is_empty());
            slot.destroy();
        }
    }

    #[test]
    fn settle_after_transfer() {
        let slot: Slot<u8> = Slot::new();

        // The publisher saw one pinned reader; the reader settles afterwards.
        assert!(!slot.transfer(1));
        assert!(slot.settle_one());
    }

    #[test]
    fn settle_before_transfer() {
        let slot: Slot<u8> = Slot::new();

        // One of two pinned readers settles before the publisher's transfer lands; the other
        // reclaims.
        assert!(!slot.settle_one());
        assert!(!slot.transfer(2));
        assert!(slot.settle_one());
    }

    #[test]
    fn transfer_without_readers_reclaims() {
        let slot: Slot<u8> = Slot::new();

        assert!(slot.transfer(0));
    }
}
