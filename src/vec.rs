//! The sorted vector.
//!
//! All coordination between readers and writers goes through one atomic descriptor word (see
//! `desc`) naming the currently published snapshot. Readers pin the snapshot by
//! compare-and-swapping its reader count up, read, and unpin. Writers build a complete copy of
//! the pinned snapshot in a fresh pool slot and publish it with a single compare-and-swap,
//! retrying from scratch when another writer got there first.
//!
//! Reclaiming a superseded snapshot is the delicate part: its final reader count, observed
//! atomically by the publishing compare-and-swap, is transferred onto the snapshot's own slot
//! header, and the remaining readers settle their pins there. The party that brings the header
//! to zero tears the snapshot down and returns its slot to the pool, so storage is never
//! recycled under a reader still using it.

use std::sync::atomic::{self, AtomicU64};

use debug;
use desc;
use error::Error;
use pool::Pool;
use settings::Settings;

/// The ordering used by every descriptor operation.
const ORDERING: atomic::Ordering = atomic::Ordering::SeqCst;

/// A lock-free sorted vector.
///
/// The vector keeps its elements in ascending order, with duplicates permitted, and supports
/// concurrent `insert` and position-based `get` from any number of threads. Updates are
/// copy-on-write: every insert pays a full copy of the sequence in exchange for lookups that
/// never wait and always observe one consistent snapshot.
///
/// Storage comes from a pool of slots fixed at construction; see `settings::Settings` for how
/// to size it.
pub struct CSortVec<T> {
    /// The pool supplying snapshot storage.
    pool: Pool<T>,
    /// The descriptor word naming the published snapshot and counting its readers.
    current: AtomicU64,
}

/// A pinned snapshot.
///
/// While this is alive, the snapshot's slot will not be reclaimed, even if the snapshot is
/// superseded in the meantime. Dropping it settles the pin.
#[must_use = "A pin without a read delays reclamation for nothing."]
struct Pinned<'a, T: 'a> {
    /// The vector the snapshot belongs to.
    vec: &'a CSortVec<T>,
    /// The slot hosting the pinned snapshot.
    index: usize,
}

impl<'a, T> Pinned<'a, T> {
    /// The slot hosting the pinned snapshot.
    fn index(&self) -> usize {
        self.index
    }

    /// The pinned sequence.
    fn as_slice(&self) -> &[T] {
        // The pin keeps the slot's sequence constructed for at least as long as the returned
        // borrow.
        unsafe { self.vec.pool.slot(self.index).get() }
    }
}

impl<'a, T> Drop for Pinned<'a, T> {
    fn drop(&mut self) {
        self.vec.unpin(self.index);
    }
}

impl<T> CSortVec<T> {
    /// Create an empty sorted vector with default settings.
    pub fn new() -> CSortVec<T> {
        CSortVec::with_settings(Settings::default())
    }

    /// Create an empty sorted vector with the given settings.
    pub fn with_settings(settings: Settings) -> CSortVec<T> {
        let pool = Pool::new(settings.pool_capacity);

        // Seed the initial snapshot: an empty sequence in the first slot. A freshly filled pool
        // cannot run dry here.
        let index = pool.acquire().unwrap();
        unsafe {
            pool.slot(index).init(Vec::new());
        }

        CSortVec {
            pool: pool,
            current: AtomicU64::new(desc::pack(index, 0)),
        }
    }

    /// The number of elements in the published snapshot.
    pub fn len(&self) -> usize {
        self.pin().as_slice().len()
    }

    /// Does the published snapshot contain no elements?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pin the currently published snapshot.
    ///
    /// This compare-and-swaps the descriptor's reader count one up, retrying when it loses a
    /// race against another pin, an unpin, or a publish. The snapshot named by the descriptor
    /// value the swap succeeded against is the one pinned.
    fn pin(&self) -> Pinned<T> {
        let mut current = self.current.load(ORDERING);
        loop {
            match self.current.compare_exchange_weak(
                current,
                current + desc::ONE_READER,
                ORDERING,
                ORDERING,
            ) {
                Ok(_) => {
                    return Pinned {
                        vec: self,
                        index: desc::index(current),
                    }
                }
                Err(changed) => current = changed,
            }
        }
    }

    /// Settle the pin on the snapshot hosted in slot `index`.
    ///
    /// While the snapshot is still published, its count lives in the descriptor word and is
    /// compare-and-swapped back down. If it was superseded mid-pin, the publisher has
    /// transferred the count onto the slot itself, and the pin settles there instead,
    /// reclaiming the slot when it was the last one outstanding.
    fn unpin(&self, index: usize) {
        let mut current = self.current.load(ORDERING);
        loop {
            if desc::index(current) != index {
                // Superseded mid-pin. The slot cannot have been recycled, as the header can't
                // settle to zero before this very pin does.
                debug::exec(|| println!("csortvec: late unpin against slot {}.", index));

                if self.pool.slot(index).settle_one() {
                    self.reclaim(index);
                }
                return;
            }

            match self.current.compare_exchange_weak(
                current,
                current - desc::ONE_READER,
                ORDERING,
                ORDERING,
            ) {
                Ok(_) => return,
                Err(changed) => current = changed,
            }
        }
    }

    /// Attempt to publish the snapshot in slot `new` over the snapshot in slot `old`.
    ///
    /// On success, returns the reader count the superseded descriptor carried at the instant of
    /// the swap. Fails without publishing when the published snapshot is no longer `old`.
    fn publish(&self, old: usize, new: usize) -> Result<isize, ()> {
        let mut current = self.current.load(ORDERING);
        loop {
            if desc::index(current) != old {
                return Err(());
            }

            // The candidate starts its life with no readers.
            match self.current.compare_exchange_weak(
                current,
                desc::pack(new, 0),
                ORDERING,
                ORDERING,
            ) {
                Ok(_) => return Ok(desc::readers(current) as isize),
                Err(changed) => current = changed,
            }
        }
    }

    /// Destruct the sequence in slot `index` and hand the slot back to the pool.
    fn reclaim(&self, index: usize) {
        unsafe {
            self.pool.slot(index).destroy();
        }
        self.pool.release(index);
    }
}

impl<T: Clone> CSortVec<T> {
    /// Read the element at position `index`.
    ///
    /// The read observes one published snapshot in its entirety: it is unaffected by inserts
    /// published after the snapshot was pinned, and can never see a half-built sequence.
    ///
    /// Positions outside the snapshot's bounds fail with `Error::OutOfRange`.
    pub fn get(&self, index: usize) -> Result<T, Error> {
        let pin = self.pin();
        let seq = pin.as_slice();

        match seq.get(index) {
            Some(x) => Ok(x.clone()),
            None => Err(Error::OutOfRange(index, seq.len())),
        }
    }

    /// Clone one published snapshot in its entirety.
    ///
    /// The copy is internally consistent (it is the exact content of one snapshot in the
    /// publication order) but naturally goes stale the moment a concurrent insert publishes.
    pub fn to_vec(&self) -> Vec<T> {
        self.pin().as_slice().to_vec()
    }
}

impl<T: Clone + Ord> CSortVec<T> {
    /// Insert `value`, keeping the sequence sorted.
    ///
    /// The insert builds a copy of the published snapshot with `value` placed before the first
    /// element not smaller than it; a value not smaller than the current maximum is appended,
    /// so ties with the maximum keep insertion order. Publishing the copy retries transparently
    /// when racing writers interleave.
    ///
    /// Fails with `Error::Exhausted` when the pool has no free slot for the copy, leaving the
    /// vector unchanged.
    pub fn insert(&self, value: T) -> Result<(), Error> {
        loop {
            // Pin the published snapshot so its storage survives the copy below even if a
            // concurrent writer supersedes it halfway through.
            let pin = self.pin();

            // The candidate needs a home before it can be built.
            let index = match self.pool.acquire() {
                Some(index) => index,
                None => return Err(Error::Exhausted(self.pool.capacity())),
            };

            // Build the candidate: the pinned sequence with `value` at its sorted position.
            let old = pin.as_slice();
            let mut seq = Vec::with_capacity(old.len() + 1);
            seq.extend_from_slice(old);

            let at = match seq.iter().position(|x| *x >= value) {
                // The first element not smaller than the value, except that a value tying
                // with the maximum skips past it and appends.
                Some(at) if value < seq[seq.len() - 1] => at,
                _ => seq.len(),
            };
            seq.insert(at, value.clone());

            unsafe {
                self.pool.slot(index).init(seq);
            }

            // Settle our own pin before publishing, so the superseded count covers readers
            // only.
            let old_index = pin.index();
            drop(pin);

            match self.publish(old_index, index) {
                Ok(readers) => {
                    // The old snapshot is superseded. Transfer its final reader count onto its
                    // slot; when that settles to zero right away, no reader is left and the
                    // slot is ours to reclaim. Otherwise the last reader reclaims it.
                    if self.pool.slot(old_index).transfer(readers) {
                        self.reclaim(old_index);
                    }
                    return Ok(());
                }
                Err(()) => {
                    // Another writer published first. Tear the candidate down and start over
                    // against the new snapshot.
                    self.reclaim(index);
                }
            }
        }
    }
}

impl<T> Default for CSortVec<T> {
    fn default() -> CSortVec<T> {
        CSortVec::new()
    }
}

impl<T> Drop for CSortVec<T> {
    fn drop(&mut self) {
        // No pin can outlive the vector, so the published snapshot is the only one left
        // standing. Tear it down before the pool frees the raw blocks.
        let index = desc::index(self.current.load(ORDERING));
        self.reclaim(index);
    }
}
