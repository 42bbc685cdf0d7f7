//! # `csortvec` — Lock-free, copy-on-write sorted vectors
//!
//! `csortvec` provides a concurrently readable and writable sorted sequence without any lock over
//! the sequence's contents. Any number of threads may insert values and look values up by
//! position at the same time; a reader always observes one fully constructed snapshot, and the
//! memory of outdated snapshots is reclaimed without stop-the-world synchronization.
//!
//! ## Overview
//!
//! - `CSortVec<T>` for the sorted vector itself, with `insert` and position-based `get`.
//! - `settings` for configuring the slot pool backing a vector.
//! - `Error` for the two failure conditions: pool exhaustion and out-of-range lookups.
//!
//! ## Why?
//!
//! Guarding a grow-only sorted vector with a lock makes readers pay for writers: a single slow
//! insert stalls every lookup. This crate instead updates through copy-on-write: an insert builds
//! a complete new copy of the sequence and publishes it with a single compare-and-swap, so
//! lookups never wait on anything and never observe a half-built sequence.
//!
//! The price is that every insert copies the whole sequence, making the structure a fit for
//! read-heavy workloads over modestly sized sequences, and a poor fit for write-heavy ones.
//!
//! ## Usage
//!
//! ```rust
//! use csortvec::CSortVec;
//!
//! let v = CSortVec::new();
//! v.insert(3).unwrap();
//! v.insert(1).unwrap();
//! v.insert(2).unwrap();
//!
//! assert_eq!(v.get(0).unwrap(), 1);
//! assert_eq!(v.to_vec(), vec![1, 2, 3]);
//! ```
//!
//! ## Design & internals
//!
//! All storage for sequence snapshots comes from a fixed pool of slots, allocated once when the
//! vector is created. The hot path never touches the general-purpose allocator; acquiring and
//! releasing a slot is a short, bounded critical section on the pool's free list, off the
//! compare-and-swap path.
//!
//! The currently published snapshot is identified by one atomic word packing a slot index
//! together with the number of readers currently pinning that snapshot. Keeping both fields in a
//! single word means the pair can never tear: a compare-and-swap either sees the index and the
//! count of the same moment, or fails.
//!
//! Reclamation is split between the descriptor word and the slots. While a snapshot is
//! published, its readers are counted in the descriptor. The insert that supersedes it learns
//! the final count from its successful compare-and-swap and transfers the count onto the
//! superseded slot's own header, where the remaining readers settle their pins. Whoever brings
//! the header to zero, be it the writer or the last late reader, destructs the snapshot and
//! returns the slot to the pool. A slot is therefore never recycled while any reader is mid-read
//! of the snapshot it hosts.
//!
//! ## Caveats
//!
//! - The pool bounds how many snapshots can be alive at once: roughly one per in-flight insert,
//!   plus the published one, plus one per reader holding a pin across a publish. An undersized
//!   pool makes `insert` fail with `Error::Exhausted`.
//! - Progress is retry-based. A failed publish due to a concurrent writer is retried
//!   transparently; under sustained write contention an insert can retry arbitrarily often.
//! - The descriptor word requires a target with 64-bit atomics.
//!
//! ## Debugging
//!
//! Enable feature `debug-tools` and set environment variable `CSORTVEC_DEBUG_MODE`. For example,
//! `CSORTVEC_DEBUG_MODE=1 cargo test --features debug-tools`. To get stacktraces after each
//! message, set environment variable `CSORTVEC_DEBUG_STACKTRACE`.

#![deny(missing_docs)]

#[macro_use]
extern crate quick_error;
extern crate parking_lot;

mod debug;
mod desc;
mod error;
mod pool;
mod slot;
mod vec;
pub mod settings;

pub use error::Error;
pub use vec::CSortVec;
