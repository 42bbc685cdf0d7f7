//! Failure conditions.

quick_error! {
    /// A sorted-vector error.
    ///
    /// Contention is deliberately not represented here: a publish that fails because another
    /// writer got there first is the steady-state mechanism of the structure, retried
    /// internally and invisible to the caller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Error {
        /// The slot pool (of the contained capacity) ran out of free slots.
        ///
        /// Every snapshot in flight (under construction, published, or awaiting its last
        /// reader) occupies one slot, so the pool must be sized for the expected number of
        /// concurrent writers and slow readers. Running out is a resource limit, not a normal
        /// code path. The operation is not retried internally, as silently blocking could
        /// deadlock a bounded thread pool; callers may retry with backoff.
        Exhausted(capacity: usize) {
            display("Slot pool of capacity {} exhausted.", capacity)
            description("Slot pool exhausted.")
        }
        /// A lookup position (first field) was outside the bounds of the sequence, whose length
        /// at the time of the read is the second field.
        ///
        /// Surfaced immediately and never silently clamped.
        OutOfRange(index: usize, len: usize) {
            display("Position {} out of range of a sequence of length {}.", index, len)
            description("Position out of range.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", Error::Exhausted(8)),
            "Slot pool of capacity 8 exhausted."
        );
        assert_eq!(
            format!("{}", Error::OutOfRange(4, 4)),
            "Position 4 out of range of a sequence of length 4."
        );
    }
}
