//! Settings and presets.

/// Settings for a sorted vector.
///
/// These are fixed at construction through `CSortVec::with_settings` and hold for the lifetime
/// of the structure.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Settings {
    /// The number of preallocated slots in the vector's pool.
    ///
    /// This bounds the memory footprint and the number of snapshots that can be alive at once.
    /// As a rule of thumb, allow one slot per concurrent writer, one for the published
    /// snapshot, and one per reader that can hold a pin across a publish. When the pool runs
    /// dry, `insert` fails with `Error::Exhausted` rather than blocking.
    pub pool_capacity: usize,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            pool_capacity: 256,
        }
    }
}

impl Settings {
    /// Preset for low memory usage with few threads.
    pub fn low_memory() -> Settings {
        Settings {
            pool_capacity: 16,
        }
    }

    /// Preset for many writer threads hammering the same vector.
    pub fn high_contention() -> Settings {
        Settings {
            pool_capacity: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        assert!(Settings::default().pool_capacity > 0);
    }

    #[test]
    fn compare_presets() {
        let low = Settings::low_memory();
        let high = Settings::high_contention();

        assert!(low.pool_capacity < Settings::default().pool_capacity);
        assert!(high.pool_capacity > Settings::default().pool_capacity);
    }
}
