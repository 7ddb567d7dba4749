//! Restart cutoff sequences.

/// A sequence of restart cutoffs, indexed by restart rank.
#[derive(Debug, Clone, PartialEq)]
pub enum Cutoff {
    /// The same cutoff every time.
    Constant { scale: u64 },
    /// `base * grow^i`, rounded down.
    Geometric { base: u64, grow: f64 },
    /// The Luby sequence (1 1 2 1 1 2 4 ...) scaled by a factor.
    Luby { scale: u64 },
}

impl Cutoff {
    /// Cutoff to apply before restart number `i` (0-based).
    pub fn nth(&self, i: u64) -> u64 {
        match *self {
            Cutoff::Constant { scale } => scale,
            Cutoff::Geometric { base, grow } => (base as f64 * grow.powi(i as i32)) as u64,
            Cutoff::Luby { scale } => scale * luby(i + 1),
        }
    }
}

/// Term `i` (1-based) of the Luby sequence.
fn luby(mut i: u64) -> u64 {
    loop {
        // smallest k with 2^k - 1 >= i
        let mut k = 1u32;
        while (1u64 << k) - 1 < i {
            k += 1;
        }
        if (1u64 << k) - 1 == i {
            return 1u64 << (k - 1);
        }
        i -= (1u64 << (k - 1)) - 1;
    }
}
