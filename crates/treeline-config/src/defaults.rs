//! Serde default values.

pub(crate) fn hbfs_a() -> f64 {
    0.05
}

pub(crate) fn hbfs_b() -> f64 {
    0.1
}

pub(crate) fn hbfs_n() -> u64 {
    32
}

pub(crate) fn restart_cap() -> u64 {
    u64::MAX
}
