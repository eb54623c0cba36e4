//! Shared tuning constants.

/// Width of a wire label in bytes (128 bits).
pub const LABEL_BYTES: usize = 16;

/// Length, in bytes, of the authentication tag appended to each garbled row.
pub const MAC_BYTES: usize = 8;

/// How often (in gates processed) progress bars refresh their position.
pub const PROGRESS_UPDATE_INTERVAL: u32 = 1000;
