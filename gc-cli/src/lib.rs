//! External-collaborator pieces the core `gc` crate deliberately excludes:
//! the `n`-bit signed comparator circuit generator, input-file parsing and
//! fixed-point scaling, and a concrete TCP transport. Exposed as a library
//! so `gc-integration-tests` can drive the same comparator/scaling logic
//! the `gc-cli` binary uses, without duplicating it.

/// The n-bit signed comparator circuit generator.
pub mod comparator;
/// Input-file parsing and decimal-to-fixed-point scaling.
pub mod input;
/// Length-prefixed bincode-over-TCP transport.
pub mod net;

/// The local file each party reads its own input values from, per the
/// reference implementation's `config.py`.
pub const ALICE_INPUT_FILE: &str = "input_alice.txt";
/// See [`ALICE_INPUT_FILE`].
pub const BOB_INPUT_FILE: &str = "input_bob.txt";
