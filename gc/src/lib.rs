//! Two-party secure function evaluation via Yao's garbled circuits, with a
//! Diffie-Hellman 1-out-of-2 oblivious transfer for delivering the
//! evaluator's input labels.
//!
//! This crate implements the protocol core only: circuit garbling
//! ([`garbler`]), evaluation ([`evaluator`]), oblivious transfer ([`ot`])
//! over a prime-order group ([`group`]), and the [`transport`] interface
//! and [`protocol`] orchestration tying them together for one end-to-end
//! run. Circuit generation, CLI argument handling, input-file parsing, and
//! the concrete network transport are external collaborators that consume
//! this crate -- see the `gc-cli` binary.

/// The circuit artifact: wires, gates, and validation.
pub mod circuit;
/// Shared tuning constants.
pub mod constants;
/// Structured error categories for the protocol.
pub mod error;
/// Circuit evaluation against garbled tables.
pub mod evaluator;
/// Dual-key, point-and-permute circuit garbling.
pub mod garbler;
/// The Diffie-Hellman group oblivious transfer runs in.
pub mod group;
/// 1-out-of-2 oblivious transfer.
pub mod ot;
/// End-to-end two-party protocol orchestration.
pub mod protocol;
/// Symmetric-key building blocks: the garbled-row cipher and OT KDF.
pub mod symmetric;
/// The wire-protocol frames and transport interface.
pub mod transport;

pub use error::{Error, Result};
