//! Symmetric-key helpers: the garbled-row cipher and the oblivious-transfer
//! pad-derivation KDF.
//!
//! Two distinct primitives live here, deliberately kept separate because
//! they're grounded on different parts of the prior art: row encryption
//! follows the SHA-2 keyed-PRF pattern used elsewhere in this crate, while
//! the OT pad derivation is an extendable-output hash over a group element,
//! matching the `shake_256`-based KDF the reference protocol uses.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use crate::constants::MAC_BYTES;
use crate::group::PrimeGroup;

/// XOR two equal-length byte buffers. Panics if the lengths differ --
/// callers in this crate always construct both operands to the same size.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(a.len(), b.len(), "xor_bytes: length mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Derive an `out_len`-byte pad from a group element, for masking an OT
/// message. Uses SHAKE-256 over the element's canonical big-endian bytes,
/// exactly mirroring the reference protocol's `shake_256(...).digest(n)`.
pub fn ot_hash(group: &PrimeGroup, element: &BigUint, out_len: usize) -> Vec<u8> {
    let mut hasher = Shake256::default();
    hasher.update(&group.encode(element));
    let mut reader = hasher.finalize_xof();
    let mut out = vec![0u8; out_len];
    reader.read(&mut out);
    out
}

/// A one-time pad derived from a wire label, a gate id and a layer tag.
/// Used to build the nested encryption of each garbled-table row: the
/// payload is masked once per input wire, innermost first, so a decryptor
/// holding the wrong pair of labels recovers garbage rather than a valid
/// plaintext+tag pair.
fn layer_pad(label: &[u8], gate_id: u32, layer_tag: u8, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut counter: u8 = 0;
    while out.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(label);
        hasher.update(gate_id.to_be_bytes());
        hasher.update([layer_tag, counter]);
        out.extend_from_slice(&hasher.finalize());
        counter = counter.wrapping_add(1);
    }
    out.truncate(len);
    out
}

fn row_tag(labels: &[&[u8]], gate_id: u32, plaintext: &[u8]) -> [u8; MAC_BYTES] {
    let mut hasher = Sha256::new();
    for label in labels {
        hasher.update(label);
    }
    hasher.update(gate_id.to_be_bytes());
    hasher.update(plaintext);
    let digest = hasher.finalize();
    let mut tag = [0u8; MAC_BYTES];
    tag.copy_from_slice(&digest[..MAC_BYTES]);
    tag
}

/// Encrypt one garbled-table row under the input labels that select it,
/// innermost label first. `labels` lists the keying labels in the same
/// order the row's ciphertext must later be decrypted with.
pub fn encrypt_row(labels: &[&[u8]], gate_id: u32, plaintext: &[u8]) -> Vec<u8> {
    let tag = row_tag(labels, gate_id, plaintext);
    let mut payload = plaintext.to_vec();
    payload.extend_from_slice(&tag);

    let mut ciphertext = payload;
    for (layer, label) in labels.iter().enumerate().rev() {
        let pad = layer_pad(label, gate_id, layer as u8, ciphertext.len());
        ciphertext = xor_bytes(&ciphertext, &pad);
    }
    ciphertext
}

/// Decrypt a garbled-table row. Returns `None` if the authentication tag
/// does not match, which happens with overwhelming probability when the
/// wrong pair of labels is used (i.e. the evaluator tried the wrong row).
pub fn decrypt_row(labels: &[&[u8]], gate_id: u32, ciphertext: &[u8]) -> Option<Vec<u8>> {
    let mut payload = ciphertext.to_vec();
    for (layer, label) in labels.iter().enumerate() {
        let pad = layer_pad(label, gate_id, layer as u8, payload.len());
        payload = xor_bytes(&payload, &pad);
    }
    if payload.len() < MAC_BYTES {
        return None;
    }
    let split = payload.len() - MAC_BYTES;
    let (plaintext, tag) = payload.split_at(split);
    if row_tag(labels, gate_id, plaintext) == tag {
        Some(plaintext.to_vec())
    } else {
        None
    }
}
