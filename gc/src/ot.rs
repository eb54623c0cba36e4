//! 1-out-of-2 oblivious transfer, honest-but-curious, over a prime-order
//! Diffie-Hellman group.
//!
//! This is Nigel Smart's textbook OT ("Cryptography Made Simple"): the
//! sender publishes a single commitment `C`, the chooser blinds it into a
//! pair `(H_0, H_1)` whose product is always `C` -- so the sender cannot
//! tell which half the chooser actually computed from a fresh exponent --
//! and the sender then masks both candidate messages under a KDF keyed by
//! `H_0^k` and `H_1^k` respectively. Only the chooser's exponent lets either
//! mask be removed, and only for the bit it actually chose.
//!
//! Each run consumes one fresh commitment (`r`) on the sender side and one
//! fresh blinding exponent (`x`) on the chooser side; neither is reused
//! across OT sessions in the same protocol run.

use rand::RngCore;

use crate::error::{Error, Result};
use crate::group::PrimeGroup;
use crate::symmetric::{ot_hash, xor_bytes};
use crate::transport::{Frame, Transport};

/// The garbler's side of one OT: it holds two equal-length messages and
/// learns nothing about which one the chooser ends up with.
pub fn run_sender(
    group: &PrimeGroup,
    transport: &mut impl Transport,
    m0: &[u8],
    m1: &[u8],
    rng: &mut impl RngCore,
) -> Result<()> {
    if m0.len() != m1.len() {
        return Err(Error::ProtocolInvariant(
            "oblivious transfer: m0 and m1 must have equal length".to_string(),
        ));
    }

    let r = group.random_exponent(rng);
    let c = group.pow_g(&r);
    transport.send(&Frame::OtCommit {
        c: group.encode_fixed(&c),
    })?;

    let h0_bytes = match transport.receive()? {
        Frame::OtChoice { h } => h,
        other => {
            return Err(Error::ProtocolInvariant(format!(
                "oblivious transfer: expected OtChoice, got {other:?}"
            )));
        }
    };
    let h0 = group.decode_checked(&h0_bytes)?;
    let h1 = group.mul(&c, &group.inv(&h0));

    let k = group.random_exponent(rng);
    let c1 = group.pow_g(&k);

    let pad0 = ot_hash(group, &group.pow(&h0, &k), m0.len());
    let pad1 = ot_hash(group, &group.pow(&h1, &k), m1.len());
    let e0 = xor_bytes(m0, &pad0);
    let e1 = xor_bytes(m1, &pad1);

    transport.send(&Frame::OtCiphertexts {
        c1: group.encode_fixed(&c1),
        e0,
        e1,
    })?;
    Ok(())
}

/// The evaluator's side of one OT: it holds a choice bit `b` and, on
/// success, recovers exactly `m_b` -- no other information about `m_{1-b}`.
pub fn run_chooser(
    group: &PrimeGroup,
    transport: &mut impl Transport,
    choice_bit: bool,
    rng: &mut impl RngCore,
) -> Result<Vec<u8>> {
    let c_bytes = match transport.receive()? {
        Frame::OtCommit { c } => c,
        other => {
            return Err(Error::ProtocolInvariant(format!(
                "oblivious transfer: expected OtCommit, got {other:?}"
            )));
        }
    };
    let c = group.decode_checked(&c_bytes)?;

    let x = group.random_exponent(rng);
    let x_pow = group.pow_g(&x);
    let h_chosen = if choice_bit {
        group.mul(&c, &group.inv(&x_pow))
    } else {
        x_pow.clone()
    };

    transport.send(&Frame::OtChoice {
        h: group.encode_fixed(&h_chosen),
    })?;

    let (c1_bytes, e0, e1) = match transport.receive()? {
        Frame::OtCiphertexts { c1, e0, e1 } => (c1, e0, e1),
        other => {
            return Err(Error::ProtocolInvariant(format!(
                "oblivious transfer: expected OtCiphertexts, got {other:?}"
            )));
        }
    };
    let c1 = group.decode_checked(&c1_bytes)?;

    let chosen = if choice_bit { &e1 } else { &e0 };
    let pad = ot_hash(group, &group.pow(&c1, &x), chosen.len());
    Ok(xor_bytes(chosen, &pad))
}
