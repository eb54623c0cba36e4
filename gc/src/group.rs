//! The Diffie-Hellman group the oblivious-transfer subprotocol runs in.
//!
//! A safe prime `p = 2q + 1` defines a subgroup of quadratic residues of
//! prime order `q`; discrete log and DDH are assumed hard there. All
//! arithmetic is plain modular exponentiation over [`BigUint`] -- no curve
//! machinery, matching the scale of the rest of this crate.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::RngCore;

/// RFC 3526 group 14, the standard 2048-bit MODP prime. It is a safe prime;
/// squaring its canonical generator (2) lands us in the order-`q` subgroup
/// of quadratic residues, which is the group the OT subprotocol needs.
const RFC3526_2048_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD",
    "129024E088A67CC74020BBEA63B139B22514A08798E3404",
    "DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C",
    "245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406",
    "B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE",
    "45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD",
    "24CF5F83655D23DCA3AD961C62F356208552BB9ED529077",
    "096966D670C354E4ABC9804F1746C08CA18217C32905E46",
    "2E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF",
    "06F4C52C9DE2BCBF6955817183995497CEA956AE515D226",
    "1898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// A multiplicative group of prime order `q`, embedded inside `Z_p^*`.
#[derive(Debug, Clone)]
pub struct PrimeGroup {
    /// The safe prime modulus.
    pub p: BigUint,
    /// The subgroup order, `(p - 1) / 2`.
    pub q: BigUint,
    /// A generator of the order-`q` subgroup.
    pub g: BigUint,
}

impl PrimeGroup {
    /// The production group: a real >=2048-bit safe prime.
    pub fn rfc3526_2048() -> Self {
        let p = BigUint::parse_bytes(RFC3526_2048_HEX.as_bytes(), 16)
            .expect("embedded RFC 3526 constant is valid hex");
        let q = (&p - BigUint::one()) / BigUint::from(2u8);
        let g = BigUint::from(2u8).modpow(&BigUint::from(2u8), &p);
        PrimeGroup { p, q, g }
    }

    /// A deliberately small safe-prime group, for fast unit tests only.
    /// `p = 23 = 2*11 + 1`, `q = 11`, `g = 4` (order 11 in `Z_23^*`).
    pub fn insecure_test_group() -> Self {
        PrimeGroup {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        }
    }

    /// Sample a uniformly random exponent in `[1, q-1]`.
    pub fn random_exponent(&self, rng: &mut impl RngCore) -> BigUint {
        loop {
            let bytes_needed = self.q.to_bytes_be().len() + 8;
            let mut buf = vec![0u8; bytes_needed];
            rng.fill_bytes(&mut buf);
            let candidate = BigUint::from_bytes_be(&buf) % &self.q;
            if !candidate.is_zero() {
                return candidate;
            }
        }
    }

    /// `g^x mod p`.
    pub fn pow_g(&self, x: &BigUint) -> BigUint {
        self.g.modpow(x, &self.p)
    }

    /// `base^x mod p`.
    pub fn pow(&self, base: &BigUint, x: &BigUint) -> BigUint {
        base.modpow(x, &self.p)
    }

    /// `a * b mod p`.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    /// Multiplicative inverse of `a` modulo `p`, via Fermat's little theorem
    /// (`p` is prime, so `a^(p-2) == a^-1 mod p`).
    pub fn inv(&self, a: &BigUint) -> BigUint {
        let exp = &self.p - BigUint::from(2u8);
        a.modpow(&exp, &self.p)
    }

    /// Canonical big-endian byte encoding of a group element, used as KDF input.
    pub fn encode(&self, elem: &BigUint) -> Vec<u8> {
        elem.to_bytes_be()
    }

    /// Canonical big-endian encoding padded to the modulus width, which is
    /// what actually crosses the wire: a varying-length encoding would leak
    /// the element's magnitude to a passive observer of frame sizes.
    pub fn encode_fixed(&self, elem: &BigUint) -> Vec<u8> {
        let width = self.p.to_bytes_be().len();
        let mut bytes = elem.to_bytes_be();
        if bytes.len() < width {
            let mut padded = vec![0u8; width - bytes.len()];
            padded.extend_from_slice(&bytes);
            bytes = padded;
        }
        bytes
    }

    /// Parse a wire-format group element and reject anything that cannot be
    /// a legitimate group element: out of the canonical range `[1, p-1]`.
    /// Per the protocol spec, a validation failure here is a fatal abort,
    /// never a silent substitution.
    pub fn decode_checked(&self, bytes: &[u8]) -> crate::error::Result<BigUint> {
        let value = BigUint::from_bytes_be(bytes);
        if value.is_zero() || value >= self.p {
            return Err(crate::error::Error::ProtocolInvariant(format!(
                "group element {value} out of range [1, p-1]"
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn generator_has_order_q_in_test_group() {
        let group = PrimeGroup::insecure_test_group();
        assert_eq!(group.pow_g(&group.q), BigUint::one());
        assert_ne!(group.g, BigUint::one());
    }

    #[test]
    fn inverse_round_trips() {
        let group = PrimeGroup::insecure_test_group();
        let mut rng = ChaCha12Rng::from_seed([7u8; 32]);
        let x = group.random_exponent(&mut rng);
        let gx = group.pow_g(&x);
        let inv = group.inv(&gx);
        assert_eq!(group.mul(&gx, &inv), BigUint::one());
    }

    #[test]
    fn diffie_hellman_agrees() {
        let group = PrimeGroup::insecure_test_group();
        let mut rng = ChaCha12Rng::from_seed([9u8; 32]);
        let a = group.random_exponent(&mut rng);
        let b = group.random_exponent(&mut rng);
        let shared_from_a = group.pow(&group.pow_g(&b), &a);
        let shared_from_b = group.pow(&group.pow_g(&a), &b);
        assert_eq!(shared_from_a, shared_from_b);
    }

    #[test]
    fn rfc3526_group_generator_has_order_q() {
        let group = PrimeGroup::rfc3526_2048();
        assert_eq!(group.pow_g(&group.q), BigUint::one());
    }

    #[test]
    fn fixed_encoding_has_constant_width() {
        let group = PrimeGroup::rfc3526_2048();
        let width = group.p.to_bytes_be().len();
        assert_eq!(group.encode_fixed(&BigUint::from(2u8)).len(), width);
        assert_eq!(group.encode_fixed(&group.p).len(), width);
    }

    #[test]
    fn decode_checked_rejects_out_of_range_elements() {
        let group = PrimeGroup::insecure_test_group();
        assert!(group.decode_checked(&[0]).is_err());
        assert!(group.decode_checked(&group.p.to_bytes_be()).is_err());
        assert!(group.decode_checked(&(&group.p + 1u8).to_bytes_be()).is_err());
        assert!(group.decode_checked(&[4]).is_ok());
    }
}
