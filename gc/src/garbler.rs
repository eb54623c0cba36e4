//! Dual-key, point-and-permute garbling.
//!
//! Every wire gets two labels `(k0, k1)` and a random permutation bit
//! `p_bit`; the *external* (or "signal") bit carried alongside a label is
//! `actual_bit ^ p_bit`. A garbled gate's table is indexed by the external
//! bits of its inputs rather than by the actual bits, so neither the
//! garbler's table nor the evaluator's walk through it ever reveals which
//! logical value a label represents.

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};
use rand::RngCore;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::circuit::{Circuit, WireId};
use crate::constants::{LABEL_BYTES, PROGRESS_UPDATE_INTERVAL};
use crate::error::{Error, Result};
use crate::symmetric::{decrypt_row, encrypt_row};

/// A single 128-bit wire label.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct WireLabel(pub [u8; LABEL_BYTES]);

impl std::fmt::Debug for WireLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WireLabel({:02x?}..)", &self.0[..4])
    }
}

impl WireLabel {
    fn random(rng: &mut ChaCha12Rng) -> Self {
        let mut bytes = [0u8; LABEL_BYTES];
        rng.fill_bytes(&mut bytes);
        WireLabel(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// The two labels for a wire plus the permutation bit attached to `k0`.
///
/// Per the protocol's resource-lifetime contract, garbled material is
/// single-use: it survives exactly one evaluation and is discarded, so
/// every `WireKeys` zeroizes its labels and permutation bit when dropped.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
struct WireKeys {
    k0: WireLabel,
    k1: WireLabel,
    p_bit: bool,
}

impl WireKeys {
    fn random(rng: &mut ChaCha12Rng) -> Self {
        WireKeys {
            k0: WireLabel::random(rng),
            k1: WireLabel::random(rng),
            p_bit: rng.next_u32() & 1 == 1,
        }
    }

    fn label_for_bit(&self, bit: bool) -> &WireLabel {
        if bit {
            &self.k1
        } else {
            &self.k0
        }
    }

    fn external_bit_for(&self, bit: bool) -> bool {
        bit ^ self.p_bit
    }
}

/// A wire label together with the external (point-and-permute) bit that
/// travels with it. This, never a bare logical bit, is what gets handed to
/// the evaluator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LabeledWire {
    pub label: WireLabel,
    pub external_bit: bool,
}

/// Byte width of a [`LabeledWire`] in its OT payload encoding: the label
/// followed by a single tag byte for the external bit.
pub const LABELED_WIRE_BYTES: usize = LABEL_BYTES + 1;

impl LabeledWire {
    /// Fixed-width encoding used as an oblivious-transfer payload. Both
    /// messages in a single OT always encode to this same length, so the
    /// sender never needs to pad.
    pub fn to_bytes(self) -> [u8; LABELED_WIRE_BYTES] {
        let mut out = [0u8; LABELED_WIRE_BYTES];
        out[..LABEL_BYTES].copy_from_slice(&self.label.0);
        out[LABEL_BYTES] = self.external_bit as u8;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != LABELED_WIRE_BYTES {
            return Err(Error::ProtocolInvariant(format!(
                "labeled wire payload has wrong length: expected {LABELED_WIRE_BYTES}, got {}",
                bytes.len()
            )));
        }
        let mut label_bytes = [0u8; LABEL_BYTES];
        label_bytes.copy_from_slice(&bytes[..LABEL_BYTES]);
        Ok(LabeledWire {
            label: WireLabel(label_bytes),
            external_bit: bytes[LABEL_BYTES] != 0,
        })
    }
}

/// One garbled gate: a permuted, encrypted truth table with `2^arity` rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GarbledGate {
    pub rows: Vec<Vec<u8>>,
}

/// Everything the garbler produces for a circuit: the garbled tables
/// (shared with the evaluator) and the permutation bits of the output
/// wires (kept private, used later to decode the evaluator's result).
#[derive(Debug)]
pub struct Garbler {
    wire_keys: HashMap<WireId, WireKeys>,
    tables: HashMap<WireId, GarbledGate>,
}

impl Garbler {
    /// Garble every gate in `circuit`, generating fresh random labels for
    /// every wire (inputs and intermediates alike).
    pub fn garble(circuit: &Circuit, rng: &mut ChaCha12Rng) -> Result<Self> {
        let mut wire_keys = HashMap::new();
        for &wire in circuit.alice.iter().chain(circuit.bob.iter()) {
            wire_keys.insert(wire, WireKeys::random(rng));
        }

        let mut tables = HashMap::new();
        debug!(gate_count = circuit.gates.len(), "garbling circuit");

        let progress = ProgressBar::new(circuit.gates.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} gates garbled [{elapsed_precise}]")
                .unwrap()
                .progress_chars("##-"),
        );

        for (processed, gate) in circuit.gates.iter().enumerate() {
            let output_keys = WireKeys::random(rng);
            let input_keys: Vec<&WireKeys> = gate
                .inputs
                .iter()
                .map(|w| {
                    wire_keys
                        .get(w)
                        .ok_or_else(|| Error::ProtocolInvariant(format!("wire {w} ungarbled")))
                })
                .collect::<Result<_>>()?;

            let arity = gate.gate_type.arity();
            let mut rows = vec![Vec::new(); 1 << arity];
            for combo in 0..(1u32 << arity) {
                let actual_bits: Vec<bool> =
                    (0..arity).map(|i| (combo >> (arity - 1 - i)) & 1 == 1).collect();
                let output_bit = gate.gate_type.eval(&actual_bits);

                let keying_labels: Vec<&[u8]> = input_keys
                    .iter()
                    .zip(actual_bits.iter())
                    .map(|(keys, &bit)| keys.label_for_bit(bit).as_bytes())
                    .collect();

                let mut plaintext = Vec::with_capacity(LABEL_BYTES + 1);
                plaintext.extend_from_slice(output_keys.label_for_bit(output_bit).as_bytes());
                plaintext.push(output_keys.external_bit_for(output_bit) as u8);

                let ciphertext = encrypt_row(&keying_labels, gate.id, &plaintext);

                let row_index: usize = input_keys
                    .iter()
                    .zip(actual_bits.iter())
                    .fold(0usize, |acc, (keys, &bit)| {
                        (acc << 1) | keys.external_bit_for(bit) as usize
                    });
                rows[row_index] = ciphertext;
            }

            trace!(gate = gate.id, "garbled gate table built");
            tables.insert(gate.id, GarbledGate { rows });
            wire_keys.insert(gate.id, output_keys);

            if (processed as u32).is_multiple_of(PROGRESS_UPDATE_INTERVAL) {
                progress.set_position(processed as u64);
            }
        }
        progress.finish_and_clear();

        Ok(Garbler { wire_keys, tables })
    }

    /// The garbled tables, to be shipped to the evaluator.
    pub fn tables(&self) -> &HashMap<WireId, GarbledGate> {
        &self.tables
    }

    /// Labels (with external bits) for the garbler's own input wires, given
    /// its actual input bits in wire order.
    pub fn own_input_labels(&self, wires: &[WireId], inputs: &[bool]) -> Result<HashMap<WireId, LabeledWire>> {
        if wires.len() != inputs.len() {
            return Err(Error::ProtocolInvariant(
                "own_input_labels: wire/input length mismatch".to_string(),
            ));
        }
        wires
            .iter()
            .zip(inputs.iter())
            .map(|(&w, &bit)| {
                let keys = self
                    .wire_keys
                    .get(&w)
                    .ok_or_else(|| Error::ProtocolInvariant(format!("unknown wire {w}")))?;
                Ok((
                    w,
                    LabeledWire {
                        label: *keys.label_for_bit(bit),
                        external_bit: keys.external_bit_for(bit),
                    },
                ))
            })
            .collect()
    }

    /// For each of the peer's wires, the two candidate labeled values (for
    /// actual bit 0 and for actual bit 1). Feeds directly into oblivious
    /// transfer: the peer picks exactly one of the pair per wire, never
    /// learning the other.
    pub fn peer_input_label_pairs(
        &self,
        wires: &[WireId],
    ) -> Result<HashMap<WireId, (LabeledWire, LabeledWire)>> {
        wires
            .iter()
            .map(|&w| {
                let keys = self
                    .wire_keys
                    .get(&w)
                    .ok_or_else(|| Error::ProtocolInvariant(format!("unknown wire {w}")))?;
                Ok((
                    w,
                    (
                        LabeledWire {
                            label: keys.k0,
                            external_bit: keys.external_bit_for(false),
                        },
                        LabeledWire {
                            label: keys.k1,
                            external_bit: keys.external_bit_for(true),
                        },
                    ),
                ))
            })
            .collect()
    }

    /// The output decoding table: each output wire's private permutation
    /// bit. Shipped as part of the circuit artifact per the data model, but
    /// the evaluator has no protocol-level use for it -- only the garbler's
    /// own [`Garbler::decode`] consults it.
    pub fn output_perm_bits(&self, outputs: &[WireId]) -> Result<HashMap<WireId, bool>> {
        outputs
            .iter()
            .map(|&w| {
                let keys = self
                    .wire_keys
                    .get(&w)
                    .ok_or_else(|| Error::ProtocolInvariant(format!("unknown output wire {w}")))?;
                Ok((w, keys.p_bit))
            })
            .collect()
    }

    /// Decode the evaluator's reported external bits for the output wires
    /// into actual logical bits, using the private permutation bits.
    pub fn decode(&self, out_signals: &HashMap<WireId, bool>) -> Result<HashMap<WireId, bool>> {
        out_signals
            .iter()
            .map(|(&w, &signal)| {
                let keys = self
                    .wire_keys
                    .get(&w)
                    .ok_or_else(|| Error::ProtocolInvariant(format!("unknown output wire {w}")))?;
                Ok((w, signal ^ keys.p_bit))
            })
            .collect()
    }
}

/// Decrypt one garbled row using the input labels an evaluator actually
/// holds (in gate input order), returning the output wire's labeled value.
pub fn decrypt_gate_row(
    table: &GarbledGate,
    gate_id: WireId,
    input_labels: &[LabeledWire],
) -> Result<LabeledWire> {
    let row_index: usize = input_labels
        .iter()
        .fold(0usize, |acc, lw| (acc << 1) | lw.external_bit as usize);
    let row = table
        .rows
        .get(row_index)
        .ok_or_else(|| Error::ProtocolInvariant(format!("gate {gate_id}: row {row_index} missing")))?;

    let keying_labels: Vec<&[u8]> = input_labels.iter().map(|lw| lw.label.as_bytes()).collect();
    let plaintext = decrypt_row(&keying_labels, gate_id, row).ok_or_else(|| {
        Error::Cryptographic(format!("gate {gate_id}: row {row_index} failed to authenticate"))
    })?;

    if plaintext.len() != LABEL_BYTES + 1 {
        return Err(Error::Cryptographic(format!(
            "gate {gate_id}: decrypted row has wrong length"
        )));
    }
    let mut label_bytes = [0u8; LABEL_BYTES];
    label_bytes.copy_from_slice(&plaintext[..LABEL_BYTES]);
    Ok(LabeledWire {
        label: WireLabel(label_bytes),
        external_bit: plaintext[LABEL_BYTES] != 0,
    })
}
