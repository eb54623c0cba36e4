//! Circuit evaluation: walking the gate DAG with exactly one label per
//! wire and no knowledge of the logical bit it represents.
//!
//! The evaluator's entire state is a map from wire id to the single
//! `(label, external_bit)` pair it holds for that wire -- never a pair of
//! candidate labels, and never a bare logical bit. Conflating this with the
//! garbler's `(k0, k1)` view is exactly the kind of bug the type split in
//! the design notes exists to prevent, so [`Evaluator`] only ever stores
//! [`LabeledWire`] values.

use std::collections::HashMap;

use tracing::trace;
use zeroize::Zeroize;

use crate::circuit::{Circuit, WireId};
use crate::error::{Error, Result};
use crate::garbler::{GarbledGate, LabeledWire, decrypt_gate_row};

/// Per-run evaluator state: the single labeled value held for each wire
/// whose value is currently known.
#[derive(Debug, Default)]
pub struct Evaluator {
    held: HashMap<WireId, LabeledWire>,
}

impl Drop for Evaluator {
    /// `LabeledWire` is `Copy` so it cannot carry its own `Drop` glue; zero
    /// every held label by hand instead, matching the protocol's
    /// single-use-material resource-lifetime contract (spec.md §5).
    fn drop(&mut self) {
        for labeled in self.held.values_mut() {
            labeled.label.0.zeroize();
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            held: HashMap::new(),
        }
    }

    /// Record labeled values the evaluator has obtained for some wires --
    /// the garbler's own input wires (received in the clear) or its own
    /// input wires (received via oblivious transfer).
    pub fn seed(&mut self, labels: impl IntoIterator<Item = (WireId, LabeledWire)>) {
        self.held.extend(labels);
    }

    /// Evaluate every gate in ascending (topological) order, decrypting the
    /// one garbled-table row selected by the external bits the evaluator
    /// currently holds for that gate's inputs. Returns the external
    /// (signal) bits for the circuit's declared output wires -- the
    /// evaluator never learns the corresponding logical bits, since it
    /// never sees the permutation bits.
    pub fn evaluate(
        &mut self,
        circuit: &Circuit,
        tables: &HashMap<WireId, GarbledGate>,
    ) -> Result<HashMap<WireId, bool>> {
        for gate in &circuit.gates {
            let table = tables
                .get(&gate.id)
                .ok_or_else(|| Error::ProtocolInvariant(format!("gate {}: table missing", gate.id)))?;

            let input_labels: Vec<LabeledWire> = gate
                .inputs
                .iter()
                .map(|w| {
                    self.held.get(w).copied().ok_or_else(|| {
                        Error::ProtocolInvariant(format!(
                            "gate {}: no label held for input wire {w}",
                            gate.id
                        ))
                    })
                })
                .collect::<Result<_>>()?;

            let output = decrypt_gate_row(table, gate.id, &input_labels)?;
            trace!(gate = gate.id, "evaluated gate");
            self.held.insert(gate.id, output);
        }

        circuit
            .out
            .iter()
            .map(|&w| {
                let lw = self.held.get(&w).ok_or_else(|| {
                    Error::ProtocolInvariant(format!("output wire {w} never produced a value"))
                })?;
                Ok((w, lw.external_bit))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Gate, GateType};
    use crate::garbler::Garbler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn xor_circuit() -> Circuit {
        Circuit {
            id: "xor".to_string(),
            alice: vec![0],
            bob: vec![1],
            out: vec![2],
            gates: vec![Gate {
                id: 2,
                gate_type: GateType::Xor,
                inputs: vec![0, 1],
            }],
        }
    }

    #[test]
    fn evaluates_every_input_combination_correctly() {
        let circuit = xor_circuit();
        for a in [false, true] {
            for b in [false, true] {
                let mut rng = ChaCha12Rng::from_seed([3u8; 32]);
                let garbler = Garbler::garble(&circuit, &mut rng).unwrap();

                let alice = garbler.own_input_labels(&[0], &[a]).unwrap();
                let bob_pairs = garbler.peer_input_label_pairs(&[1]).unwrap();
                let bob_label = if b { bob_pairs[&1].1 } else { bob_pairs[&1].0 };

                let mut evaluator = Evaluator::new();
                evaluator.seed([(0, alice[&0]), (1, bob_label)]);
                let signals = evaluator.evaluate(&circuit, garbler.tables()).unwrap();
                let decoded = garbler.decode(&signals).unwrap();
                assert_eq!(decoded[&2], a ^ b);
            }
        }
    }

    #[test]
    fn missing_input_label_is_a_protocol_error() {
        let circuit = xor_circuit();
        let mut rng = ChaCha12Rng::from_seed([4u8; 32]);
        let garbler = Garbler::garble(&circuit, &mut rng).unwrap();
        let mut evaluator = Evaluator::new();
        let alice = garbler.own_input_labels(&[0], &[true]).unwrap();
        evaluator.seed([(0, alice[&0])]); // wire 1 never seeded
        assert!(evaluator.evaluate(&circuit, garbler.tables()).is_err());
    }
}
