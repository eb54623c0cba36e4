use std::collections::HashMap;

use anyhow::{Result, bail};
use gc::circuit::{Circuit, WireId};

/// Result of plain circuit evaluation: a ground truth to check garbled
/// evaluation against, computed by walking the gate DAG directly on
/// plaintext bits rather than through garbled tables and OT.
#[derive(Debug, PartialEq, Eq)]
pub struct PlainEvaluationResult {
    /// Output wire results: wire_id -> bit_value.
    pub output_results: HashMap<WireId, bool>,
}

/// Evaluate `circuit` in plain (ungarbled) form given Alice's and Bob's
/// input bits, in the same order as `circuit.alice`/`circuit.bob`.
pub fn evaluate_plain_circuit(
    circuit: &Circuit,
    alice_bits: &[bool],
    bob_bits: &[bool],
) -> Result<PlainEvaluationResult> {
    if alice_bits.len() != circuit.alice.len() {
        bail!(
            "expected {} alice input bits, got {}",
            circuit.alice.len(),
            alice_bits.len()
        );
    }
    if bob_bits.len() != circuit.bob.len() {
        bail!(
            "expected {} bob input bits, got {}",
            circuit.bob.len(),
            bob_bits.len()
        );
    }

    let mut values: HashMap<WireId, bool> = HashMap::new();
    for (&wire, &bit) in circuit.alice.iter().zip(alice_bits) {
        values.insert(wire, bit);
    }
    for (&wire, &bit) in circuit.bob.iter().zip(bob_bits) {
        values.insert(wire, bit);
    }

    for gate in &circuit.gates {
        let inputs: Vec<bool> = gate
            .inputs
            .iter()
            .map(|w| {
                values
                    .get(w)
                    .copied()
                    .ok_or_else(|| anyhow::anyhow!("wire {w} used before it was computed"))
            })
            .collect::<Result<_>>()?;
        values.insert(gate.id, gate.gate_type.eval(&inputs));
    }

    let mut output_results = HashMap::new();
    for &wire in &circuit.out {
        let bit = values
            .get(&wire)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("output wire {wire} was never computed"))?;
        output_results.insert(wire, bit);
    }

    Ok(PlainEvaluationResult { output_results })
}
