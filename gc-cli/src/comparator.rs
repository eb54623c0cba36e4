//! Generator for the `n`-bit signed comparator circuit: two's-complement
//! integers `alice` and `bob`, each `bits` wide, compared for
//! greater/equal/less. Ported gate-for-gate from the reference
//! implementation's comparator builder so the wire-id layout and gate
//! sequence are identical, just expressed against [`gc::circuit`]'s typed
//! model instead of a hand-rolled JSON dict.
//!
//! Output wires, in order: `[bob_wins, mismatch]`, where `mismatch` is 1
//! whenever the two values differ. `(1,1)` means Bob's value is greater,
//! `(0,1)` means Alice's is greater, `(0,0)` means they're equal.

use gc::circuit::{Circuit, CircuitSet, Gate, GateType, WireId};
use gc::error::{Error, Result};

/// Build the `bits`-wide signed comparator circuit. `bits` must be at least
/// 2 (one sign bit plus at least one magnitude bit).
pub fn generate_signed_comparator(bits: u32) -> Result<CircuitSet> {
    if bits < 2 {
        return Err(Error::Configuration(format!(
            "signed comparator circuit needs at least 2 bits, got {bits}"
        )));
    }

    let alice: Vec<WireId> = (1..=bits).collect();
    let bob: Vec<WireId> = (bits + 1..=2 * bits).collect();
    let mut wire_id: WireId = 2 * bits + 1 + 2;
    let mut gates: Vec<Gate> = Vec::new();

    let mut push = |id: WireId, gate_type: GateType, inputs: Vec<WireId>| {
        gates.push(Gate {
            id,
            gate_type,
            inputs,
        });
    };

    // Bit 0 (most significant of the magnitude comparison chain): B0 > A0 =>
    // Bob wins unless a sign-bit special case below overrides it.
    push(wire_id, GateType::Not, vec![alice[0]]);
    wire_id += 1;
    push(wire_id, GateType::And, vec![wire_id - 1, bob[0]]);
    wire_id += 1;

    for i in 1..bits as usize {
        // Bi > Ai, conditioned below on every higher bit being equal.
        push(wire_id, GateType::Not, vec![alice[i]]);
        wire_id += 1;
        push(wire_id, GateType::And, vec![wire_id - 1, bob[i]]);
        wire_id += 1;
        push(wire_id, GateType::Xnor, vec![alice[i - 1], bob[i - 1]]);
        wire_id += 1;

        if i != 1 {
            // Chain this level's equality check onto the running "all
            // higher bits equal" accumulator.
            push(wire_id, GateType::And, vec![wire_id - 6, wire_id - 1]);
            wire_id += 1;
            push(wire_id, GateType::And, vec![wire_id - 3, wire_id - 1]);
            wire_id += 1;
            push(wire_id, GateType::Or, vec![wire_id - 6, wire_id - 1]);
            wire_id += 1;
        } else {
            push(wire_id, GateType::And, vec![wire_id - 2, wire_id - 1]);
            wire_id += 1;
            push(wire_id, GateType::Or, vec![wire_id - 5, wire_id - 1]);
            wire_id += 1;
        }
    }

    // Two's-complement sign handling: differing sign bits decide the
    // comparison outright; equal sign bits fall back to the magnitude chain
    // above.
    push(wire_id, GateType::Xor, vec![alice[0], bob[0]]);
    wire_id += 1;
    push(wire_id, GateType::And, vec![alice[0], wire_id - 1]);
    wire_id += 1;
    push(wire_id, GateType::Not, vec![wire_id - 2]);
    wire_id += 1;
    push(wire_id, GateType::And, vec![wire_id - 1, wire_id - 4]);
    wire_id += 1;
    push(wire_id, GateType::Or, vec![wire_id - 3, wire_id - 1]);
    let bob_wins = wire_id;
    wire_id += 1;

    // Mismatch flag: NAND of (all higher bits equal) and (least-significant
    // bits equal) is 1 exactly when not every bit position matched.
    push(wire_id, GateType::Xnor, vec![alice[bits as usize - 1], bob[bits as usize - 1]]);
    wire_id += 1;
    push(wire_id, GateType::Nand, vec![wire_id - 9, wire_id - 1]);
    let mismatch = wire_id;

    let circuit = Circuit {
        id: format!("{bits}-bit CMP signed (two's complement)"),
        alice,
        bob,
        out: vec![bob_wins, mismatch],
        gates,
    };
    circuit.validate()?;

    Ok(CircuitSet {
        name: "cmp".to_string(),
        circuits: vec![circuit],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Plain-evaluation oracle for a single circuit, used only to exercise
    /// the generator against the full input space for small bit widths.
    fn eval(circuit: &Circuit, alice_bits: &[bool], bob_bits: &[bool]) -> Vec<bool> {
        let mut values: HashMap<WireId, bool> = HashMap::new();
        for (&w, &b) in circuit.alice.iter().zip(alice_bits) {
            values.insert(w, b);
        }
        for (&w, &b) in circuit.bob.iter().zip(bob_bits) {
            values.insert(w, b);
        }
        for gate in &circuit.gates {
            let inputs: Vec<bool> = gate.inputs.iter().map(|w| values[w]).collect();
            values.insert(gate.id, gate.gate_type.eval(&inputs));
        }
        circuit.out.iter().map(|w| values[w]).collect()
    }

    fn signed_value(bits: &[bool]) -> i64 {
        let n = bits.len();
        let mut magnitude: i64 = 0;
        for &b in bits {
            magnitude = (magnitude << 1) | i64::from(b);
        }
        if bits[0] {
            magnitude - (1i64 << n)
        } else {
            magnitude
        }
    }

    fn bits_of(value: i64, width: u32) -> Vec<bool> {
        let unsigned = if value < 0 {
            (1i64 << width) + value
        } else {
            value
        };
        (0..width)
            .rev()
            .map(|i| (unsigned >> i) & 1 == 1)
            .collect()
    }

    #[test]
    fn rejects_too_narrow_a_width() {
        assert!(generate_signed_comparator(1).is_err());
    }

    #[test]
    fn generated_circuit_is_well_formed() {
        let set = generate_signed_comparator(4).unwrap();
        let circuit = &set.circuits[0];
        assert_eq!(circuit.alice.len(), 4);
        assert_eq!(circuit.bob.len(), 4);
        assert_eq!(circuit.out.len(), 2);
    }

    #[test]
    fn exhaustive_comparison_over_a_small_width() {
        let width = 4u32;
        let set = generate_signed_comparator(width).unwrap();
        let circuit = &set.circuits[0];
        let lo = -(1i64 << (width - 1));
        let hi = (1i64 << (width - 1)) - 1;

        for a in lo..=hi {
            for b in lo..=hi {
                let a_bits = bits_of(a, width);
                let b_bits = bits_of(b, width);
                let out = eval(circuit, &a_bits, &b_bits);
                let (bob_wins, mismatch) = (out[0], out[1]);

                if a == b {
                    assert!(!mismatch, "expected a match for a=b={a}");
                } else if b > a {
                    assert!(bob_wins && mismatch, "expected bob_wins for a={a} b={b}");
                } else {
                    assert!(!bob_wins && mismatch, "expected alice_wins for a={a} b={b}");
                }
                assert_eq!(signed_value(&a_bits), a);
                assert_eq!(signed_value(&b_bits), b);
            }
        }
    }
}
