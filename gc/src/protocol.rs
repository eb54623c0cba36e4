//! End-to-end orchestration of one protocol run: garble-and-send on one
//! side, receive-and-evaluate on the other, stitched together by the wire
//! frames of §6. Each side is a single sequential task with suspension
//! points only at `send`/`receive`; there is no shared mutable state
//! between the two, all synchronization goes through the [`Transport`].
//!
//! The oblivious-transfer step can be disabled (`--no-oblivious-transfer`)
//! for a debug/verification mode that trades away input privacy: both
//! candidate labels for every evaluator-input wire are sent in the clear
//! and the evaluator just picks the one matching its own bit.

use std::collections::HashMap;

use rand_chacha::ChaCha12Rng;

use crate::circuit::{Circuit, WireId};
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::garbler::Garbler;
use crate::group::PrimeGroup;
use crate::ot;
use crate::transport::{Frame, Transport};

/// Run the garbler's half of one protocol execution: garble `circuit`,
/// ship it and the garbler's own input labels, transfer the evaluator's
/// input labels (via OT or in the clear), and receive back the evaluator's
/// reported output signals, which are decoded and returned.
///
/// `reveal_to_evaluator` controls whether the decoded output is also sent
/// back to the evaluator -- an application-layer policy, not a protocol
/// requirement (the core does not assume either choice).
pub fn run_garbler(
    circuit: &Circuit,
    own_input_bits: &[bool],
    transport: &mut impl Transport,
    use_oblivious_transfer: bool,
    reveal_to_evaluator: bool,
    rng: &mut ChaCha12Rng,
) -> Result<HashMap<WireId, bool>> {
    circuit.validate()?;
    if circuit.alice.len() != own_input_bits.len() {
        return Err(Error::Configuration(format!(
            "circuit expects {} garbler input bits, got {}",
            circuit.alice.len(),
            own_input_bits.len()
        )));
    }

    let garbler = Garbler::garble(circuit, rng)?;
    let output_perm_bits = garbler.output_perm_bits(&circuit.out)?;

    let ack = transport.send_and_wait(&Frame::CircuitPackage {
        circuit: circuit.clone(),
        tables: garbler.tables().clone(),
        output_perm_bits,
    })?;
    if !matches!(ack, Frame::Ack) {
        return Err(Error::ProtocolInvariant(format!(
            "expected Ack after CircuitPackage, got {ack:?}"
        )));
    }

    let own_labels = garbler.own_input_labels(&circuit.alice, own_input_bits)?;
    transport.send(&Frame::GarblerInputLabels(own_labels))?;

    let peer_label_pairs = garbler.peer_input_label_pairs(&circuit.bob)?;

    if use_oblivious_transfer {
        let group = PrimeGroup::rfc3526_2048();
        transport.send(&Frame::Group {
            p: group.encode(&group.p),
            q: group.encode(&group.q),
            g: group.encode(&group.g),
        })?;

        for _ in 0..circuit.bob.len() {
            let wire = match transport.receive()? {
                Frame::OtStart { wire } => wire,
                other => {
                    return Err(Error::ProtocolInvariant(format!(
                        "expected OtStart, got {other:?}"
                    )));
                }
            };
            let (lw0, lw1) = peer_label_pairs
                .get(&wire)
                .ok_or_else(|| Error::ProtocolInvariant(format!("no OT pair for wire {wire}")))?;
            ot::run_sender(
                &group,
                transport,
                &lw0.to_bytes(),
                &lw1.to_bytes(),
                rng,
            )?;
        }
    } else {
        transport.send(&Frame::ClearChoicePairs(peer_label_pairs))?;
    }

    let out_signals = match transport.receive()? {
        Frame::Evaluation(signals) => signals,
        other => {
            return Err(Error::ProtocolInvariant(format!(
                "expected Evaluation, got {other:?}"
            )));
        }
    };
    let decoded = garbler.decode(&out_signals)?;

    if reveal_to_evaluator {
        transport.send(&Frame::DecodedOutput(decoded.clone()))?;
    }
    transport.close()?;
    Ok(decoded)
}

/// Run the evaluator's half of one protocol execution. Returns the decoded
/// output if the garbler chose to reveal it (`Frame::DecodedOutput`
/// followed), otherwise returns the raw signal bits it reported -- decoding
/// them requires the garbler's private permutation bits, which the
/// evaluator never holds.
pub fn run_evaluator(
    own_input_bits: &[bool],
    transport: &mut impl Transport,
    use_oblivious_transfer: bool,
    rng: &mut ChaCha12Rng,
) -> Result<HashMap<WireId, bool>> {
    let (circuit, tables) = match transport.receive()? {
        Frame::CircuitPackage { circuit, tables, .. } => (circuit, tables),
        other => {
            return Err(Error::ProtocolInvariant(format!(
                "expected CircuitPackage, got {other:?}"
            )));
        }
    };
    circuit.validate()?;
    if circuit.bob.len() != own_input_bits.len() {
        return Err(Error::Configuration(format!(
            "circuit expects {} evaluator input bits, got {}",
            circuit.bob.len(),
            own_input_bits.len()
        )));
    }
    transport.send(&Frame::Ack)?;

    let mut evaluator = Evaluator::new();

    let garbler_labels = match transport.receive()? {
        Frame::GarblerInputLabels(labels) => labels,
        other => {
            return Err(Error::ProtocolInvariant(format!(
                "expected GarblerInputLabels, got {other:?}"
            )));
        }
    };
    evaluator.seed(garbler_labels);

    if use_oblivious_transfer {
        let group = match transport.receive()? {
            Frame::Group { p, q, g } => PrimeGroup {
                p: num_bigint::BigUint::from_bytes_be(&p),
                q: num_bigint::BigUint::from_bytes_be(&q),
                g: num_bigint::BigUint::from_bytes_be(&g),
            },
            other => {
                return Err(Error::ProtocolInvariant(format!(
                    "expected Group, got {other:?}"
                )));
            }
        };

        for (&wire, &bit) in circuit.bob.iter().zip(own_input_bits.iter()) {
            transport.send(&Frame::OtStart { wire })?;
            let bytes = ot::run_chooser(&group, transport, bit, rng)?;
            let labeled = crate::garbler::LabeledWire::from_bytes(&bytes)?;
            evaluator.seed([(wire, labeled)]);
        }
    } else {
        let pairs = match transport.receive()? {
            Frame::ClearChoicePairs(pairs) => pairs,
            other => {
                return Err(Error::ProtocolInvariant(format!(
                    "expected ClearChoicePairs, got {other:?}"
                )));
            }
        };
        for (&wire, &bit) in circuit.bob.iter().zip(own_input_bits.iter()) {
            let (lw0, lw1) = pairs
                .get(&wire)
                .ok_or_else(|| Error::ProtocolInvariant(format!("no label pair for wire {wire}")))?;
            evaluator.seed([(wire, if bit { *lw1 } else { *lw0 })]);
        }
    }

    let out_signals = evaluator.evaluate(&circuit, &tables)?;
    transport.send(&Frame::Evaluation(out_signals.clone()))?;

    match transport.receive() {
        Ok(Frame::DecodedOutput(decoded)) => {
            transport.close()?;
            Ok(decoded)
        }
        Ok(other) => Err(Error::ProtocolInvariant(format!(
            "expected DecodedOutput or channel close, got {other:?}"
        ))),
        Err(_) => {
            transport.close()?;
            Ok(out_signals)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Gate, GateType};
    use crate::transport::ChannelTransport;
    use rand::SeedableRng;

    fn and_circuit() -> Circuit {
        Circuit {
            id: "and".to_string(),
            alice: vec![0],
            bob: vec![1],
            out: vec![2],
            gates: vec![Gate {
                id: 2,
                gate_type: GateType::And,
                inputs: vec![0, 1],
            }],
        }
    }

    fn run_both(use_ot: bool, a: bool, b: bool, reveal: bool) -> (HashMap<WireId, bool>, HashMap<WireId, bool>) {
        let circuit = and_circuit();
        let (mut garbler_t, mut evaluator_t) = ChannelTransport::pair();

        let circuit_for_garbler = circuit.clone();
        let garbler_handle = std::thread::spawn(move || {
            let mut rng = ChaCha12Rng::from_seed([1u8; 32]);
            run_garbler(
                &circuit_for_garbler,
                &[a],
                &mut garbler_t,
                use_ot,
                reveal,
                &mut rng,
            )
            .unwrap()
        });

        let mut rng = ChaCha12Rng::from_seed([2u8; 32]);
        let evaluator_result = run_evaluator(&[b], &mut evaluator_t, use_ot, &mut rng).unwrap();
        let garbler_result = garbler_handle.join().unwrap();
        (garbler_result, evaluator_result)
    }

    #[test]
    fn end_to_end_with_oblivious_transfer() {
        for a in [false, true] {
            for b in [false, true] {
                let (garbler_out, evaluator_out) = run_both(true, a, b, true);
                assert_eq!(garbler_out[&2], a && b);
                assert_eq!(evaluator_out[&2], a && b);
            }
        }
    }

    #[test]
    fn end_to_end_without_oblivious_transfer_debug_mode() {
        let (garbler_out, evaluator_out) = run_both(false, true, true, true);
        assert_eq!(garbler_out[&2], true);
        assert_eq!(evaluator_out[&2], true);
    }

    #[test]
    fn evaluator_gets_only_signals_when_garbler_withholds_decoded_output() {
        let (garbler_out, evaluator_signals) = run_both(true, true, false, false);
        assert_eq!(garbler_out[&2], false);
        // The evaluator's view is the external bit, not necessarily equal to
        // the logical bit -- we only assert it's present, not its value.
        assert!(evaluator_signals.contains_key(&2));
    }
}
