//! The circuit artifact: a JSON description of a small Boolean circuit over
//! two parties' input wires.
//!
//! Unlike the Bristol streaming format this crate's ancestor used, circuits
//! here are small enough to hold entirely in memory, and are identified by
//! gate id == output wire id, which doubles as a topological order: a
//! gate's inputs always reference wires with a strictly smaller id.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A wire identifier. Also used as a gate identifier, since each gate
/// produces exactly one output wire and that wire's id names the gate.
pub type WireId = u32;

/// The Boolean operation a gate computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateType {
    And,
    Or,
    Xor,
    Xnor,
    Nand,
    Nor,
    Not,
}

impl GateType {
    /// Number of input wires this gate type takes.
    pub fn arity(self) -> usize {
        match self {
            GateType::Not => 1,
            _ => 2,
        }
    }

    /// Evaluate the gate in plaintext, for the ground-truth plain evaluator
    /// and for the comparator-circuit tests. `inputs` must have length
    /// matching `arity()`.
    pub fn eval(self, inputs: &[bool]) -> bool {
        match self {
            GateType::Not => !inputs[0],
            GateType::And => inputs[0] && inputs[1],
            GateType::Or => inputs[0] || inputs[1],
            GateType::Xor => inputs[0] ^ inputs[1],
            GateType::Xnor => !(inputs[0] ^ inputs[1]),
            GateType::Nand => !(inputs[0] && inputs[1]),
            GateType::Nor => !(inputs[0] || inputs[1]),
        }
    }
}

/// A single gate: an id (= its output wire), a type, and its input wires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: WireId,
    #[serde(rename = "type")]
    pub gate_type: GateType,
    #[serde(rename = "in")]
    pub inputs: Vec<WireId>,
}

/// One circuit: Alice's input wires, Bob's input wires, the output wires,
/// and the gate list that connects them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    pub id: String,
    pub alice: Vec<WireId>,
    pub bob: Vec<WireId>,
    pub out: Vec<WireId>,
    pub gates: Vec<Gate>,
}

/// The top-level JSON artifact: a named bundle of circuits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitSet {
    pub name: String,
    pub circuits: Vec<Circuit>,
}

impl Circuit {
    /// Check structural well-formedness: no wire is defined twice, every
    /// gate's inputs were already defined by an earlier input or gate, gate
    /// arity matches its declared input count, and output wires are defined.
    pub fn validate(&self) -> Result<()> {
        let mut defined: HashSet<WireId> = HashSet::new();
        for &w in self.alice.iter().chain(self.bob.iter()) {
            if !defined.insert(w) {
                return Err(Error::CircuitValidation(format!(
                    "wire {w} declared as an input more than once"
                )));
            }
        }

        let mut last_gate_id: Option<WireId> = None;
        for gate in &self.gates {
            if let Some(prev) = last_gate_id {
                if gate.id <= prev {
                    return Err(Error::CircuitValidation(format!(
                        "gate ids must be strictly increasing, got {} after {}",
                        gate.id, prev
                    )));
                }
            }
            last_gate_id = Some(gate.id);

            if gate.inputs.len() != gate.gate_type.arity() {
                return Err(Error::CircuitValidation(format!(
                    "gate {} ({:?}) expects {} input(s), got {}",
                    gate.id,
                    gate.gate_type,
                    gate.gate_type.arity(),
                    gate.inputs.len()
                )));
            }
            for &input in &gate.inputs {
                if !defined.contains(&input) {
                    return Err(Error::CircuitValidation(format!(
                        "gate {} references undefined wire {}",
                        gate.id, input
                    )));
                }
                if input >= gate.id {
                    return Err(Error::CircuitValidation(format!(
                        "gate {} references wire {} which is not defined before it",
                        gate.id, input
                    )));
                }
            }
            if !defined.insert(gate.id) {
                return Err(Error::CircuitValidation(format!(
                    "wire {} produced by more than one gate",
                    gate.id
                )));
            }
        }

        if self.out.is_empty() {
            return Err(Error::CircuitValidation(
                "circuit declares no output wires".to_string(),
            ));
        }
        for &w in &self.out {
            if !defined.contains(&w) {
                return Err(Error::CircuitValidation(format!(
                    "output wire {w} is never defined"
                )));
            }
        }

        Ok(())
    }

    /// All wire ids a gate's inputs may legally reference: Alice's, Bob's,
    /// and every gate output. Used by the garbler/evaluator to size their
    /// wire tables without re-walking the gate list.
    pub fn all_wires(&self) -> Vec<WireId> {
        let mut wires: Vec<WireId> = self
            .alice
            .iter()
            .chain(self.bob.iter())
            .copied()
            .collect();
        wires.extend(self.gates.iter().map(|g| g.id));
        wires
    }
}

impl CircuitSet {
    /// Load and validate a circuit bundle from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let set: CircuitSet = serde_json::from_str(&data)?;
        for circuit in &set.circuits {
            circuit.validate()?;
        }
        Ok(set)
    }
}
