//! The wire-protocol message shapes and the transport interface the core
//! consumes to send them.
//!
//! The core only depends on the [`Transport`] trait: a framed,
//! request/response-capable, strictly-FIFO-per-direction channel. Concrete
//! transports (a TCP socket, an in-process queue) are external collaborators
//! -- see the `gc-cli` crate for the network implementation used by the
//! `alice`/`bob` binaries. [`ChannelTransport`] here is the in-memory pair
//! used by this crate's own tests and by the end-to-end integration suite.

use std::collections::HashMap;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, WireId};
use crate::error::{Error, Result};
use crate::garbler::{GarbledGate, LabeledWire};

/// Every message shape exchanged between garbler and evaluator, per the
/// wire-protocol frames of the spec (§6). A single connection carries these
/// strictly in the order a protocol run produces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Frame {
    /// Garbler -> Evaluator: the circuit skeleton, garbled tables, and the
    /// output wires' permutation bits (the "output decoding table").
    CircuitPackage {
        circuit: Circuit,
        tables: HashMap<WireId, GarbledGate>,
        output_perm_bits: HashMap<WireId, bool>,
    },
    /// Evaluator -> Garbler: acknowledges receipt of a `CircuitPackage`.
    Ack,
    /// Garbler -> Evaluator: labeled values for the garbler's own input
    /// wires, safe to send in the clear since they are already sealed by
    /// garbling.
    GarblerInputLabels(HashMap<WireId, LabeledWire>),
    /// Garbler -> Evaluator: the Diffie-Hellman group parameters used for
    /// every oblivious transfer in this run, sent once.
    Group { p: Vec<u8>, q: Vec<u8>, g: Vec<u8> },
    /// Evaluator -> Garbler: "begin an OT session for this input wire".
    OtStart { wire: WireId },
    /// Garbler -> Evaluator: the sender's OT commitment `C = g^r`.
    OtCommit { c: Vec<u8> },
    /// Evaluator -> Garbler: the chooser's blinded value `H`.
    OtChoice { h: Vec<u8> },
    /// Garbler -> Evaluator: the sender's second commitment and the two
    /// masked payloads.
    OtCiphertexts { c1: Vec<u8>, e0: Vec<u8>, e1: Vec<u8> },
    /// Garbler -> Evaluator, used only in the `--no-oblivious-transfer`
    /// debug mode: both labeled values for each of the evaluator's input
    /// wires, sent in the clear. Offers no input privacy.
    ClearChoicePairs(HashMap<WireId, (LabeledWire, LabeledWire)>),
    /// Evaluator -> Garbler: the external (signal) bit computed for every
    /// output wire.
    Evaluation(HashMap<WireId, bool>),
    /// Garbler -> Evaluator: the decoded logical output bits. Sending this
    /// back is an application-layer policy choice, not a protocol
    /// requirement -- see the open question in the spec's design notes.
    DecodedOutput(HashMap<WireId, bool>),
}

/// A framed request/response channel between the two participants.
/// Ordering is strictly FIFO per direction; no reconnection semantics are
/// required at this level. Timeouts, if any, are a transport concern.
pub trait Transport {
    fn send(&mut self, frame: &Frame) -> Result<()>;
    fn receive(&mut self) -> Result<Frame>;

    /// Send a frame and block for the peer's next frame. The default
    /// implementation is correct for any transport that preserves
    /// per-direction ordering; override only if a transport can pipeline
    /// more efficiently.
    fn send_and_wait(&mut self, frame: &Frame) -> Result<Frame> {
        self.send(frame)?;
        self.receive()
    }

    /// Non-blocking check for the peer's next frame, per spec.md §4.G's
    /// `poll() -> stream of incoming sessions`. Each `Transport` value here
    /// already represents one established two-party session rather than a
    /// listener multiplexing several, so polling surfaces that session's
    /// next frame if one has already arrived, or `None` if the caller would
    /// otherwise have to block on [`Transport::receive`]. The default
    /// implementation never has a frame to report without blocking;
    /// transports capable of a non-blocking read should override it.
    fn poll(&mut self) -> Result<Option<Frame>> {
        Ok(None)
    }

    /// Release any transport-held resources. Idempotent.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// An in-memory, in-process transport: two ends of a pair of MPSC queues,
/// one per direction. Used for this crate's unit tests and for end-to-end
/// integration tests that don't want to bind a real socket.
pub struct ChannelTransport {
    tx: mpsc::Sender<Frame>,
    rx: mpsc::Receiver<Frame>,
}

impl ChannelTransport {
    /// Build a connected pair; frames sent on one end arrive on the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::channel();
        let (tx_b, rx_a) = mpsc::channel();
        (
            ChannelTransport { tx: tx_a, rx: rx_a },
            ChannelTransport { tx: tx_b, rx: rx_b },
        )
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        self.tx
            .send(frame.clone())
            .map_err(|_| Error::Transport("peer end dropped".to_string()))
    }

    fn receive(&mut self) -> Result<Frame> {
        self.rx
            .recv()
            .map_err(|_| Error::Transport("peer end closed without sending".to_string()))
    }

    fn poll(&mut self) -> Result<Option<Frame>> {
        match self.rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(Error::Transport("peer end closed without sending".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_pair_delivers_in_fifo_order() {
        let (mut a, mut b) = ChannelTransport::pair();
        a.send(&Frame::Ack).unwrap();
        a.send(&Frame::OtStart { wire: 7 }).unwrap();
        assert!(matches!(b.receive().unwrap(), Frame::Ack));
        assert!(matches!(b.receive().unwrap(), Frame::OtStart { wire: 7 }));
    }

    #[test]
    fn send_and_wait_round_trips() {
        let (mut a, mut b) = ChannelTransport::pair();
        let handle = std::thread::spawn(move || {
            let reply = a.send_and_wait(&Frame::OtStart { wire: 3 }).unwrap();
            assert!(matches!(reply, Frame::Ack));
        });
        assert!(matches!(b.receive().unwrap(), Frame::OtStart { wire: 3 }));
        b.send(&Frame::Ack).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn receive_after_drop_is_a_transport_error() {
        let (a, mut b) = ChannelTransport::pair();
        drop(a);
        assert!(b.receive().is_err());
    }

    #[test]
    fn poll_reports_none_until_a_frame_has_arrived() {
        let (mut a, mut b) = ChannelTransport::pair();
        assert!(matches!(b.poll().unwrap(), None));
        a.send(&Frame::Ack).unwrap();
        assert!(matches!(b.poll().unwrap(), Some(Frame::Ack)));
        assert!(matches!(b.poll().unwrap(), None));
    }

    #[test]
    fn poll_after_drop_is_a_transport_error() {
        let (a, mut b) = ChannelTransport::pair();
        drop(a);
        assert!(b.poll().is_err());
    }
}
