//! Length-prefixed bincode-over-TCP, the one concrete [`gc::transport::Transport`]
//! this workspace ships a real socket for (the core crate only provides the
//! in-memory `ChannelTransport`, per spec's "transport socket is an external
//! collaborator" scoping). Framing is a 4-byte big-endian length followed by
//! a bincode-serialized `Frame`.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};

use gc::error::{Error, Result};
use gc::transport::{Frame, Transport};

/// A garbler's listening socket: binds once, accepts exactly one evaluator
/// connection (this protocol runs a single two-party session at a time),
/// and hands back a `TcpTransport` for it. Mirrors the point in spec.md's
/// §4.G `poll() -> stream of incoming sessions` interface that a concrete
/// single-session server realizes by accepting once.
pub struct TcpListenerHandle {
    listener: TcpListener,
}

impl TcpListenerHandle {
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self { listener })
    }

    pub fn accept_one(&self) -> Result<TcpTransport> {
        let (stream, _peer) = self
            .listener
            .accept()
            .map_err(|e| Error::Transport(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(TcpTransport { stream })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).map_err(|e| Error::Transport(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self { stream })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(frame, bincode::config::standard())
            .map_err(|e| Error::Transport(format!("frame encode failed: {e}")))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| Error::Transport("frame too large to send".to_string()))?;
        self.stream
            .write_all(&len.to_be_bytes())
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.stream
            .write_all(&bytes)
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.stream.flush().map_err(|e| Error::Transport(e.to_string()))
    }

    fn receive(&mut self) -> Result<Frame> {
        let mut len_bytes = [0u8; 4];
        self.stream
            .read_exact(&mut len_bytes)
            .map_err(|e| Error::Transport(e.to_string()))?;
        let len = u32::from_be_bytes(len_bytes) as usize;
        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .map_err(|e| Error::Transport(e.to_string()))?;
        let (frame, _) = bincode::serde::decode_from_slice(&buf, bincode::config::standard())
            .map_err(|e| Error::Transport(format!("frame decode failed: {e}")))?;
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        let _ = self.stream.shutdown(Shutdown::Both);
        Ok(())
    }
}
