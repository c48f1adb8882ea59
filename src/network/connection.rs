use crate::error::{LedgerError, Result};
use crate::network::codec::write_frame;
use crate::network::Message;
use log::debug;
use std::fmt;
use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Mutex;
use uuid::Uuid;

/// Lifecycle of one peer connection. CLOSED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Which side opened the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// We dialled out; we send CHAIN_REQUEST on open
    Initiator,
    /// We accepted; we wait to be asked
    Listener,
}

/// The write half of a bidirectional stream to exactly one remote node.
///
/// Reads are driven by the node's per-connection reader thread; this type
/// only owns the sending side and the lifecycle state.
pub struct Connection {
    id: Uuid,
    peer_addr: SocketAddr,
    role: Role,
    state: Mutex<ConnectionState>,
    writer: Mutex<Box<dyn Write + Send>>,
    // Handle used to tear the socket down on close so the reader wakes up
    socket: Option<TcpStream>,
}

impl Connection {
    pub fn new<W>(peer_addr: SocketAddr, role: Role, writer: W) -> Connection
    where
        W: Write + Send + 'static,
    {
        let writer: Box<dyn Write + Send> = Box::new(writer);
        Connection {
            id: Uuid::new_v4(),
            peer_addr,
            role,
            state: Mutex::new(ConnectionState::Connecting),
            writer: Mutex::new(writer),
            socket: None,
        }
    }

    /// Wrap a connected TCP stream. The caller keeps `stream` for reading.
    pub fn over_tcp(stream: &TcpStream, role: Role) -> Result<Connection> {
        let peer_addr = stream.peer_addr()?;
        let writer = stream.try_clone()?;
        let socket = stream.try_clone()?;
        let mut connection = Connection::new(peer_addr, role, writer);
        connection.socket = Some(socket);
        Ok(connection)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> ConnectionState {
        *self
            .state
            .lock()
            .expect("Failed to acquire connection state lock - this should never happen")
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// CONNECTING -> OPEN. Fails if the connection was already closed.
    pub fn open(&self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .expect("Failed to acquire connection state lock - this should never happen");
        match *state {
            ConnectionState::Connecting => {
                *state = ConnectionState::Open;
                Ok(())
            }
            ConnectionState::Open => Ok(()),
            ConnectionState::Closed => Err(LedgerError::ConnectionClosed(format!(
                "{} cannot reopen",
                self.peer_addr
            ))),
        }
    }

    /// Move to CLOSED. Returns true only for the call that closed it.
    pub fn close(&self) -> bool {
        let mut state = self
            .state
            .lock()
            .expect("Failed to acquire connection state lock - this should never happen");
        if *state == ConnectionState::Closed {
            return false;
        }
        *state = ConnectionState::Closed;
        if let Some(socket) = &self.socket {
            let _ = socket.shutdown(Shutdown::Both);
        }
        true
    }

    pub fn send(&self, message: &Message) -> Result<()> {
        let body = message.encode()?;
        self.send_encoded(&body)
    }

    /// Send a pre-encoded envelope; used when broadcasting one message to many peers
    pub fn send_encoded(&self, body: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(LedgerError::ConnectionClosed(self.peer_addr.to_string()));
        }
        let mut writer = self
            .writer
            .lock()
            .expect("Failed to acquire connection writer lock - this should never happen");
        write_frame(&mut *writer, body).map_err(|e| {
            LedgerError::Network(format!("Failed to send to {}: {e}", self.peer_addr))
        })?;
        debug!("Sent {} bytes to {}", body.len(), self.peer_addr);
        Ok(())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("role", &self.role)
            .field("state", &self.state())
            .finish()
    }
}
