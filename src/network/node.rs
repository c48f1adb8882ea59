use crate::config::resolve_addr;
use crate::core::{Block, SharedChain};
use crate::error::{LedgerError, Result};
use crate::network::codec::{read_frame, Frame, MAX_FRAME_SIZE};
use crate::network::{Connection, Message, Peers, Role};
use log::{debug, error, info, warn};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use uuid::Uuid;

const TCP_CONNECT_TIMEOUT: u64 = 5000;
const TCP_WRITE_TIMEOUT: u64 = 5000;

/// What a node did with one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Answered a CHAIN_REQUEST
    ChainSent,
    /// CHAIN_RESPONSE adopted; carries the new length
    ChainReplaced(usize),
    /// CHAIN_RESPONSE was shorter, equal or invalid
    ChainRejected,
    /// NEW_BLOCK appended and relayed to this many peers
    BlockAppended(usize),
    /// NEW_BLOCK did not extend the tip
    BlockRejected,
    /// Undecodable bytes, or a reply that could not be delivered
    Dropped,
}

/// One ledger participant: its chain plus its live peer connections.
///
/// `Node` is a cheap handle; clones share the same chain and peer set, which
/// is how the listener, the reader threads and the operator console all see
/// one node.
#[derive(Clone)]
pub struct Node {
    label: String,
    chain: SharedChain,
    peers: Arc<Peers>,
    max_frame_size: usize,
}

impl Node {
    pub fn new(label: impl Into<String>) -> Node {
        Self::with_frame_limit(label, MAX_FRAME_SIZE)
    }

    pub fn with_frame_limit(label: impl Into<String>, max_frame_size: usize) -> Node {
        Node {
            label: label.into(),
            chain: SharedChain::new(),
            peers: Arc::new(Peers::new()),
            max_frame_size,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn chain(&self) -> &SharedChain {
        &self.chain
    }

    pub fn peers(&self) -> &Peers {
        &self.peers
    }

    /// Current chain, genesis first
    pub fn blocks(&self) -> Vec<Block> {
        self.chain.blocks()
    }

    /// Register an inbound stream. The accepting side never asks for a chain.
    pub fn accept_connection(&self, stream: TcpStream) -> Result<Arc<Connection>> {
        let connection = self.register(stream, Role::Listener)?;
        info!(
            "[{}] Accepted connection from {}",
            self.label,
            connection.peer_addr()
        );
        Ok(connection)
    }

    /// Dial a peer and ask for its chain. No retry on failure.
    pub fn connect_to(&self, addr: &str) -> Result<Arc<Connection>> {
        let socket_addr = resolve_addr(addr)?;
        let stream =
            TcpStream::connect_timeout(&socket_addr, Duration::from_millis(TCP_CONNECT_TIMEOUT))
                .map_err(|e| {
                    warn!("[{}] Could not connect to peer {addr}: {e}", self.label);
                    LedgerError::Network(format!("Failed to connect to {socket_addr}: {e}"))
                })?;

        let connection = self.register(stream, Role::Initiator)?;
        info!("[{}] Connected to peer {socket_addr}", self.label);

        if let Err(e) = connection.send(&Message::ChainRequest) {
            self.drop_connection(&connection, &e);
            return Err(e);
        }
        Ok(connection)
    }

    /// Dial every address, logging failures and carrying on
    pub fn connect_to_peers(&self, addrs: &[String]) -> usize {
        addrs
            .iter()
            .filter(|addr| self.connect_to(addr).is_ok())
            .count()
    }

    fn register(&self, stream: TcpStream, role: Role) -> Result<Arc<Connection>> {
        stream
            .set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT)))
            .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;

        let connection = Arc::new(Connection::over_tcp(&stream, role)?);
        connection.open()?;
        self.peers.add(Arc::clone(&connection));

        let node = self.clone();
        let reader = Arc::clone(&connection);
        thread::spawn(move || node.handle_connection(reader, stream));

        Ok(connection)
    }

    // Per-connection reader loop; runs until the stream closes or errors
    fn handle_connection(&self, connection: Arc<Connection>, mut stream: TcpStream) {
        let peer_addr = connection.peer_addr();
        loop {
            match read_frame(&mut stream, self.max_frame_size) {
                Ok(Frame::Data(body)) => {
                    self.on_frame(&connection, &body);
                }
                Ok(Frame::Oversized(len)) => {
                    warn!(
                        "[{}] Dropped oversized message ({len} bytes) from {peer_addr}",
                        self.label
                    );
                }
                Ok(Frame::Eof) => {
                    info!("[{}] Peer {peer_addr} closed the connection", self.label);
                    break;
                }
                Err(e) => {
                    if connection.is_open() {
                        warn!("[{}] Read from {peer_addr} failed: {e}", self.label);
                    }
                    break;
                }
            }
        }

        connection.close();
        self.peers.evict(connection.id());
        debug!("[{}] Reader for {peer_addr} finished", self.label);
    }

    /// Decode one frame body and dispatch it. Malformed input is dropped
    /// without a reply and the connection stays open.
    pub fn on_frame(&self, connection: &Arc<Connection>, body: &[u8]) -> Outcome {
        match Message::decode(body) {
            Ok(message) => self.on_message(connection, message),
            Err(e) => {
                warn!(
                    "[{}] Ignoring message from {}: {e}",
                    self.label,
                    connection.peer_addr()
                );
                Outcome::Dropped
            }
        }
    }

    pub fn on_message(&self, connection: &Arc<Connection>, message: Message) -> Outcome {
        debug!(
            "[{}] Received {message} from {}",
            self.label,
            connection.peer_addr()
        );

        match message {
            Message::ChainRequest => {
                let reply = Message::ChainResponse {
                    chain: self.chain.blocks(),
                };
                match connection.send(&reply) {
                    Ok(()) => Outcome::ChainSent,
                    Err(e) => {
                        self.drop_connection(connection, &e);
                        Outcome::Dropped
                    }
                }
            }
            Message::ChainResponse { chain } => match self.chain.replace_if_better(chain) {
                Ok(()) => {
                    let len = self.chain.len();
                    info!(
                        "[{}] Chain updated with longer valid chain from peer (length {len})",
                        self.label
                    );
                    Outcome::ChainReplaced(len)
                }
                Err(e) => {
                    debug!("[{}] Kept local chain: {e}", self.label);
                    Outcome::ChainRejected
                }
            },
            Message::NewBlock { block } => match self.chain.append_remote(block.clone()) {
                Ok(()) => {
                    info!(
                        "[{}] New block added from peer: {}",
                        self.label,
                        block.get_data()
                    );
                    let relayed =
                        self.broadcast(&Message::NewBlock { block }, Some(connection.id()));
                    Outcome::BlockAppended(relayed)
                }
                Err(e) => {
                    info!("[{}] Received invalid block, ignored: {e}", self.label);
                    Outcome::BlockRejected
                }
            },
        }
    }

    /// Append `data` as a new local block and announce it to every peer
    pub fn submit_data(&self, data: &str) -> Result<Block> {
        let block = self.chain.append_local(data).map_err(|e| {
            warn!("[{}] Block rejected: {e}", self.label);
            e
        })?;
        info!(
            "[{}] Block {} mined and broadcast: {data}",
            self.label,
            block.get_index()
        );
        self.broadcast(
            &Message::NewBlock {
                block: block.clone(),
            },
            None,
        );
        Ok(block)
    }

    /// Send to every connection except `exclude`; returns how many sends
    /// succeeded. A failed send closes that connection and the rest carry on.
    pub fn broadcast(&self, message: &Message, exclude: Option<Uuid>) -> usize {
        let body = match message.encode() {
            Ok(body) => body,
            Err(e) => {
                error!("[{}] Failed to encode {}: {e}", self.label, message.kind());
                return 0;
            }
        };

        let mut delivered = 0;
        for connection in self.peers.get_connections() {
            if Some(connection.id()) == exclude {
                continue;
            }
            match connection.send_encoded(&body) {
                Ok(()) => delivered += 1,
                Err(e) => self.drop_connection(&connection, &e),
            }
        }
        delivered
    }

    fn drop_connection(&self, connection: &Arc<Connection>, reason: &LedgerError) {
        if connection.close() {
            warn!(
                "[{}] Closing connection to {}: {reason}",
                self.label,
                connection.peer_addr()
            );
        }
        self.peers.evict(connection.id());
    }
}
