use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::network::Node;
use log::{error, info};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

/// Listening side of a node: accepts inbound peers and hands each one to
/// the node, which gives it its own reader thread.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    node: Node,
}

impl Server {
    /// Bind the configured address and create the node that will own it
    pub fn bind(config: &Config) -> Result<Server> {
        let addr = config.listen_socket_addr()?;
        let listener = TcpListener::bind(addr)
            .map_err(|e| LedgerError::Network(format!("Failed to bind to {addr}: {e}")))?;
        let local_addr = listener.local_addr()?;
        let node = Node::with_frame_limit(local_addr.to_string(), config.max_frame_size);

        info!("[{local_addr}] Server listening on {local_addr}");

        Ok(Server {
            listener,
            local_addr,
            node,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn node(&self) -> Node {
        self.node.clone()
    }

    /// Accept connections until the listener fails
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.node.accept_connection(stream) {
                        error!("[{}] Failed to register connection: {e}", self.local_addr);
                    }
                }
                Err(e) => {
                    error!("[{}] Error accepting connection: {e}", self.local_addr);
                }
            }
        }

        Ok(())
    }

    /// Run the accept loop on a background thread
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        thread::spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config() -> Config {
        Config {
            listen_addr: "127.0.0.1:0".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_server_creation() -> Result<()> {
        let server = Server::bind(&loopback_config())?;
        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(server.node().label(), server.local_addr().to_string());
        Ok(())
    }

    #[test]
    fn test_bind_conflict_is_network_error() -> Result<()> {
        let first = Server::bind(&loopback_config())?;
        let taken = Config {
            listen_addr: first.local_addr().to_string(),
            ..Config::default()
        };
        assert!(matches!(Server::bind(&taken), Err(LedgerError::Network(_))));
        Ok(())
    }
}
