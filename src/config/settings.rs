use crate::error::{LedgerError, Result};
use crate::network::codec::MAX_FRAME_SIZE;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

static DEFAULT_NODE_ADDR: &str = "127.0.0.1:5000";

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const NODE_PEERS_KEY: &str = "NODE_PEERS";

/// Node settings.
///
/// Resolved in layers: built-in defaults, then an optional TOML file, then
/// the `NODE_ADDRESS` / `NODE_PEERS` environment variables. Command-line flags
/// are applied on top by `main`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub peers: Vec<String>,
    pub max_frame_size: usize,
    pub console: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: String::from(DEFAULT_NODE_ADDR),
            peers: vec![],
            max_frame_size: MAX_FRAME_SIZE,
            console: true,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Config> {
        let config: Config = toml::from_str(raw)?;
        if config.max_frame_size == 0 {
            return Err(LedgerError::Config(
                "max_frame_size must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Overlay values from an environment-like lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(NODE_ADDRESS_KEY) {
            self.listen_addr = addr;
        }
        if let Some(peers) = lookup(NODE_PEERS_KEY) {
            self.peers = peers
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
    }

    pub fn listen_socket_addr(&self) -> Result<SocketAddr> {
        resolve_addr(&self.listen_addr)
    }
}

/// Accepts `host:port` or a bare port, which means a loopback address
pub fn resolve_addr(addr: &str) -> Result<SocketAddr> {
    let addr = addr.trim();
    if let Ok(port) = addr.parse::<u16>() {
        return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
    }
    addr.to_socket_addrs()
        .map_err(|e| LedgerError::Config(format!("Invalid address {addr}: {e}")))?
        .next()
        .ok_or_else(|| LedgerError::Config(format!("Address {addr} did not resolve")))
}
