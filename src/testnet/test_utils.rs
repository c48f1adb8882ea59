//! Test utilities for multi-node scenarios

use crate::config::Config;
use crate::network::{Node, Server};
use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

/// How long convergence checks wait before giving up
pub const CONVERGENCE_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Config listening on an ephemeral loopback port
pub fn loopback_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        console: false,
        ..Config::default()
    }
}

/// Start a node with its accept loop on a background thread
pub fn spawn_node() -> (Node, SocketAddr) {
    let server = Server::bind(&loopback_config()).expect("loopback bind should succeed");
    let addr = server.local_addr();
    let node = server.node();
    server.spawn();
    (node, addr)
}

/// Poll `condition` until it holds or the convergence timeout passes
pub fn wait_until<F>(condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + CONVERGENCE_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(POLL_INTERVAL);
    }
    condition()
}
