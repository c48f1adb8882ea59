//! Synchronization integration tests
//!
//! Real nodes on loopback ports, plus in-process message delivery where the
//! exact ordering matters.

use peer_chain::network::codec::{read_frame, write_frame, Frame, MAX_FRAME_SIZE};
use peer_chain::{
    is_valid_successor, Block, Chain, Config, Connection, Message, Node, Outcome, Role, Server,
};
use std::io;
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn spawn_node() -> (Node, SocketAddr) {
    let config = Config {
        listen_addr: "127.0.0.1:0".to_string(),
        console: false,
        ..Config::default()
    };
    let server = Server::bind(&config).unwrap();
    let addr = server.local_addr();
    let node = server.node();
    server.spawn();
    (node, addr)
}

fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

fn detached_connection() -> Arc<Connection> {
    let conn = Connection::new("127.0.0.1:9".parse().unwrap(), Role::Listener, io::sink());
    conn.open().unwrap();
    Arc::new(conn)
}

#[test]
fn test_late_joiner_matches_byte_for_byte() {
    let (a, a_addr) = spawn_node();
    a.submit_data("tx1").unwrap();
    a.submit_data("tx2").unwrap();

    let (b, _) = spawn_node();
    assert_eq!(b.chain().len(), 1);
    b.connect_to(&a_addr.to_string()).unwrap();

    assert!(wait_until(|| b.chain().len() == 3));
    let a_blocks = a.blocks();
    let b_blocks = b.blocks();
    assert_eq!(a_blocks, b_blocks);
    assert_eq!(
        serde_json::to_vec(&a_blocks).unwrap(),
        serde_json::to_vec(&b_blocks).unwrap()
    );
    assert_eq!(b.chain().tip().get_data(), "tx2");
}

#[test]
fn test_shorter_fork_adopts_longer_chain() {
    let (a, a_addr) = spawn_node();
    for data in ["a1", "a2", "a3"] {
        a.submit_data(data).unwrap();
    }

    let (b, _) = spawn_node();
    b.submit_data("b1").unwrap();
    b.connect_to(&a_addr.to_string()).unwrap();

    assert!(wait_until(|| b.chain().len() == 4));
    assert_eq!(b.blocks(), a.blocks());
    assert!(b.blocks().iter().all(|block| block.get_data() != "b1"));
}

#[test]
fn test_equal_length_forks_do_not_converge() {
    let a = Node::new("a");
    let b = Node::new("b");
    a.submit_data("left").unwrap();
    b.submit_data("right").unwrap();

    let link = detached_connection();
    let outcome_b = b.on_message(&link, Message::ChainResponse { chain: a.blocks() });
    let outcome_a = a.on_message(&link, Message::ChainResponse { chain: b.blocks() });

    assert_eq!(outcome_a, Outcome::ChainRejected);
    assert_eq!(outcome_b, Outcome::ChainRejected);
    assert_eq!(a.chain().tip().get_data(), "left");
    assert_eq!(b.chain().tip().get_data(), "right");
}

#[test]
fn test_tampered_block_fails_chain_validation() {
    let mut source = Chain::new();
    for data in ["tx1", "tx2", "tx3"] {
        source.append_local(data).unwrap();
    }

    let mut blocks = source.blocks().to_vec();
    let original = blocks[1].clone();
    blocks[1] = Block::from_wire(
        original.get_index(),
        original.get_timestamp(),
        "tx1 but altered".to_string(),
        original.get_previous_hash().to_string(),
        original.get_hash().to_string(),
    );

    // The next link still points at the claimed hash...
    assert!(is_valid_successor(&blocks[2], &blocks[1]));
    // ...but the forged block's own hash no longer matches its content
    assert!(!blocks[1].has_consistent_hash());

    let mut local = Chain::new();
    assert!(!local.is_valid_chain(&blocks));
    assert!(!local.replace_if_better(blocks));
    assert_eq!(local.len(), 1);
}

#[test]
fn test_concurrent_new_blocks_only_one_wins() {
    let receiver = Node::new("receiver");
    let tip = receiver.chain().tip();
    let left = Block::new_block(1, 100, "left".into(), tip.get_hash().into());
    let right = Block::new_block(1, 101, "right".into(), tip.get_hash().into());

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [left, right]
        .into_iter()
        .map(|block| {
            let node = receiver.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = detached_connection();
                barrier.wait();
                node.on_message(&conn, Message::NewBlock { block })
            })
        })
        .collect();

    let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let appended = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::BlockAppended(_)))
        .count();
    let rejected = outcomes
        .iter()
        .filter(|o| **o == Outcome::BlockRejected)
        .count();

    assert_eq!((appended, rejected), (1, 1));
    assert_eq!(receiver.chain().len(), 2);
}

#[test]
fn test_gossiped_chain_stays_valid() {
    let (a, a_addr) = spawn_node();
    let (b, _) = spawn_node();
    b.connect_to(&a_addr.to_string()).unwrap();
    assert!(wait_until(|| a.peers().len() == 1));

    for i in 0..5 {
        a.submit_data(&format!("a{i}")).unwrap();
        assert!(wait_until(|| b.chain().len() == i + 2));
    }
    for i in 0..3 {
        b.submit_data(&format!("b{i}")).unwrap();
        assert!(wait_until(|| a.chain().len() == 7 + i));
    }

    let blocks = b.blocks();
    assert_eq!(blocks.len(), 9);
    assert!(Chain::new().is_valid_chain(&blocks));
    assert_eq!(a.blocks(), blocks);
}

#[test]
fn test_malformed_frame_keeps_connection_open() {
    let (node, addr) = spawn_node();
    node.submit_data("tx1").unwrap();

    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    write_frame(&mut stream, b"{\"type\":\"CHAIN_REQUEST\"").unwrap();
    write_frame(&mut stream, b"\xff\xfe garbage").unwrap();
    write_frame(&mut stream, br#"{"type":"NEW_BLOCK"}"#).unwrap();
    write_frame(&mut stream, &Message::ChainRequest.encode().unwrap()).unwrap();

    match read_frame(&mut stream, MAX_FRAME_SIZE).unwrap() {
        Frame::Data(body) => match Message::decode(&body).unwrap() {
            Message::ChainResponse { chain } => {
                assert_eq!(chain.len(), 2);
                assert_eq!(chain, node.blocks());
            }
            other => panic!("expected CHAIN_RESPONSE, got {other}"),
        },
        other => panic!("expected a frame, got {other:?}"),
    }
}

#[test]
fn test_unreachable_peer_does_not_stop_node() {
    let (node, _) = spawn_node();
    let dead_port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let (live, live_addr) = spawn_node();

    let connected = node.connect_to_peers(&[dead_port.to_string(), live_addr.to_string()]);
    assert_eq!(connected, 1);

    node.submit_data("still running").unwrap();
    assert!(wait_until(|| live.chain().len() == 2));
}
