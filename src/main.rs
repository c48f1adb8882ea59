// Entry point for the peer-chain node binary
use clap::Parser;
use log::{error, info, LevelFilter};
use peer_chain::{run_console, Block, Command, Config, Opt, Server};
use std::io;
use std::process;

fn main() {
    // Info by default; RUST_LOG still wins when set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::StartNode {
            addr,
            peers,
            config,
            headless,
        } => {
            // Defaults, then the file, then env, then flags
            let mut config = Config::load(config.as_deref())?;
            if let Some(addr) = addr {
                config.listen_addr = addr;
            }
            config.peers.extend(peers);
            if headless {
                config.console = false;
            }

            let server = Server::bind(&config)?;
            let node = server.node();
            let accept_loop = server.spawn();

            let connected = node.connect_to_peers(&config.peers);
            info!(
                "[{}] Connected to {connected} of {} configured peers",
                node.label(),
                config.peers.len()
            );

            if config.console {
                let stdin = io::stdin();
                run_console(&node, stdin.lock(), &mut io::stdout())?;
            } else {
                accept_loop
                    .join()
                    .map_err(|_| "accept loop panicked".to_string())??;
            }
        }
        Command::Genesis => {
            println!("{}", serde_json::to_string_pretty(&Block::genesis())?);
        }
    }
    Ok(())
}
