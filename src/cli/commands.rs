use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "peer-chain")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(long, help = "Address to listen on (host:port or bare port)")]
        addr: Option<String>,
        #[arg(
            long = "peer",
            help = "Peer to connect to on startup; repeat for several"
        )]
        peers: Vec<String>,
        #[arg(long, help = "TOML configuration file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Serve peers only, without the operator console")]
        headless: bool,
    },
    #[command(name = "genesis", about = "Print the genesis block as JSON")]
    Genesis,
}
