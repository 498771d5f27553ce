use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tix",
    about = "Tix: concurrent ticket allocation without overselling",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a load simulation against an in-memory ticket pool
    Simulate(SimulateArgs),
    /// Start the HTTP booking server
    Serve(ServeArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args, Default)]
pub struct SimulateArgs {
    /// Tickets in the pool
    #[arg(long)]
    pub tickets: Option<u64>,
    /// Booking requests to submit
    #[arg(long)]
    pub requests: Option<u64>,
    /// Dispatch pool workers
    #[arg(long)]
    pub workers: Option<usize>,
    /// Deadline for the whole run
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Requests submitted per producer task
    #[arg(long)]
    pub batch_size: Option<u64>,
    /// Maximum simulated latency per request, in microseconds
    #[arg(long)]
    pub jitter_us: Option<u64>,
}

#[derive(Args, Default)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Tickets in the pool
    #[arg(long)]
    pub tickets: Option<u64>,
}
