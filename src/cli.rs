//! CLI argument definitions using clap derive macros.

use clap::Parser;

use apiprobe_core::ServerConfig;
use apiprobe_core::server::{DEFAULT_HOST, DEFAULT_PORT};

/// Local execution backend for the apiprobe API-testing UI.
///
/// Serves `POST /api/proxy/send`, which fires the described HTTP request and
/// returns the raw status, headers, and body.
#[derive(Parser, Debug)]
#[command(name = "apiprobe")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Args {
    /// Listener settings derived from the flags.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}
