mod configuration;
mod cursor;
mod interface;
mod internet;
mod logging;
mod scanner;

use anyhow::Context;
use clap::{ArgAction, Parser};
use configuration::ScanConfiguration;
use interface::InterfaceInfo;
use scanner::ScanError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, warn};

#[derive(Parser)]
#[command(name = "subnet_scan")]
#[command(about = "Pings every IPv4 address of a network interface's subnet.")]
struct CommandLine {
    /// Interface whose subnet is swept, e.g. eth0
    interface: String,
    /// JSON file with `ttl`, `receive_timeout_millis` and `identifier_port`
    #[arg(long)]
    config: Option<PathBuf>,
    /// TTL of the echo requests [default: 64]
    #[arg(long)]
    ttl: Option<u8>,
    /// Wait for each reply, in milliseconds [default: 250]
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,
    /// ICMP echo identifier [default: 0]
    #[arg(long)]
    identifier: Option<u16>,
    /// More logs on stderr, repeat for packet level traces
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn run(args: &CommandLine) -> anyhow::Result<()> {
    let conf = ScanConfiguration::load(args.config.as_deref())?
        .with_overrides(args.ttl, args.timeout_ms, args.identifier)
        .validate()?;
    debug!(?conf, "Configuration");

    let interface = InterfaceInfo::lookup(&args.interface)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match scanner::scan(&interface, &conf, &mut out) {
        Ok(_) => Ok(()),
        Err(ScanError::Socket(e)) if e.is_permission_denied() => {
            warn!("Raw ICMP sockets require root or the CAP_NET_RAW capability");
            Err(e).context("cannot start the sweep")
        }
        Err(e) => Err(e).with_context(|| format!("sweep of {} failed", interface.name)),
    }
}

fn main() -> ExitCode {
    let args = CommandLine::parse();
    logging::init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
