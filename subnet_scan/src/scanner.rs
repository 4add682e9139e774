use crate::configuration::ScanConfiguration;
use crate::interface::InterfaceInfo;
use crate::internet::SweepRange;
use ip_ping_request::ping::icmp::{IcmpSocket, Pinger, SocketError};
use ip_ping_request::ping::EchoSocket;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Socket(#[from] SocketError),
    #[error("failed to write scan results")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub probed: u64,
    pub responders: u64,
    pub elapsed: Duration,
}

/// Pings every address of the interface's subnet and writes responders to
/// `out`, one per line, after a header.
///
/// The socket lives exactly as long as this call.
pub fn scan<W: Write>(
    interface: &InterfaceInfo,
    conf: &ScanConfiguration,
    out: &mut W,
) -> Result<ScanSummary, ScanError> {
    let range = SweepRange::new(interface.address, interface.mask);
    let socket = IcmpSocket::open(conf.ttl, conf.receive_timeout())?;
    sweep(
        interface,
        range,
        &mut Pinger::new(socket, conf.identifier_port),
        out,
    )
}

pub fn write_header<W: Write>(out: &mut W, interface: &InterfaceInfo) -> io::Result<()> {
    writeln!(out, "Interface:      {}", interface.name)?;
    writeln!(out, "IPv4 Address:   {}", interface.address)?;
    writeln!(out, "IP Subnet Mask: {}", interface.mask)?;
    writeln!(out)?;
    out.flush()
}

/// Probes `range` in ascending order, one address at a time.
pub fn sweep<S: EchoSocket, W: Write>(
    interface: &InterfaceInfo,
    range: SweepRange,
    pinger: &mut Pinger<S>,
    out: &mut W,
) -> Result<ScanSummary, ScanError> {
    write_header(out, interface)?;
    info!(
        interface = %interface.name,
        first = %range.base(),
        last = %range.target(range.range()),
        addresses = range.address_count(),
        "Starting sweep"
    );

    let total = range.address_count();
    let start = Instant::now();
    let mut probed = 0u64;
    let mut responders = 0u64;
    for (offset, target) in range.targets() {
        // Sequence numbers wrap every 65536 probes
        if pinger.probe(offset as u16, target) {
            writeln!(out, "{}", target)?;
            out.flush()?;
            responders += 1;
        }

        probed += 1;
        let permille = 1000 * probed / total;
        if permille > 1000 * (probed - 1) / total {
            debug!(
                "{}% after {:?}",
                permille as f32 / 10.0,
                start.elapsed()
            );
        }
    }

    let summary = ScanSummary {
        probed,
        responders,
        elapsed: start.elapsed(),
    };
    info!(
        probed = summary.probed,
        responders = summary.responders,
        elapsed = ?summary.elapsed,
        "Sweep done"
    );
    Ok(summary)
}
