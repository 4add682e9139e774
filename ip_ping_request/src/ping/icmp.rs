use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::Packet;
use pnet::transport::icmp_packet_iter;
use pnet::transport::transport_channel;
use pnet::transport::TransportChannelType::Layer4;
use pnet::transport::TransportProtocol::Ipv4;
use pnet::transport::{TransportReceiver, TransportSender};
use socket2::SockRef;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::os::fd::BorrowedFd;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

use super::*;

const CHANNEL_BUFFER_SIZE: usize = 4096;

/// Smallest wait a socket timeout can express. Shorter waits round down to a
/// zero `timeval`, which the kernel reads as "block forever".
pub const MIN_RECEIVE_WAIT: Duration = Duration::from_micros(1);

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("failed to open raw ICMP socket")]
    Open(#[source] io::Error),
    #[error("failed to set TTL to {ttl}")]
    Ttl {
        ttl: u8,
        #[source]
        source: io::Error,
    },
    #[error("failed to set receive timeout to {timeout:?}")]
    ReceiveTimeout {
        timeout: Duration,
        #[source]
        source: io::Error,
    },
    #[error("receive timeout must be at least 1µs, got {0:?}")]
    InvalidTimeout(Duration),
}

impl SocketError {
    /// Whether the OS refused the socket for lack of privileges.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Open(e) if e.kind() == io::ErrorKind::PermissionDenied)
    }
}

/// Raw IPv4 ICMP socket.
///
/// The file descriptors are released when the value is dropped.
pub struct IcmpSocket {
    tx: TransportSender,
    rx: TransportReceiver,
    receive_timeout: Duration,
}

impl IcmpSocket {
    pub fn open(ttl: u8, receive_timeout: Duration) -> Result<Self, SocketError> {
        if receive_timeout < MIN_RECEIVE_WAIT {
            return Err(SocketError::InvalidTimeout(receive_timeout));
        }
        let protocol = Layer4(Ipv4(IpNextHeaderProtocols::Icmp));
        let (mut tx, rx) =
            transport_channel(CHANNEL_BUFFER_SIZE, protocol).map_err(SocketError::Open)?;
        tx.set_ttl(ttl)
            .map_err(|source| SocketError::Ttl { ttl, source })?;
        // SAFETY: the descriptor is owned by `rx`, alive for this whole call.
        let fd = unsafe { BorrowedFd::borrow_raw(rx.socket.fd) };
        SockRef::from(&fd)
            .set_read_timeout(Some(receive_timeout))
            .map_err(|source| SocketError::ReceiveTimeout {
                timeout: receive_timeout,
                source,
            })?;
        debug!(ttl, ?receive_timeout, "ICMP socket ready");
        Ok(Self {
            tx,
            rx,
            receive_timeout,
        })
    }
}

impl EchoSocket for IcmpSocket {
    fn send_to(&mut self, packet: &[u8], destination: Ipv4Addr) -> io::Result<()> {
        let packet = IcmpPacket::new(packet)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "truncated ICMP packet"))?;
        self.tx.send_to(packet, IpAddr::V4(destination))?;
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> io::Result<Option<(Vec<u8>, Ipv4Addr)>> {
        if timeout < MIN_RECEIVE_WAIT {
            return Ok(None);
        }
        let mut iter = icmp_packet_iter(&mut self.rx);
        match iter.next_with_timeout(timeout)? {
            Some((packet, IpAddr::V4(source))) => Ok(Some((packet.packet().to_vec(), source))),
            Some((_, IpAddr::V6(source))) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected IPv6 source {}", source),
            )),
            None => Ok(None),
        }
    }

    fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }
}

/// Sends echo requests one at a time over a single socket.
pub struct Pinger<S> {
    socket: S,
    identifier: u16,
}

impl<S: EchoSocket> Pinger<S> {
    pub fn new(socket: S, identifier: u16) -> Self {
        Self { socket, identifier }
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Sends one request to `addr` and waits for the matching reply.
    ///
    /// Anything that is not an echo reply from `addr` carrying our identifier
    /// and `sequence` is discarded; the wait never exceeds the socket's receive
    /// timeout, counted from the send.
    pub fn ping(&mut self, sequence: u16, addr: Ipv4Addr) -> Result<Duration, PingError> {
        let request = EchoPacket::request(self.identifier, sequence);
        self.socket
            .send_to(&request.encode(), addr)
            .map_err(PingError::FailedToSendPacket)?;

        let timeout = self.socket.receive_timeout();
        let start = Instant::now();
        let stop = start + timeout;
        loop {
            let remaining = stop.saturating_duration_since(Instant::now());
            if remaining < MIN_RECEIVE_WAIT {
                return Err(PingError::Timeout(timeout));
            }
            let (data, source) = match self
                .socket
                .recv_timeout(remaining)
                .map_err(PingError::FailedToReceive)?
            {
                Some(received) => received,
                None => return Err(PingError::Timeout(timeout)),
            };
            match EchoPacket::decode(&data) {
                Some(reply) if source == addr && request.is_answered_by(&reply) => {
                    return Ok(start.elapsed());
                }
                Some(other) => trace!(%source, ?other, "ignoring unrelated echo packet"),
                None => trace!(%source, len = data.len(), "ignoring non echo ICMP packet"),
            }
        }
    }

    /// `ping` collapsed to reachability. Failures are only logged.
    pub fn probe(&mut self, sequence: u16, addr: Ipv4Addr) -> bool {
        match self.ping(sequence, addr) {
            Ok(latency) => {
                debug!(%addr, sequence, ?latency, "echo reply");
                true
            }
            Err(PingError::Timeout(_)) => {
                trace!(%addr, sequence, "no reply");
                false
            }
            Err(e) => {
                debug!(%addr, sequence, error = ?e, "probe failed");
                false
            }
        }
    }
}
