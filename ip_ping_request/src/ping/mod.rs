pub mod icmp;

use crate::checksum::checksum;
use pnet::packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::{self, MutableEchoRequestPacket};
use pnet::packet::icmp::IcmpTypes;
use pnet::packet::Packet;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;

pub type IcmpType = packet::icmp::IcmpType;

/// An ICMP echo message without payload.
///
/// Request and reply share the same layout, only the type differs. The
/// checksum is not stored: it is computed when encoding and checked when
/// decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoPacket {
    pub ty: IcmpType,
    pub identifier: u16,
    pub sequence: u16,
}

impl EchoPacket {
    pub fn request(identifier: u16, sequence: u16) -> Self {
        Self {
            ty: IcmpTypes::EchoRequest,
            identifier,
            sequence,
        }
    }

    pub fn reply(identifier: u16, sequence: u16) -> Self {
        Self {
            ty: IcmpTypes::EchoReply,
            identifier,
            sequence,
        }
    }

    pub fn size() -> usize {
        MutableEchoRequestPacket::minimum_packet_size()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = vec![0u8; Self::size()];
        if let Some(mut echo_packet) = MutableEchoRequestPacket::new(&mut buffer[..]) {
            echo_packet.set_icmp_type(self.ty);
            echo_packet.set_icmp_code(echo_request::IcmpCodes::NoCode);
            echo_packet.set_identifier(self.identifier);
            echo_packet.set_sequence_number(self.sequence);
            // The checksum field must be zero while summing
            echo_packet.set_checksum(0);
            let csum = checksum(echo_packet.packet());
            echo_packet.set_checksum(csum);
        }
        buffer
    }

    /// Parses an echo request or reply, payload included in the checksum.
    ///
    /// Returns `None` for other ICMP types, truncated data or a bad checksum.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let packet = EchoReplyPacket::new(data)?;
        let ty = packet.get_icmp_type();
        if ty != IcmpTypes::EchoReply && ty != IcmpTypes::EchoRequest {
            return None;
        }
        if checksum(packet.packet()) != 0 {
            return None;
        }
        Some(Self {
            ty,
            identifier: packet.get_identifier(),
            sequence: packet.get_sequence_number(),
        })
    }

    /// Whether `other` is the reply to this request.
    pub fn is_answered_by(&self, other: &EchoPacket) -> bool {
        self.ty == IcmpTypes::EchoRequest
            && other.ty == IcmpTypes::EchoReply
            && self.identifier == other.identifier
            && self.sequence == other.sequence
    }
}

/// The socket side of a ping: one ICMP packet out, ICMP packets in.
pub trait EchoSocket {
    /// Sends a complete ICMP message to `destination`.
    fn send_to(&mut self, packet: &[u8], destination: Ipv4Addr) -> io::Result<()>;

    /// Waits at most `timeout` for the next inbound ICMP message.
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    fn recv_timeout(&mut self, timeout: Duration) -> io::Result<Option<(Vec<u8>, Ipv4Addr)>>;

    /// Upper bound on the wait for a reply to one request.
    fn receive_timeout(&self) -> Duration;
}

impl<T: EchoSocket + ?Sized> EchoSocket for &mut T {
    fn send_to(&mut self, packet: &[u8], destination: Ipv4Addr) -> io::Result<()> {
        (**self).send_to(packet, destination)
    }

    fn recv_timeout(&mut self, timeout: Duration) -> io::Result<Option<(Vec<u8>, Ipv4Addr)>> {
        (**self).recv_timeout(timeout)
    }

    fn receive_timeout(&self) -> Duration {
        (**self).receive_timeout()
    }
}

#[derive(Debug, Error)]
pub enum PingError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("failed to send packet")]
    FailedToSendPacket(#[source] io::Error),
    #[error("failed to receive packet")]
    FailedToReceive(#[source] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_layout() {
        let data = EchoPacket::request(0, 0x01_02).encode();
        assert_eq!(data.len(), 8);
        assert_eq!(data[0], 8);
        assert_eq!(data[1], 0);
        assert_eq!(&data[4..6], &[0, 0]);
        assert_eq!(&data[6..8], &[0x01, 0x02]);
        // 0x0800 + 0x0102 = 0x0902
        assert_eq!(&data[2..4], &(!0x09_02u16).to_be_bytes());
    }

    #[test]
    fn encoded_packets_verify() {
        for (identifier, sequence) in [(0, 0), (0, 255), (0x12_34, 0xFF_FF), (0xFF_FF, 1)] {
            let data = EchoPacket::request(identifier, sequence).encode();
            assert_eq!(checksum(&data), 0);
            let data = EchoPacket::reply(identifier, sequence).encode();
            assert_eq!(checksum(&data), 0);
        }
    }

    #[test]
    fn decode_consistency() {
        let request = EchoPacket::request(7, 42);
        assert_eq!(EchoPacket::decode(&request.encode()), Some(request));
        let reply = EchoPacket::reply(7, 42);
        assert_eq!(EchoPacket::decode(&reply.encode()), Some(reply));
    }

    #[test]
    fn decode_rejects_corruption() {
        let mut data = EchoPacket::reply(7, 42).encode();
        data[7] ^= 0x01;
        assert_eq!(EchoPacket::decode(&data), None);
        assert_eq!(EchoPacket::decode(&data[..4]), None);
    }

    #[test]
    fn decode_rejects_other_types() {
        // Destination unreachable, checksum fixed up
        let mut data = vec![3, 1, 0, 0, 0, 0, 0, 0];
        let csum = checksum(&data);
        data[2..4].copy_from_slice(&csum.to_be_bytes());
        assert_eq!(EchoPacket::decode(&data), None);
    }

    #[test]
    fn reply_matching() {
        let request = EchoPacket::request(0, 10);
        assert!(request.is_answered_by(&EchoPacket::reply(0, 10)));
        assert!(!request.is_answered_by(&EchoPacket::reply(0, 11)));
        assert!(!request.is_answered_by(&EchoPacket::reply(1, 10)));
        assert!(!request.is_answered_by(&EchoPacket::request(0, 10)));
    }
}
