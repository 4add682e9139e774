use pnet::datalink;
use pnet::ipnetwork::IpNetwork;
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("no network interface named {0:?}")]
    NotFound(String),
    #[error("network interface {0:?} has no IPv4 address")]
    NoIpv4Address(String),
}

/// The IPv4 side of a network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl InterfaceInfo {
    pub fn lookup(name: &str) -> Result<Self, InterfaceError> {
        let interfaces = datalink::interfaces();
        debug!(count = interfaces.len(), "listed network interfaces");
        Self::select(
            name,
            interfaces
                .iter()
                .map(|interface| (interface.name.as_str(), interface.ips.as_slice())),
        )
    }

    /// First IPv4 network of the interface called `name`.
    fn select<'a>(
        name: &str,
        interfaces: impl IntoIterator<Item = (&'a str, &'a [IpNetwork])>,
    ) -> Result<Self, InterfaceError> {
        let mut found = false;
        for (candidate, ips) in interfaces {
            if candidate != name {
                continue;
            }
            found = true;
            let network = ips.iter().find_map(|ip| match ip {
                IpNetwork::V4(network) => Some(network),
                IpNetwork::V6(_) => None,
            });
            if let Some(network) = network {
                return Ok(Self {
                    name: name.to_string(),
                    address: network.ip(),
                    mask: network.mask(),
                });
            }
        }
        if found {
            Err(InterfaceError::NoIpv4Address(name.to_string()))
        } else {
            Err(InterfaceError::NotFound(name.to_string()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pnet::ipnetwork::{Ipv4Network, Ipv6Network};

    fn v4(a: u8, b: u8, c: u8, d: u8, prefix: u8) -> IpNetwork {
        IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), prefix).unwrap())
    }

    fn v6_link_local() -> IpNetwork {
        IpNetwork::V6(Ipv6Network::new("fe80::1".parse().unwrap(), 64).unwrap())
    }

    #[test]
    fn selects_by_name() {
        let lo = [v4(127, 0, 0, 1, 8)];
        let eth0 = [v6_link_local(), v4(10, 0, 0, 5, 30), v4(10, 0, 1, 5, 24)];
        let interfaces = [("lo", &lo[..]), ("eth0", &eth0[..])];
        let info = InterfaceInfo::select("eth0", interfaces.iter().copied()).unwrap();
        assert_eq!(
            info,
            InterfaceInfo {
                name: "eth0".to_string(),
                address: Ipv4Addr::new(10, 0, 0, 5),
                mask: Ipv4Addr::new(255, 255, 255, 252),
            }
        );
    }

    #[test]
    fn unknown_interface() {
        let lo = [v4(127, 0, 0, 1, 8)];
        let interfaces = [("lo", &lo[..])];
        assert_eq!(
            InterfaceInfo::select("wlan0", interfaces.iter().copied()),
            Err(InterfaceError::NotFound("wlan0".to_string()))
        );
    }

    #[test]
    fn interface_without_ipv4() {
        let tun = [v6_link_local()];
        let interfaces = [("tun0", &tun[..])];
        assert_eq!(
            InterfaceInfo::select("tun0", interfaces.iter().copied()),
            Err(InterfaceError::NoIpv4Address("tun0".to_string()))
        );
    }

    #[test]
    fn repeated_entries_are_merged() {
        // Some platforms list one entry per address
        let first = [v6_link_local()];
        let second = [v4(192, 168, 1, 20, 24)];
        let interfaces = [("en0", &first[..]), ("en0", &second[..])];
        let info = InterfaceInfo::select("en0", interfaces.iter().copied()).unwrap();
        assert_eq!(info.address, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(info.mask, Ipv4Addr::new(255, 255, 255, 0));
    }
}
