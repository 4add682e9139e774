use crate::cursor::u32::U32Cursor;
use crate::cursor::CursorExt;
use std::net::Ipv4Addr;

/// The addresses of an IPv4 subnet, network and broadcast included.
///
/// Everything is computed on host order `u32`s; `Ipv4Addr` only appears at
/// the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepRange {
    base: u32,
    range: u32,
}

impl SweepRange {
    pub fn new(address: Ipv4Addr, mask: Ipv4Addr) -> Self {
        let mask = u32::from(mask);
        Self {
            base: u32::from(address) & mask,
            range: u32::MAX - mask,
        }
    }

    /// Network address, offset 0.
    pub fn base(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    /// Highest host offset, inclusive.
    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn address_count(&self) -> u64 {
        self.range as u64 + 1
    }

    pub fn target(&self, offset: u32) -> Ipv4Addr {
        // Wraps only for non contiguous masks
        Ipv4Addr::from(self.base.wrapping_add(offset))
    }

    /// `(offset, address)` for every offset, ascending.
    pub fn targets(&self) -> impl Iterator<Item = (u32, Ipv4Addr)> {
        self.targets_from(0)
    }

    pub fn targets_from(&self, first: u32) -> impl Iterator<Item = (u32, Ipv4Addr)> {
        let range = *self;
        U32Cursor::new(first, self.range)
            .map(move |offset| (offset, range.target(offset)))
            .to_iter()
    }
}
