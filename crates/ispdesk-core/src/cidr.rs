// ── CIDR pool resolver ──
//
// A router's pool is the ordered union of its CIDR blocks. Host
// enumeration is lazy: a /8 is never materialised, candidates are
// produced one at a time in list order, then numeric order.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── CidrBlock ───────────────────────────────────────────────────────

/// A single IPv4 network: base address plus prefix length.
///
/// The base is normalised on parse, so `192.168.1.7/24` and
/// `192.168.1.0/24` are the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CidrBlock {
    network: Ipv4Addr,
    prefix: u8,
}

impl CidrBlock {
    pub fn new(address: Ipv4Addr, prefix: u8) -> Result<Self, CoreError> {
        if prefix > 32 {
            return Err(CoreError::InvalidCidrFormat {
                entry: format!("{address}/{prefix}"),
            });
        }
        let network = Ipv4Addr::from(u32::from(address) & mask(prefix));
        Ok(Self { network, prefix })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !mask(self.prefix))
    }

    /// Whether `address` falls anywhere inside the block, endpoints included.
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & mask(self.prefix) == u32::from(self.network)
    }

    /// Whether `address` is an assignable host of the block.
    ///
    /// Network and broadcast are excluded for prefixes up to /30;
    /// /31 and /32 have no reserved addresses.
    pub fn is_host(&self, address: Ipv4Addr) -> bool {
        let (first, last) = self.host_bounds();
        let raw = u64::from(u32::from(address));
        self.contains(address) && raw >= first && raw <= last
    }

    /// Lazy iterator over assignable hosts in ascending order.
    pub fn hosts(&self) -> Hosts {
        let (next, last) = self.host_bounds();
        Hosts { next, last }
    }

    pub fn host_count(&self) -> u64 {
        let (first, last) = self.host_bounds();
        last - first + 1
    }

    /// First and last assignable host, the form a router's pool ranges use.
    pub fn host_range(&self) -> (Ipv4Addr, Ipv4Addr) {
        let (first, last) = self.host_bounds();
        (to_addr(first), to_addr(last))
    }

    fn host_bounds(&self) -> (u64, u64) {
        let start = u64::from(u32::from(self.network));
        let end = u64::from(u32::from(self.broadcast()));
        if self.prefix >= 31 {
            (start, end)
        } else {
            (start + 1, end - 1)
        }
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for CidrBlock {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();
        let invalid = || CoreError::InvalidCidrFormat {
            entry: entry.to_owned(),
        };

        let (addr, prefix) = entry.split_once('/').ok_or_else(invalid)?;
        let address = parse_octets(addr).ok_or_else(invalid)?;

        if prefix.is_empty() || prefix.len() > 2 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;

        Self::new(address, prefix).map_err(|_| invalid())
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CidrBlock> for String {
    fn from(block: CidrBlock) -> Self {
        block.to_string()
    }
}

// ── AddressPool ─────────────────────────────────────────────────────

/// Ordered union of CIDR blocks from which a router hands out addresses.
///
/// Blocks may overlap each other and may overlap other routers' pools;
/// pools are per router, never global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressPool(Vec<CidrBlock>);

impl AddressPool {
    /// Parse a comma-separated CIDR list such as
    /// `"192.168.1.0/24, 10.0.0.0/24"`. Fails on the first bad entry and
    /// on an empty list.
    pub fn parse(list: &str) -> Result<Self, CoreError> {
        let blocks = list
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<CidrBlock>, _>>()?;
        Self::from_blocks(blocks)
    }

    pub fn from_blocks(blocks: Vec<CidrBlock>) -> Result<Self, CoreError> {
        if blocks.is_empty() {
            return Err(CoreError::InvalidCidrFormat {
                entry: String::new(),
            });
        }
        Ok(Self(blocks))
    }

    pub fn blocks(&self) -> &[CidrBlock] {
        &self.0
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        self.0.iter().any(|b| b.contains(address))
    }

    pub fn is_host(&self, address: Ipv4Addr) -> bool {
        self.0.iter().any(|b| b.is_host(address))
    }

    /// All candidate hosts: blocks in list order, ascending within each.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.0.iter().flat_map(CidrBlock::hosts)
    }

    /// Sum of host counts. Overlapping blocks are counted twice.
    pub fn capacity(&self) -> u64 {
        self.0.iter().map(CidrBlock::host_count).sum()
    }
}

impl fmt::Display for AddressPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for AddressPool {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Hosts iterator ──────────────────────────────────────────────────

/// Finite, lazy sequence of host addresses inside one block.
///
/// Bounds are held as `u64` so `/0` and `255.255.255.255/32` iterate
/// without overflow.
#[derive(Debug, Clone)]
pub struct Hosts {
    next: u64,
    last: u64,
}

impl Iterator for Hosts {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let addr = to_addr(self.next);
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last + 1).saturating_sub(self.next);
        let n = usize::try_from(remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}

fn to_addr(raw: u64) -> Ipv4Addr {
    Ipv4Addr::from(u32::try_from(raw).unwrap_or(u32::MAX))
}

/// Four dot-separated groups of one to three digits.
/// Four dot-separated groups of 1-3 digits, each 0-255. Leading zeros are
/// accepted (`010` is 10), unlike `Ipv4Addr::from_str`.
fn parse_octets(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    let [a, b, c, d] = octets;
    Some(Ipv4Addr::new(a, b, c, d))
}
