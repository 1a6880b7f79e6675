//! Fixed-width address prefixes and their textual form.
//!
//! An [`AddressPrefix`] is a 128-bit address plus a count of significant
//! leading bits. The trie consumes it one bit at a time, most significant
//! bit first, through [`AddressPrefix::pop_bit`].

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Width of the address space in bits
pub const ADDRESS_BITS: u8 = 128;

const HIGHEST_BIT: u128 = 1 << 127;

/// Errors produced while parsing prefixes and table entries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    #[error("missing '/' separator in '{input}'")]
    MissingSeparator { input: String },

    #[error("invalid address '{input}'")]
    InvalidAddress { input: String },

    #[error("invalid prefix length '{input}'")]
    InvalidLength { input: String },

    #[error("prefix length {length} exceeds 128 bits")]
    LengthOutOfRange { length: u32 },

    #[error("invalid PoP identifier '{input}'")]
    InvalidPop { input: String },

    #[error("expected '<address>/<length> <pop>', got '{input}'")]
    MalformedEntry { input: String },
}

/// A 128-bit address with the number of leading bits that are significant.
///
/// Bits past `length` are not masked and are echoed back unchanged by the
/// `Display` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressPrefix {
    address: u128,
    length: u8,
}

impl AddressPrefix {
    pub fn new(address: u128, length: u8) -> Result<Self, PrefixError> {
        if length > ADDRESS_BITS {
            return Err(PrefixError::LengthOutOfRange { length: length.into() });
        }
        Ok(Self { address, length })
    }

    pub fn from_ipv6(address: Ipv6Addr, length: u8) -> Result<Self, PrefixError> {
        Self::new(u128::from(address), length)
    }

    pub fn address(&self) -> u128 {
        self.address
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn ipv6(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.address)
    }

    /// Take the next significant bit, most significant first.
    ///
    /// Returns `None` once `length` bits have been taken. Each call shortens
    /// the prefix by one and shifts the consumed bit out of the address, so
    /// callers that still need the original must pop from a copy.
    pub fn pop_bit(&mut self) -> Option<usize> {
        if self.length == 0 {
            return None;
        }
        self.length -= 1;
        let bit = usize::from(self.address & HIGHEST_BIT != 0);
        self.address <<= 1;
        Some(bit)
    }

    /// Address as 32 lower-case hex digits
    pub fn to_hex(&self) -> String {
        format!(
            "{:016x}{:016x}",
            (self.address >> 64) as u64,
            self.address as u64
        )
    }
}

impl fmt::Display for AddressPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ipv6(), self.length)
    }
}

impl FromStr for AddressPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (address, length) = s
            .split_once('/')
            .ok_or_else(|| PrefixError::MissingSeparator { input: s.to_string() })?;

        let address: Ipv6Addr = address
            .parse()
            .map_err(|_| PrefixError::InvalidAddress { input: address.to_string() })?;

        let length: u32 = length
            .parse()
            .map_err(|_| PrefixError::InvalidLength { input: length.to_string() })?;
        let length = u8::try_from(length)
            .ok()
            .filter(|l| *l <= ADDRESS_BITS)
            .ok_or(PrefixError::LengthOutOfRange { length })?;

        Self::from_ipv6(address, length)
    }
}

/// One line of the assignment table: a prefix and the PoP serving it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub prefix: AddressPrefix,
    pub pop: u16,
}

/// Match: "<address>/<length> <pop>"
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+/\S+)\s+(\S+)\s*$").expect("Invalid entry regex")
});

/// Parse a table line of the form `<address>/<length> <pop>`.
pub fn parse_entry(line: &str) -> Result<RouteEntry, PrefixError> {
    let caps = ENTRY_PATTERN
        .captures(line)
        .ok_or_else(|| PrefixError::MalformedEntry { input: line.trim().to_string() })?;

    let prefix: AddressPrefix = caps[1].parse()?;
    let pop: u16 = caps[2]
        .parse()
        .map_err(|_| PrefixError::InvalidPop { input: caps[2].to_string() })?;

    Ok(RouteEntry { prefix, pop })
}
