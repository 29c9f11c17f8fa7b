//! Description of the generic type `Prefix`, the bit-level view of an address family.

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnet::{Ipv4Net, Ipv6Net};
use num_traits::{CheckedShr, PrimInt, Unsigned, Zero};

use crate::error::{Error, Result};

/// Trait for defining prefixes of an address family.
///
/// The trie only ever looks at a prefix through this trait: it walks the bits of [`Self::repr`]
/// from the left, one per level, until [`Self::prefix_len`] bits are consumed. Results are turned
/// back into prefixes with [`Self::from_repr_len`] and into text with [`Self::canonical`].
pub trait Prefix: Sized {
    /// How can the prefix be represented. This must be one of `u8`, `u16`, `u32`, `u64`, or `u128`.
    type R: Unsigned + PrimInt + Zero + CheckedShr;

    /// Get raw representation of the address, ignoring the prefix length. Host bits may be set.
    fn repr(&self) -> Self::R;

    /// Prefix length
    fn prefix_len(&self) -> u8;

    /// Create a new prefix from the representation and the prefix length.
    fn from_repr_len(repr: Self::R, len: u8) -> Self;

    /// Parse a prefix of the form `addr/len` or `addr`. A missing length means a host prefix,
    /// i.e., [`Self::max_len`] bits.
    fn parse_prefix(s: &str) -> Result<Self>;

    /// Canonical text of the prefix (`addr/len`), built only from the masked address and the
    /// prefix length.
    fn canonical(&self) -> String;

    /// Number of bits of an address in this family.
    fn max_len() -> u8 {
        Self::R::zero().count_zeros() as u8
    }

    /// mask `self.repr()` using `self.len()`. If you can guarantee that `repr` is already masked,
    /// them simply re-implement this function for your type.
    fn mask(&self) -> Self::R {
        self.repr() & mask_from_prefix_len(self.prefix_len())
    }

    /// Create a prefix that matches everything
    fn zero() -> Self {
        Self::from_repr_len(Self::R::zero(), 0)
    }

    /// Check if `self` contains `other` in its prefix range. This function also returns `True` if
    /// `self` is identical to `other`.
    fn contains(&self, other: &Self) -> bool {
        if self.prefix_len() > other.prefix_len() {
            return false;
        }
        other.repr() & mask_from_prefix_len(self.prefix_len()) == self.mask()
    }

    /// Check if a specific bit is set (counted from the left, where 0 is the first bit from the
    /// left). Bits beyond the prefix length are never set.
    fn is_bit_set(&self, bit: u8) -> bool {
        single_bit::<Self::R>(bit) & self.mask() != Self::R::zero()
    }
}

pub(crate) fn mask_from_prefix_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 == R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

/// The representation that has only bit `bit` set (counted from the left). Zero if `bit` is out
/// of range.
pub(crate) fn single_bit<R>(bit: u8) -> R
where
    R: PrimInt + Zero + CheckedShr,
{
    (!R::zero())
        .checked_shr(bit as u32)
        .unwrap_or_else(R::zero)
        ^ (!R::zero())
            .checked_shr(1u32 + bit as u32)
            .unwrap_or_else(R::zero)
}

/// Split `addr/len` into its address text and length. Without a `/`, the length is `max_len`.
fn split_prefix(input: &str, max_len: u8) -> Result<(&str, u8)> {
    let Some((addr, len)) = input.split_once('/') else {
        return Ok((input, max_len));
    };
    let len: u8 = len
        .parse()
        .map_err(|e| Error::malformed(input, format!("invalid prefix length: {e}")))?;
    if len > max_len {
        return Err(Error::malformed(
            input,
            format!("prefix length {len} exceeds {max_len} bits"),
        ));
    }
    Ok((addr, len))
}

impl Prefix for Ipv4Net {
    type R = u32;

    fn repr(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        Ipv4Net::new(repr.into(), len.min(32)).unwrap_or_default()
    }

    fn parse_prefix(s: &str) -> Result<Self> {
        let (addr, len) = split_prefix(s, 32)?;
        let addr: Ipv4Addr = addr.parse().map_err(|e| Error::malformed(s, e))?;
        Ipv4Net::new(addr, len).map_err(|e| Error::malformed(s, e))
    }

    fn canonical(&self) -> String {
        format!("{}/{}", self.network(), self.prefix_len())
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }

    fn zero() -> Self {
        Default::default()
    }
}

impl Prefix for Ipv6Net {
    type R = u128;

    fn repr(&self) -> u128 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u128, len: u8) -> Self {
        Ipv6Net::new(repr.into(), len.min(128)).unwrap_or_default()
    }

    fn parse_prefix(s: &str) -> Result<Self> {
        let (addr, len) = split_prefix(s, 128)?;
        let addr: Ipv6Addr = addr.parse().map_err(|e| Error::malformed(s, e))?;
        Ipv6Net::new(addr, len).map_err(|e| Error::malformed(s, e))
    }

    fn canonical(&self) -> String {
        format!("{}/{}", format_ipv6(&self.network()), self.prefix_len())
    }

    fn mask(&self) -> u128 {
        self.network().into()
    }

    fn zero() -> Self {
        Default::default()
    }
}

/// Colon-hex text of an IPv6 address. The longest run of at least two zero groups (the first one
/// on ties) becomes `::`. Without such a run, a single trailing zero group is dropped as `::`.
fn format_ipv6(addr: &Ipv6Addr) -> String {
    let groups = addr.segments();

    let (mut start, mut len) = (0, 0);
    let mut run_start = 0;
    for (i, group) in groups.iter().enumerate() {
        if *group != 0 {
            run_start = i + 1;
        } else if i + 1 - run_start > len {
            start = run_start;
            len = i + 1 - run_start;
        }
    }
    if len < 2 {
        (start, len) = if groups[7] == 0 { (7, 1) } else { (0, 0) };
    }

    let hex = |groups: &[u16]| {
        groups
            .iter()
            .map(|g| format!("{g:x}"))
            .collect::<Vec<_>>()
            .join(":")
    };
    if len == 0 {
        hex(&groups)
    } else {
        format!("{}::{}", hex(&groups[..start]), hex(&groups[start + len..]))
    }
}
