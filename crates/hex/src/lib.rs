//! `0x`-prefixed big-integer codec used throughout the indexer.
//!
//! Block heights, timestamps, gas fields and transfer values all arrive from
//! the upstream JSON-RPC node as `0x`-prefixed hex strings of unbounded size.
//! [`Hex`] gives them a single lossless representation; callers convert to a
//! narrower type ([`i64`], [`u64`], [`BigDecimal`]) only at the point of use.
//!
//! Addresses never go through this type — see the crate-level warning in the
//! project's top-level design notes. They are opaque lowercase strings.

use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use thiserror::Error;

/// A non-negative arbitrary-precision integer parsed from a `0x`-prefixed hex string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hex(BigUint);

/// Failure modes for [`Hex`] parsing and narrowing conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex string: {0:?}")]
    InvalidHex(String),
    #[error("value {0} does not fit in i64")]
    NotAnI64(String),
    #[error("value {0} does not fit in u64")]
    NotAnU64(String),
}

impl Hex {
    /// Parses a hex string with or without the `0x` prefix.
    ///
    /// `""`, `"0x"`, and strings containing non-hex-digit characters after
    /// stripping the prefix all produce [`HexError::InvalidHex`].
    pub fn parse(s: &str) -> Result<Hex, HexError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() {
            return Err(HexError::InvalidHex(s.to_string()));
        }
        BigUint::parse_bytes(digits.as_bytes(), 16)
            .map(Hex)
            .ok_or_else(|| HexError::InvalidHex(s.to_string()))
    }

    /// Builds a [`Hex`] directly from a `u64`, e.g. for constructing RPC params.
    pub fn from_u64(n: u64) -> Hex {
        Hex(BigUint::from(n))
    }

    /// Narrows to `i64`. Block timestamps are seconds-since-epoch and always fit.
    pub fn as_i64(&self) -> Result<i64, HexError> {
        self.0.to_i64().ok_or_else(|| HexError::NotAnI64(self.to_string()))
    }

    /// Narrows to `u64`. Block heights always fit.
    pub fn as_u64(&self) -> Result<u64, HexError> {
        self.0.to_u64().ok_or_else(|| HexError::NotAnU64(self.to_string()))
    }

    /// Converts to an exact, arbitrary-precision decimal — the representation
    /// used for wei values and fees, where double-conversion through a float
    /// or a fixed-width integer would lose precision.
    pub fn as_decimal(&self) -> BigDecimal {
        BigDecimal::from(num_bigint::BigInt::from(self.0.clone()))
    }
}

impl fmt::Display for Hex {
    /// Canonical textual form: `0x` + lowercase base-16, no leading zeros
    /// (beyond the single `0` for the zero value). Do not use this to render
    /// 20-byte addresses; it does not preserve width.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_str_radix(16))
    }
}

/// Returns `true` when a raw trace/transaction value field means "no transfer
/// happened", *before* attempting to [`Hex::parse`] it — `parse("0x")` is
/// itself an error, so this check must run first.
pub fn is_zero_value_literal(raw: &str) -> bool {
    matches!(raw, "" | "0x" | "0x0")
}
