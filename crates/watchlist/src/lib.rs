//! The set of addresses this run of the indexer cares about.
//!
//! Lowercasing happens exactly once, here, at construction. Every other
//! address this process sees is lowercased the moment it's read off an RPC
//! DTO (see `baseidx-connector`); `Watchlist::contains` never re-lowercases
//! its argument, so a caller that forgets the chokepoint will simply miss a
//! match rather than silently paying for a redundant allocation on every
//! lookup.

use std::collections::HashSet;

/// An immutable, lowercase-normalised set of account addresses.
#[derive(Debug, Clone)]
pub struct Watchlist {
    addresses: HashSet<String>,
}

impl Watchlist {
    /// Builds a watchlist from a configured address list, lowercasing each entry.
    pub fn new<I, S>(addresses: I) -> Watchlist
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Watchlist {
            addresses: addresses
                .into_iter()
                .map(|a| a.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// `true` if `address` (assumed already lowercase) is being watched.
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
