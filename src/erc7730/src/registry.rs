//! Well-known token addresses
//!
//! A fixed table of canonical Ethereum mainnet tokens. Address fields that
//! point at one of these are shown by name instead of as shortened hex, and
//! amount fields that reference one through `params.tokenPath` use its real
//! decimals.
//!
//! # Example
//!
//! ```rust,ignore
//! use clearsign_erc7730::registry::KnownTokens;
//!
//! let usdc = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse()?;
//! assert_eq!(KnownTokens::lookup(&usdc).map(|t| t.name), Some("USDC Token"));
//! ```

use alloy_primitives::Address;

/// Display metadata for a well-known token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownToken {
    /// Name shown in place of the address (e.g., "USDC Token")
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

// Keyed by lowercase 0x-prefixed hex
static KNOWN_TOKENS: phf::Map<&'static str, KnownToken> = phf::phf_map! {
    "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48" => KnownToken { name: "USDC Token", symbol: "USDC", decimals: 6 },
    "0xdac17f958d2ee523a2206206994597c13d831ec7" => KnownToken { name: "USDT Token", symbol: "USDT", decimals: 6 },
    "0x6b175474e89094c44da98b954eedeac495271d0f" => KnownToken { name: "DAI Token", symbol: "DAI", decimals: 18 },
    "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2" => KnownToken { name: "WETH Token", symbol: "WETH", decimals: 18 },
};

/// Lookup facade over the static token table
pub struct KnownTokens;

impl KnownTokens {
    pub fn lookup(address: &Address) -> Option<&'static KnownToken> {
        KNOWN_TOKENS.get(format!("0x{}", hex::encode(address)).as_str())
    }

    /// Human name for `address`, if it is a known token
    pub fn name(address: &Address) -> Option<&'static str> {
        Self::lookup(address).map(|t| t.name)
    }

    pub fn decimals(address: &Address) -> Option<u8> {
        Self::lookup(address).map(|t| t.decimals)
    }

    /// Iterates over every `(address, token)` entry
    pub fn all() -> impl Iterator<Item = (Address, &'static KnownToken)> {
        KNOWN_TOKENS
            .entries()
            .filter_map(|(addr, token)| addr.parse().ok().map(|a| (a, token)))
    }
}
