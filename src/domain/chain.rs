//! Chain membership heuristics.
//!
//! The upstream API mixes chains in several responses, and freshly listed
//! pairs often carry incomplete chain metadata, so membership is decided by
//! a chain-id match, a DEX allow-list, or an address-shape check.

use super::pair::Pair;

/// DEX venues that imply the target chain when the chain id is missing.
pub const SOLANA_DEXES: &[&str] = &[
    "raydium", "orca", "serum", "jupiter", "moonshot", "pumpfun", "pump.fun", "bonkswap",
    "aldrin", "meteora",
];

/// Established venues that carry no extra risk weight.
pub const TRUSTED_DEXES: &[&str] = &["raydium", "orca", "jupiter"];

/// High-volume launchpad venues; liquid, but non-traditional.
pub const MAJOR_DEXES: &[&str] = &["pumpfun", "pump.fun", "moonshot"];

/// Well-known addresses accepted regardless of shape.
pub const KNOWN_ADDRESSES: &[&str] = &[
    "So11111111111111111111111111111111111111112",  // WSOL
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", // USDC
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", // USDT
    "11111111111111111111111111111111",             // System Program
];

/// True when `dex_id` contains any entry of `list` (case-insensitive).
pub fn dex_matches(dex_id: &str, list: &[&str]) -> bool {
    let dex_id = dex_id.to_lowercase();
    list.iter().any(|dex| dex_id.contains(dex))
}

/// Address-shape heuristic: a known address, or 32-50 chars of valid
/// base58. Not a proof of chain membership, just a cheap filter.
pub fn is_plausible_address(address: &str) -> bool {
    if address.is_empty() {
        return false;
    }
    if KNOWN_ADDRESSES.contains(&address) {
        return true;
    }
    if !(32..=50).contains(&address.len()) {
        return false;
    }
    bs58::decode(address).into_vec().is_ok()
}

/// Decide whether a pair belongs to the target chain.
pub fn is_target_pair(pair: &Pair, target_chain: &str) -> bool {
    if pair.chain_id.eq_ignore_ascii_case(target_chain) {
        return true;
    }
    if dex_matches(&pair.dex_id, SOLANA_DEXES) {
        return true;
    }
    is_plausible_address(&pair.base_token.address) || is_plausible_address(&pair.quote_token.address)
}
