//! DexScreener response shapes that are not pair records.

use serde::Deserialize;

use crate::domain::coerce::lenient_str;

/// Entry from the token-profiles and token-boosts listings. Both shapes
/// share the fields we care about: the chain and the token address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenListing {
    #[serde(deserialize_with = "lenient_str")]
    pub chain_id: String,
    #[serde(deserialize_with = "lenient_str")]
    pub token_address: String,
    #[serde(deserialize_with = "lenient_str")]
    pub url: String,
    #[serde(deserialize_with = "lenient_str")]
    pub description: String,
}

impl TokenListing {
    pub fn is_on_chain(&self, target_chain: &str) -> bool {
        self.chain_id.eq_ignore_ascii_case(target_chain)
    }
}

/// The listing endpoints have shipped both a bare array and a wrapped
/// `{"data": [...]}` object; accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListingResponse {
    Plain(Vec<TokenListing>),
    Wrapped { data: Vec<TokenListing> },
}

impl ListingResponse {
    pub fn into_vec(self) -> Vec<TokenListing> {
        match self {
            ListingResponse::Plain(items) => items,
            ListingResponse::Wrapped { data } => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_listing_array() {
        let json = r#"[{"chainId": "solana", "tokenAddress": "abc"},
                       {"chainId": "ethereum", "tokenAddress": "0xdef"}]"#;
        let listings = serde_json::from_str::<ListingResponse>(json)
            .unwrap()
            .into_vec();
        assert_eq!(listings.len(), 2);
        assert!(listings[0].is_on_chain("solana"));
        assert!(!listings[1].is_on_chain("solana"));
    }

    #[test]
    fn test_wrapped_listing_object() {
        let json = r#"{"data": [{"chainId": "Solana", "tokenAddress": "abc"}]}"#;
        let listings = serde_json::from_str::<ListingResponse>(json)
            .unwrap()
            .into_vec();
        assert_eq!(listings.len(), 1);
        assert!(listings[0].is_on_chain("solana"));
    }

    #[test]
    fn test_listing_tolerates_missing_fields() {
        let listing: TokenListing = serde_json::from_str("{}").unwrap();
        assert!(listing.token_address.is_empty());
        assert!(!listing.is_on_chain("solana"));
    }
}
