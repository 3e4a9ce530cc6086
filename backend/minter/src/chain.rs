//! Chain minting adapter (Verbwire quick-mint API).

use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::errors::{MinterError, Result};
use crate::http;

/// Provider chain name used when the internal chain id has no mapping.
/// Unknown chains mint on the default rather than failing — deliberate
/// leniency, kept from the original contract.
pub const DEFAULT_PROVIDER_CHAIN: &str = "polygon-amoy";

/// Map an internal chain id to the minting provider's naming scheme.
pub fn provider_chain_name(chain: &str) -> &'static str {
    match chain {
        "polygon-amoy" => "polygon-amoy",
        "ethereum-sepolia" => "sepolia",
        "base-sepolia" => "base-sepolia",
        _ => DEFAULT_PROVIDER_CHAIN,
    }
}

/// Native currency of a supported chain, used as the default listing
/// currency. Unknown chains follow the default chain.
pub fn native_currency(chain: &str) -> &'static str {
    match chain {
        "ethereum-sepolia" | "base-sepolia" => "ETH",
        _ => "MATIC",
    }
}

/// On-chain identifiers returned by a successful mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    pub token_id: String,
    pub contract_address: String,
    pub tx_hash: String,
}

/// Submit a mint transaction for a pinned metadata document.
///
/// Fatal on failure: the orchestrator marks the asset `failed`.
pub async fn submit_mint(
    client: &Client,
    config: &Config,
    recipient: &str,
    metadata_uri: &str,
    name: &str,
    description: &str,
    chain: &str,
) -> Result<MintOutcome> {
    let provider_chain = provider_chain_name(chain);
    info!("Submitting mint on chain {provider_chain} for recipient {recipient}");

    let payload = json!({
        "recipientAddress": recipient,
        "metadataUrl": metadata_uri,
        "name": name,
        "description": description,
        "chain": provider_chain,
    });

    let url = format!(
        "{}/v1/nft/mint/quickMintFromMetadataUrl",
        config.verbwire_api_url
    );
    let response = http::post_json(
        client,
        &url,
        &[("X-API-Key", config.verbwire_api_key.as_str())],
        &payload,
    )
    .await
    .map_err(|e| MinterError::Mint(format!("mint submission failed: {e}")))?;

    parse_mint_outcome(&response)
        .ok_or_else(|| MinterError::Mint("mint response missing on-chain identifiers".to_string()))
}

/// Decode a mint response. The provider has shipped both snake_case and
/// camelCase field names; all three identifiers are required.
pub fn parse_mint_outcome(response: &Value) -> Option<MintOutcome> {
    Some(MintOutcome {
        token_id: string_field(response, &["token_id", "tokenId"])?,
        contract_address: string_field(response, &["contract_address", "contractAddress"])?,
        tx_hash: string_field(response, &["transaction_hash", "transactionHash"])?,
    })
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
            return Some(s.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chain_mapping_table() {
        assert_eq!(provider_chain_name("polygon-amoy"), "polygon-amoy");
        assert_eq!(provider_chain_name("ethereum-sepolia"), "sepolia");
        assert_eq!(provider_chain_name("base-sepolia"), "base-sepolia");
    }

    #[test]
    fn unknown_chain_falls_back_to_default() {
        assert_eq!(provider_chain_name("solana-devnet"), DEFAULT_PROVIDER_CHAIN);
        assert_eq!(provider_chain_name(""), DEFAULT_PROVIDER_CHAIN);
    }

    #[test]
    fn native_currency_table() {
        assert_eq!(native_currency("polygon-amoy"), "MATIC");
        assert_eq!(native_currency("ethereum-sepolia"), "ETH");
        assert_eq!(native_currency("base-sepolia"), "ETH");
        assert_eq!(native_currency("somewhere-else"), "MATIC");
    }

    #[test]
    fn parse_mint_outcome_snake_case() {
        let response = json!({
            "token_id": "42",
            "contract_address": "0xabc",
            "transaction_hash": "0xdef"
        });
        let outcome = parse_mint_outcome(&response).unwrap();
        assert_eq!(outcome.token_id, "42");
        assert_eq!(outcome.contract_address, "0xabc");
        assert_eq!(outcome.tx_hash, "0xdef");
    }

    #[test]
    fn parse_mint_outcome_camel_case() {
        let response = json!({
            "tokenId": "7",
            "contractAddress": "0x111",
            "transactionHash": "0x222"
        });
        let outcome = parse_mint_outcome(&response).unwrap();
        assert_eq!(outcome.token_id, "7");
        assert_eq!(outcome.tx_hash, "0x222");
    }

    #[test]
    fn parse_mint_outcome_missing_identifier() {
        let response = json!({ "token_id": "42", "contract_address": "0xabc" });
        assert!(parse_mint_outcome(&response).is_none());
    }
}
