//! IPFS pinning adapter (Verbwire-style storage API).
//!
//! Two independent calls: pin the image first, then pin the metadata
//! document that embeds the returned image locator. The orchestrator owns
//! that ordering; this module just performs the uploads.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::errors::{MinterError, Result};
use crate::http;

/// Pin the generated image.
///
/// `source` is whatever the image service returned — a fetchable URL or an
/// inline data URI; the provider resolves either. Returns the stable
/// content-addressed locator.
pub async fn upload_image(
    client: &Client,
    config: &Config,
    source: &str,
    file_name: &str,
) -> Result<String> {
    let payload = json!({
        "filePath": source,
        "fileName": file_name,
    });

    let response = post_verbwire(client, config, "/v1/nft/store/file", &payload)
        .await
        .map_err(|e| MinterError::Upload(format!("image upload failed: {e}")))?;

    let locator = extract_locator(&response)
        .ok_or_else(|| MinterError::Upload("no IPFS locator in image response".to_string()))?;
    info!("Image pinned to IPFS: {locator}");
    Ok(locator)
}

/// Pin the metadata document. The document must already embed the image
/// locator (see [`crate::assets::metadata_document`]).
pub async fn upload_metadata(client: &Client, config: &Config, document: &Value) -> Result<String> {
    let response = post_verbwire(client, config, "/v1/nft/store/metadata", document)
        .await
        .map_err(|e| MinterError::Upload(format!("metadata upload failed: {e}")))?;

    let locator = extract_locator(&response)
        .ok_or_else(|| MinterError::Upload("no IPFS locator in metadata response".to_string()))?;
    info!("Metadata pinned to IPFS: {locator}");
    Ok(locator)
}

/// The provider reports the locator either nested under `ipfs_storage` or at
/// the top level, depending on endpoint version.
pub fn extract_locator(response: &Value) -> Option<String> {
    response
        .get("ipfs_storage")
        .and_then(|s| s.get("ipfs_url"))
        .or_else(|| response.get("ipfs_url"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

async fn post_verbwire(
    client: &Client,
    config: &Config,
    path: &str,
    payload: &Value,
) -> std::result::Result<Value, http::CallError> {
    let url = format!("{}{path}", config.verbwire_api_url);
    http::post_json(
        client,
        &url,
        &[("X-API-Key", config.verbwire_api_key.as_str())],
        payload,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_locator_nested_shape() {
        let response = json!({
            "ipfs_storage": { "ipfs_url": "ipfs://bafy-image", "file_name": "a.webp" }
        });
        assert_eq!(extract_locator(&response).unwrap(), "ipfs://bafy-image");
    }

    #[test]
    fn extract_locator_flat_shape() {
        let response = json!({ "ipfs_url": "ipfs://bafy-meta" });
        assert_eq!(extract_locator(&response).unwrap(), "ipfs://bafy-meta");
    }

    #[test]
    fn extract_locator_missing() {
        assert!(extract_locator(&json!({ "status": "pinned" })).is_none());
    }
}
