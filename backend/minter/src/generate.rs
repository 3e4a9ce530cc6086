//! Generative adapters — image, metadata, and price synthesis against an
//! OpenAI-compatible API.
//!
//! Failure semantics differ per call:
//!
//! * image generation is fatal for the pipeline (no asset row exists yet),
//! * metadata synthesis falls back to a deterministic object when the
//!   assistant content is malformed, but an unreachable API is fatal,
//! * price estimation never fails — any problem yields the fixed fallback.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::assets::{NftMetadata, PriceSuggestion};
use crate::config::Config;
use crate::errors::{MinterError, Result};
use crate::http;

const IMAGE_MODEL: &str = "gpt-image-1";
const METADATA_MODEL: &str = "gpt-4.1-2025-04-14";
const PRICE_MODEL: &str = "gpt-4.1-mini-2025-04-14";

/// Appended to every user prompt before image generation.
const IMAGE_PROMPT_SUFFIX: &str =
    "high quality digital art, vibrant colors, detailed, ultra high resolution";

const METADATA_SYSTEM_PROMPT: &str = r#"You are an expert NFT metadata generator. Create compelling NFT metadata based on the user's prompt. Return ONLY a valid JSON object with the following structure:
{
  "name": "Creative NFT Title (max 50 chars)",
  "description": "Detailed description (max 200 chars)",
  "attributes": [
    {"trait_type": "Style", "value": "..."},
    {"trait_type": "Color Palette", "value": "..."},
    {"trait_type": "Mood", "value": "..."},
    {"trait_type": "Rarity", "value": "Common|Rare|Epic|Legendary"},
    {"trait_type": "Theme", "value": "..."}
  ]
}

Make it creative and engaging for NFT collectors. The name should be catchy and the description should be detailed but concise."#;

const PRICE_SYSTEM_PROMPT: &str = r#"You are an NFT pricing expert. Analyze the metadata and suggest pricing in MATIC for Polygon network. Return ONLY a JSON object:
{
  "min": 0.01,
  "mid": 0.05,
  "max": 0.1,
  "currency": "MATIC"
}
Base prices on rarity, style, and theme. Common: 0.01-0.05, Rare: 0.05-0.2, Epic: 0.2-0.5, Legendary: 0.5-2.0"#;

/// Generate an image from the prompt.
///
/// Returns the image reference: either a fetchable URL or a
/// `data:image/webp;base64,…` URI when the provider inlines the bytes.
pub async fn generate_image(client: &Client, config: &Config, prompt: &str) -> Result<String> {
    let payload = json!({
        "model": IMAGE_MODEL,
        "prompt": format!("{prompt}, {IMAGE_PROMPT_SUFFIX}"),
        "n": 1,
        "size": "1024x1024",
        "quality": "high",
        "output_format": "webp",
    });

    let response = post_openai(client, config, "/v1/images/generations", &payload)
        .await
        .map_err(|e| MinterError::Generation(format!("image generation failed: {e}")))?;

    extract_image_url(&response)
        .ok_or_else(|| MinterError::Generation("no image in generation response".to_string()))
}

/// Pull the image reference out of an images-API response. The model returns
/// base64 data directly or, for some providers, a hosted URL.
pub fn extract_image_url(response: &Value) -> Option<String> {
    let first = response.get("data")?.as_array()?.first()?;
    if let Some(b64) = first.get("b64_json").and_then(|v| v.as_str()) {
        return Some(format!("data:image/webp;base64,{b64}"));
    }
    first
        .get("url")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Synthesize name/description/attributes for the prompt.
///
/// An unreachable API is surfaced as [`MinterError::Generation`]; malformed
/// assistant content is replaced by [`NftMetadata::fallback`] and never
/// aborts the pipeline.
pub async fn generate_metadata(
    client: &Client,
    config: &Config,
    prompt: &str,
) -> Result<NftMetadata> {
    let user = format!("Generate NFT metadata for this prompt: \"{prompt}\"");
    let response = chat(client, config, METADATA_MODEL, 500, METADATA_SYSTEM_PROMPT, &user)
        .await
        .map_err(|e| MinterError::Generation(format!("metadata generation failed: {e}")))?;

    match chat_content(&response) {
        Some(content) => Ok(parse_metadata_content(content, prompt)),
        None => {
            warn!("Metadata response had no assistant content, using fallback");
            Ok(NftMetadata::fallback(prompt))
        }
    }
}

/// Decode assistant content into typed metadata, falling back on any
/// malformation.
pub fn parse_metadata_content(content: &str, prompt: &str) -> NftMetadata {
    match serde_json::from_str::<NftMetadata>(content) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Failed to parse metadata JSON ({e}), using fallback");
            NftMetadata::fallback(prompt)
        }
    }
}

/// Suggest a price range for the synthesized metadata.
///
/// Never fails: transport errors, malformed content, and suggestions that
/// violate min ≤ mid ≤ max all yield [`PriceSuggestion::fallback`].
pub async fn estimate_price(
    client: &Client,
    config: &Config,
    metadata: &NftMetadata,
) -> PriceSuggestion {
    let serialized = match serde_json::to_string(metadata) {
        Ok(s) => s,
        Err(_) => return PriceSuggestion::fallback(),
    };
    let user = format!("Price this NFT: {serialized}");

    match chat(client, config, PRICE_MODEL, 200, PRICE_SYSTEM_PROMPT, &user).await {
        Ok(response) => chat_content(&response)
            .and_then(parse_price_content)
            .unwrap_or_else(|| {
                info!("Using fallback price suggestion");
                PriceSuggestion::fallback()
            }),
        Err(e) => {
            warn!("Price estimation failed ({e}), using fallback");
            PriceSuggestion::fallback()
        }
    }
}

/// Decode assistant content into a price suggestion, rejecting anything that
/// breaks the ordering invariant.
pub fn parse_price_content(content: &str) -> Option<PriceSuggestion> {
    let price: PriceSuggestion = serde_json::from_str(content).ok()?;
    if price.is_ordered() {
        Some(price)
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────
// Chat plumbing
// ─────────────────────────────────────────────────────────

async fn chat(
    client: &Client,
    config: &Config,
    model: &str,
    max_completion_tokens: u32,
    system: &str,
    user: &str,
) -> std::result::Result<Value, http::CallError> {
    let payload = json!({
        "model": model,
        "max_completion_tokens": max_completion_tokens,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
    });
    post_openai(client, config, "/v1/chat/completions", &payload).await
}

async fn post_openai(
    client: &Client,
    config: &Config,
    path: &str,
    payload: &Value,
) -> std::result::Result<Value, http::CallError> {
    let url = format!("{}{path}", config.openai_api_url);
    let auth = format!("Bearer {}", config.openai_api_key);
    http::post_json(client, &url, &[("Authorization", auth.as_str())], payload).await
}

fn chat_content(response: &Value) -> Option<&str> {
    response
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_image_url_prefers_inline_bytes() {
        let response = json!({
            "data": [{ "b64_json": "aGVsbG8=", "url": "https://img.example/a.webp" }]
        });
        assert_eq!(
            extract_image_url(&response).unwrap(),
            "data:image/webp;base64,aGVsbG8="
        );
    }

    #[test]
    fn extract_image_url_falls_back_to_hosted_url() {
        let response = json!({ "data": [{ "url": "https://img.example/a.webp" }] });
        assert_eq!(
            extract_image_url(&response).unwrap(),
            "https://img.example/a.webp"
        );
    }

    #[test]
    fn extract_image_url_rejects_empty_response() {
        assert!(extract_image_url(&json!({ "data": [] })).is_none());
        assert!(extract_image_url(&json!({ "error": "quota" })).is_none());
    }

    #[test]
    fn parse_metadata_valid_content() {
        let content = r#"{
            "name": "Neon City Dreams",
            "description": "A cyberpunk skyline",
            "attributes": [
                {"trait_type": "Style", "value": "Cyberpunk"},
                {"trait_type": "Rarity", "value": "Rare"}
            ]
        }"#;
        let meta = parse_metadata_content(content, "neon city");
        assert_eq!(meta.name, "Neon City Dreams");
        assert_eq!(meta.attributes.len(), 2);
        assert_eq!(meta.attributes[1].value, "Rare");
    }

    #[test]
    fn parse_metadata_malformed_content_falls_back() {
        let meta = parse_metadata_content("Sure! Here is your metadata: {...", "neon city");
        assert_eq!(meta.name, "AI Generated Art");
        assert!(meta.description.contains("neon city"));
        assert_eq!(meta.attributes.len(), 3);
    }

    #[test]
    fn parse_metadata_wrong_shape_falls_back() {
        let meta = parse_metadata_content(r#"{"title": "nope"}"#, "neon city");
        assert_eq!(meta.name, "AI Generated Art");
    }

    #[test]
    fn parse_price_valid_content() {
        let price =
            parse_price_content(r#"{"min": 0.05, "mid": 0.1, "max": 0.3, "currency": "MATIC"}"#)
                .unwrap();
        assert_eq!(price.min, 0.05);
        assert_eq!(price.max, 0.3);
    }

    #[test]
    fn parse_price_malformed_content() {
        assert!(parse_price_content("around 0.1 MATIC").is_none());
    }

    #[test]
    fn parse_price_rejects_unordered_range() {
        let content = r#"{"min": 0.5, "mid": 0.1, "max": 1.0, "currency": "MATIC"}"#;
        assert!(parse_price_content(content).is_none());
    }

    #[test]
    fn chat_content_extraction() {
        let response = json!({
            "choices": [{ "message": { "content": "hello" } }]
        });
        assert_eq!(chat_content(&response), Some("hello"));
        assert_eq!(chat_content(&json!({ "choices": [] })), None);
    }
}
