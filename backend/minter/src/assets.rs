//! Core asset types: lifecycle status, synthesized metadata, price
//! suggestions, and the database record shapes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::types::Json;

/// Lifecycle status of an asset.
///
/// `Generating` covers the pre-registration phase only — a persisted row is
/// born `Minting` and ends as either `Minted` or `Failed`. `Failed` is
/// terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Generating,
    Minting,
    Minted,
    Failed,
}

impl AssetStatus {
    /// Identifier string stored in the database `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Minting => "minting",
            Self::Minted => "minted",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "generating" => Some(Self::Generating),
            "minting" => Some(Self::Minting),
            "minted" => Some(Self::Minted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A single display trait on an asset. Order within the list is
/// display-relevant and preserved as synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

impl Attribute {
    pub fn new(trait_type: &str, value: &str) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.to_string(),
        }
    }
}

/// Synthesized descriptive metadata for an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl NftMetadata {
    /// Deterministic substitute used when the synthesizer returns malformed
    /// output. Malformed upstream output is expected and must degrade
    /// gracefully rather than abort the pipeline.
    pub fn fallback(prompt: &str) -> Self {
        Self {
            name: "AI Generated Art".to_string(),
            description: format!("Created with AI from the prompt: {prompt}"),
            attributes: vec![
                Attribute::new("Style", "AI Generated"),
                Attribute::new("Rarity", "Common"),
                Attribute::new("Theme", "Digital Art"),
            ],
        }
    }
}

/// Suggested price range for a freshly minted asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
    pub currency: String,
}

impl PriceSuggestion {
    /// Fixed substitute used whenever the estimator is unreachable or
    /// returns malformed output. Price is an enhancement, never a blocker.
    pub fn fallback() -> Self {
        Self {
            min: 0.01,
            mid: 0.05,
            max: 0.1,
            currency: "MATIC".to_string(),
        }
    }

    /// The min ≤ mid ≤ max invariant. Suggestions that violate it are
    /// treated as malformed.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.mid && self.mid <= self.max
    }
}

/// An asset row as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssetRecord {
    pub id: String,
    pub owner_id: String,
    pub owner_address: String,
    pub prompt: String,
    pub chain: String,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Option<Json<Vec<Attribute>>>,
    pub ai_image_url: Option<String>,
    pub ipfs_image_uri: Option<String>,
    pub ipfs_metadata_uri: Option<String>,
    pub token_id: Option<String>,
    pub contract_address: Option<String>,
    pub tx_hash: Option<String>,
    pub price_suggestion: Option<Json<PriceSuggestion>>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Everything known about an asset at registration time (status `minting`).
#[derive(Debug, Clone)]
pub struct AssetDraft {
    pub owner_id: String,
    pub owner_address: String,
    pub prompt: String,
    pub chain: String,
    pub name: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
    pub ai_image_url: String,
}

/// A partial update merged into an existing asset row. `None` fields leave
/// the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct AssetPatch {
    pub ipfs_image_uri: Option<String>,
    pub ipfs_metadata_uri: Option<String>,
    pub token_id: Option<String>,
    pub contract_address: Option<String>,
    pub tx_hash: Option<String>,
    pub price_suggestion: Option<PriceSuggestion>,
    pub status: Option<AssetStatus>,
}

/// A marketplace listing row. Listings only ever reference minted assets.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingRecord {
    pub id: String,
    pub asset_id: String,
    pub seller_id: String,
    pub seller_address: String,
    pub price: f64,
    pub currency: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Build the metadata document pinned to IPFS.
///
/// The exact shape (including the empty `external_url`, `background_color`
/// and `animation_url` fields) is a compatibility contract with downstream
/// consumers and must not change.
pub fn metadata_document(metadata: &NftMetadata, image_uri: &str) -> Value {
    json!({
        "name": metadata.name,
        "description": metadata.description,
        "image": image_uri,
        "attributes": metadata.attributes,
        "external_url": "",
        "background_color": "",
        "animation_url": "",
    })
}

/// Derive the pinned image filename from the asset name: every
/// non-alphanumeric character becomes `_`, with a `.webp` extension.
pub fn image_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{safe}.webp")
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
