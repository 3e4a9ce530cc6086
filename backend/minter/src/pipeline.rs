//! Minting orchestrator — sequences generation, registration, pinning, and
//! mint submission, and owns every status write for the asset it creates.
//!
//! Phases and their failure consequences:
//!
//! 1. validation and generation — nothing persisted, errors surface as-is;
//! 2. registration — the asset row is created with status `minting`;
//! 3. pinning and mint submission — failures mark the row `failed`
//!    (best-effort) before surfacing;
//! 4. finalization — a failed write after a successful mint is surfaced but
//!    the status is left as last written, since the mint is irreversible.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::assets::{self, AssetDraft, AssetPatch, AssetStatus, NftMetadata};
use crate::chain::{self, MintOutcome};
use crate::config::Config;
use crate::db;
use crate::errors::{MinterError, Result};
use crate::generate;
use crate::storage;

/// One trigger invocation. Context is explicit — the pipeline never reads
/// ambient session state.
#[derive(Debug, Clone, Deserialize)]
pub struct MintRequest {
    pub prompt: String,
    pub chain: String,
    pub wallet_address: String,
    pub user_id: String,
}

/// Success payload: every chain and storage field populated.
#[derive(Debug, Clone, Serialize)]
pub struct MintReceipt {
    pub asset_id: String,
    pub ipfs_image_uri: String,
    pub ipfs_metadata_uri: String,
    pub token_id: String,
    pub contract_address: String,
    pub tx_hash: String,
    pub chain: String,
}

/// A terminal pipeline failure. `asset_id` tells the caller whether a row
/// was created and can be inspected later.
#[derive(Debug)]
pub struct PipelineFailure {
    pub asset_id: Option<String>,
    pub error: MinterError,
}

/// Execute one end-to-end pipeline run.
pub async fn run(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    request: MintRequest,
) -> std::result::Result<MintReceipt, PipelineFailure> {
    if let Err(error) = validate(&request) {
        return Err(PipelineFailure {
            asset_id: None,
            error,
        });
    }

    info!("Starting mint pipeline for prompt: {}", request.prompt);

    // Phase 1: generation. No record exists yet, so failures surface with
    // asset_id = None.
    let image_url = generate::generate_image(client, config, &request.prompt)
        .await
        .map_err(|error| PipelineFailure {
            asset_id: None,
            error,
        })?;

    // Metadata first, then price — the estimator consumes the synthesized
    // metadata. Both complete (degraded or not) before registration.
    let metadata = generate::generate_metadata(client, config, &request.prompt)
        .await
        .map_err(|error| PipelineFailure {
            asset_id: None,
            error,
        })?;
    let price = generate::estimate_price(client, config, &metadata).await;

    // Phase 2: registration. The single insert of this run.
    let draft = AssetDraft {
        owner_id: request.user_id.clone(),
        owner_address: request.wallet_address.clone(),
        prompt: request.prompt.clone(),
        chain: request.chain.clone(),
        name: metadata.name.clone(),
        description: metadata.description.clone(),
        attributes: metadata.attributes.clone(),
        ai_image_url: image_url.clone(),
    };
    let asset_id = db::insert_asset(pool, &draft)
        .await
        .map_err(|error| PipelineFailure {
            asset_id: None,
            error,
        })?;
    info!("Asset {asset_id} registered, status=minting");

    // Phase 3: pin to IPFS and submit the mint.
    let (image_uri, metadata_uri, outcome) =
        match upload_and_mint(client, config, &request, &metadata, &image_url).await {
            Ok(staged) => staged,
            Err(error) => {
                mark_failed(pool, &asset_id).await;
                return Err(PipelineFailure {
                    asset_id: Some(asset_id),
                    error,
                });
            }
        };

    // Phase 4: finalize. The mint already happened and cannot be rolled
    // back, so a failed write here leaves the status as last written.
    let patch = AssetPatch {
        ipfs_image_uri: Some(image_uri.clone()),
        ipfs_metadata_uri: Some(metadata_uri.clone()),
        token_id: Some(outcome.token_id.clone()),
        contract_address: Some(outcome.contract_address.clone()),
        tx_hash: Some(outcome.tx_hash.clone()),
        price_suggestion: Some(price),
        status: Some(AssetStatus::Minted),
    };
    if let Err(error) = db::update_asset(pool, &asset_id, &patch).await {
        error!("Asset {asset_id} minted on-chain but the finalizing write failed: {error}");
        return Err(PipelineFailure {
            asset_id: Some(asset_id),
            error,
        });
    }

    info!(
        "Asset {asset_id} minted: token {} on {}",
        outcome.token_id, request.chain
    );

    Ok(MintReceipt {
        asset_id,
        ipfs_image_uri: image_uri,
        ipfs_metadata_uri: metadata_uri,
        token_id: outcome.token_id,
        contract_address: outcome.contract_address,
        tx_hash: outcome.tx_hash,
        chain: request.chain,
    })
}

/// Pin the image, pin the document embedding its locator, then submit the
/// mint. The image upload strictly precedes the metadata upload — the
/// document cannot be built without the image locator.
async fn upload_and_mint(
    client: &Client,
    config: &Config,
    request: &MintRequest,
    metadata: &NftMetadata,
    image_url: &str,
) -> Result<(String, String, MintOutcome)> {
    let file_name = assets::image_file_name(&metadata.name);
    let image_uri = storage::upload_image(client, config, image_url, &file_name).await?;

    let document: Value = assets::metadata_document(metadata, &image_uri);
    let metadata_uri = storage::upload_metadata(client, config, &document).await?;

    let outcome = chain::submit_mint(
        client,
        config,
        &request.wallet_address,
        &metadata_uri,
        &metadata.name,
        &metadata.description,
        &request.chain,
    )
    .await?;

    Ok((image_uri, metadata_uri, outcome))
}

/// Best-effort failure marking. If even this write fails, the original
/// pipeline error is still what the caller sees; the stuck `minting` row is
/// logged, not hidden.
async fn mark_failed(pool: &SqlitePool, asset_id: &str) {
    let patch = AssetPatch {
        status: Some(AssetStatus::Failed),
        ..Default::default()
    };
    if let Err(e) = db::update_asset(pool, asset_id, &patch).await {
        error!("Failed to mark asset {asset_id} as failed: {e}");
    }
}

fn validate(request: &MintRequest) -> Result<()> {
    if request.prompt.trim().is_empty() {
        return Err(MinterError::Validation("prompt must not be empty".to_string()));
    }
    if request.wallet_address.trim().is_empty() {
        return Err(MinterError::Validation(
            "wallet_address must not be empty".to_string(),
        ));
    }
    if request.user_id.trim().is_empty() {
        return Err(MinterError::Validation("user_id must not be empty".to_string()));
    }
    if request.chain.trim().is_empty() {
        return Err(MinterError::Validation("chain must not be empty".to_string()));
    }
    Ok(())
}
