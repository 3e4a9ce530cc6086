//! Database layer — migrations, asset registry queries, and listings.
//!
//! The asset registry is the single source of truth for where an asset is in
//! its pipeline: exactly one insert per pipeline run, followed by merge-style
//! updates keyed by the same id.

use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::types::Json;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::assets::{AssetDraft, AssetPatch, AssetRecord, AssetStatus, ListingRecord};
use crate::errors::{MinterError, Result};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Asset registry
// ─────────────────────────────────────────────────────────

/// Register a new asset. Assigns the id and timestamps and persists the row
/// with status `minting`. This is the only insert a pipeline run performs.
pub async fn insert_asset(pool: &SqlitePool, draft: &AssetDraft) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO assets
            (id, owner_id, owner_address, prompt, chain, name, description,
             attributes, ai_image_url, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&id)
    .bind(&draft.owner_id)
    .bind(&draft.owner_address)
    .bind(&draft.prompt)
    .bind(&draft.chain)
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(Json(draft.attributes.clone()))
    .bind(&draft.ai_image_url)
    .bind(AssetStatus::Minting.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Merge a partial update into an existing asset row. `None` fields keep
/// their stored value; `updated_at` is always refreshed.
pub async fn update_asset(pool: &SqlitePool, id: &str, patch: &AssetPatch) -> Result<()> {
    let now = Utc::now().timestamp();

    let rows_affected = sqlx::query(
        r#"
        UPDATE assets SET
            ipfs_image_uri    = COALESCE(?2, ipfs_image_uri),
            ipfs_metadata_uri = COALESCE(?3, ipfs_metadata_uri),
            token_id          = COALESCE(?4, token_id),
            contract_address  = COALESCE(?5, contract_address),
            tx_hash           = COALESCE(?6, tx_hash),
            price_suggestion  = COALESCE(?7, price_suggestion),
            status            = COALESCE(?8, status),
            updated_at        = ?9
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(&patch.ipfs_image_uri)
    .bind(&patch.ipfs_metadata_uri)
    .bind(&patch.token_id)
    .bind(&patch.contract_address)
    .bind(&patch.tx_hash)
    .bind(patch.price_suggestion.clone().map(Json))
    .bind(patch.status.map(|s| s.as_str()))
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(MinterError::NotFound(format!("asset {id}")));
    }
    Ok(())
}

/// Fetch a single asset by id.
pub async fn get_asset(pool: &SqlitePool, id: &str) -> Result<Option<AssetRecord>> {
    let row = sqlx::query_as::<_, AssetRecord>(
        r#"
        SELECT id, owner_id, owner_address, prompt, chain, name, description,
               attributes, ai_image_url, ipfs_image_uri, ipfs_metadata_uri,
               token_id, contract_address, tx_hash, price_suggestion, status,
               created_at, updated_at
        FROM   assets
        WHERE  id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch assets, newest first, optionally filtered by owner.
pub async fn list_assets(pool: &SqlitePool, owner_id: Option<&str>) -> Result<Vec<AssetRecord>> {
    let rows = match owner_id {
        Some(owner) => {
            sqlx::query_as::<_, AssetRecord>(
                r#"
                SELECT id, owner_id, owner_address, prompt, chain, name, description,
                       attributes, ai_image_url, ipfs_image_uri, ipfs_metadata_uri,
                       token_id, contract_address, tx_hash, price_suggestion, status,
                       created_at, updated_at
                FROM   assets
                WHERE  owner_id = ?1
                ORDER  BY created_at DESC, id ASC
                "#,
            )
            .bind(owner)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, AssetRecord>(
                r#"
                SELECT id, owner_id, owner_address, prompt, chain, name, description,
                       attributes, ai_image_url, ipfs_image_uri, ipfs_metadata_uri,
                       token_id, contract_address, tx_hash, price_suggestion, status,
                       created_at, updated_at
                FROM   assets
                ORDER  BY created_at DESC, id ASC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Marketplace listings
// ─────────────────────────────────────────────────────────

/// Create a listing for a minted asset. Seller identity comes from the asset
/// row itself.
pub async fn insert_listing(
    pool: &SqlitePool,
    asset: &AssetRecord,
    price: f64,
    currency: &str,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO listings
            (id, asset_id, seller_id, seller_address, price, currency, status,
             created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'active', ?7, ?8)
        "#,
    )
    .bind(&id)
    .bind(&asset.id)
    .bind(&asset.owner_id)
    .bind(&asset.owner_address)
    .bind(price)
    .bind(currency)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Fetch all active listings, newest first.
pub async fn list_listings(pool: &SqlitePool) -> Result<Vec<ListingRecord>> {
    let rows = sqlx::query_as::<_, ListingRecord>(
        r#"
        SELECT id, asset_id, seller_id, seller_address, price, currency, status,
               created_at, updated_at
        FROM   listings
        WHERE  status = 'active'
        ORDER  BY created_at DESC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
