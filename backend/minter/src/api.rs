//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::assets::{AssetRecord, AssetStatus, ListingRecord};
use crate::chain;
use crate::config::Config;
use crate::db;
use crate::errors::MinterError;
use crate::pipeline::{self, MintRequest};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub client: Client,
    pub config: Config,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AssetsQuery {
    pub owner: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateListingRequest {
    pub price: f64,
    pub currency: Option<String>,
}

#[derive(Serialize)]
pub struct AssetsResponse {
    pub count: usize,
    pub assets: Vec<AssetRecord>,
}

#[derive(Serialize)]
pub struct ListingsResponse {
    pub count: usize,
    pub listings: Vec<ListingRecord>,
}

#[derive(Serialize)]
pub struct ListingCreatedResponse {
    pub listing_id: String,
    pub asset_id: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

fn error_response(error: &MinterError, asset_id: Option<String>) -> axum::response::Response {
    let status = match error {
        MinterError::Validation(_) => StatusCode::BAD_REQUEST,
        MinterError::NotFound(_) => StatusCode::NOT_FOUND,
        MinterError::Generation(_)
        | MinterError::Upload(_)
        | MinterError::Mint(_)
        | MinterError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            code: error.code(),
            message: error.to_string(),
            asset_id,
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /mint`
///
/// Runs one full pipeline within the request. Success returns the complete
/// receipt; failure returns a coded error that includes the asset id
/// whenever a row was created before the failure.
pub async fn mint(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<MintRequest>,
) -> impl IntoResponse {
    match pipeline::run(&state.pool, &state.client, &state.config, request).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(failure) => error_response(&failure.error, failure.asset_id),
    }
}

/// `GET /assets` — all assets, optionally filtered by `?owner=`.
pub async fn get_assets(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AssetsQuery>,
) -> impl IntoResponse {
    match db::list_assets(&state.pool, query.owner.as_deref()).await {
        Ok(assets) => {
            let count = assets.len();
            (StatusCode::OK, Json(AssetsResponse { count, assets })).into_response()
        }
        Err(e) => error_response(&e, None),
    }
}

/// `GET /assets/:id`
pub async fn get_asset(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match db::get_asset(&state.pool, &id).await {
        Ok(Some(asset)) => (StatusCode::OK, Json(asset)).into_response(),
        Ok(None) => error_response(&MinterError::NotFound(format!("asset {id}")), None),
        Err(e) => error_response(&e, None),
    }
}

/// `POST /assets/:id/listings`
///
/// Lists a minted asset on the marketplace. Rejected unless the asset has
/// reached `minted`; the seller is the asset's owner.
pub async fn create_listing(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(request): Json<CreateListingRequest>,
) -> impl IntoResponse {
    if !request.price.is_finite() || request.price <= 0.0 {
        return error_response(
            &MinterError::Validation("price must be positive".to_string()),
            None,
        );
    }

    let asset = match db::get_asset(&state.pool, &id).await {
        Ok(Some(asset)) => asset,
        Ok(None) => return error_response(&MinterError::NotFound(format!("asset {id}")), None),
        Err(e) => return error_response(&e, None),
    };

    if asset.status != AssetStatus::Minted.as_str() {
        return error_response(
            &MinterError::Validation(format!(
                "asset {id} is not minted (status: {})",
                asset.status
            )),
            Some(id),
        );
    }

    let currency = request
        .currency
        .unwrap_or_else(|| chain::native_currency(&asset.chain).to_string());

    match db::insert_listing(&state.pool, &asset, request.price, &currency).await {
        Ok(listing_id) => (
            StatusCode::CREATED,
            Json(ListingCreatedResponse {
                listing_id,
                asset_id: asset.id,
                price: request.price,
                currency,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e, None),
    }
}

/// `GET /listings` — all active listings.
pub async fn get_listings(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match db::list_listings(&state.pool).await {
        Ok(listings) => {
            let count = listings.len();
            (StatusCode::OK, Json(ListingsResponse { count, listings })).into_response()
        }
        Err(e) => error_response(&e, None),
    }
}
