//! HTTP surface. Every product response is re-evaluated against the clock at
//! read time; nothing derived is read back from the store.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shelfwatch_common::alert::{scan_alerts, Alert};
use shelfwatch_common::catalog::{catalog, ProductTypeInfo};
use shelfwatch_common::decay::Conditions;
use shelfwatch_common::error::ShelfError;
use shelfwatch_common::product::{CreateProduct, ProductId, ProductView};
use shelfwatch_common::reading::SensorReading;
use shelfwatch_common::simulator::simulate_reading_now;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::store::Store;

/// Default number of readings returned by the sensor-data listing.
pub const DEFAULT_READINGS_LIMIT: usize = 50;
/// Upper bound on readings returned in one listing.
pub const MAX_READINGS_LIMIT: usize = 1000;

pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

#[derive(Deserialize)]
pub struct ReadingsQuery {
    limit: Option<usize>,
}

async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Dairy Shelf Life Predictor API".to_string(),
    })
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: state.store.backend_name().to_string(),
    })
}

// ─── Products ────────────────────────────────────────────────────────────────

async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> ApiResult<ProductView> {
    let Json(req) = payload.map_err(|e| ShelfError::Validation(e.body_text()))?;

    let now = Utc::now();
    let product = req.into_product(ProductId::generate(), now)?;

    // First reading at the optimal conditions the product starts with.
    let conditions = Conditions::optimal_for(product.product_type);
    let reading = SensorReading::new(product.id.clone(), conditions, now);
    state
        .store
        .insert_product_with_reading(&product, &reading)
        .await?;

    info!(
        product_id = %product.id,
        product_type = %product.product_type,
        name = %product.name,
        "product created"
    );
    Ok(Json(product.evaluate(now)))
}

async fn list_products_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ProductView>> {
    let now = Utc::now();
    let products = state.store.list_products().await?;
    Ok(Json(products.iter().map(|p| p.evaluate(now)).collect()))
}

async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ProductView> {
    let id = ProductId(id);
    let product = state
        .store
        .find_product(&id)
        .await?
        .ok_or(ShelfError::NotFound(id))?;
    Ok(Json(product.evaluate(Utc::now())))
}

async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = ProductId(id);
    if !state.store.delete_product(&id).await? {
        return Err(ShelfError::NotFound(id).into());
    }
    info!(product_id = %id, "product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

// ─── Sensor readings ─────────────────────────────────────────────────────────

/// Most recent readings of a product, returned oldest first.
async fn sensor_data_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<ReadingsQuery>, QueryRejection>,
) -> ApiResult<Vec<SensorReading>> {
    let Query(query) = query.map_err(|e| ShelfError::Validation(e.body_text()))?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_READINGS_LIMIT)
        .min(MAX_READINGS_LIMIT);
    let mut readings = state.store.list_readings(&ProductId(id), limit).await?;
    readings.reverse();
    Ok(Json(readings))
}

async fn simulate_sensor_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SensorReading> {
    let id = ProductId(id);
    let product = state
        .store
        .find_product(&id)
        .await?
        .ok_or_else(|| ShelfError::NotFound(id.clone()))?;

    let conditions = simulate_reading_now(product.product_type);
    let reading = SensorReading::new(id.clone(), conditions, Utc::now());
    state.store.record_reading(&reading).await?;

    info!(
        product_id = %id,
        temperature = reading.temperature,
        humidity = reading.humidity,
        "simulated reading recorded"
    );
    Ok(Json(reading))
}

// ─── Catalog & alerts ────────────────────────────────────────────────────────

async fn product_types_handler() -> Json<Vec<ProductTypeInfo>> {
    Json(catalog())
}

async fn alerts_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Alert>> {
    let products = state.store.list_products().await?;
    let alerts = scan_alerts(&products, Utc::now());
    debug!(scanned = products.len(), alerts = alerts.len(), "alert scan");
    Ok(Json(alerts))
}

/// All routes, mounted under `/api`. The banner answers on both `/api` and `/api/`.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(
            "/products",
            post(create_product_handler).get(list_products_handler),
        )
        .route(
            "/products/{id}",
            get(get_product_handler).delete(delete_product_handler),
        )
        .route("/sensor-data/{id}", get(sensor_data_handler))
        .route("/simulate-sensor/{id}", post(simulate_sensor_handler))
        .route("/product-types", get(product_types_handler))
        .route("/alerts", get(alerts_handler));

    Router::new()
        .route("/api/", get(root_handler))
        .nest("/api", api)
        .with_state(state)
}
