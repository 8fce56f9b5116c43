use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    data::Product,
    error::{AppError, FieldErrors},
    expiration::TimeZoneSpec,
    service::{ExpirationResult, LookupService},
};

pub type AppState = Arc<LookupService>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfLifeParams {
    name: Option<String>,
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
}

pub async fn shelf_life_handler(
    State(service): State<AppState>,
    Query(params): Query<ShelfLifeParams>,
) -> Result<Json<ExpirationResult>, AppError> {
    let name = params.name.unwrap_or_default();
    let time_zone = params.time_zone.unwrap_or_default();

    let mut errors = FieldErrors::default();
    errors.require("name", &name);
    errors.require("timeZone", &time_zone);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let zone = TimeZoneSpec::parse(&time_zone)?;
    let result = service.get_shelf_life(&name, &zone).await?;

    info!(product = %result.product_name, zone = %zone, "Computed expiration");
    Ok(Json(result))
}

pub async fn search_handler(
    State(service): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Some(query) = params.query else {
        return Err(AppError::Validation(FieldErrors::required("query")));
    };

    let products = service.search_products(&query).await?;
    if products.is_empty() {
        return Err(AppError::NoResults);
    }

    Ok(Json(products))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
