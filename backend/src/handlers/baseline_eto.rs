//! Baseline ETₒ lookup endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::DomainError;

use crate::error::AppResult;
use crate::services::baseline_eto::BaselineEToReader;
use crate::services::geocoder::resolve_coordinates;
use crate::AppState;

/// Significant digits reported to clients
const ETO_PRECISION: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub loc: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BaselineEToResponse {
    /// Average daily ETₒ, mm/day
    pub eto: f64,
}

/// Average daily baseline ETₒ at a location
pub async fn get_baseline_eto(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<BaselineEToResponse>> {
    let mut reader = BaselineEToReader::new(state.baseline_eto.clone());
    if let Err(error) = reader.read_header().await {
        tracing::error!("An error occurred while reading the baseline ETo data file header: {}", error);
        return Err(DomainError::DataUnavailable(
            "Baseline ETo calculation is currently unavailable".to_string(),
        )
        .into());
    }

    let coordinates = resolve_coordinates(&query.loc, state.geocoder.as_ref()).await?;
    let eto = reader
        .average_daily_eto(&coordinates, Some(ETO_PRECISION))
        .await?;

    tracing::debug!(%coordinates, eto, "Baseline ETo lookup");
    Ok(Json(BaselineEToResponse { eto }))
}
