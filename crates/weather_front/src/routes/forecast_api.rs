use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};

use super::caller_ip;
use crate::{lookup_forecast, AppError, AppState, ForecastParams, ForecastQuery, ViewModel};

#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    params(
        ForecastParams
    ),
    responses(
        (status = OK, description = "Current conditions, upcoming hours and daily forecast", body = ViewModel),
        (status = NOT_FOUND, description = "Weather service could not match the city"),
        (status = BAD_GATEWAY, description = "Weather service failed or sent unusable data"),
        (status = SERVICE_UNAVAILABLE, description = "Caller could not be geolocated"),
        (status = GATEWAY_TIMEOUT, description = "Weather service did not answer in time")
    ))]
pub async fn forecast_json(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
    request: Request,
) -> Result<Json<ViewModel>, AppError> {
    let params: ForecastParams = pairs.into_iter().collect();
    let client_ip = caller_ip(&state, &request);
    let lookup = lookup_forecast(&state, ForecastQuery::from(&params), client_ip).await;
    match lookup.outcome {
        Ok(view) => Ok(Json(view)),
        Err(source) => Err(AppError::Lookup {
            city: lookup.city,
            source,
        }),
    }
}
