use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    response::Html,
};

use super::caller_ip;
use crate::{lookup_forecast, render::render_page, AppState, ForecastParams, ForecastQuery};

/// `GET /`, always answers 200 with either the forecast or an error page.
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
    request: Request,
) -> Html<String> {
    let params: ForecastParams = pairs.into_iter().collect();
    let client_ip = caller_ip(&state, &request);
    let lookup = lookup_forecast(&state, ForecastQuery::from(&params), client_ip).await;
    let (page, view) = lookup.into_page();
    Html(render_page(page, &view, &state.settings.app_name))
}
