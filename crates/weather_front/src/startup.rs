use crate::{
    forecast_json, index_handler, routes, Condition, DaySummary, ForecastDay, Geolocator,
    HourlyRecord, IpApiClient, Settings, TemperatureScale, ViewModel, WeatherApiClient,
    WeatherSource,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::Method;
use log::info;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub const API_V1_PREFIX: &str = "/api/v1";

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub weather: Arc<dyn WeatherSource>,
    pub geolocator: Arc<dyn Geolocator>,
}

#[derive(OpenApi)]
#[openapi(
    paths(routes::forecast_api::forecast_json),
    components(
        schemas(
                ViewModel,
                TemperatureScale,
                ForecastDay,
                DaySummary,
                HourlyRecord,
                Condition
            )
    ),
    tags(
        (name = "weather front api", description = "current conditions and forecast for a city, or for the caller's location")
    )
)]
struct ApiDoc;

pub fn build_app_state(settings: Settings) -> Result<AppState, anyhow::Error> {
    let weather = Arc::new(
        WeatherApiClient::new(
            settings.weather_api_key.clone(),
            settings.weather_api_url.clone(),
        )
        .map_err(|e| anyhow!("error setting up weather client: {}", e))?,
    );
    let geolocator = Arc::new(
        IpApiClient::new(settings.geolocation_url.clone())
            .map_err(|e| anyhow!("error setting up geolocation client: {}", e))?,
    );

    Ok(AppState {
        settings: Arc::new(settings),
        weather,
        geolocator,
    })
}

pub fn app(app_state: AppState) -> Router {
    let serve_dir = ServeDir::new(app_state.settings.static_dir.clone());
    let docs_enabled = app_state.settings.debug;
    let docs_title = app_state.settings.app_name.clone();
    let cors = CorsLayer::new()
        // the json route is read-only
        .allow_methods([Method::GET])
        .allow_origin(Any);

    let router = Router::new()
        .route("/", get(index_handler))
        .route(&format!("{}/forecast", API_V1_PREFIX), get(forecast_json))
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(app_state))
        .nest_service("/static", serve_dir);

    let router = if docs_enabled {
        let mut doc = ApiDoc::openapi();
        doc.info.title = docs_title;
        router.merge(Scalar::with_url("/docs", doc))
    } else {
        router
    };
    router.layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
