use crate::helpers::{
    forecast_payload, get, get_with_headers, location, spawn_app, spawn_app_with, test_settings,
    transport_error, MockGeolocation, MockWeatherApi, PUBLIC_PEER,
};
use axum::http::StatusCode;
use std::net::{IpAddr, Ipv4Addr};
use weather_front::{geolocation, weather_client};

#[tokio::test]
async fn renders_forecast_for_searched_city() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .withf(|city, days| city.to_string() == "Washington" && *days == 6)
        .times(1)
        .returning(|_, _| Ok(forecast_payload("Washington", "2024-03-01 05:00", 6)));
    let mut geolocator = MockGeolocation::new();
    geolocator.expect_resolve().never();

    let (status, html) = get(spawn_app(weather, geolocator), "/?city_name=Washington").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Washington</h1>"));
    assert!(html.contains("United States of America"));
    assert!(html.contains("11°C"));
    assert!(html.contains("Partly cloudy"));
    assert_eq!(html.matches(r#"class="hour-column""#).count(), 8);
    assert_eq!(html.matches(r#"class="forecast-day""#).count(), 6);
    assert!(!html.contains(r#"class="alert""#));
}

#[tokio::test]
async fn fahrenheit_scale_uses_temp_f() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .returning(|_, _| Ok(forecast_payload("Washington", "2024-03-01 05:00", 6)));

    let (_, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Washington&temp_scale=temp_f",
    )
    .await;

    assert!(html.contains("52°F"));
    assert!(html.contains(r#"name="temp_scale" value="temp_f""#));
}

#[tokio::test]
async fn unknown_scale_falls_back_to_celsius() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .returning(|_, _| Ok(forecast_payload("Washington", "2024-03-01 05:00", 6)));

    let (_, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Washington&temp_scale=kelvin",
    )
    .await;

    assert!(html.contains("11°C"));
    assert!(html.contains(r#"name="temp_scale" value="temp_c""#));
}

#[tokio::test]
async fn empty_city_is_resolved_from_caller_address() {
    let mut geolocator = MockGeolocation::new();
    geolocator
        .expect_resolve()
        .withf(|ip| *ip == PUBLIC_PEER)
        .times(1)
        .returning(|_| location("Washington"));
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .withf(|city, _| city.to_string() == "Washington")
        .times(1)
        .returning(|_, _| Ok(forecast_payload("Washington", "2024-03-01 23:45", 6)));

    let (status, html) = get(spawn_app(weather, geolocator), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Washington</h1>"));
    assert!(html.contains(r#"value="Washington""#));
    assert_eq!(html.matches(r#"class="hour-column""#).count(), 8);
}

#[tokio::test]
async fn proxy_header_is_used_when_trusted() {
    let forwarded = IpAddr::V4(Ipv4Addr::new(81, 2, 69, 160));
    let mut geolocator = MockGeolocation::new();
    geolocator
        .expect_resolve()
        .withf(move |ip| *ip == forwarded)
        .times(1)
        .returning(|_| location("London"));
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .withf(|city, _| city.to_string() == "London")
        .returning(|_, _| Ok(forecast_payload("London", "2024-03-01 12:00", 6)));
    let settings = weather_front::Settings {
        trust_proxy_headers: true,
        ..test_settings()
    };

    let (_, html) = get_with_headers(
        spawn_app_with(settings, weather, geolocator),
        "/",
        &[("x-real-ip", "81.2.69.160")],
    )
    .await;

    assert!(html.contains("<h1>London</h1>"));
}

#[tokio::test]
async fn unknown_city_renders_not_found_page() {
    let mut weather = MockWeatherApi::new();
    weather.expect_fetch_forecast().returning(|_, _| {
        Err(weather_client::Error::NotFound(String::from(
            r#"{"error":{"code":1006,"message":"No matching location found."}}"#,
        )))
    });

    let (status, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Nowhere",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("not-found"));
    assert!(html.contains("City &#x27;Nowhere&#x27; not found. Please check the spelling."));
}

#[tokio::test]
async fn upstream_status_is_reported() {
    let mut weather = MockWeatherApi::new();
    weather.expect_fetch_forecast().returning(|_, _| {
        Err(weather_client::Error::UpstreamHttp(
            StatusCode::SERVICE_UNAVAILABLE,
        ))
    });

    let (status, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(
        "Weather service error (HTTP 503 Service Unavailable). Please try again later."
    ));
    assert!(html.contains("has-error"));
    assert!(!html.contains("not-found"));
}

#[tokio::test]
async fn repeated_city_uses_last_value() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .withf(|city, _| city.to_string() == "Rome")
        .times(1)
        .returning(|_, _| Ok(forecast_payload("Rome", "2024-03-01 12:00", 6)));

    let (status, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris&city_name=Rome&temp_scale=temp_c&temp_scale=temp_f",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Rome</h1>"));
    assert!(html.contains("52°F"));
}

#[tokio::test]
async fn malformed_query_still_renders_page() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .withf(|city, _| city.to_string() == "Paris")
        .returning(|_, _| Ok(forecast_payload("Paris", "2024-03-01 12:00", 6)));

    let (status, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris&%ZZ&&=x",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Paris</h1>"));
}

#[tokio::test]
async fn error_page_keeps_requested_scale() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .returning(|_, _| Err(weather_client::Error::Timeout));

    let (_, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris&temp_scale=temp_f",
    )
    .await;

    assert!(html.contains("Request timed out."));
    assert!(html.contains(r#"name="temp_scale" value="temp_f""#));
}

#[tokio::test]
async fn timeout_is_reported() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .returning(|_, _| Err(weather_client::Error::Timeout));

    let (_, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris",
    )
    .await;

    assert!(html.contains("Request timed out. Please try again."));
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let err = transport_error().await;
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .return_once(move |_, _| Err(err));

    let (_, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris",
    )
    .await;

    assert!(html.contains("An unexpected error occurred."));
    assert!(!html.contains("Cannot connect"));
}

#[tokio::test]
async fn unusable_payload_is_a_data_error() {
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .returning(|_, _| Ok(forecast_payload("Paris", "2024-03-01 23:00", 1)));

    let (_, html) = get(
        spawn_app(weather, MockGeolocation::new()),
        "/?city_name=Paris",
    )
    .await;

    assert!(html.contains("Received unexpected data format from weather service."));
}

#[tokio::test]
async fn geolocation_outage_skips_weather_call() {
    let mut geolocator = MockGeolocation::new();
    geolocator.expect_resolve().returning(|_| {
        Err(geolocation::Error::UpstreamUnavailable(String::from(
            "connection refused",
        )))
    });
    let mut weather = MockWeatherApi::new();
    weather.expect_fetch_forecast().never();

    let (status, html) = get(spawn_app(weather, geolocator), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Cannot connect to weather service."));
}

#[tokio::test]
async fn ungeolocatable_caller_gets_not_found_page() {
    let mut geolocator = MockGeolocation::new();
    geolocator.expect_resolve().returning(|_| location(""));
    let mut weather = MockWeatherApi::new();
    weather.expect_fetch_forecast().never();

    let (status, html) = get(spawn_app(weather, geolocator), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("not-found"));
}

#[tokio::test]
async fn requests_do_not_share_failures() {
    let mut calls = 0;
    let mut weather = MockWeatherApi::new();
    weather
        .expect_fetch_forecast()
        .times(2)
        .returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(weather_client::Error::Timeout)
            } else {
                Ok(forecast_payload("Paris", "2024-03-01 12:00", 6))
            }
        });
    let app = spawn_app(weather, MockGeolocation::new());

    let (_, first) = get(app.clone(), "/?city_name=Paris").await;
    let (_, second) = get(app, "/?city_name=Paris").await;

    assert!(first.contains("Request timed out."));
    assert!(second.contains("<h1>Paris</h1>"));
    assert!(!second.contains(r#"class="alert""#));
}

#[tokio::test]
async fn static_assets_are_served() {
    let (status, body) = get(
        spawn_app(MockWeatherApi::new(), MockGeolocation::new()),
        "/static/js/recent_temperature.js",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("hour-column"));
}
