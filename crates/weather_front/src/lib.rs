mod app_error;
pub mod client_ip;
mod forecast;
pub mod geolocation;
mod models;
pub mod render;
pub mod routes;
mod startup;
mod utils;
mod view_model;
pub mod weather_client;

pub use app_error::AppError;
pub use forecast::*;
pub use geolocation::{Geolocator, IpApiClient, IpLocation};
pub use models::*;
pub use routes::*;
pub use startup::*;
pub use utils::*;
pub use view_model::*;
pub use weather_client::{WeatherApiClient, WeatherSource};
