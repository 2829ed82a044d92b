use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::{
    env, fs,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

pub const DEFAULT_APP_NAME: &str = "Weather API";
pub const DEFAULT_WEATHER_API_URL: &str = "http://api.weatherapi.com/v1";
pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_FORECAST_DAYS: u8 = 6;

#[derive(Parser, Clone, Debug, Default, serde::Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to Settings.toml file holding the rest of the cli options
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set the log level (default: info)
    #[arg(short, long)]
    pub level: Option<String>,

    /// Host to listen at (default: 127.0.0.1)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Port to listen on (default: 9100)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Name shown in page titles and api docs (default: Weather API)
    #[arg(long)]
    pub app_name: Option<String>,

    /// Enables the /docs api explorer
    #[arg(long)]
    #[serde(default)]
    pub debug: bool,

    /// Key for api.weatherapi.com
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub weather_api_key: Option<String>,

    /// Base url of the weather api (default: http://api.weatherapi.com/v1)
    #[arg(long)]
    pub weather_api_url: Option<String>,

    /// Base url of the ip geolocation service (default: http://ip-api.com/json)
    #[arg(long)]
    pub geolocation_url: Option<String>,

    /// Path to css/js assets served under /static (default: ./static)
    #[arg(short, long)]
    pub static_dir: Option<String>,

    /// Read the caller address from X-Real-IP / X-Forwarded-For, only enable behind a trusted proxy
    #[arg(long)]
    #[serde(default)]
    pub trust_proxy_headers: bool,

    /// Address to geolocate when the caller address is local or private, for development only
    #[arg(long)]
    pub dev_fallback_ip: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(String, std::io::Error),
    #[error("Failed to deserialize config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("No weather api key configured, set WEATHER_API_KEY or --weather-api-key")]
    MissingApiKey,
    #[error("Invalid port: {0}")]
    Port(String),
    #[error("Invalid listen address: {0}")]
    ListenAddr(String),
    #[error("Invalid dev fallback ip: {0}")]
    FallbackIp(String),
}

/// Validated application settings, built once at startup and shared through `AppState`.
#[derive(Clone, Debug)]
pub struct Settings {
    pub app_name: String,
    pub debug: bool,
    pub domain: String,
    pub port: u16,
    pub weather_api_key: String,
    pub weather_api_url: String,
    pub geolocation_url: String,
    pub forecast_days: u8,
    pub static_dir: String,
    pub trust_proxy_headers: bool,
    pub dev_fallback_ip: Option<IpAddr>,
}

impl Settings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.domain, self.port);
        SocketAddr::from_str(&raw).map_err(|_| ConfigError::ListenAddr(raw))
    }
}

impl TryFrom<Cli> for Settings {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let weather_api_key = cli
            .weather_api_key
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let port = match cli.port {
            Some(port) => port.parse::<u16>().map_err(|_| ConfigError::Port(port))?,
            None => 9100,
        };

        let dev_fallback_ip = cli
            .dev_fallback_ip
            .map(|ip| IpAddr::from_str(&ip).map_err(|_| ConfigError::FallbackIp(ip)))
            .transpose()?;

        let settings = Settings {
            app_name: cli.app_name.unwrap_or(String::from(DEFAULT_APP_NAME)),
            debug: cli.debug,
            domain: cli.domain.unwrap_or(String::from("127.0.0.1")),
            port,
            weather_api_key,
            weather_api_url: trim_url(cli.weather_api_url, DEFAULT_WEATHER_API_URL),
            geolocation_url: trim_url(cli.geolocation_url, DEFAULT_GEOLOCATION_URL),
            forecast_days: DEFAULT_FORECAST_DAYS,
            static_dir: cli.static_dir.unwrap_or(String::from("./static")),
            trust_proxy_headers: cli.trust_proxy_headers,
            dev_fallback_ip,
        };
        settings.socket_addr()?;
        Ok(settings)
    }
}

fn trim_url(url: Option<String>, default: &str) -> String {
    url.unwrap_or(String::from(default))
        .trim_end_matches('/')
        .to_owned()
}

/// Parses the command line, swapping in the toml file named by `--config` when it exists.
/// The api key from the environment still applies when the file leaves it out.
pub fn get_config_info() -> Result<Cli, ConfigError> {
    load_config(Cli::parse())
}

pub fn load_config(cli: Cli) -> Result<Cli, ConfigError> {
    let Some(config_path) = cli.config.clone() else {
        return Ok(cli);
    };
    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(cli),
        Err(e) => return Err(ConfigError::Read(config_path, e)),
    };
    let mut from_file: Cli = toml::from_str(&content)?;
    from_file.config = Some(config_path);
    from_file.level = from_file.level.or(cli.level);
    from_file.weather_api_key = from_file.weather_api_key.or(cli.weather_api_key);
    Ok(from_file)
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level = match cli.level.as_ref() {
        Some(level) => level.to_lowercase(),
        None => env::var("RUST_LOG")
            .unwrap_or_else(|_| String::from(""))
            .to_lowercase(),
    };
    match level.as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
