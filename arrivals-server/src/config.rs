//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::otp;
use crate::realtime::defaults;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_FARE_TABLE_PATH: &str = "data/xunta_fares.csv";
pub const DEFAULT_WHITELIST_PATH: &str = "data/vitrasa_stops_p95.csv";
pub const DEFAULT_TIMETABLE_DIR: &str = "data/timetables";
pub const DEFAULT_STAGE_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {var}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub otp_base_url: String,
    /// Serve schedules from JSON fixtures instead of the trip planner.
    pub otp_fixtures_dir: Option<PathBuf>,
    pub vitrasa_base_url: String,
    pub tranvias_base_url: String,
    pub tussa_base_url: String,
    /// The shuttle stage only runs when this is set.
    pub shuttle_status_url: Option<String>,
    pub fare_table_path: PathBuf,
    pub whitelist_path: PathBuf,
    pub timetable_dir: PathBuf,
    pub stage_timeout: Duration,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            otp_base_url: otp::DEFAULT_BASE_URL.to_string(),
            otp_fixtures_dir: None,
            vitrasa_base_url: defaults::VITRASA_BASE_URL.to_string(),
            tranvias_base_url: defaults::TRANVIAS_BASE_URL.to_string(),
            tussa_base_url: defaults::TUSSA_BASE_URL.to_string(),
            shuttle_status_url: None,
            fare_table_path: PathBuf::from(DEFAULT_FARE_TABLE_PATH),
            whitelist_path: PathBuf::from(DEFAULT_WHITELIST_PATH),
            timetable_dir: PathBuf::from(DEFAULT_TIMETABLE_DIR),
            stage_timeout: Duration::from_millis(DEFAULT_STAGE_TIMEOUT_MS),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Read the process environment. Unset or empty variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            bind_addr: parse(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?,
            otp_base_url: get("OTP_BASE_URL").unwrap_or(defaults.otp_base_url),
            otp_fixtures_dir: get("OTP_FIXTURES_DIR").map(PathBuf::from),
            vitrasa_base_url: get("VITRASA_BASE_URL").unwrap_or(defaults.vitrasa_base_url),
            tranvias_base_url: get("TRANVIAS_BASE_URL").unwrap_or(defaults.tranvias_base_url),
            tussa_base_url: get("TUSSA_BASE_URL").unwrap_or(defaults.tussa_base_url),
            shuttle_status_url: get("SHUTTLE_STATUS_URL"),
            fare_table_path: get("FARE_TABLE_PATH").map_or(defaults.fare_table_path, PathBuf::from),
            whitelist_path: get("RIDERSHIP_WHITELIST_PATH")
                .map_or(defaults.whitelist_path, PathBuf::from),
            timetable_dir: get("TIMETABLE_DIR").map_or(defaults.timetable_dir, PathBuf::from),
            stage_timeout: Duration::from_millis(parse(
                get("STAGE_TIMEOUT_MS"),
                "STAGE_TIMEOUT_MS",
                DEFAULT_STAGE_TIMEOUT_MS,
            )?),
            request_timeout_secs: parse(
                get("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        })
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_otp_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.otp_fixtures_dir = Some(dir.into());
        self
    }

    pub fn with_shuttle_status_url(mut self, url: impl Into<String>) -> Self {
        self.shuttle_status_url = Some(url.into());
        self
    }

    pub fn with_fare_table_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fare_table_path = path.into();
        self
    }

    pub fn with_whitelist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.whitelist_path = path.into();
        self
    }

    pub fn with_timetable_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.timetable_dir = dir.into();
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }
}

fn parse<T: FromStr>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError { var, value: v }),
    }
}
