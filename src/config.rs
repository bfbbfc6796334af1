//! Planner configuration, with environment overrides.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::map::MapSettings;
use crate::polyline::{DEFAULT_PRECISION, PolylineCodec};
use crate::sync::DEFAULT_SNAP_THRESHOLD;

pub const API_URL_VAR: &str = "ROUTE_PLANNER_API_URL";
pub const TIMEOUT_VAR: &str = "ROUTE_PLANNER_TIMEOUT_SECS";
pub const PRECISION_VAR: &str = "ROUTE_PLANNER_POLYLINE_PRECISION";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub api: ApiConfig,
    /// Must match the precision of the server's polyline encoder.
    pub polyline_precision: u32,
    pub map: MapSettings,
    /// Fraction of the viewport a sheet drag must cover to snap.
    pub snap_threshold: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polyline_precision: DEFAULT_PRECISION,
            map: MapSettings::default(),
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            api: ApiConfig {
                base_url: try_load(&lookup, API_URL_VAR, defaults.api.base_url)?,
                timeout_secs: try_load(&lookup, TIMEOUT_VAR, defaults.api.timeout_secs)?,
            },
            polyline_precision: try_load(&lookup, PRECISION_VAR, defaults.polyline_precision)?,
            ..defaults
        };
        config.codec()?;
        Ok(config)
    }

    pub fn codec(&self) -> Result<PolylineCodec, ConfigError> {
        PolylineCodec::new(self.polyline_precision).map_err(|err| ConfigError::Invalid {
            key: PRECISION_VAR,
            value: self.polyline_precision.to_string(),
            reason: err.to_string(),
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return Ok(default);
    };
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}
