use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::batch::Station;
use crate::predict::ObserverSite;
use crate::time_expr::TimeExpr;

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 10;
pub const DEFAULT_DAYS: u32 = 7;
pub const DEFAULT_MIN_ELEVATION_DEG: f64 = 20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stations: Vec<StationConfig>,
    pub tle: TleConfig,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub id: String,
    pub name: Option<String>,
    /// `"lat, lon"` in degrees
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
}

fn default_min_elevation() -> f64 {
    DEFAULT_MIN_ELEVATION_DEG
}

#[derive(Debug, Clone, Deserialize)]
pub struct TleConfig {
    pub folder: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub start: TimeExpr,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            start: TimeExpr::default(),
            workers: default_workers(),
        }
    }
}

fn default_days() -> u32 {
    DEFAULT_DAYS
}

fn default_workers() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl StationConfig {
    pub fn to_station(&self) -> Result<Station, ConfigError> {
        let site = ObserverSite::from_coordinates(
            &self.coordinates,
            Some(self.altitude_m),
            self.min_elevation_deg,
        )
        .ok_or_else(|| {
            ConfigError::Invalid(format!(
                "station {}: cannot parse coordinates '{}'",
                self.id, self.coordinates
            ))
        })?;
        site.validate()
            .map_err(|e| ConfigError::Invalid(format!("station {}: {}", self.id, e)))?;

        Ok(Station {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            site,
        })
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_days(self.predict.days)?;
        if self.predict.workers == 0 {
            return Err(ConfigError::Invalid("predict.workers must be at least 1".into()));
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate station id: {}",
                    station.id
                )));
            }
            station.to_station()?;
        }
        Ok(())
    }

    pub fn stations(&self) -> Result<Vec<Station>, ConfigError> {
        self.stations.iter().map(StationConfig::to_station).collect()
    }
}

pub fn validate_days(days: u32) -> Result<(), ConfigError> {
    if (MIN_DAYS..=MAX_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "days must be between {} and {}, got {}",
            MIN_DAYS, MAX_DAYS, days
        )))
    }
}
