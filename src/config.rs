use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// Every field defaults to the constants the charts were designed around, so
// a config file is only needed to override paths or dimensions.

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub trend: TrendConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub boroughs_geojson: PathBuf,
    pub hospitals_csv: PathBuf,
    pub borough_weeks_csv: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            boroughs_geojson: PathBuf::from("data/nyc.geojson"),
            hospitals_csv: PathBuf::from("data/nyc_icu.csv"),
            borough_weeks_csv: PathBuf::from("data/by_borough.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Margin { top: 0.0, left: 0.0, right: 0.0, bottom: 0.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub target_week: String,
    pub center: (f64, f64),
    pub projection_scale: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            width: 600.0,
            height: 500.0,
            margin: Margin { top: 25.0, ..Margin::default() },
            target_week: "2021/03/12".to_string(),
            center: (-73.94, 40.70),
            projection_scale: 45000.0,
        }
    }
}

impl MapConfig {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrendConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            width: 700.0,
            height: 500.0,
            margin: Margin { top: 100.0, left: 50.0, right: 150.0, bottom: 30.0 },
        }
    }
}

impl TrendConfig {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { dir: PathBuf::from("output") }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: 8080 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Missing file falls back to the built-in chart constants.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(AppConfig::default())
        }
    }
}
