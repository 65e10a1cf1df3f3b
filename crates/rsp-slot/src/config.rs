//! Slot machine configuration
//!
//! Immutable after validation: the machine and evaluator receive it at
//! construction and never touch module-level state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use rsp_core::{SlotError, SlotResult};

use crate::paytable::{Payline, standard_12_paylines};
use crate::symbols::SymbolCatalog;
use crate::timing::TimingConfig;

/// Grid specification (reels × visible rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub visible_rows: u8,
}

impl GridSpec {
    /// Off-screen tiles per reel: one above the window, one below
    pub const BUFFER_TILES: usize = 2;

    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self {
            reels: 5,
            visible_rows: 3,
        }
    }

    /// Tiles owned by each reel
    pub fn tiles_per_reel(&self) -> usize {
        self.visible_rows as usize + Self::BUFFER_TILES
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    #[serde(default)]
    pub grid: GridSpec,
    /// Machine width in reel units (split evenly across reels)
    #[serde(default = "default_width")]
    pub width: f64,
    /// Reel window height in reel units
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub catalog: SymbolCatalog,
    #[serde(default = "standard_12_paylines")]
    pub paylines: Vec<Payline>,
    #[serde(default)]
    pub timing: TimingConfig,
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    400.0
}

impl SlotConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SlotError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| SlotError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            Some("json") => Self::from_json(&text),
            other => Err(SlotError::InvalidConfig(format!(
                "unsupported config extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    pub fn to_json(&self) -> SlotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SlotError::Serialization(e.to_string()))
    }

    /// Replace the timing block (quick spin toggle etc.)
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Width of a single reel
    pub fn reel_width(&self) -> f64 {
        self.width / f64::from(self.grid.reels.max(1))
    }

    /// Height of a single tile
    pub fn tile_height(&self) -> f64 {
        self.height / f64::from(self.grid.visible_rows.max(1))
    }

    /// Startup validation; nothing is re-checked at evaluation time
    pub fn validate(&self) -> SlotResult<()> {
        let grid = self.grid;
        if grid.reels == 0 || grid.visible_rows == 0 {
            return Err(SlotError::InvalidConfig(format!(
                "grid must be at least 1×1, got {}×{}",
                grid.reels, grid.visible_rows
            )));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "geometry must be positive, got {}×{}",
                self.width, self.height
            )));
        }
        if self.catalog.is_empty() {
            return Err(SlotError::InvalidConfig("symbol catalog is empty".into()));
        }
        for (i, symbol) in self.catalog.iter().enumerate() {
            if symbol.id as usize != i {
                return Err(SlotError::InvalidConfig(format!(
                    "symbol '{}' has id {} at catalog index {}",
                    symbol.name, symbol.id, i
                )));
            }
            if symbol.paytable.len() != grid.reels as usize {
                return Err(SlotError::InvalidConfig(format!(
                    "symbol '{}' paytable has {} entries for {} reels",
                    symbol.name,
                    symbol.paytable.len(),
                    grid.reels
                )));
            }
        }
        for payline in &self.paylines {
            payline.validate(grid.reels, grid.visible_rows)?;
        }
        self.timing.validate(grid.reels)
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            width: default_width(),
            height: default_height(),
            catalog: SymbolCatalog::standard(),
            paylines: standard_12_paylines(),
            timing: TimingConfig::default(),
        }
    }
}
