//! Grid tuning, axis descriptions and headless scene files.

use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::layout::{validate_size, Dimension, FixedDimension, SizeTable, DEFAULT_SCAN_LIMIT};
use crate::types::Point;

fn default_tile_margin() -> u32 {
    2
}

fn default_max_scan() -> u32 {
    DEFAULT_SCAN_LIMIT
}

/// Tuning shared by the panels and caches of one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Extra columns rendered on each side of a viewport tile.
    #[serde(default = "default_tile_margin")]
    pub tile_margin_cols: u32,
    /// Extra rows rendered on each side of a viewport tile.
    #[serde(default = "default_tile_margin")]
    pub tile_margin_rows: u32,
    /// Most indices a scan of an unbounded variable-size axis may visit.
    #[serde(default = "default_max_scan")]
    pub max_scan: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_margin_cols: default_tile_margin(),
            tile_margin_rows: default_tile_margin(),
            max_scan: DEFAULT_SCAN_LIMIT,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_scan == 0 {
            return Err(GridError::Config("max_scan must be at least 1".into()));
        }
        Ok(())
    }
}

/// Serializable description of one axis.
///
/// With `sizes` set the axis is variable-sized and its count is the number of
/// sizes; otherwise every index is `size` wide and `count` bounds the axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub size: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<f64>,
    #[serde(default)]
    pub wraparound: bool,
}

impl AxisConfig {
    pub fn fixed(count: Option<u32>, size: f64) -> Self {
        Self {
            count,
            size,
            sizes: Vec::new(),
            wraparound: false,
        }
    }

    pub fn variable(sizes: Vec<f64>) -> Self {
        Self {
            count: None,
            size: 0.0,
            sizes,
            wraparound: false,
        }
    }

    #[must_use]
    pub fn wrapping(mut self) -> Self {
        self.wraparound = true;
        self
    }

    /// Validate and build the dimension.
    pub fn build(&self) -> Result<Rc<dyn Dimension>> {
        if !self.sizes.is_empty() {
            if let Some(count) = self.count {
                if usize::try_from(count).ok() != Some(self.sizes.len()) {
                    return Err(GridError::Config(format!(
                        "count {count} does not match {} sizes",
                        self.sizes.len()
                    )));
                }
            }
            return Ok(Rc::new(SizeTable::new(
                self.sizes.clone(),
                self.wraparound,
            )?));
        }
        validate_size(None, self.size)?;
        match self.count {
            Some(count) => Ok(Rc::new(FixedDimension::new(
                count,
                self.size,
                self.wraparound,
            )?)),
            None if self.wraparound => Err(GridError::WraparoundWithoutCount),
            None => Ok(Rc::new(FixedDimension::unbounded(self.size)?)),
        }
    }
}

/// Headless scene rendered by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub grid: GridConfig,
    pub columns: AxisConfig,
    pub rows: AxisConfig,
    /// Container size.
    pub width: f64,
    pub height: f64,
    /// Requested content offset of the center pane (clamped).
    #[serde(default)]
    pub offset: Point,
    /// Height of a frozen column-letter header row above the center pane.
    #[serde(default)]
    pub header_row: Option<f64>,
    /// Width of a frozen row-number header column left of the center pane.
    #[serde(default)]
    pub header_column: Option<f64>,
    /// Draw the center pane through the viewport tile cache.
    #[serde(default)]
    pub tile_cache: bool,
    /// Selected cells or ranges as A1 labels ("B2", "A1:C3").
    #[serde(default)]
    pub selected: Vec<String>,
    /// View-local taps on the center pane, applied after the first draw.
    #[serde(default)]
    pub taps: Vec<Point>,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let scene: SceneConfig = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if !v.is_finite() || v < 0.0 {
                return Err(GridError::Config(format!("{name} must be >= 0, got {v}")));
            }
        }
        if let Some(h) = self.header_row {
            validate_size(None, h)?;
        }
        if let Some(w) = self.header_column {
            validate_size(None, w)?;
        }
        Ok(())
    }
}
