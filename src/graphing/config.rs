//! Tunable parameters of the plotting engine.
//!
//! Every knob has a default matching the behaviour of the interactive plotter
//! (viewport x in [-10, 10], y in [-7.5, 7.5] on an 800x600 surface, wheel zoom by
//! 0.9 / 1.1, and so on). A TOML document can override any subset:
//!
//! ```toml
//! [viewport]
//! x_min = -5
//! x_max = 5
//!
//! [sampler]
//! grid_stride = 1
//! implicit_epsilon = 0.02
//!
//! [render]
//! theme = "dark"
//! ```
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::graphing::error::{PlotError, Result};
use crate::graphing::renderer::Theme;

/// Default visible rectangle and the surface it is mapped onto.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// smallest extent (on either axis) zooming may reach
    pub min_extent: f64,
    /// largest extent (on either axis) zooming may reach
    pub max_extent: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            y_min: -7.5,
            y_max: 7.5,
            pixel_width: 800,
            pixel_height: 600,
            min_extent: 1e-6,
            max_extent: 1e6,
        }
    }
}

/// Resolution / performance knobs of the family samplers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerConfig {
    /// parametric sweep start
    pub t_min: f64,
    /// parametric sweep end
    pub t_max: f64,
    pub t_step: f64,
    /// polar sweep step over [0, 2pi]
    pub theta_step: f64,
    /// pixel stride of the implicit / inequality grid
    pub grid_stride: u32,
    /// |lhs - rhs| below this marks an implicit-curve pixel
    pub implicit_epsilon: f64,
    /// upper bound on evaluated grid cells per mask; the stride grows to respect it
    pub max_grid_cells: usize,
    /// grid rows evaluated per cooperative step
    pub band_rows: u32,
    /// jump (in surface heights) above which an edge-crossing explicit segment is checked for a pole
    pub asymptote_jump: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            t_min: -10.0,
            t_max: 10.0,
            t_step: 0.01,
            theta_step: 0.01,
            grid_stride: 2,
            implicit_epsilon: 0.05,
            max_grid_cells: 1_000_000,
            band_rows: 16,
            asymptote_jump: 1.0,
        }
    }
}

/// Look of the drawing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(deserialize_with = "theme_from_str")]
    pub theme: Theme,
    pub draw_grid: bool,
    /// preferred distance between grid lines, in pixels
    pub grid_target_px: f64,
    /// grid lines on one axis above this count are not drawn
    pub max_grid_lines: usize,
    /// opacity of inequality fills
    pub inequality_alpha: f64,
    /// opacity of implicit-curve masks
    pub implicit_alpha: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            draw_grid: true,
            grid_target_px: 50.0,
            max_grid_lines: 200,
            inequality_alpha: 0.3,
            implicit_alpha: 1.0,
        }
    }
}

/// Interaction response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// factor applied when the wheel scrolls up (zoom in)
    pub zoom_in_factor: f64,
    /// factor applied when the wheel scrolls down (zoom out)
    pub zoom_out_factor: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            zoom_in_factor: 0.9,
            zoom_out_factor: 1.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// number of submitted inputs remembered
    pub history_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
        }
    }
}

/// All configuration of a plotting session.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub viewport: ViewportConfig,
    pub sampler: SamplerConfig,
    pub render: RenderConfig,
    pub controller: ControllerConfig,
    pub registry: RegistryConfig,
}

fn config_err(msg: impl Into<String>) -> PlotError {
    PlotError::Config(msg.into())
}

fn theme_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Theme, D::Error> {
    let name = String::deserialize(deserializer)?;
    Theme::from_str(&name).map_err(|_| de::Error::custom(format!("unknown theme `{}`", name)))
}

impl PlotConfig {
    /// Reads a configuration document. Missing tables and keys keep their defaults.
    ///
    /// # Errors
    /// `PlotError::Config` on TOML syntax errors, unknown or wrongly typed keys, or values that fail [`PlotConfig::validate`].
    pub fn from_toml_str(input: &str) -> Result<PlotConfig> {
        let config: PlotConfig =
            toml::from_str(input).map_err(|e| config_err(format!("TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file, see [`PlotConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<PlotConfig> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| config_err(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        let v = &self.viewport;
        if !(v.x_min.is_finite() && v.x_max.is_finite() && v.x_min < v.x_max) {
            return Err(config_err("viewport needs finite x_min < x_max"));
        }
        if !(v.y_min.is_finite() && v.y_max.is_finite() && v.y_min < v.y_max) {
            return Err(config_err("viewport needs finite y_min < y_max"));
        }
        if v.pixel_width == 0 || v.pixel_height == 0 {
            return Err(config_err("surface size must be non-zero"));
        }
        if !(v.min_extent > 0.0 && v.min_extent < v.max_extent) {
            return Err(config_err("extent bounds need 0 < min_extent < max_extent"));
        }
        let (wx, wy) = (v.x_max - v.x_min, v.y_max - v.y_min);
        if wx < v.min_extent || wy < v.min_extent || wx > v.max_extent || wy > v.max_extent {
            return Err(config_err("default viewport lies outside the extent bounds"));
        }

        let s = &self.sampler;
        if !(s.t_min < s.t_max) {
            return Err(config_err("sampler needs t_min < t_max"));
        }
        if !(s.t_step > 0.0) || !(s.theta_step > 0.0) {
            return Err(config_err("sampler steps must be positive"));
        }
        if s.grid_stride == 0 || s.band_rows == 0 || s.max_grid_cells == 0 {
            return Err(config_err(
                "grid_stride, band_rows and max_grid_cells must be at least 1",
            ));
        }
        if !(s.implicit_epsilon > 0.0) {
            return Err(config_err("implicit_epsilon must be positive"));
        }
        if !(s.asymptote_jump > 0.0) {
            return Err(config_err("asymptote_jump must be positive"));
        }

        let r = &self.render;
        if !(r.grid_target_px > 0.0) {
            return Err(config_err("grid_target_px must be positive"));
        }
        for alpha in [r.inequality_alpha, r.implicit_alpha] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(config_err("alpha values must lie in [0, 1]"));
            }
        }

        let c = &self.controller;
        if !(c.zoom_in_factor > 0.0 && c.zoom_in_factor < 1.0) {
            return Err(config_err("zoom_in_factor must lie in (0, 1)"));
        }
        if !(c.zoom_out_factor > 1.0 && c.zoom_out_factor.is_finite()) {
            return Err(config_err("zoom_out_factor must be greater than 1"));
        }
        Ok(())
    }
}
